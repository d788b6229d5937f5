use async_trait::async_trait;
use log::{debug, info};

use crate::{error::Result, fan_controller::FanActuator, hysteresis::FanState};

/// Actuator that only remembers what it was asked to do.
///
/// Decision logic runs unchanged; no GPIO I/O is performed, and `shutdown`
/// is a no-op rather than skipped.
#[derive(Debug, Default)]
pub struct DryRunFan {
    pin: u8,
    state: FanState,
    history: Vec<FanState>,
}

impl DryRunFan {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            ..Default::default()
        }
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    /// Every state passed to `set`, in order.
    pub fn history(&self) -> &[FanState] {
        &self.history
    }
}

#[async_trait]
impl FanActuator for DryRunFan {
    async fn initialize(&mut self) -> Result<()> {
        info!("Dry run: GPIO pin {} will not be touched", self.pin);
        self.state = FanState::Off;
        Ok(())
    }

    async fn set(&mut self, state: FanState) -> Result<()> {
        debug!("Dry run: pin {} -> {}", self.pin, state.level());
        self.state = state;
        self.history.push(state);
        Ok(())
    }

    async fn shutdown(&mut self) {
        debug!("Dry run: nothing to release on pin {}", self.pin);
    }

    fn pin(&self) -> u8 {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn records_requested_states() {
        let mut fan = DryRunFan::new(14);
        fan.initialize().await.unwrap();
        fan.set(FanState::On).await.unwrap();
        fan.set(FanState::Off).await.unwrap();

        assert_eq!(fan.history(), &[FanState::On, FanState::Off]);
        assert_eq!(fan.state(), FanState::Off);
    }

    #[tokio::test]
    async fn shutdown_is_repeatable() {
        let mut fan = DryRunFan::new(14);
        fan.shutdown().await;
        fan.initialize().await.unwrap();
        fan.shutdown().await;
        fan.shutdown().await;
        assert!(fan.history().is_empty());
    }
}
