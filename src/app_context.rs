//! Daemon context: everything one run of the daemon owns.

use std::sync::Arc;

use log::info;

use crate::{
    config::PollConfig,
    error::Result,
    fan_controller::FanActuator,
    hysteresis::{FanState, HysteresisController},
    sensors::TemperatureSource,
    shutdown::ShutdownCoordinator,
};

/// Owned handles and state of a running daemon.
///
/// Replaces process-wide globals: the poll loop borrows it mutably, while the
/// signal path only ever sees the [`ShutdownCoordinator`] clone.
pub struct DaemonContext {
    pub config: Arc<PollConfig>,
    pub sensor: Box<dyn TemperatureSource>,
    pub fan: Box<dyn FanActuator>,
    pub controller: HysteresisController,
    pub shutdown: ShutdownCoordinator,
}

impl DaemonContext {
    pub fn new(
        config: Arc<PollConfig>,
        sensor: Box<dyn TemperatureSource>,
        fan: Box<dyn FanActuator>,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        let controller = HysteresisController::new(config.thresholds);
        Self {
            config,
            sensor,
            fan,
            controller,
            shutdown,
        }
    }

    pub fn fan_state(&self) -> FanState {
        self.controller.state()
    }

    /// Forces the fan to a known-off output, then opens the sensor.
    pub async fn setup(&mut self) -> Result<()> {
        let config = &self.config;
        info!(
            "Setup: pin={}, high={}, low={}, time={}, dry_run={}",
            config.pin,
            config.thresholds.high(),
            config.thresholds.low(),
            config.interval_secs,
            config.dry_run
        );

        self.fan.initialize().await?;
        self.sensor.open().await?;
        Ok(())
    }

    /// Releases sensor and fan. Only the first call per coordinator acts.
    pub async fn cleanup(&mut self) -> bool {
        self.shutdown
            .cleanup(self.sensor.as_mut(), self.fan.as_mut())
            .await
    }
}
