//! Fan actuator abstraction.

use async_trait::async_trait;

use crate::{error::Result, hysteresis::FanState};

/// Binary fan actuator driven through a single output pin.
///
/// The pin number is fixed at construction. `shutdown` must be safe after a
/// partial `initialize` and idempotent.
///
/// # Example
///
/// ```no_run
/// use rpi_fanctl::{drivers::sysfs_gpio::SysfsGpioFan, fan_controller::FanActuator, hysteresis::FanState};
///
/// # async fn example() -> rpi_fanctl::error::Result<()> {
/// let mut fan = SysfsGpioFan::new("/sys/class/gpio", 14);
/// fan.initialize().await?;
/// fan.set(FanState::On).await?;
/// fan.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FanActuator: Send {
    /// Configures the pin as an output forced to logical 0.
    async fn initialize(&mut self) -> Result<()>;

    /// Drives the pin to the level of `state`.
    async fn set(&mut self, state: FanState) -> Result<()>;

    /// Releases the pin. Best effort, never fails.
    async fn shutdown(&mut self);

    /// Broadcom GPIO number this actuator drives.
    fn pin(&self) -> u8;
}
