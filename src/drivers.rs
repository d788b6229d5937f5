//! Fan actuator backends.

pub mod dry_run;
pub mod sysfs_gpio;

use crate::{config::PollConfig, fan_controller::FanActuator};

/// Picks the backend once at startup from the `dry_run` flag.
pub fn from_config(config: &PollConfig) -> Box<dyn FanActuator> {
    if config.dry_run {
        Box::new(dry_run::DryRunFan::new(config.pin))
    } else {
        Box::new(sysfs_gpio::SysfsGpioFan::new(&config.gpio_root, config.pin))
    }
}
