use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::fs;

use crate::{
    error::{FanCtlError, Result},
    fan_controller::FanActuator,
    hysteresis::FanState,
};

/// Kernel sysfs GPIO class directory (Broadcom numbering on the Pi).
pub const GPIO_ROOT: &str = "/sys/class/gpio";

/// Fan switched by a GPIO output through the sysfs GPIO ABI.
#[derive(Debug)]
pub struct SysfsGpioFan {
    root: PathBuf,
    pin: u8,
    // We wrote the pin to `export` and owe an `unexport`.
    exported: bool,
    // The pin is an output and owes a drive-low before release.
    configured: bool,
}

impl SysfsGpioFan {
    pub fn new(root: impl AsRef<Path>, pin: u8) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pin,
            exported: false,
            configured: false,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.exported || self.configured
    }

    fn pin_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.pin))
    }

    fn unavailable(&self, source: io::Error) -> FanCtlError {
        FanCtlError::ActuatorUnavailable {
            pin: self.pin,
            source,
        }
    }

    async fn write_attr(&self, attr: &str, value: &str) -> io::Result<()> {
        fs::write(self.pin_dir().join(attr), value).await
    }
}

#[async_trait]
impl FanActuator for SysfsGpioFan {
    async fn initialize(&mut self) -> Result<()> {
        if !fs::try_exists(self.pin_dir()).await.unwrap_or(false) {
            fs::write(self.root.join("export"), self.pin.to_string())
                .await
                .map_err(|e| self.unavailable(e))?;
            self.exported = true;
            debug!("Exported GPIO pin {}", self.pin);
        }

        // "low" sets output direction with the level already at 0.
        self.write_attr("direction", "low")
            .await
            .map_err(|e| self.unavailable(e))?;
        self.configured = true;

        info!("GPIO pin {} configured as output, fan off", self.pin);
        Ok(())
    }

    async fn set(&mut self, state: FanState) -> Result<()> {
        if !self.configured {
            return Err(FanCtlError::ActuatorWrite {
                pin: self.pin,
                source: io::Error::new(io::ErrorKind::NotConnected, "pin is not configured"),
            });
        }

        self.write_attr("value", &state.level().to_string())
            .await
            .map_err(|source| FanCtlError::ActuatorWrite {
                pin: self.pin,
                source,
            })
    }

    async fn shutdown(&mut self) {
        if self.configured {
            if let Err(e) = self.write_attr("value", "0").await {
                warn!("Failed to drive GPIO pin {} low: {e}", self.pin);
            }
            if let Err(e) = self.write_attr("direction", "in").await {
                warn!("Failed to switch GPIO pin {} to input: {e}", self.pin);
            }
            self.configured = false;
        }

        if self.exported {
            if let Err(e) = fs::write(self.root.join("unexport"), self.pin.to_string()).await {
                warn!("Failed to unexport GPIO pin {}: {e}", self.pin);
            }
            self.exported = false;
        }

        debug!("Released GPIO pin {}", self.pin);
    }

    fn pin(&self) -> u8 {
        self.pin
    }
}
