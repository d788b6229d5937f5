use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::debug;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt},
};

use crate::{
    error::{FanCtlError, Result},
    sensors::TemperatureSource,
    temperature::Temperature,
};

/// SoC temperature exposed by the kernel thermal framework.
pub const THERMAL_ZONE_PATH: &str = "/sys/devices/virtual/thermal/thermal_zone0/temp";

/// Reads a sysfs thermal-zone `temp` file through one long-lived handle.
///
/// Every read rewinds the handle to offset 0, so the file is opened once at
/// setup and never reopened.
#[derive(Debug)]
pub struct ThermalZoneSensor {
    path: PathBuf,
    file: Option<File>,
}

impl ThermalZoneSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn read_error(&self, reason: impl Into<String>) -> FanCtlError {
        FanCtlError::SensorRead {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl Default for ThermalZoneSensor {
    fn default() -> Self {
        Self::new(THERMAL_ZONE_PATH)
    }
}

#[async_trait]
impl TemperatureSource for ThermalZoneSensor {
    async fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }

        let file = File::open(&self.path)
            .await
            .map_err(|source| FanCtlError::SensorUnavailable {
                path: self.path.clone(),
                source,
            })?;
        debug!("Opened temperature source {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    async fn read(&mut self) -> Result<Temperature> {
        let Some(file) = self.file.as_mut() else {
            return Err(self.read_error("sensor is not open"));
        };

        let mut raw = String::new();
        let read = file.read_to_string(&mut raw).await;
        let rewound = file.seek(SeekFrom::Start(0)).await;
        read.map_err(|e| self.read_error(e.to_string()))?;
        rewound.map_err(|e| self.read_error(format!("rewind failed: {e}")))?;

        Temperature::from_raw(&raw).map_err(|reason| self.read_error(reason))
    }

    async fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("Closed temperature source {}", self.path.display());
        }
    }
}
