//! Error kinds surfaced by the control core.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Result alias used throughout the control core.
pub type Result<T> = std::result::Result<T, FanCtlError>;

/// Fatal conditions of the daemon.
///
/// None of these are retried inside the core: every variant stops the poll
/// loop and is mapped to [`ExitOutcome::Error`](crate::application::ExitOutcome)
/// after cleanup has run.
#[derive(Error, Debug)]
pub enum FanCtlError {
    #[error("Failed to open \"{}\" file: need newer firmware ({source})", path.display())]
    SensorUnavailable { path: PathBuf, source: io::Error },

    #[error("Failed to read temperature from \"{}\": {reason}", path.display())]
    SensorRead { path: PathBuf, reason: String },

    #[error("GPIO pin {pin} unavailable: {source}")]
    ActuatorUnavailable { pin: u8, source: io::Error },

    #[error("Failed to drive GPIO pin {pin}: {source}")]
    ActuatorWrite { pin: u8, source: io::Error },

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

impl FanCtlError {
    /// True for errors that can only happen before the poll loop starts.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::SensorUnavailable { .. }
                | Self::ActuatorUnavailable { .. }
                | Self::ConfigurationInvalid(_)
        )
    }
}
