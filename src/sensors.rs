//! Temperature source capability.

use async_trait::async_trait;

use crate::{error::Result, temperature::Temperature};

/// A re-readable temperature resource.
///
/// `open` acquires the resource once at setup; `read` must leave it ready for
/// the next call for the whole life of the process; `close` releases it and
/// may be called any number of times.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemperatureSource: Send {
    /// Acquires the underlying resource, failing with `SensorUnavailable`.
    async fn open(&mut self) -> Result<()>;

    /// Reads a fresh value, failing with `SensorRead`.
    async fn read(&mut self) -> Result<Temperature>;

    /// Releases the resource if it is held.
    async fn close(&mut self);
}
