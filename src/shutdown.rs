//! Termination signal handling and one-shot cleanup.

use std::{
    fmt, io,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
};

use log::{debug, info, warn};
use tokio::{
    signal::unix::{SignalKind, signal},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{fan_controller::FanActuator, sensors::TemperatureSource};

/// Why the daemon is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// SIGTERM, e.g. from `systemctl stop`.
    Terminate,
    /// SIGINT, Ctrl+C in a terminal.
    Interrupt,
    /// Programmatic request.
    Requested,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Terminate => "SIGTERM",
            Self::Interrupt => "SIGINT (Ctrl+C)",
            Self::Requested => "shutdown request",
        })
    }
}

/// Shared exit signal plus the exactly-once cleanup guard.
///
/// Cloning is cheap; every clone observes the same token. The only state
/// shared with the signal listener is the token itself and the recorded cause,
/// both race-free without a lock.
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    token: CancellationToken,
    cause: OnceLock<ShutdownCause>,
    cleaned_up: AtomicBool,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token observed by the poll loop's wait.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// The first cause that triggered shutdown.
    pub fn cause(&self) -> Option<ShutdownCause> {
        self.inner.cause.get().copied()
    }

    /// Sets the exit signal. Returns `false` if it was already set.
    pub fn trigger(&self, cause: ShutdownCause) -> bool {
        if self.inner.cause.set(cause).is_err() {
            debug!("Shutdown already in progress, ignoring {cause}");
            return false;
        }

        warn!("Interrupted by {cause}, shutting down");
        self.inner.token.cancel();
        true
    }

    /// Whether the sensor and fan have already been released.
    pub fn is_cleaned_up(&self) -> bool {
        self.inner.cleaned_up.load(Ordering::Acquire)
    }

    /// Spawns a listener routing SIGTERM and SIGINT into [`Self::trigger`].
    ///
    /// Handlers are registered before this returns. The task keeps running
    /// after the first signal so that repeats during cleanup are logged; abort
    /// the handle once cleanup is done.
    pub fn listen_for_signals(&self) -> io::Result<JoinHandle<()>> {
        let mut terminate = signal(SignalKind::terminate())?;
        let mut interrupt = signal(SignalKind::interrupt())?;
        let this = self.clone();

        Ok(tokio::spawn(async move {
            loop {
                let cause = tokio::select! {
                    Some(()) = terminate.recv() => ShutdownCause::Terminate,
                    Some(()) = interrupt.recv() => ShutdownCause::Interrupt,
                    else => break,
                };
                this.trigger(cause);
            }
            debug!("Signal listener stopped");
        }))
    }

    /// Closes the sensor and releases the fan, once per process.
    ///
    /// Later calls do nothing and return `false`. Release is best effort and
    /// cannot fail.
    pub async fn cleanup(
        &self,
        sensor: &mut dyn TemperatureSource,
        fan: &mut dyn FanActuator,
    ) -> bool {
        if self.inner.cleaned_up.swap(true, Ordering::AcqRel) {
            debug!("Cleanup already done");
            return false;
        }

        info!("Cleanup: fan will stop");
        sensor.close().await;
        fan.shutdown().await;
        true
    }
}
