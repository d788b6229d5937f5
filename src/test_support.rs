//! Hand-written capability doubles shared by the async tests.

use std::{
    cell::RefCell,
    collections::VecDeque,
    io,
    path::PathBuf,
    sync::{Arc, Mutex, Once},
};

use async_trait::async_trait;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::{
    error::{FanCtlError, Result},
    fan_controller::FanActuator,
    hysteresis::FanState,
    sensors::TemperatureSource,
    shutdown::{ShutdownCause, ShutdownCoordinator},
    temperature::Temperature,
};

#[derive(Debug, Default)]
pub struct SensorLog {
    pub opens: usize,
    pub reads: usize,
    pub closes: usize,
}

/// Sensor replaying a fixed script; `None` entries fail the read.
pub struct ScriptedSensor {
    script: VecDeque<Option<f64>>,
    log: Arc<Mutex<SensorLog>>,
    fail_open: bool,
    stop_when_done: Option<ShutdownCoordinator>,
}

impl ScriptedSensor {
    pub fn new(script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            log: Arc::default(),
            fail_open: false,
            stop_when_done: None,
        }
    }

    pub fn readings(values: &[f64]) -> Self {
        Self::new(values.iter().copied().map(Some))
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::new([])
        }
    }

    /// Triggers `shutdown` as the last scripted entry is handed out.
    pub fn stop_when_done(mut self, shutdown: &ShutdownCoordinator) -> Self {
        self.stop_when_done = Some(shutdown.clone());
        self
    }

    pub fn log(&self) -> Arc<Mutex<SensorLog>> {
        self.log.clone()
    }

    fn error(reason: &str) -> FanCtlError {
        FanCtlError::SensorRead {
            path: PathBuf::from("scripted"),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TemperatureSource for ScriptedSensor {
    async fn open(&mut self) -> Result<()> {
        self.log.lock().unwrap().opens += 1;
        if self.fail_open {
            return Err(FanCtlError::SensorUnavailable {
                path: PathBuf::from("scripted"),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Temperature> {
        self.log.lock().unwrap().reads += 1;
        let next = self.script.pop_front();
        if self.script.is_empty() {
            if let Some(shutdown) = &self.stop_when_done {
                shutdown.trigger(ShutdownCause::Requested);
            }
        }
        match next {
            Some(Some(celsius)) => Ok(Temperature::from_celsius(celsius)),
            Some(None) => Err(Self::error("scripted failure")),
            None => Err(Self::error("script exhausted")),
        }
    }

    async fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}

#[derive(Debug, Default)]
pub struct FanLog {
    pub initializes: usize,
    pub sets: Vec<FanState>,
    pub shutdowns: usize,
}

/// Actuator that records every call.
pub struct RecordingFan {
    log: Arc<Mutex<FanLog>>,
    fail_initialize: bool,
    fail_set: bool,
}

impl RecordingFan {
    pub fn new() -> Self {
        Self {
            log: Arc::default(),
            fail_initialize: false,
            fail_set: false,
        }
    }

    pub fn failing_initialize() -> Self {
        Self {
            fail_initialize: true,
            ..Self::new()
        }
    }

    pub fn failing_set() -> Self {
        Self {
            fail_set: true,
            ..Self::new()
        }
    }

    pub fn log(&self) -> Arc<Mutex<FanLog>> {
        self.log.clone()
    }
}

#[async_trait]
impl FanActuator for RecordingFan {
    async fn initialize(&mut self) -> Result<()> {
        self.log.lock().unwrap().initializes += 1;
        if self.fail_initialize {
            return Err(FanCtlError::ActuatorUnavailable {
                pin: 14,
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        Ok(())
    }

    async fn set(&mut self, state: FanState) -> Result<()> {
        if self.fail_set {
            return Err(FanCtlError::ActuatorWrite {
                pin: 14,
                source: io::Error::other("write failed"),
            });
        }
        self.log.lock().unwrap().sets.push(state);
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.log.lock().unwrap().shutdowns += 1;
    }

    fn pin(&self) -> u8 {
        14
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<CapturedRecord>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Global test logger keeping records per thread, so parallel tests on their
/// own runtimes do not see each other's output.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|records| {
            records.borrow_mut().push(CapturedRecord {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            })
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Handle on the records logged by the current thread since [`capture_logs`].
pub struct LogCapture;

/// Installs the capturing logger once and clears this thread's records.
pub fn capture_logs() -> LogCapture {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|records| records.borrow_mut().clear());
    LogCapture
}

impl LogCapture {
    /// Messages at `level` emitted from modules under `target`.
    pub fn messages(&self, level: Level, target: &str) -> Vec<String> {
        CAPTURED.with(|records| {
            records
                .borrow()
                .iter()
                .filter(|r| r.level == level && r.target.starts_with(target))
                .map(|r| r.message.clone())
                .collect()
        })
    }
}
