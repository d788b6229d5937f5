//! Application entry point and builder pattern implementation.

use std::{process::ExitCode, sync::Arc};

use log::{error, info};

use crate::{
    app_context::DaemonContext,
    config::PollConfig,
    drivers,
    error::{FanCtlError, Result},
    fan_controller::FanActuator,
    poll_loop::run_poll_loop,
    sensors::TemperatureSource,
    shutdown::ShutdownCoordinator,
    temperature_sensors::thermal_zone::ThermalZoneSensor,
};

/// How a daemon run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Stopped by a termination signal or an explicit request.
    Clean,
    /// Stopped by a fatal sensor, actuator or configuration error.
    Error(String),
}

impl ExitOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

impl From<ExitOutcome> for ExitCode {
    fn from(outcome: ExitOutcome) -> Self {
        match outcome {
            ExitOutcome::Clean => ExitCode::SUCCESS,
            ExitOutcome::Error(_) => ExitCode::FAILURE,
        }
    }
}

impl From<FanCtlError> for ExitOutcome {
    fn from(err: FanCtlError) -> Self {
        Self::Error(err.to_string())
    }
}

/// Runs the daemon with production backends until a signal or a fatal error.
///
/// Installs SIGTERM/SIGINT handling, performs setup, polls, and always runs
/// cleanup before returning.
///
/// # Example
///
/// ```no_run
/// use rpi_fanctl::{config::PollConfig, run};
///
/// # async fn example() {
/// let outcome = run(PollConfig::default()).await;
/// std::process::exit(if outcome.is_clean() { 0 } else { 1 });
/// # }
/// ```
pub async fn run(config: PollConfig) -> ExitOutcome {
    let mut app = match Application::builder().with_config(config).build() {
        Ok(app) => app,
        Err(e) => {
            error!("{e}");
            return e.into();
        }
    };

    let listener = match app.shutdown().listen_for_signals() {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to install signal handlers: {e}");
            return ExitOutcome::Error(e.to_string());
        }
    };

    let outcome = app.run().await;
    listener.abort();
    outcome
}

/// One daemon instance: a context plus its lifecycle.
pub struct Application {
    context: DaemonContext,
}

impl Application {
    /// Creates a new ApplicationBuilder for constructing Application instances.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.context.shutdown
    }

    pub fn context(&self) -> &DaemonContext {
        &self.context
    }

    /// Setup, poll loop, then cleanup exactly once whichever way the loop ended.
    ///
    /// A context is single-use: once released, later runs return an error
    /// without touching the sensor or fan again.
    pub async fn run(&mut self) -> ExitOutcome {
        if self.context.shutdown.is_cleaned_up() {
            error!("Daemon already stopped, refusing to run again");
            return ExitOutcome::Error("daemon already stopped".into());
        }

        let result = match self.context.setup().await {
            Ok(()) => run_poll_loop(&mut self.context).await,
            Err(e) => Err(e),
        };

        self.context.cleanup().await;

        match result {
            Ok(()) => {
                info!("Stopped cleanly");
                ExitOutcome::Clean
            }
            Err(e) if e.is_startup() => {
                error!("Setup failed: {e}");
                e.into()
            }
            Err(e) => {
                error!("{e}");
                e.into()
            }
        }
    }
}

/// Builder pattern for creating Application instances.
///
/// Capabilities left unset fall back to the production backends chosen from
/// the configuration.
#[derive(Default)]
pub struct ApplicationBuilder {
    config: Option<PollConfig>,
    sensor: Option<Box<dyn TemperatureSource>>,
    fan: Option<Box<dyn FanActuator>>,
    shutdown: Option<ShutdownCoordinator>,
}

impl ApplicationBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_sensor(mut self, sensor: Box<dyn TemperatureSource>) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn with_actuator(mut self, fan: Box<dyn FanActuator>) -> Self {
        self.fan = Some(fan);
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Validates the configuration and assembles the daemon context.
    pub fn build(self) -> Result<Application> {
        let config = self.config.ok_or_else(|| {
            FanCtlError::ConfigurationInvalid("configuration is required".into())
        })?;
        config.validate()?;

        let sensor = self
            .sensor
            .unwrap_or_else(|| Box::new(ThermalZoneSensor::new(&config.sensor_path)));
        let fan = self.fan.unwrap_or_else(|| drivers::from_config(&config));
        let shutdown = self.shutdown.unwrap_or_default();

        Ok(Application {
            context: DaemonContext::new(Arc::new(config), sensor, fan, shutdown),
        })
    }
}
