//! # rpi_fanctl
//!
//! A Raspberry Pi daemon keeping a fan's on/off state in line with the SoC
//! temperature.
//!
//! ## Architecture
//!
//! - [`TemperatureSource`](sensors::TemperatureSource) - re-readable sensor,
//!   backed by the kernel thermal zone
//! - [`FanActuator`](fan_controller::FanActuator) - binary output pin, backed by
//!   sysfs GPIO or a dry-run stand-in
//! - [`HysteresisController`](hysteresis::HysteresisController) - dead-band
//!   on/off decision
//! - [`run_poll_loop`](poll_loop::run_poll_loop) - read, decide, actuate, wait
//! - [`ShutdownCoordinator`](shutdown::ShutdownCoordinator) - signals and
//!   exactly-once cleanup
//!
//! ## Example
//!
//! ```no_run
//! use rpi_fanctl::{config::PollConfig, run};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> std::process::ExitCode {
//!     run(PollConfig::default()).await.into()
//! }
//! ```

pub mod app_context;
pub mod application;
pub mod cli;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fan_controller;
pub mod hysteresis;
pub mod logging;
pub mod poll_loop;
pub mod sensors;
pub mod shutdown;
pub mod systemd;
pub mod temperature;
pub mod temperature_sensors;

#[cfg(test)]
mod test_support;

pub use application::{ExitOutcome, run};
