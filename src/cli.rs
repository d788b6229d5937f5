use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use crate::{
    config::Overrides,
    logging::{LogOptions, LogTarget},
};

/// Raspberry Pi fan control daemon
#[derive(Parser, Debug)]
#[command(name = "rpi-fanctl", author, version, about, long_about = None)]
pub struct Cli {
    /// Print debug messages
    #[arg(long)]
    pub debug: bool,

    /// Run without pin control
    #[arg(long)]
    pub dry_run: bool,

    /// GPIO pin (BCM numbering) controlling the fan [default: 14]
    #[arg(long, value_name = "PIN")]
    pub pin: Option<u8>,

    /// Fan start temperature in °C [default: 70]
    #[arg(long, value_name = "CELSIUS", allow_negative_numbers = true)]
    pub high: Option<f64>,

    /// Fan stop temperature in °C [default: 50]
    #[arg(long, value_name = "CELSIUS", allow_negative_numbers = true)]
    pub low: Option<f64>,

    /// Temperature polling interval in seconds [default: 10]
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<u64>,

    /// YAML config file path
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Prefix log lines with date and time
    #[arg(long)]
    pub log_datetime: bool,

    /// Log to syslog instead of stderr
    #[arg(long, conflicts_with = "log_datetime")]
    pub syslog: bool,

    /// Install systemd service rpi-fanctl.service and exit
    #[arg(long)]
    pub install_systemd_service: bool,
}

impl Cli {
    /// Command-line values that override the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            pin: self.pin,
            high: self.high,
            low: self.low,
            interval: self.time,
            dry_run: self.dry_run,
        }
    }

    /// Logging setup; `file_debug` is the config file's `debug` key.
    pub fn log_options(&self, file_debug: bool) -> LogOptions {
        LogOptions {
            level: if self.debug || file_debug {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            target: if self.syslog {
                LogTarget::Syslog
            } else {
                LogTarget::Stderr {
                    datetime: self.log_datetime,
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_flags_means_no_overrides() {
        let cli = Cli::try_parse_from(["rpi-fanctl"]).unwrap();

        assert_eq!(cli.overrides(), Overrides::default());
        assert!(!cli.install_systemd_service);
        assert_eq!(
            cli.log_options(false),
            LogOptions {
                level: LevelFilter::Info,
                target: LogTarget::Stderr { datetime: false },
            }
        );
    }

    #[test]
    fn all_control_flags() {
        let cli = Cli::try_parse_from([
            "rpi-fanctl", "--pin", "18", "--high", "65.5", "--low", "45", "--time", "5",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(
            cli.overrides(),
            Overrides {
                pin: Some(18),
                high: Some(65.5),
                low: Some(45.0),
                interval: Some(5),
                dry_run: true,
            }
        );
    }

    #[test]
    fn negative_thresholds_parse() {
        let cli = Cli::try_parse_from(["rpi-fanctl", "--low", "-10", "--high", "-2.5"]).unwrap();
        assert_eq!(cli.low, Some(-10.0));
        assert_eq!(cli.high, Some(-2.5));
    }

    #[test]
    fn debug_from_flag_or_file() {
        let cli = Cli::try_parse_from(["rpi-fanctl", "--debug", "--log-datetime"]).unwrap();
        assert_eq!(cli.log_options(false).level, LevelFilter::Debug);
        assert_eq!(
            cli.log_options(false).target,
            LogTarget::Stderr { datetime: true }
        );

        let cli = Cli::try_parse_from(["rpi-fanctl"]).unwrap();
        assert_eq!(cli.log_options(true).level, LevelFilter::Debug);
    }

    #[test]
    fn syslog_target() {
        let cli = Cli::try_parse_from(["rpi-fanctl", "--syslog"]).unwrap();
        assert_eq!(cli.log_options(false).target, LogTarget::Syslog);
    }

    #[test]
    fn pin_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["rpi-fanctl", "--pin", "300"]).is_err());
    }

    #[test]
    fn config_short_flag() {
        let cli = Cli::try_parse_from(["rpi-fanctl", "-c", "/etc/rpi-fanctl/config.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/rpi-fanctl/config.yml")));
    }
}
