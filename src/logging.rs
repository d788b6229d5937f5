//! Log backends: stderr through `fern`, or the local syslog daemon.

use anyhow::{Result, anyhow};
use log::{Level, LevelFilter};
use syslog::{BasicLogger, Facility, Formatter3164};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Plain lines on stderr, optionally timestamped.
    Stderr { datetime: bool },
    Syslog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub level: LevelFilter,
    pub target: LogTarget,
}

/// Installs the global logger. Must be called once, before any record.
pub fn init_log(options: &LogOptions) -> Result<()> {
    match options.target {
        LogTarget::Stderr { datetime } => init_stderr(options.level, datetime),
        LogTarget::Syslog => init_syslog(options.level),
    }
}

fn init_stderr(level: LevelFilter, datetime: bool) -> Result<()> {
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let timestamp =
                datetime.then(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            out.finish(format_args!(
                "{}{}",
                prefix(record.level(), timestamp.as_deref()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| anyhow!("{e}"))
}

fn init_syslog(level: LevelFilter) -> Result<()> {
    syslog::unix(Formatter3164 {
        facility: Facility::LOG_DAEMON,
        hostname: None,
        process: "rpi-fanctl".into(),
        pid: std::process::id(),
    })
    .map_err(|e| anyhow!("{e}"))
    .and_then(|logger| {
        log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow!("{e}"))
    })
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// `LEVEL: ` or `[timestamp - LEVEL] `.
fn prefix(level: Level, timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => format!("[{ts} - {}] ", level_name(level)),
        None => format!("{}: ", level_name(level)),
    }
}
