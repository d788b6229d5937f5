//! Configuration for the rpi-fanctl daemon.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags ([`Overrides`]), an optional YAML file ([`FileConfig`]), and built-in
//! defaults. The result is a [`PollConfig`] that stays read-only for the life
//! of the process.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    drivers::sysfs_gpio::GPIO_ROOT,
    error::{self, FanCtlError},
    hysteresis::Thresholds,
    temperature_sensors::thermal_zone::THERMAL_ZONE_PATH,
};

/// Immutable configuration of one daemon run.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Broadcom GPIO number driving the fan.
    pub pin: u8,
    pub thresholds: Thresholds,
    /// Seconds between two temperature polls.
    pub interval_secs: u64,
    /// Skip all GPIO I/O while still running the decision logic.
    pub dry_run: bool,
    pub sensor_path: PathBuf,
    pub gpio_root: PathBuf,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Rejects configurations the poll loop cannot run with.
    pub fn validate(&self) -> error::Result<()> {
        if self.interval_secs == 0 {
            return Err(FanCtlError::ConfigurationInvalid(
                "poll interval must be a positive number of seconds".into(),
            ));
        }
        // `Thresholds::new` already warned about equal values.
        let (low, high) = (self.thresholds.low(), self.thresholds.high());
        if low > high {
            return Err(FanCtlError::ConfigurationInvalid(format!(
                "low threshold {low} is above high threshold {high}"
            )));
        }
        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            pin: defaults::pin(),
            thresholds: Thresholds::default(),
            interval_secs: defaults::interval(),
            dry_run: false,
            sensor_path: defaults::sensor_path(),
            gpio_root: defaults::gpio_root(),
        }
    }
}

/// On-disk YAML configuration.
///
/// # Example
///
/// ```yaml
/// version: 1
/// pin: 14
/// high: 70.0
/// low: 50.0
/// interval: 10
/// dry_run: false
/// debug: false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Configuration version for compatibility checking.
    pub version: u8,

    #[serde(default = "defaults::pin")]
    pub pin: u8,

    /// Fan start temperature in °C.
    #[serde(default = "defaults::high")]
    pub high: f64,

    /// Fan stop temperature in °C.
    #[serde(default = "defaults::low")]
    pub low: f64,

    /// Poll interval in seconds.
    #[serde(default = "defaults::interval")]
    pub interval: u64,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "defaults::sensor_path")]
    pub sensor_path: PathBuf,

    #[serde(default = "defaults::gpio_root")]
    pub gpio_root: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            version: 1,
            pin: defaults::pin(),
            high: defaults::high(),
            low: defaults::low(),
            interval: defaults::interval(),
            dry_run: false,
            debug: false,
            sensor_path: defaults::sensor_path(),
            gpio_root: defaults::gpio_root(),
        }
    }
}

impl FileConfig {
    /// Applies command-line overrides and validates the result.
    pub fn resolve(&self, overrides: &Overrides) -> error::Result<PollConfig> {
        let low = overrides.low.unwrap_or(self.low);
        let high = overrides.high.unwrap_or(self.high);

        let config = PollConfig {
            pin: overrides.pin.unwrap_or(self.pin),
            thresholds: Thresholds::new(low, high)?,
            interval_secs: overrides.interval.unwrap_or(self.interval),
            dry_run: overrides.dry_run || self.dry_run,
            sensor_path: self.sensor_path.clone(),
            gpio_root: self.gpio_root.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub pin: Option<u8>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub interval: Option<u64>,
    pub dry_run: bool,
}

mod defaults {
    use std::path::PathBuf;

    /// BCM 14, the usual fan pin on Pi cases.
    pub fn pin() -> u8 {
        14
    }

    pub fn high() -> f64 {
        70.0
    }

    pub fn low() -> f64 {
        50.0
    }

    pub fn interval() -> u64 {
        10
    }

    pub fn sensor_path() -> PathBuf {
        PathBuf::from(super::THERMAL_ZONE_PATH)
    }

    pub fn gpio_root() -> PathBuf {
        PathBuf::from(super::GPIO_ROOT)
    }
}

fn locate_config() -> Option<PathBuf> {
    if let Ok(env_path) = env::var("RPI_FANCTL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    if let Some(mut cfg_dir) = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| Path::new(&h).join(".config")))
    {
        cfg_dir.push("rpi-fanctl/config.yml");
        if cfg_dir.exists() {
            return Some(cfg_dir);
        }
    }

    let etc = Path::new("/etc/rpi-fanctl/config.yml");
    etc.exists().then(|| etc.to_path_buf())
}

/// A loaded configuration file and where it came from.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: FileConfig,
    path: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new(config: FileConfig, path: Option<PathBuf>) -> Self {
        Self { config, path }
    }

    /// Loads the configuration file.
    ///
    /// An explicit `path` must be readable. Without one, the standard
    /// locations are searched in order:
    /// 1. `RPI_FANCTL_CONFIG` environment variable
    /// 2. `$XDG_CONFIG_HOME/rpi-fanctl/config.yml` or `~/.config/rpi-fanctl/config.yml`
    /// 3. `/etc/rpi-fanctl/config.yml`
    ///
    /// Finding nothing yields the built-in defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        match path.or_else(locate_config) {
            Some(path) => {
                let config = Self::load_config_from_path(&path)?;
                Ok(Self::new(config, Some(path)))
            }
            None => Ok(Self::new(FileConfig::default(), None)),
        }
    }

    pub fn get(&self) -> &FileConfig {
        &self.config
    }

    /// File the configuration was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load_config_from_path(path: &Path) -> Result<FileConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FileConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in: {}", path.display()))?;

        if config.version != 1 {
            anyhow::bail!(
                "Unsupported config version {} in file: {}",
                config.version,
                path.display()
            );
        }

        Ok(config)
    }
}
