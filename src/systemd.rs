//! systemd unit file generation for `--install-systemd-service`.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::PollConfig;

pub const UNIT_NAME: &str = "rpi-fanctl.service";
const SYSTEM_UNIT_DIR: &str = "/etc/systemd/system";
const USER_UNIT_DIR: &str = ".config/systemd/user";

/// Values baked into the unit's `ExecStart` line.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSettings {
    pub exec: PathBuf,
    pub pin: u8,
    pub high: f64,
    pub low: f64,
    pub interval: u64,
    pub config: Option<PathBuf>,
}

impl UnitSettings {
    pub fn from_config(config: &PollConfig, exec: PathBuf, config_path: Option<PathBuf>) -> Self {
        Self {
            exec,
            pin: config.pin,
            high: config.thresholds.high().celsius(),
            low: config.thresholds.low().celsius(),
            interval: config.interval_secs,
            config: config_path,
        }
    }
}

/// Renders the unit. A root install runs the service as `nobody`.
pub fn render_unit(settings: &UnitSettings, as_root: bool) -> String {
    let user = if as_root { "\nUser=nobody" } else { "" };
    let config = settings
        .config
        .as_ref()
        .map(|p| format!(" --config {}", exec_arg(p)))
        .unwrap_or_default();

    format!(
        "[Unit]
Description=Raspberry Pi fan control service

[Service]
Type=simple{user}
ExecStart={exec} --pin {pin} --high {high:.2} --low {low:.2} --time {time}{config}
ExecStop=/bin/kill -s SIGTERM $MAINPID

[Install]
WantedBy=default.target
",
        exec = exec_arg(&settings.exec),
        pin = settings.pin,
        high = settings.high,
        low = settings.low,
        time = settings.interval,
    )
}

/// Escapes a path for an `Exec*=` line. `%` and `$` are expanded by systemd
/// even inside quotes; whitespace and quotes need a double-quoted word.
fn exec_arg(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => escaped.push_str("%%"),
            '$' => escaped.push_str("$$"),
            '\\' | '"' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }

    if raw.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';')) {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// System-wide unit for root, per-user unit otherwise.
pub fn unit_path(as_root: bool, home: Option<&Path>) -> Result<PathBuf> {
    if as_root {
        return Ok(Path::new(SYSTEM_UNIT_DIR).join(UNIT_NAME));
    }
    let home = home.context("HOME is not set, cannot place a user unit")?;
    Ok(home.join(USER_UNIT_DIR).join(UNIT_NAME))
}

/// Login name from the environment, checked in the usual order.
pub fn current_user() -> Option<String> {
    ["LOGNAME", "USER", "LNAME", "USERNAME"]
        .into_iter()
        .find_map(|var| env::var(var).ok().filter(|v| !v.is_empty()))
}

/// Writes the unit for the invoking user and returns its path.
pub fn install(settings: &UnitSettings) -> Result<PathBuf> {
    let as_root = current_user().as_deref() == Some("root");
    let home = env::var_os("HOME").map(PathBuf::from);
    let path = unit_path(as_root, home.as_deref())?;
    write_unit(&path, &render_unit(settings, as_root))?;
    Ok(path)
}

fn write_unit(path: &Path, unit: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::write(path, unit).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings() -> UnitSettings {
        UnitSettings::from_config(
            &PollConfig::default(),
            PathBuf::from("/usr/local/bin/rpi-fanctl"),
            None,
        )
    }

    #[test]
    fn user_unit() {
        let expected = "[Unit]
Description=Raspberry Pi fan control service

[Service]
Type=simple
ExecStart=/usr/local/bin/rpi-fanctl --pin 14 --high 70.00 --low 50.00 --time 10
ExecStop=/bin/kill -s SIGTERM $MAINPID

[Install]
WantedBy=default.target
";
        assert_eq!(render_unit(&settings(), false), expected);
    }

    #[test]
    fn root_unit_runs_as_nobody() {
        let unit = render_unit(&settings(), true);
        assert!(unit.contains("Type=simple\nUser=nobody\nExecStart="));
    }

    #[test]
    fn config_path_is_forwarded() {
        let settings = UnitSettings {
            config: Some(PathBuf::from("/etc/rpi-fanctl/config.yml")),
            ..settings()
        };
        assert!(
            render_unit(&settings, false)
                .contains("--time 10 --config /etc/rpi-fanctl/config.yml\n")
        );
    }

    #[test]
    fn paths_with_spaces_are_quoted() {
        let settings = UnitSettings {
            exec: PathBuf::from("/opt/fan tools/rpi-fanctl"),
            config: Some(PathBuf::from("/home/pi/my config/fan.yml")),
            ..settings()
        };

        let unit = render_unit(&settings, false);

        assert!(unit.contains(
            "ExecStart=\"/opt/fan tools/rpi-fanctl\" --pin 14 --high 70.00 --low 50.00 --time 10 --config \"/home/pi/my config/fan.yml\"\n"
        ));
    }

    #[test]
    fn specifiers_and_quotes_are_escaped() {
        assert_eq!(exec_arg(Path::new("/opt/fan%d/$bin")), "/opt/fan%%d/$$bin");
        assert_eq!(exec_arg(Path::new("/opt/a\"b")), "\"/opt/a\\\"b\"");
        assert_eq!(exec_arg(Path::new("/usr/bin/rpi-fanctl")), "/usr/bin/rpi-fanctl");
    }

    #[test]
    fn unit_locations() {
        assert_eq!(
            unit_path(true, None).unwrap(),
            PathBuf::from("/etc/systemd/system/rpi-fanctl.service")
        );
        assert_eq!(
            unit_path(false, Some(Path::new("/home/pi"))).unwrap(),
            PathBuf::from("/home/pi/.config/systemd/user/rpi-fanctl.service")
        );
        assert!(unit_path(false, None).is_err());
    }

    #[test]
    fn write_unit_creates_parent_dirs() {
        let home = tempfile::tempdir().unwrap();
        let path = unit_path(false, Some(home.path())).unwrap();

        write_unit(&path, "unit").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "unit");
    }
}
