use std::{path::Path, process::ExitCode};

use clap::Parser;
use log::{error, info};
use rpi_fanctl::{
    cli::Cli,
    config::ConfigManager,
    logging,
    systemd::{self, UnitSettings},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let manager = ConfigManager::load(cli.config.clone());
    let file_debug = manager.as_ref().is_ok_and(|m| m.get().debug);
    if let Err(e) = logging::init_log(&cli.log_options(file_debug)) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let manager = match manager {
        Ok(manager) => manager,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = manager.path() {
        info!("Loaded config from: {}", path.display());
    }

    let config = match manager.get().resolve(&cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.install_systemd_service {
        let exec = match std::env::current_exe() {
            Ok(exec) => exec,
            Err(e) => {
                error!("Failed to resolve executable path: {e}");
                return ExitCode::FAILURE;
            }
        };
        let settings = UnitSettings::from_config(&config, exec, manager.path().map(Path::to_path_buf));
        return match systemd::install(&settings) {
            Ok(path) => {
                info!("Systemd service successfully made at '{}'", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e:#}");
                ExitCode::FAILURE
            }
        };
    }

    rpi_fanctl::run(config).await.into()
}
