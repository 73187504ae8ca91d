use std::process::ExitCode;

use clap::Parser;
use saiku_backup_lib::backup::Capture;
use saiku_backup_lib::cli::{Action, BackupArgs, Cli, RestoreArgs};
use saiku_backup_lib::client::Saiku;
use saiku_backup_lib::config::Config;
use saiku_backup_lib::restore::Restore;
use saiku_backup_lib::snapshot::Snapshot;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // init logger
    let mut env_logger = env_logger::builder();
    if let Some(level) = cli.verbose {
        env_logger.filter_level(level);
    }
    if let Err(e) = env_logger.try_init() {
        eprintln!("Initialising the logger failed: {e}");
    }

    let mut config = match Config::load_or_init(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = cli.url {
        config.saiku.url = url;
    }
    if let Some(password) = cli.password {
        config.saiku.password = Some(password);
    }

    let saiku = match Saiku::login(&config.saiku) {
        Ok(saiku) => saiku,
        Err(e) => {
            log::error!(target: "client::saiku", "Login failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.action {
        Action::Backup(BackupArgs {
            file,
            license,
            pretty,
        }) => {
            let snapshot = match Capture::new(&saiku).include_license(license).capture() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::error!(target: "backup", "Backup of the Saiku server failed: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = snapshot.write_to(&file, pretty) {
                log::error!(target: "backup", "Writing backup to {} failed: {e}", file.display());
                return ExitCode::FAILURE;
            }
            log::info!(target: "backup", "Wrote backup to {}", file.display());
        }
        Action::Restore(RestoreArgs {
            file,
            license,
            dry_run,
        }) => {
            let snapshot = match Snapshot::read_from(&file) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::error!(target: "restore", "Reading backup {} failed: {e}", file.display());
                    return ExitCode::FAILURE;
                }
            };
            let restore = Restore::new(&saiku).include_license(license).dry_run(dry_run);
            if let Err(e) = restore.restore(&snapshot) {
                log::error!(target: "restore", "{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
