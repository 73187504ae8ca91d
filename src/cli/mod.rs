use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbosity of the command output.
    #[arg(long, global = true)]
    pub verbose: Option<LevelFilter>,

    /// Configuration file of the Saiku server connection.
    ///
    /// A default configuration is written if the file doesn't exist.
    #[arg(long, short = 'c', default_value = "saiku-backup.toml")]
    pub config: PathBuf,

    /// Base URL of the Saiku server, overrides the configured one.
    #[arg(long)]
    pub url: Option<String>,

    /// Password of the Saiku user, overrides the configured one.
    #[arg(long, env = "SAIKU_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Write the server's users, schemas, datasources and home folders to a file.
    Backup(BackupArgs),
    /// Make the server match a previously written backup.
    Restore(RestoreArgs),
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Backup file to write. Files ending in `.gz` are compressed.
    pub file: PathBuf,

    /// Include the license file.
    #[arg(long)]
    pub license: bool,

    /// Pretty print the JSON document.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Backup file to restore.
    pub file: PathBuf,

    /// Include the license file.
    #[arg(long)]
    pub license: bool,

    /// Only log the changes a restore would make.
    #[arg(long)]
    pub dry_run: bool,
}
