//! Configuration file of the tool.

use std::io;
use std::path::Path;

use derive_more::{Display, Error, From};

use crate::client::SaikuConfig;

/// Contents of the TOML configuration file.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Connection to the Saiku server.
    #[serde(default)]
    pub saiku: SaikuConfig,
}

#[derive(Debug, Display, Error, From)]
/// Errors on loading the [Config].
pub enum ConfigError {
    #[display("Reading the config file failed: {_0}")]
    Io(io::Error),
    #[display("Parsing the config file failed: {_0}")]
    Parse(toml::de::Error),
}

impl Config {
    /// Reads the config at `path`.
    ///
    /// If the file doesn't exist yet, the default config is written to
    /// `path` and returned.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(config_str) => Ok(toml::from_str(&config_str)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "Writing default config to {} because it doesn't exist yet",
                    path.display()
                );
                let default_config = Config::default();
                match toml::to_string_pretty(&default_config) {
                    Ok(config_str) => {
                        if let Err(e) = std::fs::write(path, config_str) {
                            log::warn!("Writing default config to {} failed {e}", path.display());
                        }
                    }
                    Err(e) => log::warn!("Serializing the default config failed: {e}"),
                }
                Ok(default_config)
            }
            Err(e) => Err(e.into()),
        }
    }
}
