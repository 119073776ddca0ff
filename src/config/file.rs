// config/file.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Config, ConfigError};

/// Overrides the directory holding `config.yaml`.
pub const CONFIG_DIR_ENV: &str = "VAULTCLICONFIG";
const CONFIG_DEFAULT_DIR: &str = ".vaultcli";
const CONFIG_DEFAULT_FILE_NAME: &str = "config.yaml";

/// Persistence for the multi-cluster config.
pub trait ConfigStore {
    fn read(&self, path: &Path) -> Result<Config, ConfigError>;
    fn write(&self, path: &Path, config: &Config) -> Result<(), ConfigError>;
}

/// YAML file backed store. A missing file reads as an empty config.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigFile;

impl ConfigStore for ConfigFile {
    fn read(&self, path: &Path) -> Result<Config, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => Config::from_yaml(&data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, starting empty");
                Ok(Config::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write(&self, path: &Path, config: &Config) -> Result<(), ConfigError> {
        let data = config.to_yaml()?;
        fs::write(path, data).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolves the config file path: `--config` flag, then the
/// `VAULTCLICONFIG` directory, then `~/.vaultcli/config.yaml`.
///
/// The flag names the file itself; the environment variable and the default
/// name a directory, which is created if it does not exist yet.
pub fn resolve_config_path(flag: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = flag.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(shellexpand::tilde(path).as_ref()));
    }

    let dir = match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(shellexpand::tilde(&dir).as_ref()),
        _ => dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(CONFIG_DEFAULT_DIR),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|source| ConfigError::Write {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(dir.join(CONFIG_DEFAULT_FILE_NAME))
}
