mod editor;
mod file;
mod types;

pub use editor::{ClusterEdit, ContextEdit, CredentialEdit};
pub use file::{resolve_config_path, ConfigFile, ConfigStore, CONFIG_DIR_ENV};
pub use types::{
    Cluster, ClusterSpec, Config, Context, ContextSpec, Session, User, UserSpec,
    SESSION_EXPIRE_SKEW,
};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("cannot delete {kind} {name}: {reason}")]
    InUse {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    #[error("could not determine home directory")]
    NoHomeDir,
}
