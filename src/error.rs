// error.rs
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::vault::VaultError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    ConfigLoad(#[from] ConfigError),

    #[error("context not found: {name}")]
    ContextNotFound { name: String },

    #[error("cluster not found: {name}")]
    MissingCluster { name: String },

    #[error("user not found: {name}")]
    MissingUser { name: String },

    #[error("cluster {name} has no server address")]
    MissingServer { name: String },

    #[error("no credentials configured for user {user}")]
    NoCredentials { user: String },

    #[error("authentication failed: {0}")]
    Authentication(#[source] VaultError),

    #[error("{label} ({spec}) not found in inventory")]
    InventoryLookup { label: String, spec: String },

    #[error("inventory error: {0}")]
    Inventory(String),

    #[error("unable to apply template: {0}")]
    TemplateRender(#[from] minijinja::Error),

    #[error("unable to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        source: serde_yaml::Error,
    },

    #[error("error reading {path}: {source}")]
    Read { path: String, source: VaultError },

    #[error("error writing {path}: {source}")]
    Write { path: String, source: VaultError },

    #[error("unable to determine mount state of {path}: {source}")]
    UnknownMount { path: String, source: VaultError },

    #[error("expected CSR in response from {path}")]
    ExpectedCsr { path: String },

    #[error("expected certificate in response from {path}")]
    ExpectedCertificate { path: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("failed to save session to {}: {source}", path.display())]
    SessionPersist {
        path: PathBuf,
        source: ConfigError,
    },

    #[error("{0}")]
    Vault(#[from] VaultError),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn read(path: impl Into<String>, source: VaultError) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<String>, source: VaultError) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
