// vault/error.rs

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("{method} {url}: {source}")]
    Http {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    #[error("{method} {url}: code {status}: {}", .errors.join("; "))]
    Status {
        method: String,
        url: String,
        status: u16,
        errors: Vec<String>,
    },

    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("invalid server address {server}: {source}")]
    Address {
        server: String,
        source: url::ParseError,
    },

    #[error("no client token in login response from {url}")]
    MissingToken { url: String },

    #[error("tls configuration: {0}")]
    Tls(String),
}

impl VaultError {
    /// HTTP status returned by the server, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            VaultError::Status { status, .. } => Some(*status),
            VaultError::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when one of the server's error messages contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        match self {
            VaultError::Status { errors, .. } => errors.iter().any(|e| e.contains(needle)),
            other => other.to_string().contains(needle),
        }
    }
}
