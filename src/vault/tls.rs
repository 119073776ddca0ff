// vault/tls.rs
use std::fmt;
use std::fs;

use base64::{engine::general_purpose, Engine as _};
use openssl::pkey::PKey;
use reqwest::{Certificate, Identity};
use x509_parser::pem::Pem;

use super::VaultError;
use crate::config::{ClusterSpec, UserSpec};

/// CA bundle, client identity and verification mode for one cluster/user pair.
#[derive(Clone, Default)]
pub struct TlsMaterial {
    pub ca_pem: Option<Vec<u8>>,
    pub client_cert_pem: Option<Vec<u8>>,
    /// PKCS#8 PEM.
    pub client_key_pem: Option<Vec<u8>>,
    pub insecure_skip_verify: bool,
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("ca_pem", &self.ca_pem.as_ref().map(Vec::len))
            .field("client_cert_pem", &self.client_cert_pem.as_ref().map(Vec::len))
            .field("client_key_pem", &self.client_key_pem.as_ref().map(|_| "<redacted>"))
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}

impl TlsMaterial {
    /// Loads material from paths (`~` expanded) or inline base64 data. Paths
    /// win when both are set.
    pub fn from_config(cluster: &ClusterSpec, user: &UserSpec) -> Result<Self, VaultError> {
        let ca_pem = load_pem("certificate-authority", &cluster.cert_auth, &cluster.cert_auth_data)?;
        let client_cert_pem =
            load_pem("client-certificate", &user.client_cert, &user.client_cert_data)?;
        let client_key_pem = load_pem("client-key", &user.client_key, &user.client_key_data)?
            .map(|key| to_pkcs8(&key))
            .transpose()?;

        Ok(TlsMaterial {
            ca_pem,
            client_cert_pem,
            client_key_pem,
            insecure_skip_verify: cluster.insecure_skip_tls_verify,
        })
    }

    pub fn has_identity(&self) -> bool {
        self.client_cert_pem.is_some() && self.client_key_pem.is_some()
    }

    pub fn build_client(&self) -> Result<reqwest::Client, VaultError> {
        let mut builder = reqwest::Client::builder();

        if let Some(ca) = &self.ca_pem {
            for pem in Pem::iter_from_buffer(ca) {
                let pem = pem.map_err(|e| VaultError::Tls(format!("ca bundle: {e}")))?;
                let cert = Certificate::from_der(&pem.contents)
                    .map_err(|e| VaultError::Tls(format!("ca bundle: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
        }

        if let (Some(cert), Some(key)) = (&self.client_cert_pem, &self.client_key_pem) {
            let identity = Identity::from_pkcs8_pem(cert, key)
                .map_err(|e| VaultError::Tls(format!("client identity: {e}")))?;
            builder = builder.identity(identity);
        }

        if self.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| VaultError::Tls(format!("http client: {e}")))
    }
}

fn load_pem(what: &str, path: &str, data: &str) -> Result<Option<Vec<u8>>, VaultError> {
    if !path.is_empty() {
        let expanded = shellexpand::tilde(path);
        let bytes = fs::read(expanded.as_ref())
            .map_err(|e| VaultError::Tls(format!("{what} {path}: {e}")))?;
        if bytes.is_empty() {
            return Err(VaultError::Tls(format!("{what} {path}: file is empty")));
        }
        return Ok(Some(bytes));
    }
    if !data.is_empty() {
        let bytes = general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| VaultError::Tls(format!("{what}-data: {e}")))?;
        return Ok(Some(bytes));
    }
    Ok(None)
}

fn to_pkcs8(key_pem: &[u8]) -> Result<Vec<u8>, VaultError> {
    PKey::private_key_from_pem(key_pem)
        .and_then(|key| key.private_key_to_pem_pkcs8())
        .map_err(|e| VaultError::Tls(format!("client key: {e}")))
}
