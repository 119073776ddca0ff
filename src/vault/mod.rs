//! Capability interface to the secret store.
//!
//! Every call carries the namespace it runs in. Callers get a [`Scope`] view
//! from [`SecretService::scope`] instead of switching a shared handle.

mod auth;
mod client;
mod error;
mod kv;
mod tls;

pub use auth::{AuthResponse, Authenticator, Credentials, LoginMethod, LoginRequest, VaultAuthenticator};
pub use client::VaultService;
pub use error::VaultError;
pub use kv::{kv_v2_path, sanitize_path};
pub use tls::TlsMaterial;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response body of a Vault logical request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub lease_id: String,
    #[serde(default)]
    pub lease_duration: i64,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    #[serde(default)]
    pub auth: Option<SecretAuth>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretAuth {
    #[serde(default)]
    pub client_token: String,
    #[serde(default)]
    pub accessor: String,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub lease_duration: i64,
    #[serde(default)]
    pub renewable: bool,
}

impl Secret {
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// `"root"` addresses the root namespace, which is sent as no namespace at all.
pub fn normalize_namespace(namespace: &str) -> &str {
    let trimmed = namespace.trim().trim_matches('/');
    if trimmed == "root" {
        ""
    } else {
        trimmed
    }
}

pub type VaultResult<T> = Result<T, VaultError>;

#[allow(async_fn_in_trait)]
pub trait SecretService {
    /// Namespace the handle was bound to when it was resolved.
    fn namespace(&self) -> &str;

    async fn list(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>>;
    async fn read(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>>;
    async fn read_with_data(
        &self,
        namespace: &str,
        path: &str,
        query: &[(String, String)],
    ) -> VaultResult<Option<Secret>>;
    async fn write(&self, namespace: &str, path: &str, body: &Value) -> VaultResult<Option<Secret>>;
    async fn delete(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>>;

    /// Returns the mount path of `path` and whether it is a KV version 2
    /// mount. Servers without the preflight endpoint report version 1.
    async fn is_kv_v2(&self, namespace: &str, path: &str) -> VaultResult<(String, bool)> {
        let preflight = format!("sys/internal/ui/mounts/{}", sanitize_path(path));
        let Some(secret) = self.read(namespace, &preflight).await? else {
            return Ok((String::new(), false));
        };
        let data = secret.data.unwrap_or_default();
        let mount_path = data
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let version = data
            .get("options")
            .and_then(|o| o.get("version"))
            .and_then(Value::as_str)
            .unwrap_or("1");
        Ok((mount_path, version == "2"))
    }

    /// View bound to `namespace`; empty keeps the handle's own namespace.
    fn scope(&self, namespace: &str) -> Scope<'_, Self>
    where
        Self: Sized,
    {
        let namespace = if namespace.trim().is_empty() {
            self.namespace().to_string()
        } else {
            normalize_namespace(namespace).to_string()
        };
        Scope {
            service: self,
            namespace,
        }
    }
}

/// A secret service pinned to one namespace.
pub struct Scope<'a, S> {
    service: &'a S,
    namespace: String,
}

impl<'a, S: SecretService> Scope<'a, S> {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Another view on the same handle, bound to exactly `namespace`. Empty
    /// and `"root"` both address the root namespace.
    pub fn with_namespace(&self, namespace: &str) -> Scope<'a, S> {
        Scope {
            service: self.service,
            namespace: normalize_namespace(namespace).to_string(),
        }
    }

    pub async fn list(&self, path: &str) -> VaultResult<Option<Secret>> {
        self.service.list(&self.namespace, path).await
    }

    pub async fn read(&self, path: &str) -> VaultResult<Option<Secret>> {
        self.service.read(&self.namespace, path).await
    }

    pub async fn read_with_data(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> VaultResult<Option<Secret>> {
        self.service.read_with_data(&self.namespace, path, query).await
    }

    pub async fn write(&self, path: &str, body: &Value) -> VaultResult<Option<Secret>> {
        self.service.write(&self.namespace, path, body).await
    }

    pub async fn delete(&self, path: &str) -> VaultResult<Option<Secret>> {
        self.service.delete(&self.namespace, path).await
    }

    pub async fn is_kv_v2(&self, path: &str) -> VaultResult<(String, bool)> {
        self.service.is_kv_v2(&self.namespace, path).await
    }
}

#[cfg(test)]
pub(crate) mod testing;
