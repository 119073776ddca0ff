// vault/client.rs
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{normalize_namespace, sanitize_path, Secret, SecretService, TlsMaterial, VaultError, VaultResult};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";
const REQUEST_HEADER: &str = "X-Vault-Request";

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// Live connection handle: server address, token and bound namespace.
#[derive(Debug, Clone)]
pub struct VaultService {
    http: reqwest::Client,
    address: String,
    token: String,
    namespace: String,
}

impl VaultService {
    pub fn new(server: &str, tls: &TlsMaterial, token: impl Into<String>) -> VaultResult<Self> {
        url::Url::parse(server).map_err(|source| VaultError::Address {
            server: server.to_string(),
            source,
        })?;
        Ok(VaultService {
            http: tls.build_client()?,
            address: server.trim_end_matches('/').to_string(),
            token: token.into(),
            namespace: String::new(),
        })
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.namespace = normalize_namespace(namespace).to_string();
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn request(
        &self,
        method: Method,
        namespace: &str,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> VaultResult<Option<Secret>> {
        let url = format!("{}/v1/{}", self.address, sanitize_path(path));
        debug!(method = %method, url = %url, namespace = namespace, "vault request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(REQUEST_HEADER, "true");
        if !self.token.is_empty() {
            request = request.header(TOKEN_HEADER, &self.token);
        }
        if !namespace.is_empty() {
            request = request.header(NAMESPACE_HEADER, namespace);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let http_error = |source| VaultError::Http {
            method: method.to_string(),
            url: url.clone(),
            source,
        };
        let response = request.send().await.map_err(http_error)?;
        let status = response.status();
        let text = response.text().await.map_err(http_error)?;

        if status.is_success() {
            if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
                return Ok(None);
            }
            return serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| VaultError::Decode { url, source });
        }

        if status == StatusCode::NOT_FOUND && method == Method::GET {
            debug!(url = %url, "not found");
            return Ok(None);
        }

        let errors = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) if !body.errors.is_empty() => body.errors,
            _ if text.trim().is_empty() => Vec::new(),
            _ => vec![text.trim().to_string()],
        };
        Err(VaultError::Status {
            method: method.to_string(),
            url,
            status: status.as_u16(),
            errors,
        })
    }
}

impl SecretService for VaultService {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn list(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>> {
        let query = [("list".to_string(), "true".to_string())];
        self.request(Method::GET, namespace, path, &query, None).await
    }

    async fn read(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>> {
        self.request(Method::GET, namespace, path, &[], None).await
    }

    async fn read_with_data(
        &self,
        namespace: &str,
        path: &str,
        query: &[(String, String)],
    ) -> VaultResult<Option<Secret>> {
        self.request(Method::GET, namespace, path, query, None).await
    }

    async fn write(&self, namespace: &str, path: &str, body: &Value) -> VaultResult<Option<Secret>> {
        self.request(Method::PUT, namespace, path, &[], Some(body)).await
    }

    async fn delete(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>> {
        self.request(Method::DELETE, namespace, path, &[], None).await
    }
}
