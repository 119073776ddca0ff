// vault/auth.rs
use serde_json::{json, Value};
use tracing::debug;

use super::{normalize_namespace, Secret, TlsMaterial, VaultError, VaultResult};

/// Login strategies in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    Cert,
    UserPass,
    AppRole,
}

impl LoginMethod {
    pub fn mount(self) -> &'static str {
        match self {
            LoginMethod::Cert => "cert",
            LoginMethod::UserPass => "userpass",
            LoginMethod::AppRole => "approle",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Identity travels in the TLS handshake.
    Cert,
    UserPass { username: String, password: String },
    AppRole { role_id: String, secret_id: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Cert => f.write_str("Cert"),
            Credentials::UserPass { username, .. } => {
                f.debug_struct("UserPass").field("username", username).finish_non_exhaustive()
            }
            Credentials::AppRole { role_id, .. } => {
                f.debug_struct("AppRole").field("role_id", role_id).finish_non_exhaustive()
            }
        }
    }
}

impl Credentials {
    pub fn method(&self) -> LoginMethod {
        match self {
            Credentials::Cert => LoginMethod::Cert,
            Credentials::UserPass { .. } => LoginMethod::UserPass,
            Credentials::AppRole { .. } => LoginMethod::AppRole,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub namespace: String,
    pub server: String,
    pub mount: String,
    pub credentials: Credentials,
    pub tls: TlsMaterial,
}

impl LoginRequest {
    /// Logical path and body of the login call.
    pub fn endpoint(&self) -> (String, Value) {
        let mount = self.mount.trim_matches('/');
        match &self.credentials {
            Credentials::Cert => (format!("auth/{mount}/login"), json!({})),
            Credentials::UserPass { username, password } => (
                format!("auth/{mount}/login/{username}"),
                json!({ "password": password }),
            ),
            Credentials::AppRole { role_id, secret_id } => (
                format!("auth/{mount}/login"),
                json!({ "role_id": role_id, "secret_id": secret_id }),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub lease_duration: i64,
    pub renewable: bool,
}

impl AuthResponse {
    fn from_secret(secret: Option<Secret>, url: &str) -> VaultResult<Self> {
        match secret.and_then(|s| s.auth) {
            Some(auth) if !auth.client_token.is_empty() => Ok(AuthResponse {
                token: auth.client_token,
                lease_duration: auth.lease_duration,
                renewable: auth.renewable,
            }),
            _ => Err(VaultError::MissingToken {
                url: url.to_string(),
            }),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn login(&self, request: &LoginRequest) -> VaultResult<AuthResponse>;
}

/// Performs logins against the Vault HTTP API.
#[derive(Debug, Default, Clone, Copy)]
pub struct VaultAuthenticator;

impl Authenticator for VaultAuthenticator {
    async fn login(&self, request: &LoginRequest) -> VaultResult<AuthResponse> {
        let (path, body) = request.endpoint();
        let url = format!("{}/v1/{}", request.server.trim_end_matches('/'), path);
        debug!(url = %url, method = ?request.credentials.method(), "login");

        let http = request.tls.build_client()?;
        let mut call = http.post(&url).header("X-Vault-Request", "true").json(&body);
        let namespace = normalize_namespace(&request.namespace);
        if !namespace.is_empty() {
            call = call.header("X-Vault-Namespace", namespace);
        }

        let http_error = |source| VaultError::Http {
            method: "POST".to_string(),
            url: url.clone(),
            source,
        };
        let response = call.send().await.map_err(http_error)?;
        let status = response.status();
        let text = response.text().await.map_err(http_error)?;

        if !status.is_success() {
            let errors = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("errors").cloned())
                .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
                .unwrap_or_else(|| vec![text.trim().to_string()]);
            return Err(VaultError::Status {
                method: "POST".to_string(),
                url,
                status: status.as_u16(),
                errors,
            });
        }

        let secret: Option<Secret> = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).map_err(|source| VaultError::Decode {
                url: url.clone(),
                source,
            })?)
        };
        AuthResponse::from_secret(secret, &url)
    }
}
