// config/types.rs
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Seconds taken off a lease when computing the session expiry, so a cached
/// token is dropped well before the server expires it.
pub const SESSION_EXPIRE_SKEW: i64 = 30 * 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    #[serde(rename = "certificate-authority", default)]
    pub cert_auth: String,
    #[serde(
        rename = "certificate-authority-data",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub cert_auth_data: String,
    #[serde(
        rename = "insecure-skip-tls-verify",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub insecure_skip_tls_verify: bool,
    #[serde(default)]
    pub server: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    #[serde(rename = "cluster", default)]
    pub spec: ClusterSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(rename = "lease-duration", default, skip_serializing_if = "Option::is_none")]
    pub lease_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewable: Option<bool>,
}

impl Session {
    /// Builds a session from a login response. The expiry is only set for a
    /// positive lease; a session without one is never reused.
    pub fn from_lease(token: String, lease_duration: i64, renewable: bool, now: i64) -> Self {
        let expires = (lease_duration > 0).then(|| now + lease_duration - SESSION_EXPIRE_SKEW);
        Self {
            token,
            lease_duration: Some(lease_duration),
            expires,
            renewable: Some(renewable),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        if self.token.is_empty() {
            return true;
        }
        match self.expires {
            Some(expires) => now > expires,
            None => true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSpec {
    #[serde(default)]
    pub cluster: String,
    #[serde(rename = "inventoryPath", default)]
    pub inventory_path: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "is_empty_session")]
    pub session: Session,
    #[serde(default)]
    pub user: String,
}

fn is_empty_session(session: &Session) -> bool {
    *session == Session::default()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    #[serde(rename = "context", default)]
    pub spec: ContextSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSpec {
    #[serde(rename = "client-certificate", default)]
    pub client_cert: String,
    #[serde(
        rename = "client-certificate-data",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub client_cert_data: String,
    #[serde(rename = "client-key", default)]
    pub client_key: String,
    #[serde(rename = "client-key-data", default, skip_serializing_if = "String::is_empty")]
    pub client_key_data: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
    #[serde(rename = "roleID", default)]
    pub role_id: String,
    #[serde(rename = "secretID", default)]
    pub secret_id: String,
    #[serde(rename = "ignore-namespace-on-auth", default)]
    pub ignore_namespace_on_auth: bool,
}

impl UserSpec {
    pub fn has_client_cert(&self) -> bool {
        !self.client_cert.is_empty() || !self.client_cert_data.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(rename = "user", default)]
    pub spec: UserSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub contexts: Vec<Context>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(rename = "current-context", default)]
    pub current_context: String,
    #[serde(default)]
    pub users: Vec<User>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Config".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            contexts: Vec::new(),
            clusters: Vec::new(),
            current_context: String::new(),
            users: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(data: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rejects duplicate names so that lookups can never be shadowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unique("context", self.contexts.iter().map(|c| c.name.as_str()))?;
        check_unique("cluster", self.clusters.iter().map(|c| c.name.as_str()))?;
        check_unique("user", self.users.iter().map(|u| u.name.as_str()))
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.name == name)
    }

    pub fn cluster_mut(&mut self, name: &str) -> Option<&mut Cluster> {
        self.clusters.iter_mut().find(|c| c.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn user_mut(&mut self, name: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.name == name)
    }
}

fn check_unique<'a>(kind: &'static str, names: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
apiVersion: v1
kind: Config
contexts:
- name: dev
  context:
    cluster: local
    inventoryPath: inventory/dev
    namespace: team-a
    session:
      token: s.abc
      lease-duration: 7200
      expires: 2582395696
      renewable: true
    user: admin
clusters:
- name: local
  cluster:
    certificate-authority: ""
    insecure-skip-tls-verify: true
    server: http://127.0.0.1:8200
current-context: dev
users:
- name: admin
  user:
    client-certificate: ""
    client-key: ""
    username: admin
    password: secret
    roleID: ""
    secretID: ""
    ignore-namespace-on-auth: true
"#;

    #[test]
    fn parses_kubeconfig_style_layout() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let ctx = config.context("dev").unwrap();
        assert_eq!(ctx.spec.cluster, "local");
        assert_eq!(ctx.spec.inventory_path, "inventory/dev");
        assert_eq!(ctx.spec.session.token, "s.abc");
        assert_eq!(ctx.spec.session.expires, Some(2582395696));
        assert!(config.cluster("local").unwrap().spec.insecure_skip_tls_verify);
        let user = config.user("admin").unwrap();
        assert_eq!(user.spec.username, "admin");
        assert!(user.spec.ignore_namespace_on_auth);
        assert_eq!(config.current_context, "dev");
    }

    #[test]
    fn missing_file_fields_fall_back_to_defaults() {
        let config = Config::from_yaml("contexts: []\n").unwrap();
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.kind, "Config");
        assert!(config.clusters.is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let yaml = r#"
clusters:
- name: local
  cluster: { server: "http://a" }
- name: local
  cluster: { server: "http://b" }
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateName { kind: "cluster", ref name } if name == "local"
        ));
    }

    #[test]
    fn session_expiry_subtracts_skew() {
        let session = Session::from_lease("t".into(), 7200, true, 1_000_000);
        assert_eq!(session.expires, Some(1_000_000 + 7200 - SESSION_EXPIRE_SKEW));
        assert!(!session.is_expired_at(1_000_000));
        assert!(session.is_expired_at(1_000_000 + 7200 - SESSION_EXPIRE_SKEW + 1));
    }

    #[test]
    fn session_without_token_or_expiry_is_expired() {
        assert!(Session::default().is_expired_at(0));
        let no_lease = Session::from_lease("t".into(), 0, false, 10);
        assert_eq!(no_lease.expires, None);
        assert!(no_lease.is_expired_at(10));
    }

    #[test]
    fn empty_session_is_not_written_back() {
        let mut config = Config::default();
        config.contexts.push(Context {
            name: "dev".into(),
            spec: ContextSpec::default(),
        });
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("session"));
    }
}
