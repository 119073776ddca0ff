// kinds/vaultauth.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::pki::{body, MountConfig};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuthSpec {
    pub path: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default)]
    pub data: AuthMountData,
    #[serde(default, alias = "jwtConfig", rename = "JWTConfig")]
    pub jwt_config: JwtAuthConfig,
}

/// Body of `sys/auth/<path>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct AuthMountData {
    #[serde(rename = "type", default)]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<MountConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_wrap: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// Body of `auth/<path>/config` for `jwt` mounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct JwtAuthConfig {
    #[serde(default, alias = "oidcDiscoveryURL", skip_serializing_if = "String::is_empty")]
    pub oidc_discovery_url: String,
    #[serde(default, alias = "oidcDiscoveryCAPEM", skip_serializing_if = "String::is_empty")]
    pub oidc_discovery_ca_pem: String,
    #[serde(default, alias = "oidcClientID", skip_serializing_if = "String::is_empty")]
    pub oidc_client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oidc_client_secret: String,
    #[serde(default, alias = "jwksURL", skip_serializing_if = "String::is_empty")]
    pub jwks_url: String,
    #[serde(default, alias = "jwksCAPEM", skip_serializing_if = "String::is_empty")]
    pub jwks_ca_pem: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jwt_validation_pubkeys: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bound_issuer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jwt_supported_algs: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_role: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_config: BTreeMap<String, Value>,
}

pub struct VaultAuthKind;

impl ObjectKind for VaultAuthKind {
    const DIR: &'static str = "vaultauth";
    const LABEL: &'static str = "VaultAuth";
    const TEMPLATE: &'static str = "VaultAuth";

    type Spec = VaultAuthSpec;

    fn namespace(spec: &Self::Spec) -> &str {
        &spec.vault_namespace
    }

    async fn apply<S: SecretService>(
        &self,
        scope: &Scope<'_, S>,
        file: &str,
        spec: &Self::Spec,
        ui: &Ui,
    ) -> Result<()> {
        let auth_path = spec.path.trim_matches('/');
        let data = body(&spec.data);

        let mount_path = format!("sys/auth/{auth_path}");
        match scope.write(&mount_path, &data).await {
            Ok(_) => {}
            Err(e) if e.mentions("path is already in use") => {
                debug!(path = mount_path.as_str(), "auth mount exists, tuning");
                let tune_path = format!("sys/auth/{auth_path}/tune");
                scope
                    .write(&tune_path, &data)
                    .await
                    .map_err(|e| Error::write(&tune_path, e))?;
            }
            Err(e) => return Err(Error::write(&mount_path, e)),
        }

        if spec.data.auth_type == "jwt" {
            let config_path = format!("auth/{auth_path}/config");
            scope
                .write(&config_path, &body(&spec.jwt_config))
                .await
                .map_err(|e| Error::write(&config_path, e))?;
        }

        ui.success(&format!(
            "VaultAuth: {file}.yaml, Name: {} write OK",
            spec.path
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::testing::FakeSecretService;
    use serde_json::json;

    fn jwt_spec() -> VaultAuthSpec {
        serde_yaml::from_str(
            r#"
path: gitlab
data:
  type: jwt
  description: gitlab ci
JWTConfig:
  boundIssuer: gitlab.example.com
  jwksURL: https://gitlab.example.com/-/jwks
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn new_jwt_mount_is_configured() {
        let service = FakeSecretService::new("");
        let ui = Ui::buffer();
        VaultAuthKind
            .apply(&service.scope(""), "gitlab", &jwt_spec(), &ui)
            .await
            .unwrap();

        let writes = service.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].path, "sys/auth/gitlab");
        assert_eq!(
            writes[0].body,
            Some(json!({"type": "jwt", "description": "gitlab ci"}))
        );
        assert_eq!(writes[1].path, "auth/gitlab/config");
        assert_eq!(
            writes[1].body,
            Some(json!({
                "jwks_url": "https://gitlab.example.com/-/jwks",
                "bound_issuer": "gitlab.example.com"
            }))
        );
        assert_eq!(ui.lines(), vec!["VaultAuth: gitlab.yaml, Name: gitlab write OK"]);
    }

    #[tokio::test]
    async fn existing_mount_is_tuned() {
        let service = FakeSecretService::new("");
        service.fail("write", "sys/auth/gitlab", 400, "path is already in use at gitlab/");
        VaultAuthKind
            .apply(&service.scope(""), "gitlab", &jwt_spec(), &Ui::buffer())
            .await
            .unwrap();
        let paths: Vec<_> = service.writes().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            vec!["sys/auth/gitlab", "sys/auth/gitlab/tune", "auth/gitlab/config"]
        );
    }

    #[tokio::test]
    async fn other_mount_errors_fail() {
        let service = FakeSecretService::new("");
        service.fail("write", "sys/auth/gitlab", 403, "permission denied");
        let err = VaultAuthKind
            .apply(&service.scope(""), "gitlab", &jwt_spec(), &Ui::buffer())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert_eq!(service.writes().len(), 1);
    }
}
