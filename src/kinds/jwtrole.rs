// kinds/jwtrole.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::pki::{body, Ttl};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtRoleSpec {
    pub auth_path: String,
    pub role_name: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default)]
    pub parameters: JwtRoleParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct JwtRoleParameters {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bound_audiences: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_claim: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bound_subject: String,
    /// Claim values are strings or lists of strings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bound_claims: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bound_claims_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub claim_mappings: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub groups_claim: String,
    #[serde(default, alias = "oidcScopes", skip_serializing_if = "Vec::is_empty")]
    pub oidc_scopes: Vec<String>,
    #[serde(default, alias = "allowedRedirectURIs", skip_serializing_if = "Vec::is_empty")]
    pub allowed_redirect_uris: Vec<String>,
    #[serde(default, alias = "tokenTTL", skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<Ttl>,
    #[serde(default, alias = "tokenMaxTTL", skip_serializing_if = "Option::is_none")]
    pub token_max_ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_policies: Vec<String>,
    #[serde(default, alias = "tokenBoundCIDRs", skip_serializing_if = "Vec::is_empty")]
    pub token_bound_cidrs: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, alias = "verboseOIDCLogging", skip_serializing_if = "Option::is_none")]
    pub verbose_oidc_logging: Option<bool>,
}

pub struct JwtRoleKind;

impl ObjectKind for JwtRoleKind {
    const DIR: &'static str = "jwtrole";
    const LABEL: &'static str = "JWT Role";
    const TEMPLATE: &'static str = "JWTRole";

    type Spec = JwtRoleSpec;

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
        let path = format!(
            "auth/{}/role/{}",
            spec.auth_path.trim_matches('/'),
            spec.role_name
        );
        scope
            .write(&path, &body(&spec.parameters))
            .await
            .map_err(|e| Error::write(&path, e))?;
        ui.success(&format!("JWT Role ({file}) write OK"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::testing::FakeSecretService;
    use serde_json::json;

    #[tokio::test]
    async fn writes_role_under_auth_mount() {
        let spec: JwtRoleSpec = serde_yaml::from_str(
            r#"
authPath: gitlab
roleName: deploy
parameters:
  roleType: jwt
  userClaim: user_email
  boundClaims:
    project_id: ["42", "43"]
  tokenPolicies: [deploy]
"#,
        )
        .unwrap();
        let service = FakeSecretService::new("");
        let ui = Ui::buffer();
        JwtRoleKind
            .apply(&service.scope(""), "deploy", &spec, &ui)
            .await
            .unwrap();

        let writes = service.writes();
        assert_eq!(writes[0].path, "auth/gitlab/role/deploy");
        assert_eq!(
            writes[0].body,
            Some(json!({
                "role_type": "jwt",
                "user_claim": "user_email",
                "bound_claims": {"project_id": ["42", "43"]},
                "token_policies": ["deploy"]
            }))
        );
    }

    #[tokio::test]
    async fn write_failure_is_reported_with_path() {
        let spec = JwtRoleSpec {
            auth_path: "jwt".into(),
            role_name: "r".into(),
            ..Default::default()
        };
        let service = FakeSecretService::new("");
        service.fail("write", "auth/jwt/role/r", 400, "invalid role");
        let err = JwtRoleKind
            .apply(&service.scope(""), "r", &spec, &Ui::buffer())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("auth/jwt/role/r"));
    }
}
