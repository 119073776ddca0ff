// kinds/vaultpolicy.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultPolicySpec {
    pub policy_name: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default)]
    pub policies: Vec<PolicyRule>,
}

/// One `path` stanza of an ACL policy. Serializes to the field names of
/// Vault's JSON policy syntax.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct PolicyRule {
    #[serde(skip_serializing)]
    pub path: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub allowed_parameters: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub denied_parameters: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_parameters: Vec<String>,
    #[serde(default, alias = "minWrappingTTL", skip_serializing_if = "String::is_empty")]
    pub min_wrapping_ttl: String,
    #[serde(default, alias = "maxWrappingTTL", skip_serializing_if = "String::is_empty")]
    pub max_wrapping_ttl: String,
}

/// Encodes rules as a JSON policy document, `{"path": {"<path>": {...}}}`.
/// A path listed twice keeps its last rule.
pub fn encode_policy(rules: &[PolicyRule]) -> Result<String> {
    let mut paths = Map::new();
    for rule in rules {
        let body = serde_json::to_value(rule)
            .map_err(|e| Error::validation(format!("policy path {}: {e}", rule.path)))?;
        paths.insert(rule.path.clone(), body);
    }
    serde_json::to_string_pretty(&json!({ "path": paths }))
        .map_err(|e| Error::validation(format!("policy encoding: {e}")))
}

pub struct VaultPolicyKind;

impl ObjectKind for VaultPolicyKind {
    const DIR: &'static str = "vaultpolicy";
    const LABEL: &'static str = "Vault Policy";
    const TEMPLATE: &'static str = "VaultPolicy";

    type Spec = VaultPolicySpec;

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
        if spec.policy_name.trim().is_empty() {
            return Err(Error::validation("policyName is required"));
        }
        let path = format!("sys/policy/{}", spec.policy_name);
        let policy = encode_policy(&spec.policies)?;
        scope
            .write(&path, &json!({ "policy": policy }))
            .await
            .map_err(|e| Error::write(&path, e))?;
        ui.success(&format!(
            "Policy: {file}.yaml, Name: {}, write, OK",
            spec.policy_name
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::testing::FakeSecretService;

    #[test]
    fn policy_is_keyed_by_path() {
        let rules = vec![
            PolicyRule {
                path: "secret/data/app/*".into(),
                capabilities: vec!["read".into(), "list".into()],
                ..Default::default()
            },
            PolicyRule {
                path: "pki-int/issue/web".into(),
                capabilities: vec!["update".into()],
                allowed_parameters: BTreeMap::from([(
                    "common_name".to_string(),
                    vec!["*.example.com".to_string()],
                )]),
                max_wrapping_ttl: "1h".into(),
                ..Default::default()
            },
        ];
        let encoded: serde_json::Value =
            serde_json::from_str(&encode_policy(&rules).unwrap()).unwrap();
        assert_eq!(
            encoded,
            json!({"path": {
                "secret/data/app/*": {"capabilities": ["read", "list"]},
                "pki-int/issue/web": {
                    "capabilities": ["update"],
                    "allowed_parameters": {"common_name": ["*.example.com"]},
                    "max_wrapping_ttl": "1h"
                }
            }})
        );
    }

    #[test]
    fn quotes_in_paths_survive_encoding() {
        let rules = vec![PolicyRule {
            path: "secret/\"odd\"".into(),
            capabilities: vec!["deny".into()],
            ..Default::default()
        }];
        let encoded: serde_json::Value =
            serde_json::from_str(&encode_policy(&rules).unwrap()).unwrap();
        assert_eq!(encoded["path"]["secret/\"odd\""]["capabilities"], json!(["deny"]));
    }

    #[tokio::test]
    async fn policy_is_written_under_sys_policy() {
        let spec: VaultPolicySpec = serde_yaml::from_str(
            r#"
policyName: app-read
policies:
  - path: secret/data/app
    capabilities: [read]
"#,
        )
        .unwrap();
        let service = FakeSecretService::new("");
        let ui = Ui::buffer();
        VaultPolicyKind
            .apply(&service.scope(""), "app", &spec, &ui)
            .await
            .unwrap();
        let writes = service.writes();
        assert_eq!(writes[0].path, "sys/policy/app-read");
        let body = writes[0].body.as_ref().unwrap();
        let policy: serde_json::Value =
            serde_json::from_str(body["policy"].as_str().unwrap()).unwrap();
        assert_eq!(
            policy,
            json!({"path": {"secret/data/app": {"capabilities": ["read"]}}})
        );
        assert_eq!(ui.lines(), vec!["Policy: app.yaml, Name: app-read, write, OK"]);
    }
}
