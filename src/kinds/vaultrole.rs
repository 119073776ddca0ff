// kinds/vaultrole.rs
use serde::{Deserialize, Serialize};

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::pki::{body, Ttl};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRoleSpec {
    pub auth_method: String,
    pub role_name: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default)]
    pub data: VaultRoleData,
}

/// Body of `auth/<method>/role/<name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct VaultRoleData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_policies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bound_service_account_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bound_service_account_namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub audience: String,
    #[serde(default, alias = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
    #[serde(default, alias = "maxTTL", skip_serializing_if = "Option::is_none")]
    pub max_ttl: Option<Ttl>,
    #[serde(default, alias = "tokenTTL", skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<Ttl>,
    #[serde(default, alias = "tokenMaxTTL", skip_serializing_if = "Option::is_none")]
    pub token_max_ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_period: Option<Ttl>,
    #[serde(default, alias = "bindSecretID", skip_serializing_if = "Option::is_none")]
    pub bind_secret_id: Option<bool>,
    #[serde(default, alias = "secretIDTTL", skip_serializing_if = "Option::is_none")]
    pub secret_id_ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_num_uses: Option<u32>,
    #[serde(default, alias = "boundCIDRs", skip_serializing_if = "Vec::is_empty")]
    pub bound_cidrs: Vec<String>,
    #[serde(default, alias = "tokenBoundCIDRs", skip_serializing_if = "Vec::is_empty")]
    pub token_bound_cidrs: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
}

/// Comma separated values from `--policies`, `--bound-namespaces` and
/// `--bound-service-account-names`, appended to every role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFlags {
    pub policies: String,
    pub bound_namespaces: String,
    pub bound_service_account_names: String,
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RoleFlags {
    pub fn apply_to(&self, data: &mut VaultRoleData) {
        for policy in split_list(&self.policies) {
            data.policies.push(policy.clone());
            data.token_policies.push(policy);
        }
        data.bound_service_account_namespaces
            .extend(split_list(&self.bound_namespaces));
        data.bound_service_account_names
            .extend(split_list(&self.bound_service_account_names));
    }
}

pub struct VaultRoleKind {
    pub flags: RoleFlags,
}

impl ObjectKind for VaultRoleKind {
    const DIR: &'static str = "vaultrole";
    const LABEL: &'static str = "Vault Role";
    const TEMPLATE: &'static str = "VaultRole";

    type Spec = VaultRoleSpec;

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
        let mut data = spec.data.clone();
        self.flags.apply_to(&mut data);

        let method = spec.auth_method.trim_matches('/');
        let path = format!("auth/{method}/role/{}", spec.role_name);
        scope
            .write(&path, &body(&data))
            .await
            .map_err(|e| Error::write(&path, e))?;
        ui.success(&format!(
            "Role: {file}.yaml, Method: {method}, Name: {}  write OK",
            spec.role_name
        ));
        Ok(())
    }
}
