// kinds/sshrole.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::pki::{body, Ttl};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshRoleSpec {
    pub signer_path: String,
    pub role_name: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default)]
    pub parameters: SshRoleParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct SshRoleParameters {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub allowed_users: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub allowed_domains: String,
    #[serde(default, alias = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
    #[serde(default, alias = "maxTTL", skip_serializing_if = "Option::is_none")]
    pub max_ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub allowed_critical_options: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub allowed_extensions: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_critical_options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_extensions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_user_certificates: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_host_certificates: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_bare_domains: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_subdomains: Option<bool>,
    #[serde(default, alias = "allowUserKeyIDs", skip_serializing_if = "Option::is_none")]
    pub allow_user_key_ids: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_id_format: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub algorithm_signer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cidr_list: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

pub struct SshRoleKind;

impl ObjectKind for SshRoleKind {
    const DIR: &'static str = "sshrole";
    const LABEL: &'static str = "SSH Role";
    const TEMPLATE: &'static str = "SSHRole";

    type Spec = SshRoleSpec;

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
            "{}/roles/{}",
            spec.signer_path.trim_matches('/'),
            spec.role_name
        );
        scope
            .write(&path, &body(&spec.parameters))
            .await
            .map_err(|e| Error::write(&path, e))?;
        ui.success(&format!("SSH Role ({file}) write OK"));
        Ok(())
    }
}
