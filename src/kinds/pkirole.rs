// kinds/pkirole.rs
use serde::{Deserialize, Serialize};

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::pki::{body, Ttl};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkiRoleSpec {
    pub issuer_path: String,
    pub role_name: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default)]
    pub config: PkiRoleConfig,
}

/// Parameters of `<issuer>/roles/<name>`. Unset fields keep Vault's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct PkiRoleConfig {
    #[serde(default, alias = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
    #[serde(default, alias = "maxTTL", skip_serializing_if = "Option::is_none")]
    pub max_ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_localhost: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_domains_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_bare_domains: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_subdomains: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_glob_domains: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_any_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_hostnames: Option<bool>,
    #[serde(default, alias = "allowIPSANs", skip_serializing_if = "Option::is_none")]
    pub allow_ip_sans: Option<bool>,
    #[serde(default, alias = "allowedURISANs", skip_serializing_if = "Vec::is_empty")]
    pub allowed_uri_sans: Vec<String>,
    #[serde(default, alias = "allowedOtherSANs", skip_serializing_if = "Vec::is_empty")]
    pub allowed_other_sans: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_signing_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_protection_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_bits: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_usage: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ext_key_usage: Vec<String>,
    #[serde(default, alias = "useCSRCommonName", skip_serializing_if = "Option::is_none")]
    pub use_csr_common_name: Option<bool>,
    #[serde(default, alias = "useCSRSANs", skip_serializing_if = "Option::is_none")]
    pub use_csr_sans: Option<bool>,
    #[serde(default, alias = "OU", skip_serializing_if = "Vec::is_empty")]
    pub ou: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organization: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub country: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locality: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub province: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub street_address: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postal_code: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_lease: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_store: Option<bool>,
    #[serde(default, alias = "requireCN", skip_serializing_if = "Option::is_none")]
    pub require_cn: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policy_identifiers: Vec<String>,
    #[serde(default, alias = "basicConstraintsValidForNonCA", skip_serializing_if = "Option::is_none")]
    pub basic_constraints_valid_for_non_ca: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before_duration: Option<Ttl>,
}

pub struct PkiRoleKind;

impl ObjectKind for PkiRoleKind {
    const DIR: &'static str = "pkirole";
    const LABEL: &'static str = "PKI Role";
    const TEMPLATE: &'static str = "PKIRole";

    type Spec = PkiRoleSpec;

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
            spec.issuer_path.trim_matches('/'),
            spec.role_name
        );
        scope
            .write(&path, &body(&spec.config))
            .await
            .map_err(|e| Error::write(&path, e))?;
        ui.success(&format!("PKI Role ({file}) write OK"));
        Ok(())
    }
}
