// pki/types.rs
//
// Endpoint documents read camelCase YAML and serialize to the snake_case
// request bodies Vault expects.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A duration Vault accepts either as seconds or as a string like `"8760h"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ttl {
    Seconds(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct VaultEndpointSpec {
    pub path: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default)]
    pub mount_options: MountOptions,
    #[serde(default)]
    pub tune_options: Option<MountConfig>,
    #[serde(default)]
    pub pki_config: PkiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct MountOptions {
    #[serde(rename = "type", default)]
    pub engine_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<MountConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub local: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub seal_wrap: bool,
}

/// Mount config, used both inside mount options and as tune options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct MountConfig {
    #[serde(default, alias = "defaultLeaseTTL", skip_serializing_if = "Option::is_none")]
    pub default_lease_ttl: Option<Ttl>,
    #[serde(default, alias = "maxLeaseTTL", skip_serializing_if = "Option::is_none")]
    pub max_lease_ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_no_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_non_hmac_request_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_non_hmac_response_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub listing_visibility: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passthrough_request_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_response_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct PkiConfig {
    #[serde(default)]
    pub export_private_key: bool,
    #[serde(default)]
    pub root_options: RootOptions,
    #[serde(default)]
    pub intermediate_options: IntermediateOptions,
    #[serde(default)]
    pub urls: Option<UrlConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct RootOptions {
    #[serde(default)]
    pub generate_options: Option<GenerateOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct IntermediateOptions {
    #[serde(default)]
    pub generate_options: Option<GenerateOptions>,
    #[serde(default, alias = "rootCaPath", rename(deserialize = "rootCAPath"))]
    pub root_ca_path: String,
    #[serde(default, alias = "rootCaNamespace", rename(deserialize = "rootCANamespace"))]
    pub root_ca_namespace: String,
}

/// Body of `root/generate`, `intermediate/generate` and `root/sign-intermediate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct GenerateOptions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub common_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alt_names: String,
    #[serde(default, alias = "ipSANs", skip_serializing_if = "String::is_empty")]
    pub ip_sans: String,
    #[serde(default, alias = "uriSANs", skip_serializing_if = "String::is_empty")]
    pub uri_sans: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub other_sans: String,
    #[serde(default, alias = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key_format: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_bits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_path_length: Option<i32>,
    #[serde(default, alias = "excludeCNFromSANs", skip_serializing_if = "std::ops::Not::not")]
    pub exclude_cn_from_sans: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permitted_dns_domains: Vec<String>,
    #[serde(default, alias = "OU", skip_serializing_if = "String::is_empty")]
    pub ou: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locality: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub province: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub serial_number: String,
}

/// Issuing and CRL URLs. Accepted in documents, not written anywhere yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct UrlConfig {
    #[serde(default)]
    pub issuing_certificates: Vec<String>,
    #[serde(default, alias = "crlDistributionPoints")]
    pub crl_distribution_points: Vec<String>,
    #[serde(default, alias = "ocspServers")]
    pub ocsp_servers: Vec<String>,
}

/// JSON request body for a document section.
pub(crate) fn body<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::Object(Default::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ENDPOINT: &str = r#"
path: pki-int
vaultNamespace: team-a
mountOptions:
  type: pki
  description: intermediate
  config:
    maxLeaseTTL: 87600h
tuneOptions:
  defaultLeaseTtl: 3600
pkiConfig:
  exportPrivateKey: false
  intermediateOptions:
    rootCAPath: pki-root
    rootCANamespace: nsA
    generateOptions:
      commonName: example.com Intermediate
      keyBits: 4096
      excludeCnFromSans: true
"#;

    #[test]
    fn camel_case_document_decodes() {
        let spec: VaultEndpointSpec = serde_yaml::from_str(ENDPOINT).unwrap();
        assert_eq!(spec.path, "pki-int");
        assert_eq!(spec.vault_namespace, "team-a");
        assert_eq!(spec.mount_options.engine_type, "pki");
        assert_eq!(spec.pki_config.intermediate_options.root_ca_path, "pki-root");
        assert_eq!(spec.pki_config.intermediate_options.root_ca_namespace, "nsA");
        assert!(spec.pki_config.root_options.generate_options.is_none());
    }

    #[test]
    fn request_bodies_are_snake_case() {
        let spec: VaultEndpointSpec = serde_yaml::from_str(ENDPOINT).unwrap();
        assert_eq!(
            body(&spec.mount_options),
            json!({
                "type": "pki",
                "description": "intermediate",
                "config": {"max_lease_ttl": "87600h"}
            })
        );
        assert_eq!(body(&spec.tune_options), json!({"default_lease_ttl": 3600}));
        let generate = spec.pki_config.intermediate_options.generate_options.unwrap();
        assert_eq!(
            body(&generate),
            json!({
                "common_name": "example.com Intermediate",
                "key_bits": 4096,
                "exclude_cn_from_sans": true
            })
        );
    }
}
