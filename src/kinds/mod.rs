//! Object kinds applied by `put <kind>`.
//!
//! Each kind names its inventory directory, the label used in result lines,
//! the static schema of its `spec` and the writes that apply it.

mod endpoint;
mod jwtrole;
mod pkirole;
mod secret;
mod sshrole;
mod vaultauth;
mod vaultnamespace;
mod vaultpolicy;
mod vaultrole;

pub use endpoint::{EndpointKind, VaultEndpointSpec};
pub use jwtrole::{JwtRoleKind, JwtRoleParameters, JwtRoleSpec};
pub use pkirole::{PkiRoleConfig, PkiRoleKind, PkiRoleSpec};
pub use secret::{parse_args_data, KvKey, KvPath, SecretKind, SecretSpec};
pub use sshrole::{SshRoleKind, SshRoleParameters, SshRoleSpec};
pub use vaultauth::{AuthMountData, JwtAuthConfig, VaultAuthKind, VaultAuthSpec};
pub use vaultnamespace::{VaultNamespaceKind, VaultNamespaceSpec};
pub use vaultpolicy::{encode_policy, PolicyRule, VaultPolicyKind, VaultPolicySpec};
pub use vaultrole::{RoleFlags, VaultRoleData, VaultRoleKind, VaultRoleSpec};

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Result;
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Envelope shared by every inventory document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<S> {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: S,
}

#[allow(async_fn_in_trait)]
pub trait ObjectKind {
    /// Subdirectory of the inventory holding documents of this kind.
    const DIR: &'static str;
    /// Human name used in result lines.
    const LABEL: &'static str;
    /// Name the document is rendered under.
    const TEMPLATE: &'static str;
    /// Whether a file-spec must match exactly one document.
    const SINGLE_FILE: bool = false;

    type Spec: DeserializeOwned;

    /// Namespace the document asks to run in; empty keeps the command's.
    fn namespace(spec: &Self::Spec) -> &str;

    async fn apply<S: SecretService>(
        &self,
        scope: &Scope<'_, S>,
        file: &str,
        spec: &Self::Spec,
        ui: &Ui,
    ) -> Result<()>;
}
