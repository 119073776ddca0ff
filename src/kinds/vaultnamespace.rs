// kinds/vaultnamespace.rs
use serde::Deserialize;
use serde_json::json;

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultNamespaceSpec {
    pub namespace_name: String,
    /// Parent namespace the new one is created in.
    #[serde(default)]
    pub namespace_base: String,
}

pub struct VaultNamespaceKind;

impl ObjectKind for VaultNamespaceKind {
    const DIR: &'static str = "vaultnamespace";
    const LABEL: &'static str = "Vault Namespace";
    const TEMPLATE: &'static str = "VaultNamespace";

    type Spec = VaultNamespaceSpec;

    fn namespace(spec: &Self::Spec) -> &str {
        &spec.namespace_base
    }

    async fn apply<S: SecretService>(
        &self,
        scope: &Scope<'_, S>,
        file: &str,
        spec: &Self::Spec,
        ui: &Ui,
    ) -> Result<()> {
        let name = spec.namespace_name.trim_matches('/');
        let path = format!("sys/namespaces/{name}");

        // A failed lookup falls through to the create call, which reports
        // the real problem.
        if let Ok(Some(_)) = scope.read(&path).await {
            ui.success(&format!("Vault Namespace: ({file}.yaml) {name} exists"));
            return Ok(());
        }

        scope
            .write(&path, &json!({}))
            .await
            .map_err(|e| Error::write(&path, e))?;
        ui.success(&format!("Vault Namespace: ({file}.yaml) {name} write, OK"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::testing::FakeSecretService;

    fn spec() -> VaultNamespaceSpec {
        serde_yaml::from_str("namespaceName: ns1\nnamespaceBase: team-a\n").unwrap()
    }

    #[tokio::test]
    async fn existing_namespace_is_not_written() {
        let service = FakeSecretService::new("");
        service.respond_to("read", "sys/namespaces/ns1", json!({"data": {"path": "team-a/ns1/"}}));
        let ui = Ui::buffer();
        VaultNamespaceKind
            .apply(&service.scope("team-a"), "ns1", &spec(), &ui)
            .await
            .unwrap();
        assert!(service.writes().is_empty());
        assert_eq!(ui.lines(), vec!["Vault Namespace: (ns1.yaml) ns1 exists"]);
    }

    #[tokio::test]
    async fn missing_namespace_is_created_in_base() {
        let service = FakeSecretService::new("");
        let ui = Ui::buffer();
        VaultNamespaceKind
            .apply(&service.scope("team-a"), "ns1", &spec(), &ui)
            .await
            .unwrap();
        let writes = service.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].path, "sys/namespaces/ns1");
        assert_eq!(writes[0].namespace, "team-a");
        assert_eq!(ui.lines(), vec!["Vault Namespace: (ns1.yaml) ns1 write, OK"]);
    }
}
