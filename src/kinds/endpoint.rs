// kinds/endpoint.rs
pub use crate::pki::VaultEndpointSpec;

use super::ObjectKind;
use crate::error::Result;
use crate::pki::EndpointReconciler;
use crate::ui::Ui;
use crate::vault::{Scope, SecretService};

pub struct EndpointKind {
    pub force: bool,
}

impl ObjectKind for EndpointKind {
    const DIR: &'static str = "vaultendpoint";
    const LABEL: &'static str = "Vault Endpoint";
    const TEMPLATE: &'static str = "VaultEndpoint";

    type Spec = VaultEndpointSpec;

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
        EndpointReconciler::new(ui, self.force)
            .reconcile(scope, file, spec)
            .await
            .map(|_| ())
    }
}
