// pki/operations.rs
//
// Mount, tune and CA bootstrap for a `VaultEndpoint` document. The server's
// tune endpoint answering is what marks a mount as already present.
use serde_json::json;
use tracing::{debug, info, warn};

use super::ca::{generate_intermediate_ca, generate_root_ca};
use super::types::{body, VaultEndpointSpec};
use super::verification::describe_chain;
use crate::error::{Error, Result};
use crate::ui::Ui;
use crate::vault::{Scope, SecretService, VaultError};

/// What reading a mount's tune settings says about it.
#[derive(Debug)]
pub enum MountState {
    Mounted,
    Absent,
    Unknown(VaultError),
}

impl MountState {
    fn from_tune_read(result: std::result::Result<Option<crate::vault::Secret>, VaultError>) -> Self {
        match result {
            Ok(Some(_)) => MountState::Mounted,
            Ok(None) => MountState::Absent,
            Err(e) if e.status() == Some(404) => MountState::Absent,
            Err(e)
                if e.status() == Some(400)
                    && (e.mentions("cannot fetch sysview") || e.mentions("no mount")) =>
            {
                MountState::Absent
            }
            Err(e) => MountState::Unknown(e),
        }
    }
}

/// Steps carried out for one endpoint file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EndpointReport {
    pub previously_mounted: bool,
    pub mounted: bool,
    pub root_generated: bool,
    pub intermediate_installed: bool,
    pub ssh_signing_configured: bool,
    pub skipped: bool,
}

pub struct EndpointReconciler<'a> {
    ui: &'a Ui,
    force: bool,
}

impl<'a> EndpointReconciler<'a> {
    pub fn new(ui: &'a Ui, force: bool) -> Self {
        Self { ui, force }
    }

    pub async fn mount_state<S: SecretService>(
        &self,
        scope: &Scope<'_, S>,
        path: &str,
    ) -> MountState {
        let tune_path = format!("sys/mounts/{path}/tune");
        MountState::from_tune_read(scope.read(&tune_path).await)
    }

    /// Reconciles one endpoint. `file` names the document in result lines.
    pub async fn reconcile<S: SecretService>(
        &self,
        scope: &Scope<'_, S>,
        file: &str,
        endpoint: &VaultEndpointSpec,
    ) -> Result<EndpointReport> {
        let path = endpoint.path.trim_matches('/');
        if path.is_empty() {
            return Err(Error::validation("spec.path is required"));
        }
        let mut report = EndpointReport::default();

        match self.mount_state(scope, path).await {
            MountState::Mounted => report.previously_mounted = true,
            MountState::Absent => {
                let mount_path = format!("sys/mounts/{path}");
                info!(path = mount_path.as_str(), namespace = scope.namespace(), "mounting");
                scope
                    .write(&mount_path, &body(&endpoint.mount_options))
                    .await
                    .map_err(|e| Error::write(&mount_path, e))?;
                report.mounted = true;
            }
            MountState::Unknown(source) => {
                return Err(Error::UnknownMount {
                    path: path.to_string(),
                    source,
                })
            }
        }

        let tune_path = format!("sys/mounts/{path}/tune");
        let tune = match &endpoint.tune_options {
            Some(options) => body(options),
            None => json!({}),
        };
        scope
            .write(&tune_path, &tune)
            .await
            .map_err(|e| Error::write(&tune_path, e))?;

        match endpoint.mount_options.engine_type.as_str() {
            "ssh" if !report.previously_mounted => {
                let ca_path = format!("{path}/config/ca");
                scope
                    .write(&ca_path, &json!({ "generate_signing_key": true }))
                    .await
                    .map_err(|e| Error::write(&ca_path, e))?;
                report.ssh_signing_configured = true;
                self.ui
                    .success(&format!("SSH Endpoint configured ({file}) write OK"));
            }
            "pki" => self.bootstrap_pki(scope, file, path, endpoint, &mut report).await?,
            _ => {}
        }

        self.ui
            .success(&format!("Endpoint mount/tune ({file}) write OK"));
        Ok(report)
    }

    async fn bootstrap_pki<S: SecretService>(
        &self,
        scope: &Scope<'_, S>,
        file: &str,
        path: &str,
        endpoint: &VaultEndpointSpec,
        report: &mut EndpointReport,
    ) -> Result<()> {
        if report.previously_mounted && !self.force {
            report.skipped = true;
            self.ui
                .warn(&format!("PKI Endpoint already configured ({file})  SKIPPING"));
            return Ok(());
        }
        let pki = &endpoint.pki_config;

        if let Some(options) = &pki.root_options.generate_options {
            if pki.export_private_key {
                debug!(file, "root key is exported, not generating");
            } else {
                generate_root_ca(scope, path, options).await?;
                report.root_generated = true;
                self.ui
                    .success(&format!("PKI Root configured ({file}) write OK"));
            }
        }

        if let Some(options) = &pki.intermediate_options.generate_options {
            let chain =
                generate_intermediate_ca(scope, path, options, &pki.intermediate_options).await?;
            report.intermediate_installed = true;
            match describe_chain(&chain) {
                Ok(entries) => {
                    for entry in entries {
                        info!(
                            subject = entry.subject.as_str(),
                            issuer = entry.issuer.as_str(),
                            not_after = %entry.not_after,
                            "installed chain certificate"
                        );
                    }
                }
                Err(e) => warn!(file, error = e.as_str(), "could not parse installed chain"),
            }
            self.ui
                .success(&format!("PKI Intermediate configured ({file}) write OK"));
        }

        if pki.urls.is_some() {
            // TODO: write `<path>/config/urls` once the issuing and CRL URLs are
            // derived from the cluster address instead of the document.
            debug!(file, "url configuration is not applied");
        }

        self.ui
            .success(&format!("PKI Endpoint configured ({file}) write OK"));
        Ok(())
    }
}
