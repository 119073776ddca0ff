// app/run.rs
//
// The apply loop shared by every `put <kind>` command.
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::{Config, ConfigFile, ConfigStore, Context};
use crate::error::{Error, Result};
use crate::inventory::{expand_home, get_files, read_file, InventoryFile};
use crate::kinds::{Document, ObjectKind};
use crate::session::PersistPolicy;
use crate::template::TemplateService;
use crate::types::GlobalArgs;
use crate::ui::Ui;
use crate::vault::{SecretService, VaultAuthenticator, VaultService};

use super::resolve_service;

/// Loaded config plus the global flags every command reads.
pub struct CommandContext {
    pub config_path: PathBuf,
    pub config: Config,
    pub context_name: String,
    pub namespace: String,
    pub data: String,
    pub persist: PersistPolicy,
}

impl CommandContext {
    /// Reads the config; the context is `--context` or the current one.
    pub fn load<S: ConfigStore>(store: &S, global: &GlobalArgs) -> Result<Self> {
        let config_path = crate::config::resolve_config_path(global.config.as_deref())?;
        let config = store.read(&config_path)?;
        let context_name = if global.context.is_empty() {
            config.current_context.clone()
        } else {
            global.context.clone()
        };
        Ok(CommandContext {
            config_path,
            config,
            context_name,
            namespace: global.namespace.clone(),
            data: global.data.clone(),
            persist: PersistPolicy::default(),
        })
    }

    pub fn context(&self) -> Result<&Context> {
        if self.context_name.is_empty() {
            return Err(Error::validation(
                "no context selected, pass --context or run `config use-context`",
            ));
        }
        self.config
            .context(&self.context_name)
            .ok_or_else(|| Error::ContextNotFound {
                name: self.context_name.clone(),
            })
    }

    pub fn inventory_dir(&self) -> Result<PathBuf> {
        Ok(expand_home(&self.context()?.spec.inventory_path))
    }

    pub async fn service(&mut self) -> Result<VaultService> {
        self.context()?;
        resolve_service(
            &mut self.config,
            &ConfigFile,
            &self.config_path,
            &self.context_name,
            &self.namespace,
            &VaultAuthenticator,
            self.persist,
        )
        .await
    }
}

/// Result of one apply loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PutSummary {
    pub applied: usize,
    pub failed: usize,
}

impl PutSummary {
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }
}

/// Documents of kind `K` matching `filespec`. No match is an error, and so
/// is more than one for kinds that take a single document.
pub fn find_documents<K: ObjectKind>(inventory_dir: &Path, filespec: &str) -> Result<Vec<InventoryFile>> {
    let files = get_files(&inventory_dir.join(K::DIR), filespec)?;
    if files.is_empty() || (K::SINGLE_FILE && files.len() != 1) {
        return Err(Error::InventoryLookup {
            label: K::LABEL.to_string(),
            spec: filespec.to_string(),
        });
    }
    Ok(files)
}

fn load_document<K: ObjectKind>(
    templates: &TemplateService,
    file: &InventoryFile,
    data: &str,
) -> Result<Document<K::Spec>> {
    let raw = read_file(&file.path)?;
    let rendered = templates.exec(K::TEMPLATE, &raw, data)?;
    serde_yaml::from_str(&rendered).map_err(|source| Error::Decode {
        kind: K::TEMPLATE,
        source,
    })
}

/// Applies every file in order. A failing file is reported with its name
/// and the loop moves on to the next one.
pub async fn apply_documents<K: ObjectKind, S: SecretService>(
    kind: &K,
    service: &S,
    files: &[InventoryFile],
    data: &str,
    ui: &Ui,
) -> PutSummary {
    let templates = TemplateService::new();
    let mut summary = PutSummary::default();

    for file in files {
        debug!(kind = K::TEMPLATE, file = %file.path.display(), "applying");
        let result = match load_document::<K>(&templates, file, data) {
            Ok(document) => {
                let scope = service.scope(K::namespace(&document.spec));
                kind.apply(&scope, &file.name, &document.spec, ui).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(kind = K::TEMPLATE, file = file.name.as_str(), "applied");
                summary.applied += 1;
            }
            Err(e) => {
                error!(kind = K::TEMPLATE, file = file.name.as_str(), error = %e, "apply failed");
                ui.error(&format!("({}) {e}", file.name));
                summary.failed += 1;
            }
        }
    }
    summary
}

/// Runs `put <kind> <filespec>` end to end.
pub async fn run_put<K: ObjectKind>(ctx: &mut CommandContext, kind: &K, filespec: &str, ui: &Ui) -> Result<PutSummary> {
    let files = find_documents::<K>(&ctx.inventory_dir()?, filespec)?;
    let service = ctx.service().await?;
    Ok(apply_documents(kind, &service, &files, &ctx.data, ui).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{PkiRoleKind, SecretKind, VaultNamespaceKind};
    use crate::vault::testing::FakeSecretService;
    use serde_json::json;
    use std::fs;

    fn inventory(kind: &str, files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let kind_dir = dir.path().join(kind);
        fs::create_dir_all(&kind_dir).unwrap();
        for (name, body) in files {
            fs::write(kind_dir.join(format!("{name}.yaml")), body).unwrap();
        }
        dir
    }

    const ROLE: &str = "kind: PKIRole\nspec:\n  issuerPath: pki-int\n  roleName: {{ role }}\n  config:\n    maxTTL: 72h\n";

    #[test]
    fn missing_document_names_kind_and_spec() {
        let dir = inventory("pkirole", &[]);
        let err = find_documents::<PkiRoleKind>(dir.path(), "web").unwrap_err();
        assert_eq!(err.to_string(), "PKI Role (web) not found in inventory");
    }

    #[test]
    fn single_document_kinds_reject_several_matches() {
        let dir = inventory("secretmeta", &[("db-a", "spec: {}"), ("db-b", "spec: {}")]);
        assert!(find_documents::<SecretKind>(dir.path(), "db-*").is_err());
        assert_eq!(find_documents::<SecretKind>(dir.path(), "db-a").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn renders_each_document_with_data() {
        let dir = inventory("pkirole", &[("web", ROLE)]);
        let files = find_documents::<PkiRoleKind>(dir.path(), "web").unwrap();
        let service = FakeSecretService::new("");
        let ui = Ui::buffer();
        let summary = apply_documents(&PkiRoleKind, &service, &files, r#"{"role": "web"}"#, &ui).await;

        assert_eq!(summary, PutSummary { applied: 1, failed: 0 });
        let writes = service.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].path, "pki-int/roles/web");
        assert_eq!(writes[0].body, Some(json!({"max_ttl": "72h"})));
        assert_eq!(ui.lines(), vec!["PKI Role (web) write OK"]);
    }

    #[tokio::test]
    async fn failing_file_does_not_stop_the_loop() {
        let dir = inventory(
            "pkirole",
            &[("a-broken", "spec: [not, a, map]\n"), ("b-web", ROLE)],
        );
        let files = find_documents::<PkiRoleKind>(dir.path(), "*").unwrap();
        let service = FakeSecretService::new("");
        let ui = Ui::buffer();
        let summary = apply_documents(&PkiRoleKind, &service, &files, r#"{"role": "web"}"#, &ui).await;

        assert_eq!(summary, PutSummary { applied: 1, failed: 1 });
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(service.writes().len(), 1);
        let errors = ui.lines_on(crate::ui::Channel::Err);
        assert!(errors[0].starts_with("(a-broken) unable to decode PKIRole"));
    }

    #[tokio::test]
    async fn undefined_template_variable_fails_the_file() {
        let dir = inventory("pkirole", &[("web", ROLE)]);
        let files = find_documents::<PkiRoleKind>(dir.path(), "web").unwrap();
        let service = FakeSecretService::new("");
        let ui = Ui::buffer();
        let summary = apply_documents(&PkiRoleKind, &service, &files, "", &ui).await;
        assert_eq!(summary.failed, 1);
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn document_namespace_scopes_its_calls() {
        let dir = inventory(
            "vaultnamespace",
            &[("ns1", "spec:\n  namespaceName: ns1\n  namespaceBase: team-a\n")],
        );
        let files = find_documents::<VaultNamespaceKind>(dir.path(), "ns1").unwrap();
        let service = FakeSecretService::new("bound");
        let ui = Ui::buffer();
        apply_documents(&VaultNamespaceKind, &service, &files, "", &ui).await;
        assert!(service.calls().iter().all(|c| c.namespace == "team-a"));
    }
}
