//! Command dispatch: loads the config, resolves the connection and runs one
//! subcommand.

mod commands;
mod resolver;
mod run;

pub use commands::{redacted, run_config, run_login, run_logout};
pub use resolver::resolve_service;
pub use run::{apply_documents, find_documents, run_put, CommandContext, PutSummary};

use tracing::error;

use crate::config::ConfigFile;
use crate::error::Result;
use crate::kinds::{
    EndpointKind, JwtRoleKind, PkiRoleKind, RoleFlags, SecretKind, SshRoleKind, VaultAuthKind,
    VaultNamespaceKind, VaultPolicyKind, VaultRoleKind,
};
use crate::types::{Cli, Command, PutKind};
use crate::ui::Ui;
use crate::vault::VaultAuthenticator;

/// Runs the parsed command line and returns the process exit code.
pub async fn execute(cli: Cli, ui: &Ui) -> i32 {
    match dispatch(cli, ui).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            ui.error(&e.to_string());
            1
        }
    }
}

async fn dispatch(cli: Cli, ui: &Ui) -> Result<i32> {
    let store = ConfigFile;
    let mut ctx = CommandContext::load(&store, &cli.global)?;

    match cli.command {
        Command::Put { kind } => put(&mut ctx, kind, ui).await,
        Command::Login => run_login(&mut ctx, &store, &VaultAuthenticator, ui).await.map(|_| 0),
        Command::Logout => run_logout(&mut ctx, &store, ui).map(|_| 0),
        Command::Config(command) => run_config(&mut ctx, &store, command, ui).map(|_| 0),
    }
}

async fn put(ctx: &mut CommandContext, kind: PutKind, ui: &Ui) -> Result<i32> {
    let summary = match kind {
        PutKind::VaultEndpoint { filespec, force } => {
            run_put(ctx, &EndpointKind { force }, &filespec, ui).await?
        }
        PutKind::PkiRole { filespec } => run_put(ctx, &PkiRoleKind, &filespec, ui).await?,
        PutKind::SshRole { filespec } => run_put(ctx, &SshRoleKind, &filespec, ui).await?,
        PutKind::JwtRole { filespec } => run_put(ctx, &JwtRoleKind, &filespec, ui).await?,
        PutKind::VaultAuth { filespec } => run_put(ctx, &VaultAuthKind, &filespec, ui).await?,
        PutKind::VaultRole {
            filespec,
            policies,
            bound_namespaces,
            bound_service_account_names,
        } => {
            let kind = VaultRoleKind {
                flags: RoleFlags {
                    policies,
                    bound_namespaces,
                    bound_service_account_names,
                },
            };
            run_put(ctx, &kind, &filespec, ui).await?
        }
        PutKind::VaultPolicy { filespec } => run_put(ctx, &VaultPolicyKind, &filespec, ui).await?,
        PutKind::VaultNamespace { filespec } => {
            run_put(ctx, &VaultNamespaceKind, &filespec, ui).await?
        }
        PutKind::Secret {
            filespec,
            dir,
            args,
        } => {
            let kind = SecretKind::new(args, dir, Box::new(std::io::stdin()));
            run_put(ctx, &kind, &filespec, ui).await?
        }
    };
    Ok(summary.exit_code())
}
