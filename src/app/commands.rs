// app/commands.rs
//
// `config`, `login` and `logout`: everything that edits the config file.
use crate::config::{ClusterEdit, Config, ConfigStore, ContextEdit, CredentialEdit};
use crate::error::{Error, Result};
use crate::session::{get_session, PersistPolicy};
use crate::types::ConfigCommand;
use crate::ui::{Ui, CURRENT_COLOR, HEADER_COLOR};
use crate::vault::Authenticator;

use super::CommandContext;

const REDACTED: &str = "REDACTED";

/// Copy of `config` with passwords, keys and tokens blanked out.
pub fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    let hide = |value: &mut String| {
        if !value.is_empty() {
            *value = REDACTED.to_string();
        }
    };
    for user in &mut config.users {
        hide(&mut user.spec.password);
        hide(&mut user.spec.secret_id);
        hide(&mut user.spec.client_key_data);
    }
    for context in &mut config.contexts {
        hide(&mut context.spec.session.token);
    }
    config
}

#[allow(clippy::too_many_arguments)]
fn credential_edit(
    client_cert: String,
    client_cert_data: String,
    client_key: String,
    client_key_data: String,
    username: String,
    password: String,
    role_id: String,
    secret_id: String,
) -> Result<Option<CredentialEdit>> {
    let cert = [&client_cert, &client_cert_data, &client_key, &client_key_data]
        .iter()
        .any(|v| !v.is_empty());
    let userpass = !username.is_empty() || !password.is_empty();
    let approle = !role_id.is_empty() || !secret_id.is_empty();
    if [cert, userpass, approle].iter().filter(|m| **m).count() > 1 {
        return Err(Error::validation(
            "set-credentials takes one of certificate, username/password or role-id/secret-id",
        ));
    }

    Ok(if cert {
        Some(CredentialEdit::Cert {
            client_cert,
            client_cert_data,
            client_key,
            client_key_data,
        })
    } else if userpass {
        Some(CredentialEdit::UserPass { username, password })
    } else if approle {
        Some(CredentialEdit::AppRole { role_id, secret_id })
    } else {
        None
    })
}

fn print_contexts(config: &Config, ui: &Ui) {
    let row = |current: &str, name: &str, cluster: &str, user: &str, namespace: &str| {
        format!("{current:<8}{name:<20}{cluster:<20}{user:<20}{namespace}")
    };
    ui.highlight(&row("CURRENT", "NAME", "CLUSTER", "USER", "NAMESPACE"), HEADER_COLOR);
    for context in &config.contexts {
        let is_current = context.name == config.current_context;
        let line = row(
            if is_current { "*" } else { "" },
            &context.name,
            &context.spec.cluster,
            &context.spec.user,
            &context.spec.namespace,
        );
        if is_current {
            ui.highlight(&line, CURRENT_COLOR);
        } else {
            ui.output(&line);
        }
    }
}

/// Runs a `config` subcommand, writing the file back after every edit.
pub fn run_config<S: ConfigStore>(
    ctx: &mut CommandContext,
    store: &S,
    command: ConfigCommand,
    ui: &Ui,
) -> Result<()> {
    let config = &mut ctx.config;
    let message = match command {
        ConfigCommand::View { raw } => {
            let shown = if raw { config.clone() } else { redacted(config) };
            ui.output(shown.to_yaml()?.trim_end());
            return Ok(());
        }
        ConfigCommand::GetContexts => {
            print_contexts(config, ui);
            return Ok(());
        }
        ConfigCommand::UseContext { name } => {
            config.use_context(&name)?;
            format!("Switched to context \"{name}\".")
        }
        ConfigCommand::SetCluster {
            name,
            server,
            cert_auth,
            cert_auth_data,
            insecure_skip_tls_verify,
        } => {
            config.set_cluster(
                &name,
                &ClusterEdit {
                    server,
                    cert_auth,
                    cert_auth_data,
                    insecure_skip_tls_verify,
                },
            )?;
            format!("Cluster \"{name}\" set.")
        }
        ConfigCommand::SetCredentials {
            name,
            client_cert,
            client_cert_data,
            client_key,
            client_key_data,
            username,
            password,
            role_id,
            secret_id,
            ignore_namespace_on_auth,
        } => {
            let edit = credential_edit(
                client_cert,
                client_cert_data,
                client_key,
                client_key_data,
                username,
                password,
                role_id,
                secret_id,
            )?;
            match &edit {
                Some(edit) => {
                    config.set_user(&name, edit)?;
                }
                None if config.user(&name).is_none() => {
                    return Err(Error::validation(format!(
                        "no credentials given for new user {name}"
                    )));
                }
                None => {}
            }
            if let (Some(ignore), Some(user)) = (ignore_namespace_on_auth, config.user_mut(&name)) {
                user.spec.ignore_namespace_on_auth = ignore;
            }
            format!("User \"{name}\" set.")
        }
        ConfigCommand::SetContext {
            name,
            cluster,
            user,
            context_namespace,
            inventory_path,
        } => {
            config.set_context(
                &name,
                &ContextEdit {
                    cluster,
                    user,
                    namespace: context_namespace,
                    inventory_path,
                },
            )?;
            format!("Context \"{name}\" set.")
        }
        ConfigCommand::DeleteContext { name } => {
            config.delete_context(&name)?;
            format!("deleted context {name} from {}", ctx.config_path.display())
        }
        ConfigCommand::DeleteCluster { name } => {
            config.delete_cluster(&name)?;
            format!("deleted cluster {name} from {}", ctx.config_path.display())
        }
        ConfigCommand::DeleteUser { name } => {
            config.delete_user(&name)?;
            format!("deleted user {name} from {}", ctx.config_path.display())
        }
    };

    store.write(&ctx.config_path, config)?;
    ui.success(&message);
    Ok(())
}

/// Forces a new login for the selected context and saves the token.
pub async fn run_login<S: ConfigStore, A: Authenticator>(
    ctx: &mut CommandContext,
    store: &S,
    authenticator: &A,
    ui: &Ui,
) -> Result<()> {
    let context_name = ctx.context()?.name.clone();
    get_session(
        authenticator,
        &mut ctx.config,
        store,
        &ctx.config_path,
        &context_name,
        true,
    )
    .await?
    .accept(PersistPolicy::Strict, &ctx.config_path)?;
    ui.success(&format!("Login OK (context: {context_name})"));
    Ok(())
}

pub fn run_logout<S: ConfigStore>(ctx: &mut CommandContext, store: &S, ui: &Ui) -> Result<()> {
    let context_name = ctx.context()?.name.clone();
    ctx.config.stop_session(&context_name)?;
    store.write(&ctx.config_path, &ctx.config)?;
    ui.success(&format!("Logged out (context: {context_name})"));
    Ok(())
}
