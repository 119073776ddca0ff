// types.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vault-cli", author, version, about = "Apply inventory documents to Vault", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file, overrides $VAULTCLICONFIG
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context to use instead of the current one
    #[arg(short, long, global = true, default_value = "")]
    pub context: String,

    /// Namespace to use instead of the context's
    #[arg(short, long, global = true, default_value = "")]
    pub namespace: String,

    /// JSON object of template variables
    #[arg(long, global = true, default_value = "")]
    pub data: String,

    #[arg(long, global = true)]
    pub no_color: bool,

    // Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Write the log to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply inventory documents of one kind
    Put {
        #[command(subcommand)]
        kind: PutKind,
    },
    /// Log in to the current context and cache the token
    Login,
    /// Drop the cached token of the current context
    Logout,
    /// Edit the multi-cluster config
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum PutKind {
    /// Mount, tune and bootstrap a secret engine
    #[command(name = "vaultendpoint")]
    VaultEndpoint {
        filespec: String,
        /// Re-run PKI bootstrap on an existing mount
        #[arg(long)]
        force: bool,
    },
    #[command(name = "pkirole")]
    PkiRole { filespec: String },
    #[command(name = "sshrole")]
    SshRole { filespec: String },
    #[command(name = "jwtrole")]
    JwtRole { filespec: String },
    #[command(name = "vaultauth")]
    VaultAuth { filespec: String },
    #[command(name = "vaultrole")]
    VaultRole {
        filespec: String,
        /// Comma separated policies added to every role
        #[arg(long, default_value = "")]
        policies: String,
        /// Comma separated service account namespaces added to every role
        #[arg(long, default_value = "")]
        bound_namespaces: String,
        /// Comma separated service account names added to every role
        #[arg(long, default_value = "")]
        bound_service_account_names: String,
    },
    #[command(name = "vaultpolicy")]
    VaultPolicy { filespec: String },
    #[command(name = "vaultnamespace")]
    VaultNamespace { filespec: String },
    /// Write key/value data declared by a secretmeta document
    Secret {
        filespec: String,
        /// Directory with one file per key
        #[arg(long)]
        dir: Option<PathBuf>,
        /// key=value, key=@file or key=- (stdin)
        #[arg(trailing_var_arg = true, num_args = 0..)]
        args: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the config with secrets redacted
    View {
        /// Do not redact secrets
        #[arg(long)]
        raw: bool,
    },
    GetContexts,
    UseContext { name: String },
    SetCluster {
        name: String,
        #[arg(long, default_value = "")]
        server: String,
        #[arg(long = "certificate-authority", default_value = "")]
        cert_auth: String,
        #[arg(long = "certificate-authority-data", default_value = "")]
        cert_auth_data: String,
        #[arg(long)]
        insecure_skip_tls_verify: Option<bool>,
    },
    SetCredentials {
        name: String,
        #[arg(long = "client-certificate", default_value = "")]
        client_cert: String,
        #[arg(long = "client-certificate-data", default_value = "")]
        client_cert_data: String,
        #[arg(long = "client-key", default_value = "")]
        client_key: String,
        #[arg(long = "client-key-data", default_value = "")]
        client_key_data: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        role_id: String,
        #[arg(long, default_value = "")]
        secret_id: String,
        /// Log in without the context namespace
        #[arg(long)]
        ignore_namespace_on_auth: Option<bool>,
    },
    SetContext {
        name: String,
        #[arg(long, default_value = "")]
        cluster: String,
        #[arg(long, default_value = "")]
        user: String,
        /// Namespace of the context; "root" means none
        #[arg(long = "context-namespace", default_value = "")]
        context_namespace: String,
        #[arg(long, default_value = "")]
        inventory_path: String,
    },
    DeleteContext { name: String },
    DeleteCluster { name: String },
    DeleteUser { name: String },
}
