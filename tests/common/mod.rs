// Mock Vault server and config fixtures shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use clap::Parser;
use serde_json::{json, Value};

use vault_cli::config::{
    ClusterEdit, Config, ConfigFile, ConfigStore, ContextEdit, CredentialEdit,
};
use vault_cli::types::Cli;
use vault_cli::ui::Ui;

pub const TOKEN: &str = "s.integration";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub namespace: Option<String>,
    pub token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Shared {
    replies: Mutex<HashMap<(String, String), (u16, Value)>>,
    requests: Mutex<Vec<Recorded>>,
}

/// Answers configured `(method, path)` pairs. Unconfigured reads are 404,
/// everything else is 204.
pub struct MockVault {
    pub address: String,
    shared: Arc<Shared>,
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    shared.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        namespace: header("x-vault-namespace"),
        token: header("x-vault-token"),
        body: serde_json::from_str(&body).ok(),
    });

    let reply = shared
        .replies
        .lock()
        .unwrap()
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned();
    match reply {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
            Json(body),
        )
            .into_response(),
        None if method == Method::GET => {
            (StatusCode::NOT_FOUND, Json(json!({"errors": []}))).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

impl MockVault {
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&shared));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let vault = MockVault { address, shared };
        vault.reply(
            "POST",
            "/v1/auth/approle/login",
            200,
            json!({"auth": {"client_token": TOKEN, "lease_duration": 3600, "renewable": true}}),
        );
        vault
    }

    pub fn reply(&self, method: &str, path: &str, status: u16, body: Value) {
        self.shared
            .replies
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    /// Requests other than the login.
    pub fn api_requests(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| !r.path.starts_with("/v1/auth/approle/login"))
            .collect()
    }
}

/// Config and inventory in a temporary directory, pointing at a mock server.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub config_path: PathBuf,
}

impl Workspace {
    pub fn new(server: &str, namespace: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let inventory = dir.path().join("inventory");
        fs::create_dir_all(&inventory).unwrap();

        let mut config = Config::default();
        config
            .set_cluster(
                "mock",
                &ClusterEdit {
                    server: server.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        config
            .set_user(
                "ci",
                &CredentialEdit::AppRole {
                    role_id: "role-id".into(),
                    secret_id: "secret-id".into(),
                },
            )
            .unwrap();
        config
            .set_context(
                "test",
                &ContextEdit {
                    cluster: "mock".into(),
                    user: "ci".into(),
                    namespace: namespace.into(),
                    inventory_path: inventory.display().to_string(),
                },
            )
            .unwrap();
        config.use_context("test").unwrap();
        ConfigFile.write(&config_path, &config).unwrap();

        Workspace { dir, config_path }
    }

    pub fn inventory(&self) -> PathBuf {
        self.dir.path().join("inventory")
    }

    pub fn add_document(&self, kind: &str, name: &str, body: &str) {
        let dir = self.inventory().join(kind);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{name}.yaml")), body).unwrap();
    }

    pub fn config(&self) -> Config {
        ConfigFile.read(&self.config_path).unwrap()
    }

    /// Runs the CLI with `args` against this workspace's config.
    pub async fn run(&self, args: &[&str]) -> (i32, Ui) {
        let mut argv = vec!["vault-cli", "--config", path_str(&self.config_path)];
        argv.extend_from_slice(args);
        let cli = Cli::parse_from(argv);
        let ui = Ui::buffer();
        let code = vault_cli::app::execute(cli, &ui).await;
        (code, ui)
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}
