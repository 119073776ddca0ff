// config/editor.rs
//
// Create-or-update operations behind the `config` subcommands. Empty
// arguments leave the existing value untouched.
use super::{Cluster, ClusterSpec, Config, ConfigError, Context, ContextSpec, Session, User, UserSpec};

/// Cluster fields accepted by `config set-cluster`.
#[derive(Debug, Default, Clone)]
pub struct ClusterEdit {
    pub server: String,
    pub cert_auth: String,
    pub cert_auth_data: String,
    pub insecure_skip_tls_verify: Option<bool>,
}

/// Context fields accepted by `config set-context`.
#[derive(Debug, Default, Clone)]
pub struct ContextEdit {
    pub cluster: String,
    pub user: String,
    pub namespace: String,
    pub inventory_path: String,
}

/// Credential modes accepted by `config set-credentials`.
#[derive(Debug, Clone)]
pub enum CredentialEdit {
    Cert {
        client_cert: String,
        client_cert_data: String,
        client_key: String,
        client_key_data: String,
    },
    UserPass {
        username: String,
        password: String,
    },
    AppRole {
        role_id: String,
        secret_id: String,
    },
}

fn set_if_present(target: &mut String, value: &str) {
    if !value.is_empty() {
        *target = value.to_string();
    }
}

impl Config {
    pub fn set_cluster(&mut self, name: &str, edit: &ClusterEdit) -> Result<&Cluster, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName { kind: "cluster" });
        }
        let index = match self.clusters.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.clusters.push(Cluster {
                    name: name.to_string(),
                    spec: ClusterSpec::default(),
                });
                self.clusters.len() - 1
            }
        };
        let spec = &mut self.clusters[index].spec;
        set_if_present(&mut spec.server, &edit.server);
        set_if_present(&mut spec.cert_auth, &edit.cert_auth);
        set_if_present(&mut spec.cert_auth_data, &edit.cert_auth_data);
        if let Some(insecure) = edit.insecure_skip_tls_verify {
            spec.insecure_skip_tls_verify = insecure;
        }
        Ok(&self.clusters[index])
    }

    pub fn set_user(&mut self, name: &str, edit: &CredentialEdit) -> Result<&User, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName { kind: "user" });
        }
        let index = match self.users.iter().position(|u| u.name == name) {
            Some(index) => index,
            None => {
                self.users.push(User {
                    name: name.to_string(),
                    spec: UserSpec::default(),
                });
                self.users.len() - 1
            }
        };
        let spec = &mut self.users[index].spec;
        match edit {
            CredentialEdit::Cert {
                client_cert,
                client_cert_data,
                client_key,
                client_key_data,
            } => {
                set_if_present(&mut spec.client_cert, client_cert);
                set_if_present(&mut spec.client_cert_data, client_cert_data);
                set_if_present(&mut spec.client_key, client_key);
                set_if_present(&mut spec.client_key_data, client_key_data);
            }
            CredentialEdit::UserPass { username, password } => {
                set_if_present(&mut spec.username, username);
                set_if_present(&mut spec.password, password);
            }
            CredentialEdit::AppRole { role_id, secret_id } => {
                set_if_present(&mut spec.role_id, role_id);
                set_if_present(&mut spec.secret_id, secret_id);
            }
        }
        Ok(&self.users[index])
    }

    pub fn set_context(&mut self, name: &str, edit: &ContextEdit) -> Result<&Context, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName { kind: "context" });
        }
        let index = match self.contexts.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.contexts.push(Context {
                    name: name.to_string(),
                    spec: ContextSpec::default(),
                });
                self.contexts.len() - 1
            }
        };
        let spec = &mut self.contexts[index].spec;
        set_if_present(&mut spec.cluster, &edit.cluster);
        set_if_present(&mut spec.user, &edit.user);
        set_if_present(&mut spec.namespace, &edit.namespace);
        set_if_present(&mut spec.inventory_path, &edit.inventory_path);
        Ok(&self.contexts[index])
    }

    pub fn use_context(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.context(name).is_none() {
            return Err(ConfigError::NotFound {
                kind: "context",
                name: name.to_string(),
            });
        }
        self.current_context = name.to_string();
        Ok(())
    }

    pub fn delete_context(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.context(name).is_none() {
            return Err(ConfigError::NotFound {
                kind: "context",
                name: name.to_string(),
            });
        }
        if self.current_context == name {
            return Err(ConfigError::InUse {
                kind: "context",
                name: name.to_string(),
                reason: "it is the current context",
            });
        }
        self.contexts.retain(|c| c.name != name);
        Ok(())
    }

    pub fn delete_cluster(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.cluster(name).is_none() {
            return Err(ConfigError::NotFound {
                kind: "cluster",
                name: name.to_string(),
            });
        }
        if let Some(current) = self.context(&self.current_context) {
            if current.spec.cluster == name {
                return Err(ConfigError::InUse {
                    kind: "cluster",
                    name: name.to_string(),
                    reason: "it is used by the current context",
                });
            }
        }
        self.clusters.retain(|c| c.name != name);
        Ok(())
    }

    pub fn delete_user(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.user(name).is_none() {
            return Err(ConfigError::NotFound {
                kind: "user",
                name: name.to_string(),
            });
        }
        if let Some(current) = self.context(&self.current_context) {
            if current.spec.user == name {
                return Err(ConfigError::InUse {
                    kind: "user",
                    name: name.to_string(),
                    reason: "it is used by the current context",
                });
            }
        }
        self.users.retain(|u| u.name != name);
        Ok(())
    }

    /// Drops the cached session of a context.
    pub fn stop_session(&mut self, context_name: &str) -> Result<(), ConfigError> {
        let context = self
            .context_mut(context_name)
            .ok_or_else(|| ConfigError::NotFound {
                kind: "context",
                name: context_name.to_string(),
            })?;
        context.spec.session = Session::default();
        Ok(())
    }
}
