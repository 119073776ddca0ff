// session/mod.rs
//
// Token acquisition and caching per context.
use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError, ConfigStore, Session, UserSpec};
use crate::error::{Error, Result};
use crate::vault::{normalize_namespace, Authenticator, Credentials, LoginRequest, TlsMaterial};

/// How a caller treats a failure to write the refreshed session back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Log and keep using the in-memory session.
    #[default]
    Warn,
    /// Fail the command.
    Strict,
}

/// Session handed back by [`get_session`] together with the result of
/// saving it.
#[must_use = "the persistence result must be acknowledged with `accept`"]
#[derive(Debug)]
pub struct SessionOutcome {
    pub session: Session,
    /// True when a login happened during this call.
    pub refreshed: bool,
    pub persisted: std::result::Result<(), ConfigError>,
}

impl SessionOutcome {
    pub fn accept(self, policy: PersistPolicy, config_path: &Path) -> Result<Session> {
        match (self.persisted, policy) {
            (Ok(()), _) => Ok(self.session),
            (Err(source), PersistPolicy::Strict) => Err(Error::SessionPersist {
                path: config_path.to_path_buf(),
                source,
            }),
            (Err(source), PersistPolicy::Warn) => {
                warn!(path = %config_path.display(), error = %source, "session not saved");
                Ok(self.session)
            }
        }
    }
}

/// Picks the login strategy for a user: certificate, then username and
/// password, then app role.
pub fn credentials_for(user_name: &str, user: &UserSpec) -> Result<Credentials> {
    if user.has_client_cert() {
        Ok(Credentials::Cert)
    } else if !user.username.is_empty() {
        Ok(Credentials::UserPass {
            username: user.username.clone(),
            password: user.password.clone(),
        })
    } else if !user.role_id.is_empty() {
        Ok(Credentials::AppRole {
            role_id: user.role_id.clone(),
            secret_id: user.secret_id.clone(),
        })
    } else {
        Err(Error::NoCredentials {
            user: user_name.to_string(),
        })
    }
}

/// Returns a valid session for `context_name`, logging in when the cached
/// one is missing, expired or `force_new` is set. A fresh session replaces
/// the context's session and the whole config is written back.
pub async fn get_session<A: Authenticator, S: ConfigStore>(
    authenticator: &A,
    config: &mut Config,
    store: &S,
    config_path: &Path,
    context_name: &str,
    force_new: bool,
) -> Result<SessionOutcome> {
    get_session_at(
        authenticator,
        config,
        store,
        config_path,
        context_name,
        force_new,
        Utc::now().timestamp(),
    )
    .await
}

async fn get_session_at<A: Authenticator, S: ConfigStore>(
    authenticator: &A,
    config: &mut Config,
    store: &S,
    config_path: &Path,
    context_name: &str,
    force_new: bool,
    now: i64,
) -> Result<SessionOutcome> {
    let context = config
        .context(context_name)
        .ok_or_else(|| Error::ContextNotFound {
            name: context_name.to_string(),
        })?;

    if !force_new && !context.spec.session.is_expired_at(now) {
        debug!(context = context_name, "reusing cached session");
        return Ok(SessionOutcome {
            session: context.spec.session.clone(),
            refreshed: false,
            persisted: Ok(()),
        });
    }

    let cluster = config
        .cluster(&context.spec.cluster)
        .ok_or_else(|| Error::MissingCluster {
            name: context.spec.cluster.clone(),
        })?;
    if cluster.spec.server.is_empty() {
        return Err(Error::MissingServer {
            name: cluster.name.clone(),
        });
    }
    let user = config
        .user(&context.spec.user)
        .ok_or_else(|| Error::MissingUser {
            name: context.spec.user.clone(),
        })?;

    let credentials = credentials_for(&user.name, &user.spec)?;
    let namespace = if user.spec.ignore_namespace_on_auth {
        String::new()
    } else {
        normalize_namespace(&context.spec.namespace).to_string()
    };
    let request = LoginRequest {
        namespace,
        server: cluster.spec.server.clone(),
        mount: credentials.method().mount().to_string(),
        credentials,
        tls: TlsMaterial::from_config(&cluster.spec, &user.spec).map_err(Error::Authentication)?,
    };

    info!(
        context = context_name,
        method = request.mount.as_str(),
        namespace = request.namespace.as_str(),
        "logging in"
    );
    let auth = authenticator
        .login(&request)
        .await
        .map_err(Error::Authentication)?;

    let session = Session::from_lease(auth.token, auth.lease_duration, auth.renewable, now);
    if let Some(context) = config.context_mut(context_name) {
        context.spec.session = session.clone();
    }
    let persisted = store.write(config_path, config);

    Ok(SessionOutcome {
        session,
        refreshed: true,
        persisted,
    })
}
