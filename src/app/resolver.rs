// app/resolver.rs
use std::path::Path;

use tracing::debug;

use crate::config::{Config, ConfigStore};
use crate::error::{Error, Result};
use crate::session::{get_session, PersistPolicy};
use crate::vault::{normalize_namespace, Authenticator, TlsMaterial, VaultService};

/// Builds the connection used by one command: a valid session for
/// `context_name` and the cluster's TLS material, bound to
/// `namespace_override` or, when that is empty, the context namespace.
pub async fn resolve_service<S: ConfigStore, A: Authenticator>(
    config: &mut Config,
    store: &S,
    config_path: &Path,
    context_name: &str,
    namespace_override: &str,
    authenticator: &A,
    policy: PersistPolicy,
) -> Result<VaultService> {
    let session = get_session(authenticator, config, store, config_path, context_name, false)
        .await?
        .accept(policy, config_path)?;

    let context = config
        .context(context_name)
        .ok_or_else(|| Error::ContextNotFound {
            name: context_name.to_string(),
        })?;
    let cluster = config
        .cluster(&context.spec.cluster)
        .ok_or_else(|| Error::MissingCluster {
            name: context.spec.cluster.clone(),
        })?;
    let user = config
        .user(&context.spec.user)
        .ok_or_else(|| Error::MissingUser {
            name: context.spec.user.clone(),
        })?;

    let tls = TlsMaterial::from_config(&cluster.spec, &user.spec)?;
    let mut service = VaultService::new(&cluster.spec.server, &tls, session.token)?;

    let namespace = if namespace_override.trim().is_empty() {
        context.spec.namespace.as_str()
    } else {
        namespace_override
    };
    service.set_namespace(namespace);
    debug!(
        server = service.address(),
        namespace = normalize_namespace(namespace),
        "secret service resolved"
    );
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Cluster, ClusterSpec, Context, ContextSpec, Session, User, UserSpec};
    use crate::session::testing::{FakeAuthenticator, MemoryStore};
    use crate::vault::SecretService;

    fn config(namespace: &str) -> Config {
        let mut config = Config::default();
        config.clusters.push(Cluster {
            name: "local".into(),
            spec: ClusterSpec {
                server: "http://127.0.0.1:8200".into(),
                ..Default::default()
            },
        });
        config.users.push(User {
            name: "admin".into(),
            spec: UserSpec {
                username: "admin".into(),
                password: "pw".into(),
                ..Default::default()
            },
        });
        config.contexts.push(Context {
            name: "dev".into(),
            spec: ContextSpec {
                cluster: "local".into(),
                user: "admin".into(),
                namespace: namespace.into(),
                session: Session::from_lease("s.cached".into(), 7200, true, chrono::Utc::now().timestamp()),
                ..Default::default()
            },
        });
        config
    }

    #[tokio::test]
    async fn override_namespace_wins_over_context() {
        let mut config = config("team-a");
        let auth = FakeAuthenticator::new(3600);
        let service = resolve_service(
            &mut config,
            &MemoryStore::default(),
            Path::new("/tmp/config.yaml"),
            "dev",
            "team-b",
            &auth,
            PersistPolicy::Warn,
        )
        .await
        .unwrap();
        assert_eq!(service.namespace(), "team-b");
        assert_eq!(auth.count(), 0);
    }

    #[tokio::test]
    async fn root_context_namespace_means_none() {
        let mut config = config("root");
        let service = resolve_service(
            &mut config,
            &MemoryStore::default(),
            Path::new("/tmp/config.yaml"),
            "dev",
            "",
            &FakeAuthenticator::new(3600),
            PersistPolicy::Warn,
        )
        .await
        .unwrap();
        assert_eq!(service.namespace(), "");
    }

    #[tokio::test]
    async fn unknown_context_is_reported() {
        let mut config = config("");
        let err = resolve_service(
            &mut config,
            &MemoryStore::default(),
            Path::new("/tmp/config.yaml"),
            "prod",
            "",
            &FakeAuthenticator::new(3600),
            PersistPolicy::Warn,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::ContextNotFound { .. }));
    }
}
