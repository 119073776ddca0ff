// vault/kv.rs

/// Strips surrounding whitespace and slashes from a logical path.
pub fn sanitize_path(path: &str) -> &str {
    path.trim().trim_matches('/')
}

/// Rewrites `path` under a KV version 2 mount to its `prefix` API form, for
/// example `secret/app` with mount `secret/` becomes `secret/data/app`.
///
/// Mount paths reported by a namespaced server may carry the namespace in
/// front; leading mount segments missing from `path` are dropped until the
/// remainder lines up.
pub fn kv_v2_path(path: &str, mount_path: &str, prefix: &str) -> String {
    if path == mount_path || path == mount_path.trim_end_matches('/') {
        return join(&[mount_path, prefix]);
    }

    let mut mount = mount_path.to_string();
    let mut rest = path.strip_prefix(mount.as_str()).map(str::to_string);
    while rest.is_none() {
        match mount.split_once('/') {
            Some((_, tail)) if !tail.is_empty() => {
                mount = tail.trim_end_matches('/').to_string();
                rest = path.strip_prefix(mount.as_str()).map(str::to_string);
            }
            _ => break,
        }
    }

    join(&[&mount, prefix, rest.as_deref().unwrap_or(path)])
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_under_mount() {
        assert_eq!(kv_v2_path("secret/app/db", "secret/", "data"), "secret/data/app/db");
    }

    #[test]
    fn mount_itself_gets_prefix() {
        assert_eq!(kv_v2_path("secret", "secret/", "data"), "secret/data");
        assert_eq!(kv_v2_path("secret/", "secret/", "data"), "secret/data");
    }

    #[test]
    fn namespace_in_mount_path_is_dropped() {
        assert_eq!(kv_v2_path("kv/app", "team-a/kv/", "data"), "kv/data/app");
    }

    #[test]
    fn sanitize_trims_slashes() {
        assert_eq!(sanitize_path(" /pki/roles/web/ "), "pki/roles/web");
    }
}
