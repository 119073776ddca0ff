// kinds/secret.rs
//
// Writes key/value data described by a `secretmeta` document. The document
// only declares the keys; values come from the command line.
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::ObjectKind;
use crate::error::{Error, Result};
use crate::ui::Ui;
use crate::vault::{kv_v2_path, Scope, SecretService};

const KV_V2: &str = "kv-v2";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSpec {
    #[serde(rename = "type", default)]
    pub secret_type: String,
    #[serde(default)]
    pub vault_namespace: String,
    #[serde(default, alias = "KVPath")]
    pub kv_path: KvPath,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KvPath {
    pub path: String,
    #[serde(default)]
    pub keys: Vec<KvKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KvKey {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Parses `key=value` arguments. `key=@file` reads the value from a file and
/// `key=-` from `stdin`, which can be consumed once. A key given more than
/// once collects its values into a list.
pub fn parse_args_data(
    args: &[String],
    stdin: &mut Option<Box<dyn Read + Send>>,
) -> Result<Map<String, Value>> {
    let mut data = Map::new();
    for arg in args {
        let Some((key, raw)) = arg.split_once('=') else {
            return Err(Error::validation(format!(
                "format must be key=value (got {arg:?})"
            )));
        };
        if key.is_empty() {
            return Err(Error::validation(format!("empty key in {arg:?}")));
        }

        let value = if raw == "-" {
            let mut reader = stdin
                .take()
                .ok_or_else(|| Error::validation("stdin can only be read once"))?;
            let mut buf = String::new();
            reader
                .read_to_string(&mut buf)
                .map_err(|e| Error::validation(format!("error reading stdin: {e}")))?;
            buf
        } else if let Some(file) = raw.strip_prefix('@') {
            let path = shellexpand::tilde(file).into_owned();
            fs::read_to_string(&path)
                .map_err(|e| Error::validation(format!("error reading {path}: {e}")))?
        } else {
            raw.to_string()
        };

        match data.get_mut(key) {
            None => {
                data.insert(key.to_string(), Value::String(value));
            }
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
        }
    }
    Ok(data)
}

pub struct SecretKind {
    /// Trailing `key=value` arguments.
    pub args: Vec<String>,
    /// Directory holding one file per key, named after the key.
    pub dir: Option<PathBuf>,
    pub stdin: Mutex<Option<Box<dyn Read + Send>>>,
}

impl SecretKind {
    pub fn new(args: Vec<String>, dir: Option<PathBuf>, stdin: Box<dyn Read + Send>) -> Self {
        SecretKind {
            args,
            dir,
            stdin: Mutex::new(Some(stdin)),
        }
    }

    fn collect(&self, spec: &SecretSpec) -> Result<Map<String, Value>> {
        let mut args = self.args.clone();
        if let Some(dir) = &self.dir {
            for key in &spec.kv_path.keys {
                let file = dir.join(&key.name);
                if file.is_file() {
                    args.push(format!("{}=@{}", key.name, file.display()));
                }
            }
        }

        let mut stdin = self
            .stdin
            .lock()
            .map_err(|_| Error::validation("stdin lock poisoned"))?;
        let data = parse_args_data(&args, &mut *stdin)?;

        for key in &spec.kv_path.keys {
            if !data.contains_key(&key.name) {
                return Err(Error::validation(format!(
                    "required key not defined (key: {})",
                    key.name
                )));
            }
        }
        if let Some(unknown) = data
            .keys()
            .find(|k| !spec.kv_path.keys.iter().any(|key| &key.name == *k))
        {
            return Err(Error::validation(format!(
                "unknown key provided (key: {unknown})"
            )));
        }
        Ok(data)
    }
}

impl ObjectKind for SecretKind {
    const DIR: &'static str = "secretmeta";
    const LABEL: &'static str = "SecretMeta";
    const TEMPLATE: &'static str = "Secret";
    const SINGLE_FILE: bool = true;

    type Spec = SecretSpec;

    fn namespace(spec: &Self::Spec) -> &str {
        &spec.vault_namespace
    }

    async fn apply<S: SecretService>(
        &self,
        scope: &Scope<'_, S>,
        file: &str,
        spec: &Self::Spec,
        ui: &Ui,
    ) -> Result<()> {
        if spec.secret_type != KV_V2 {
            return Err(Error::validation("secret type must be kv-v2"));
        }
        let data = self.collect(spec)?;

        let mut path = spec.kv_path.path.clone();
        let (mount, v2) = scope
            .is_kv_v2(&path)
            .await
            .map_err(|e| Error::read(&path, e))?;
        let body = if v2 {
            path = kv_v2_path(&path, &mount, "data");
            json!({ "data": data, "options": {} })
        } else {
            Value::Object(data)
        };

        let secret = scope
            .write(&path, &body)
            .await
            .map_err(|e| Error::write(&path, e))?;
        if let Some(secret) = secret {
            let pretty = serde_json::to_string_pretty(&secret)
                .map_err(|e| Error::validation(format!("error encoding response: {e}")))?;
            ui.output(&pretty);
        }
        ui.success(&format!("Secret ({file}) write OK"));
        Ok(())
    }
}
