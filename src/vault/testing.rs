// vault/testing.rs
//
// In-memory secret service that records every call.
use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::{sanitize_path, Secret, SecretService, VaultError, VaultResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub namespace: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Reply {
    Data(Value),
    Fail(u16, String),
}

pub struct FakeSecretService {
    namespace: String,
    replies: Mutex<HashMap<(Option<&'static str>, String), Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeSecretService {
    pub fn new(namespace: &str) -> Self {
        FakeSecretService {
            namespace: namespace.to_string(),
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Any operation on `path` returns `body` parsed as a secret.
    pub fn respond(&self, path: &str, body: Value) {
        self.set(None, path, Reply::Data(body));
    }

    pub fn respond_to(&self, op: &'static str, path: &str, body: Value) {
        self.set(Some(op), path, Reply::Data(body));
    }

    pub fn fail(&self, op: &'static str, path: &str, status: u16, message: &str) {
        self.set(Some(op), path, Reply::Fail(status, message.to_string()));
    }

    fn set(&self, op: Option<&'static str>, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert((op, sanitize_path(path).to_string()), reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == "write").collect()
    }

    fn answer(
        &self,
        op: &'static str,
        namespace: &str,
        path: &str,
        body: Option<&Value>,
    ) -> VaultResult<Option<Secret>> {
        let path = sanitize_path(path).to_string();
        self.calls.lock().unwrap().push(Call {
            op,
            namespace: namespace.to_string(),
            path: path.clone(),
            body: body.cloned(),
        });

        let replies = self.replies.lock().unwrap();
        let reply = replies
            .get(&(Some(op), path.clone()))
            .or_else(|| replies.get(&(None, path.clone())));
        match reply {
            None => Ok(None),
            Some(Reply::Data(value)) => Ok(Some(
                serde_json::from_value(value.clone()).expect("fake reply is a secret"),
            )),
            Some(Reply::Fail(status, message)) => Err(VaultError::Status {
                method: op.to_uppercase(),
                url: format!("fake://{path}"),
                status: *status,
                errors: vec![message.clone()],
            }),
        }
    }
}

impl SecretService for FakeSecretService {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn list(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>> {
        self.answer("list", namespace, path, None)
    }

    async fn read(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>> {
        self.answer("read", namespace, path, None)
    }

    async fn read_with_data(
        &self,
        namespace: &str,
        path: &str,
        _query: &[(String, String)],
    ) -> VaultResult<Option<Secret>> {
        self.answer("read", namespace, path, None)
    }

    async fn write(&self, namespace: &str, path: &str, body: &Value) -> VaultResult<Option<Secret>> {
        self.answer("write", namespace, path, Some(body))
    }

    async fn delete(&self, namespace: &str, path: &str) -> VaultResult<Option<Secret>> {
        self.answer("delete", namespace, path, None)
    }
}
