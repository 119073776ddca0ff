// pki/ca.rs
//
// Root and intermediate CA bootstrap on a PKI mount.
use serde_json::Value;
use tracing::{debug, info};

use super::types::{body, GenerateOptions, IntermediateOptions};
use crate::error::{Error, Result};
use crate::vault::{Scope, SecretService};

pub async fn generate_root_ca<S: SecretService>(
    scope: &Scope<'_, S>,
    path: &str,
    options: &GenerateOptions,
) -> Result<()> {
    let generate_path = format!("{path}/root/generate/internal");
    info!(path = generate_path.as_str(), namespace = scope.namespace(), "generating root CA");
    scope
        .write(&generate_path, &body(options))
        .await
        .map_err(|e| Error::write(&generate_path, e))?;
    Ok(())
}

/// Generates an intermediate CSR on `path`, has the root mount sign it in
/// the root's namespace, and installs the signed certificate plus the root
/// chain back on `path`. Returns the installed chain.
pub async fn generate_intermediate_ca<S: SecretService>(
    scope: &Scope<'_, S>,
    path: &str,
    options: &GenerateOptions,
    root: &IntermediateOptions,
) -> Result<String> {
    if root.root_ca_path.trim().is_empty() {
        return Err(Error::validation(
            "intermediateOptions.rootCAPath is required to sign the intermediate",
        ));
    }
    let root_path = root.root_ca_path.trim_matches('/');

    let generate_path = format!("{path}/intermediate/generate/internal");
    let mut request = body(options);
    let generated = scope
        .write(&generate_path, &request)
        .await
        .map_err(|e| Error::write(&generate_path, e))?;
    let csr = generated
        .as_ref()
        .and_then(|s| s.data_str("csr"))
        .filter(|csr| !csr.is_empty())
        .ok_or_else(|| Error::ExpectedCsr {
            path: generate_path.clone(),
        })?;

    if let Value::Object(map) = &mut request {
        map.insert("csr".to_string(), Value::String(csr.to_string()));
    }

    let root_scope = scope.with_namespace(&root.root_ca_namespace);
    let sign_path = format!("{root_path}/root/sign-intermediate");
    debug!(path = sign_path.as_str(), namespace = root_scope.namespace(), "signing intermediate");
    let signed = root_scope
        .write(&sign_path, &request)
        .await
        .map_err(|e| Error::write(&sign_path, e))?;
    let certificate = signed
        .as_ref()
        .filter(|s| s.data.is_some())
        .and_then(|s| s.data_str("certificate"))
        .ok_or_else(|| Error::ExpectedCertificate {
            path: sign_path.clone(),
        })?;

    let chain_path = format!("{root_path}/cert/ca_chain");
    let chain = root_scope
        .read(&chain_path)
        .await
        .map_err(|e| Error::read(&chain_path, e))?
        .filter(|s| s.data.is_some())
        .ok_or_else(|| Error::ExpectedCertificate {
            path: chain_path.clone(),
        })?;
    let chain_certificate = chain.data_str("certificate").unwrap_or_default();

    let assembled = assemble_chain(certificate, chain_certificate);
    let set_signed_path = format!("{path}/intermediate/set-signed");
    scope
        .write(
            &set_signed_path,
            &serde_json::json!({ "certificate": assembled }),
        )
        .await
        .map_err(|e| Error::write(&set_signed_path, e))?;
    Ok(assembled)
}

/// Signed certificate followed by the root chain, when there is one.
pub fn assemble_chain(signed: &str, chain: &str) -> String {
    if chain.is_empty() {
        signed.to_string()
    } else {
        format!("{signed}\n{chain}")
    }
}
