// pki/verification.rs
use chrono::{DateTime, TimeZone, Utc};
use x509_parser::pem::Pem;
use x509_parser::prelude::{FromDer, ParsedExtension, X509Certificate};

#[derive(Debug, Clone, PartialEq)]
pub struct ChainEntry {
    pub subject: String,
    pub issuer: String,
    pub not_after: DateTime<Utc>,
    pub is_ca: bool,
}

/// Parses every certificate in a PEM chain, leaf first.
pub fn describe_chain(pem: &str) -> Result<Vec<ChainEntry>, String> {
    let mut entries = Vec::new();
    for block in Pem::iter_from_buffer(pem.as_bytes()) {
        let block = block.map_err(|e| format!("invalid PEM: {e}"))?;
        if block.label != "CERTIFICATE" {
            continue;
        }
        let (_remainder, cert) = X509Certificate::from_der(&block.contents)
            .map_err(|e| format!("invalid certificate: {e}"))?;

        let not_after = Utc
            .timestamp_opt(cert.validity().not_after.timestamp(), 0)
            .single()
            .ok_or_else(|| "invalid not_after timestamp".to_string())?;
        let is_ca = cert
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::BasicConstraints(bc) => Some(bc.ca),
                _ => None,
            })
            .unwrap_or(false);

        entries.push(ChainEntry {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            not_after,
            is_ca,
        });
    }
    if entries.is_empty() {
        return Err("no certificates found".to_string());
    }
    Ok(entries)
}


#[cfg(test)]
mod tests {
    use super::testing::self_signed_ca;
    use super::*;

    #[test]
    fn describes_each_certificate() {
        let chain = format!("{}\n{}", self_signed_ca("Intermediate"), self_signed_ca("Root"));
        let entries = describe_chain(&chain).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].subject, "CN=Intermediate");
        assert_eq!(entries[1].subject, "CN=Root");
        assert!(entries.iter().all(|e| e.is_ca));
        assert!(entries[0].not_after > Utc::now());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(describe_chain("not a certificate").is_err());
    }
}
