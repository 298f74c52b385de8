use std::sync::Arc;

use anyhow::{Result, anyhow};
use rcgen::generate_simple_self_signed;
use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};

/// Self-signed certificate for `localhost` / the bind host, for local HTTPS.
pub fn self_signed_config(host: &str) -> Result<Arc<ServerConfig>> {
    let mut subject_alt_names = vec!["localhost".to_string(), "127.0.0.1".to_string()];
    if !subject_alt_names.iter().any(|name| name == host) && host != "0.0.0.0" {
        subject_alt_names.push(host.to_string());
    }

    let certified_key = generate_simple_self_signed(subject_alt_names)?;
    let cert_pem = certified_key.cert.pem();
    let key_pem = certified_key.key_pair.serialize_pem();

    let cert_der: CertificateDer<'static> = rustls_pemfile::certs(&mut cert_pem.as_bytes())
        .next()
        .ok_or_else(|| anyhow!("Failed to parse certificate"))??;

    let key_der = rustls_pemfile::pkcs8_private_keys(&mut key_pem.as_bytes())
        .next()
        .ok_or_else(|| anyhow!("Failed to parse private key"))??;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let tls_config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(vec![cert_der], PrivateKeyDer::Pkcs8(key_der))?;

    Ok(Arc::new(tls_config))
}
