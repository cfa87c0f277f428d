//! TLS trust store construction and client configuration.
//!
//! # Responsibilities
//! - Build the root certificate store (system roots, optional CA bundle)
//! - Build the rustls client configuration used by the transport
//! - Disable server certificate verification in insecure mode
//!
//! # Design Decisions
//! - Never fails on trust store problems: an unreadable system store or an
//!   unusable CA bundle degrades to fewer trusted roots, with a log event
//! - Insecure mode always wins over the trust store contents
//! - The ring provider is pinned explicitly so the config never depends on
//!   process-wide provider state

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Build the trust store for one call.
///
/// Starts from the OS trust store unless `ignore_system_ca` is set, then
/// appends `ca_certs`. Always returns a store, possibly empty.
pub fn build_root_store(config: &ClientConfig) -> RootCertStore {
    let mut roots = if config.ignore_system_ca {
        RootCertStore::empty()
    } else {
        system_roots()
    };

    if !config.ca_certs.is_empty() {
        let appended = append_pem_certs(&mut roots, config.ca_certs.as_bytes());
        if appended == 0 {
            tracing::warn!(
                trusted_roots = roots.len(),
                "No certs appended from ca_certs, continuing with existing trust store"
            );
        } else {
            tracing::debug!(appended, trusted_roots = roots.len(), "Appended CA certificates");
        }
    }

    roots
}

/// Load the OS trust store, keeping whatever could be loaded.
fn system_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::debug!(error = %err, "Failed to load part of the system trust store");
    }
    let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
    tracing::trace!(added, ignored, "System trust store loaded");
    roots
}

/// Parse every certificate in a PEM bundle and add it to `roots`.
///
/// Returns how many certificates were added. Unparsable blocks are skipped.
pub fn append_pem_certs(roots: &mut RootCertStore, pem: &[u8]) -> usize {
    let mut reader = pem;
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut reader)
        .filter_map(|cert| match cert {
            Ok(cert) => Some(cert),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unparsable PEM block");
                None
            }
        })
        .collect();
    let (added, _ignored) = roots.add_parsable_certificates(certs);
    added
}

/// Build the rustls client configuration for one call.
pub fn build_tls_config(config: &ClientConfig) -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let roots = build_root_store(config);

    let mut tls = rustls::ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientError::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    if config.insecure {
        tracing::debug!("Server certificate verification disabled");
        tls.dangerous()
            .set_certificate_verifier(Arc::new(NoVerification::new(provider)));
    }

    Ok(tls)
}

/// Accepts any server certificate.
///
/// Handshake signatures are still checked against the presented certificate,
/// so the peer must hold the matching private key.
#[derive(Debug)]
struct NoVerification {
    provider: Arc<CryptoProvider>,
}

impl NoVerification {
    fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
