//! Certificate verification that reports instead of rejecting.
//!
//! A check must see the service's answer even when its certificate is
//! self-signed, expired or issued for another name (common when a request is
//! routed straight to one node). `RecordingVerifier` runs the standard
//! webpki verification against the bundled roots, records the first failure
//! as a warning and accepts the certificate anyway.

use std::sync::{Arc, Mutex};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, Error, RootCertStore, SignatureScheme};
use tracing::warn;

use crate::CheckError;

/// Shared slot for the first certificate problem of a connection
#[derive(Debug, Clone, Default)]
pub struct CertificateWarnings(Arc<Mutex<Option<String>>>);

impl CertificateWarnings {
    /// Keep `message` unless a warning is already recorded
    pub fn record(&self, message: String) {
        if let Ok(mut slot) = self.0.lock() {
            if slot.is_none() {
                warn!(%message, "certificate accepted despite validation failure");
                *slot = Some(message);
            }
        }
    }

    /// Remove and return the recorded warning
    pub fn take(&self) -> Option<String> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

#[derive(Debug)]
pub struct RecordingVerifier {
    inner: Arc<WebPkiServerVerifier>,
    warnings: CertificateWarnings,
}

impl RecordingVerifier {
    /// Build a verifier backed by the webpki-roots trust anchors
    pub fn new(warnings: CertificateWarnings) -> Result<Self, CheckError> {
        let root_store = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        let inner = WebPkiServerVerifier::builder(Arc::new(root_store))
            .build()
            .map_err(|e| CheckError::Tls(format!("Certificate verifier setup failed: {}", e)))?;

        Ok(RecordingVerifier { inner, warnings })
    }
}

impl ServerCertVerifier for RecordingVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        if let Err(e) =
            self.inner
                .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            self.warnings.record(format!("SSL certificate issue: {}", e));
        }
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
