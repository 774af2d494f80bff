//! Server authentication by public-key pinning.
//!
//! The server is trusted when the public key in the certificate it presents
//! is byte-for-byte equal to the key of a certificate obtained out of band.
//! Chain, name and validity period are not checked; handshake signatures are.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{
    WebPkiSupportedAlgorithms, ring as provider, verify_tls12_signature, verify_tls13_signature,
};
use rustls::{CertificateError, DigitallySignedStruct, Error, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use tracing::{debug, warn};
use x509_certificate::X509Certificate;

/// Extracts the subject public key bytes from a DER certificate.
pub fn public_key_of(cert: &CertificateDer<'_>) -> Result<Vec<u8>, String> {
    let parsed = X509Certificate::from_der(cert.as_ref()).map_err(|e| e.to_string())?;
    Ok(parsed.public_key_data().to_vec())
}

/// Accepts a server certificate iff its public key equals the pinned one.
#[derive(Debug)]
pub struct PinnedKeyVerifier {
    pinned_key: Vec<u8>,
    supported_algs: WebPkiSupportedAlgorithms,
}

impl PinnedKeyVerifier {
    /// Pins the public key of `expected`.
    pub fn from_certificate(expected: &CertificateDer<'_>) -> Result<Self, String> {
        Ok(Self::from_public_key(public_key_of(expected)?))
    }

    pub fn from_public_key(pinned_key: Vec<u8>) -> Self {
        Self {
            pinned_key,
            supported_algs: provider::default_provider().signature_verification_algorithms,
        }
    }

    /// Compares the key of `presented` with the pinned key.
    pub fn matches(&self, presented: &CertificateDer<'_>) -> bool {
        match public_key_of(presented) {
            Ok(key) => key.len() == self.pinned_key.len() && key == self.pinned_key,
            Err(_) => false,
        }
    }

    pub fn pinned_key(&self) -> &[u8] {
        &self.pinned_key
    }
}

impl ServerCertVerifier for PinnedKeyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        let key = public_key_of(end_entity).map_err(|reason| {
            warn!(%reason, "server certificate could not be parsed");
            Error::InvalidCertificate(CertificateError::BadEncoding)
        })?;

        if key.len() == self.pinned_key.len() && key == self.pinned_key {
            debug!("server public key matches pin");
            Ok(ServerCertVerified::assertion())
        } else {
            warn!("server public key does not match pin");
            Err(Error::InvalidCertificate(CertificateError::UnknownIssuer))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls12_signature(message, cert, dss, &self.supported_algs)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        verify_tls13_signature(message, cert, dss, &self.supported_algs)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.supported_algs.supported_schemes()
    }
}

/// Builds a rustls client configuration that trusts only `verifier`.
pub fn tls_client_config(
    verifier: Arc<PinnedKeyVerifier>,
) -> Result<rustls::ClientConfig, rustls::Error> {
    Ok(
        rustls::ClientConfig::builder_with_provider(Arc::new(provider::default_provider()))
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth(),
    )
}
