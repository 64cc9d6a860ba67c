// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use crate::errors::ServiceError;
use crate::startup::USER_AGENT;
use log::warn;
use rustls::ClientConfig;
use rustls_platform_verifier::ConfigVerifierExt;
use std::sync::Arc;
use std::time::Duration;

/// Create a new HTTP client for the Home Assistant REST API.
///
/// # Arguments
///
/// * `connection_timeout`: max time to connect to the server, including DNS name resolution.
/// * `request_timeout`: total time before a response must be received.
/// * `tls`: configure a rustls connector for https connections.
/// * `disable_cert_verification`: accept any server certificate. Only for self-signed setups!
pub fn new_http_client(
    connection_timeout: Duration,
    request_timeout: Duration,
    tls: bool,
    disable_cert_verification: bool,
) -> Result<awc::Client, ServiceError> {
    let connector = awc::Connector::new().timeout(connection_timeout);
    let connector = if tls {
        connector.rustls_0_23(Arc::new(tls_client_config(disable_cert_verification)?))
    } else {
        connector
    };

    Ok(awc::ClientBuilder::new()
        .timeout(request_timeout)
        .add_default_header((awc::http::header::USER_AGENT, USER_AGENT))
        .connector(connector)
        .finish())
}

fn tls_client_config(disable_cert_verification: bool) -> Result<ClientConfig, ServiceError> {
    // more than one crypto provider might be compiled in through the awc features
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let mut config = ClientConfig::with_platform_verifier().map_err(|e| {
        ServiceError::InternalServerError(format!("Error creating TLS configuration: {e}"))
    })?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    if disable_cert_verification {
        warn!("TLS certificate verification of the Home Assistant server is disabled!");
        config
            .dangerous()
            .set_certificate_verifier(Arc::new(danger::NoCertificateVerification::new()));
    }

    Ok(config)
}

mod danger {
    use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
    use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{DigitallySignedStruct, SignatureScheme};

    /// Accepts any server certificate, but still verifies the handshake signatures.
    #[derive(Debug)]
    pub struct NoCertificateVerification(CryptoProvider);

    impl NoCertificateVerification {
        pub fn new() -> Self {
            Self(rustls::crypto::aws_lc_rs::default_provider())
        }
    }

    impl ServerCertVerifier for NoCertificateVerification {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.0.signature_verification_algorithms.supported_schemes()
        }
    }
}
