//! Leaf certificate key extraction.
//!
//! Only the leaf's SubjectPublicKeyInfo is used, to check the signature on
//! ServerKeyExchange. Chain building, validity periods and name matching are
//! left to the application.

use ectls_crypto::{ProviderRegistry, SignatureAlgorithm, SignatureFamily};
use tracing::debug;
use x509_parser::certificate::X509Certificate;
use x509_parser::oid_registry::{OID_KEY_TYPE_EC_PUBLIC_KEY, OID_PKCS1_RSAENCRYPTION};
use x509_parser::prelude::FromDer;

use crate::error::{Error, Result};

/// Public key of the server's leaf certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct LeafCertificate {
    family: SignatureFamily,
    public_key: Vec<u8>,
    subject: String,
}

impl LeafCertificate {
    /// Parse a DER certificate and extract its public key.
    ///
    /// The key is the SubjectPublicKeyInfo bit string: an uncompressed SEC1
    /// point for EC keys, a PKCS#1 `RSAPublicKey` for RSA keys.
    pub fn parse(der: &[u8]) -> Result<Self> {
        let (rest, certificate) = X509Certificate::from_der(der)
            .map_err(|e| Error::MalformedMessage(format!("invalid certificate: {}", e)))?;
        if !rest.is_empty() {
            return Err(Error::MalformedMessage(
                "trailing bytes after certificate".into(),
            ));
        }

        let spki = certificate.public_key();
        let key_oid = &spki.algorithm.algorithm;
        let family = if *key_oid == OID_KEY_TYPE_EC_PUBLIC_KEY {
            SignatureFamily::Ecdsa
        } else if *key_oid == OID_PKCS1_RSAENCRYPTION {
            SignatureFamily::Rsa
        } else {
            return Err(Error::UnsupportedAlgorithm(format!(
                "certificate key type {}",
                key_oid
            )));
        };

        let subject = certificate.subject().to_string();
        debug!("Leaf certificate {} ({:?} key)", subject, family);

        Ok(Self {
            family,
            public_key: spki.subject_public_key.data.to_vec(),
            subject,
        })
    }

    /// Signature family the key belongs to.
    pub fn family(&self) -> SignatureFamily {
        self.family
    }

    /// Encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Subject distinguished name, for logging.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Verify `signature` over `message` with this key.
    ///
    /// An algorithm from the wrong family fails like a bad signature.
    pub fn verify(
        &self,
        registry: &ProviderRegistry,
        algorithm: SignatureAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        if algorithm.family() != self.family {
            return Err(Error::SignatureVerificationFailed);
        }

        registry
            .signature(algorithm)?
            .verify(&self.public_key, message, signature)
            .map_err(|_| Error::SignatureVerificationFailed)
    }
}

impl core::fmt::Debug for LeafCertificate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LeafCertificate")
            .field("family", &self.family)
            .field("subject", &self.subject)
            .field("public_key_len", &self.public_key.len())
            .finish()
    }
}
