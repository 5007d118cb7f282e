//! Signature verification: ECDSA via `p256`/`p384`, RSA PKCS#1 v1.5 via `rsa`.

use ectls_crypto::{
    Error, HashAlgorithm, Result, Signature, SignatureAlgorithm, SignatureFamily,
};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::signature::Verifier;

use crate::hash::digest;

/// Create a verifier for the specified algorithm.
pub fn create_signature(algorithm: SignatureAlgorithm) -> Result<Box<dyn Signature>> {
    match algorithm.family() {
        SignatureFamily::Ecdsa => Ok(Box::new(EcdsaVerifier { algorithm })),
        SignatureFamily::Rsa => Ok(Box::new(RsaPkcs1Verifier { algorithm })),
    }
}

/// ECDSA verifier.
///
/// TLS 1.2 decouples the hash from the curve, so the message is hashed
/// first and checked with the prehash API. The curve is selected from the
/// encoded point length.
#[derive(Debug)]
struct EcdsaVerifier {
    algorithm: SignatureAlgorithm,
}

impl Signature for EcdsaVerifier {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
        let prehash = digest(self.algorithm.hash_algorithm(), message);

        match public_key.len() {
            65 => {
                use p256::ecdsa::signature::hazmat::PrehashVerifier;
                let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
                    .map_err(|_| Error::InvalidPublicKey)?;
                let sig = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|_| Error::InvalidSignature)?;
                key.verify_prehash(&prehash, &sig)
                    .map_err(|_| Error::SignatureVerificationFailed)
            },
            97 => {
                use p384::ecdsa::signature::hazmat::PrehashVerifier;
                let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
                    .map_err(|_| Error::InvalidPublicKey)?;
                let sig = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|_| Error::InvalidSignature)?;
                key.verify_prehash(&prehash, &sig)
                    .map_err(|_| Error::SignatureVerificationFailed)
            },
            _ => Err(Error::InvalidPublicKey),
        }
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }
}

/// RSASSA-PKCS1-v1_5 verifier (RFC 8017 section 8.2).
#[derive(Debug)]
struct RsaPkcs1Verifier {
    algorithm: SignatureAlgorithm,
}

impl Signature for RsaPkcs1Verifier {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
        let key =
            rsa::RsaPublicKey::from_pkcs1_der(public_key).map_err(|_| Error::InvalidPublicKey)?;
        let sig = rsa::pkcs1v15::Signature::try_from(signature)
            .map_err(|_| Error::InvalidSignature)?;

        let verified = match self.algorithm.hash_algorithm() {
            HashAlgorithm::Sha256 => {
                rsa::pkcs1v15::VerifyingKey::<sha2::Sha256>::new(key).verify(message, &sig)
            },
            HashAlgorithm::Sha384 => {
                rsa::pkcs1v15::VerifyingKey::<sha2::Sha384>::new(key).verify(message, &sig)
            },
            HashAlgorithm::Sha512 => {
                rsa::pkcs1v15::VerifyingKey::<sha2::Sha512>::new(key).verify(message, &sig)
            },
        };
        verified.map_err(|_| Error::SignatureVerificationFailed)
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }
}
