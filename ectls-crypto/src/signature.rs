//! Signature verification for ServerKeyExchange parameters.

use crate::{HashAlgorithm, Result};

/// Public-key family of a signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureFamily {
    /// ECDSA over a NIST curve
    Ecdsa,
    /// RSA PKCS#1 v1.5
    Rsa,
}

/// TLS 1.2 `SignatureAndHashAlgorithm` pairs.
///
/// In TLS 1.2 the ECDSA code points name only the hash; the curve follows
/// from the certificate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
    /// ECDSA with SHA-256
    EcdsaSha256,
    /// ECDSA with SHA-384
    EcdsaSha384,
}

impl SignatureAlgorithm {
    /// Every variant, in preference order.
    pub const ALL: [SignatureAlgorithm; 5] = [
        SignatureAlgorithm::EcdsaSha256,
        SignatureAlgorithm::EcdsaSha384,
        SignatureAlgorithm::RsaPkcs1Sha256,
        SignatureAlgorithm::RsaPkcs1Sha384,
        SignatureAlgorithm::RsaPkcs1Sha512,
    ];

    /// Convert to wire format (hash byte, signature byte).
    pub const fn to_u16(self) -> u16 {
        match self {
            SignatureAlgorithm::RsaPkcs1Sha256 => 0x0401,
            SignatureAlgorithm::RsaPkcs1Sha384 => 0x0501,
            SignatureAlgorithm::RsaPkcs1Sha512 => 0x0601,
            SignatureAlgorithm::EcdsaSha256 => 0x0403,
            SignatureAlgorithm::EcdsaSha384 => 0x0503,
        }
    }

    /// Convert from wire format.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0401 => Some(SignatureAlgorithm::RsaPkcs1Sha256),
            0x0501 => Some(SignatureAlgorithm::RsaPkcs1Sha384),
            0x0601 => Some(SignatureAlgorithm::RsaPkcs1Sha512),
            0x0403 => Some(SignatureAlgorithm::EcdsaSha256),
            0x0503 => Some(SignatureAlgorithm::EcdsaSha384),
            _ => None,
        }
    }

    /// Hash applied to the signed message.
    pub const fn hash_algorithm(self) -> HashAlgorithm {
        match self {
            SignatureAlgorithm::RsaPkcs1Sha256 | SignatureAlgorithm::EcdsaSha256 => {
                HashAlgorithm::Sha256
            },
            SignatureAlgorithm::RsaPkcs1Sha384 | SignatureAlgorithm::EcdsaSha384 => {
                HashAlgorithm::Sha384
            },
            SignatureAlgorithm::RsaPkcs1Sha512 => HashAlgorithm::Sha512,
        }
    }

    /// Key family of the algorithm.
    pub const fn family(self) -> SignatureFamily {
        match self {
            SignatureAlgorithm::EcdsaSha256 | SignatureAlgorithm::EcdsaSha384 => {
                SignatureFamily::Ecdsa
            },
            _ => SignatureFamily::Rsa,
        }
    }

    /// Get the algorithm name (JCA style).
    pub const fn name(self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaPkcs1Sha256 => "SHA256withRSA",
            SignatureAlgorithm::RsaPkcs1Sha384 => "SHA384withRSA",
            SignatureAlgorithm::RsaPkcs1Sha512 => "SHA512withRSA",
            SignatureAlgorithm::EcdsaSha256 => "SHA256withECDSA",
            SignatureAlgorithm::EcdsaSha384 => "SHA384withECDSA",
        }
    }

    /// Look up an algorithm by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(name))
    }
}

/// Signature verifier for one algorithm.
pub trait Signature: Send + Sync {
    /// Verify `signature` over `message` with an encoded public key.
    ///
    /// `public_key` is the SubjectPublicKeyInfo bit string payload: an
    /// uncompressed SEC1 point for ECDSA or a PKCS#1 `RSAPublicKey` for RSA.
    ///
    /// # Errors
    ///
    /// - `InvalidPublicKey` if the key cannot be decoded
    /// - `InvalidSignature` if the signature encoding is malformed
    /// - `SignatureVerificationFailed` if the signature does not match
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()>;

    /// Get the algorithm of this verifier.
    fn algorithm(&self) -> SignatureAlgorithm;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_codepoints() {
        for alg in SignatureAlgorithm::ALL {
            assert_eq!(SignatureAlgorithm::from_u16(alg.to_u16()), Some(alg));
        }
        assert_eq!(SignatureAlgorithm::from_u16(0x0807), None);
        assert_eq!(
            SignatureAlgorithm::from_u16(0x0601).map(|a| a.hash_algorithm()),
            Some(HashAlgorithm::Sha512)
        );
    }

    #[test]
    fn test_signature_family() {
        assert_eq!(SignatureAlgorithm::EcdsaSha384.family(), SignatureFamily::Ecdsa);
        assert_eq!(SignatureAlgorithm::RsaPkcs1Sha256.family(), SignatureFamily::Rsa);
        assert_eq!(
            SignatureAlgorithm::from_name("sha256withecdsa"),
            Some(SignatureAlgorithm::EcdsaSha256)
        );
    }
}
