//! Elliptic-curve key exchange for ECDHE.

use crate::Result;
use zeroize::Zeroize;

/// Named elliptic curves (RFC 4492 / RFC 8422 `NamedCurve`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedCurve {
    /// secp256r1 (P-256, NIST curve)
    Secp256r1,
    /// secp384r1 (P-384, NIST curve)
    Secp384r1,
}

impl NamedCurve {
    /// Every variant, in preference order.
    pub const ALL: [NamedCurve; 2] = [NamedCurve::Secp256r1, NamedCurve::Secp384r1];

    /// Uncompressed public point size in bytes.
    pub const fn public_key_size(self) -> usize {
        match self {
            NamedCurve::Secp256r1 => 65,
            NamedCurve::Secp384r1 => 97,
        }
    }

    /// Shared secret (x-coordinate) size in bytes.
    pub const fn shared_secret_size(self) -> usize {
        match self {
            NamedCurve::Secp256r1 => 32,
            NamedCurve::Secp384r1 => 48,
        }
    }

    /// Convert to wire format (u16).
    pub const fn to_u16(self) -> u16 {
        match self {
            NamedCurve::Secp256r1 => 0x0017,
            NamedCurve::Secp384r1 => 0x0018,
        }
    }

    /// Convert from wire format (u16).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0017 => Some(NamedCurve::Secp256r1),
            0x0018 => Some(NamedCurve::Secp384r1),
            _ => None,
        }
    }

    /// Get the curve name.
    pub const fn name(self) -> &'static str {
        match self {
            NamedCurve::Secp256r1 => "secp256r1",
            NamedCurve::Secp384r1 => "secp384r1",
        }
    }

    /// Look up a curve by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "secp256r1" | "p-256" | "prime256v1" => Some(NamedCurve::Secp256r1),
            "secp384r1" | "p-384" => Some(NamedCurve::Secp384r1),
            _ => None,
        }
    }
}

/// Ephemeral private scalar.
///
/// Zeroized when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct PrivateKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl PrivateKey {
    /// Create a new private key from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the private key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Uncompressed SEC1 public point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Create a new public key from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the public key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to owned bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// ECDH agreement output, used as the pre-master secret.
///
/// Zeroized when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl SharedSecret {
    /// Create a new shared secret from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the shared secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// EC group operations for one named curve.
pub trait KeyExchange: Send + Sync {
    /// Generate a fresh ephemeral key pair.
    fn generate_keypair(&self) -> Result<(PrivateKey, PublicKey)>;

    /// Decode and validate a peer point.
    ///
    /// # Errors
    ///
    /// `InvalidPublicKey` if the bytes are not a valid point on the curve.
    fn decode_point(&self, bytes: &[u8]) -> Result<PublicKey>;

    /// Compute the ECDH shared secret (x-coordinate, fixed length).
    fn exchange(&self, private_key: &PrivateKey, peer_public_key: &PublicKey)
        -> Result<SharedSecret>;

    /// Get the curve of this key exchange.
    fn curve(&self) -> NamedCurve;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_codepoints() {
        for curve in NamedCurve::ALL {
            assert_eq!(NamedCurve::from_u16(curve.to_u16()), Some(curve));
            assert_eq!(NamedCurve::from_name(curve.name()), Some(curve));
        }
        assert_eq!(NamedCurve::from_u16(0x001D), None);
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = PrivateKey::from_bytes(vec![0x42; 32]);
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("42"));
    }
}
