//! Bulk cipher interface (CBC block ciphers and AEAD).
//!
//! Both modes sit behind one keyed [`Cipher`] trait so the record layer can
//! hold a single context per direction. The `iv` argument means:
//!
//! - **CBC**: the 16-byte explicit record IV. Input must be block aligned;
//!   padding and MAC checks belong to the caller.
//! - **AEAD**: the full 12-byte nonce. `aad` is authenticated, and the tag is
//!   appended to the ciphertext.

use crate::Result;

/// Operating mode of a bulk cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// Block cipher in CBC mode, MAC-then-encrypt.
    Cbc,
    /// Authenticated encryption with associated data.
    Aead,
}

/// Bulk cipher algorithms known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CipherAlgorithm {
    /// AES-128 in CBC mode
    Aes128Cbc,
    /// AES-256 in CBC mode
    Aes256Cbc,
    /// AES-128-GCM
    Aes128Gcm,
    /// AES-256-GCM
    Aes256Gcm,
}

impl CipherAlgorithm {
    /// Every variant.
    pub const ALL: [CipherAlgorithm; 4] = [
        CipherAlgorithm::Aes128Cbc,
        CipherAlgorithm::Aes256Cbc,
        CipherAlgorithm::Aes128Gcm,
        CipherAlgorithm::Aes256Gcm,
    ];

    /// Cipher mode.
    pub const fn mode(self) -> CipherMode {
        match self {
            CipherAlgorithm::Aes128Cbc | CipherAlgorithm::Aes256Cbc => CipherMode::Cbc,
            CipherAlgorithm::Aes128Gcm | CipherAlgorithm::Aes256Gcm => CipherMode::Aead,
        }
    }

    /// Key size in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc | CipherAlgorithm::Aes128Gcm => 16,
            CipherAlgorithm::Aes256Cbc | CipherAlgorithm::Aes256Gcm => 32,
        }
    }

    /// Length of the implicit IV taken from the key block.
    ///
    /// AEAD suites take the 4-byte salt of the nonce from the key block. CBC
    /// suites in TLS 1.2 send an explicit IV with every record, so the key
    /// block carries none.
    pub const fn fixed_iv_len(self) -> usize {
        match self.mode() {
            CipherMode::Cbc => 0,
            CipherMode::Aead => 4,
        }
    }

    /// Length of the per-record explicit IV or nonce carried on the wire.
    pub const fn record_iv_len(self) -> usize {
        match self.mode() {
            CipherMode::Cbc => 16,
            CipherMode::Aead => 8,
        }
    }

    /// Full IV or nonce length accepted by [`Cipher::seal`].
    pub const fn iv_len(self) -> usize {
        match self.mode() {
            CipherMode::Cbc => 16,
            CipherMode::Aead => 12,
        }
    }

    /// Authentication tag length (AEAD only).
    pub const fn tag_len(self) -> usize {
        match self.mode() {
            CipherMode::Cbc => 0,
            CipherMode::Aead => 16,
        }
    }

    /// Block length (CBC only, 1 for stream-like AEAD).
    pub const fn block_len(self) -> usize {
        match self.mode() {
            CipherMode::Cbc => 16,
            CipherMode::Aead => 1,
        }
    }

    /// Name of the algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes128Cbc => "AES_128_CBC",
            CipherAlgorithm::Aes256Cbc => "AES_256_CBC",
            CipherAlgorithm::Aes128Gcm => "AES_128_GCM",
            CipherAlgorithm::Aes256Gcm => "AES_256_GCM",
        }
    }

    /// Look up a cipher by name (`AES_128_GCM` or `aes-128-gcm`).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.replace('-', "_").to_ascii_uppercase();
        Self::ALL.into_iter().find(|alg| alg.name() == normalized)
    }
}

/// Keyed bulk cipher.
///
/// Created by the provider with the key bound, then used for any number of
/// `seal`/`open` calls with a distinct IV each time.
pub trait Cipher: Send + Sync {
    /// Encrypt `data`.
    ///
    /// For AEAD the returned buffer is ciphertext followed by the tag. For CBC
    /// `data` must already be padded to the block size; `aad` is ignored.
    ///
    /// # Errors
    ///
    /// - `InvalidNonceSize` if `iv` has the wrong length
    /// - `InvalidLength` if CBC input is not block aligned
    fn seal(&self, iv: &[u8], aad: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `data`.
    ///
    /// For AEAD, fails with `AuthenticationFailed` on tag mismatch and never
    /// returns partial plaintext. For CBC the padded plaintext is returned
    /// unchecked.
    fn open(&self, iv: &[u8], aad: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Get the algorithm of this cipher.
    fn algorithm(&self) -> CipherAlgorithm;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_geometry() {
        assert_eq!(CipherAlgorithm::Aes128Gcm.key_len(), 16);
        assert_eq!(CipherAlgorithm::Aes128Gcm.fixed_iv_len(), 4);
        assert_eq!(CipherAlgorithm::Aes128Gcm.record_iv_len(), 8);
        assert_eq!(CipherAlgorithm::Aes256Cbc.key_len(), 32);
        assert_eq!(CipherAlgorithm::Aes256Cbc.fixed_iv_len(), 0);
        assert_eq!(CipherAlgorithm::Aes256Cbc.block_len(), 16);
    }

    #[test]
    fn test_cipher_from_name() {
        assert_eq!(
            CipherAlgorithm::from_name("aes-128-gcm"),
            Some(CipherAlgorithm::Aes128Gcm)
        );
        assert_eq!(
            CipherAlgorithm::from_name("AES_256_CBC"),
            Some(CipherAlgorithm::Aes256Cbc)
        );
        assert_eq!(CipherAlgorithm::from_name("RC4_128"), None);
    }
}
