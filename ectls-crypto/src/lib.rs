//! # ectls Algorithm Provider Interface
//!
//! This crate defines the algorithm layer driven by the ectls handshake
//! engine: closed enumerations of every supported algorithm, the traits a
//! cryptographic backend implements, and the [`ProviderRegistry`] that the
//! engine receives at construction time.
//!
//! ## Architecture
//!
//! ```text
//! ProviderRegistry (registration table, built once at startup)
//! └── CryptoProvider (backend trait)
//!     ├── Hash        (SHA-256, SHA-384, SHA-512)
//!     ├── Hmac        (HMAC over the hashes above)
//!     ├── Cipher      (AES-CBC, AES-GCM)
//!     ├── KeyExchange (ECDHE over secp256r1 / secp384r1)
//!     ├── Signature   (ECDSA, RSA PKCS#1 v1.5 verification)
//!     └── Random      (CSPRNG)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ectls_crypto::{CipherAlgorithm, ProviderRegistry};
//!
//! fn example(provider: Arc<dyn ectls_crypto::CryptoProvider>) -> ectls_crypto::Result<()> {
//!     let registry = ProviderRegistry::builder(provider)
//!         .with_all_supported()
//!         .build()?;
//!
//!     let gcm = registry.cipher(CipherAlgorithm::Aes128Gcm, &[0u8; 16])?;
//!     let sealed = gcm.seal(&[0u8; 12], b"aad", b"plaintext")?;
//!     let opened = gcm.open(&[0u8; 12], b"aad", &sealed)?;
//!     assert_eq!(opened, b"plaintext");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

pub mod cipher;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod key_exchange;
pub mod prf;
pub mod random;
pub mod registry;
pub mod signature;

pub use cipher::{Cipher, CipherAlgorithm, CipherMode};
pub use error::{Error, Result};
pub use hash::{Hash, HashAlgorithm};
pub use hmac::Hmac;
pub use key_exchange::{KeyExchange, NamedCurve, PrivateKey, PublicKey, SharedSecret};
pub use prf::PrfAlgorithm;
pub use random::Random;
pub use registry::{ProviderRegistry, ProviderRegistryBuilder};
pub use signature::{Signature, SignatureAlgorithm, SignatureFamily};

/// The cryptographic backend trait.
///
/// Implementations construct keyed or stateless algorithm instances on
/// demand. They hold no per-connection state, so a single provider can be
/// shared by every handshake in the process.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Create a new instance of the crypto provider.
    fn new() -> Self
    where
        Self: Sized;

    /// Get a hash function instance.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The hash algorithm to use
    ///
    /// # Returns
    ///
    /// A hash function instance, or an error if the algorithm is not supported.
    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>>;

    /// Get an HMAC instance keyed with `key`.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The hash algorithm to use for HMAC
    /// * `key` - The HMAC key
    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>>;

    /// Get a bulk cipher instance keyed with `key`.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - The cipher algorithm (CBC or AEAD)
    /// * `key` - The cipher key; length must equal `algorithm.key_len()`
    ///
    /// # Errors
    ///
    /// `InvalidKeySize` on a key length mismatch, `UnsupportedAlgorithm` if
    /// the backend lacks the cipher.
    fn cipher(&self, algorithm: CipherAlgorithm, key: &[u8]) -> Result<Box<dyn Cipher>>;

    /// Get the random number generator.
    fn random(&self) -> &dyn Random;

    /// Get the EC group operations for a named curve.
    fn key_exchange(&self, curve: NamedCurve) -> Result<Box<dyn KeyExchange>>;

    /// Get a signature verifier.
    fn signature(&self, algorithm: SignatureAlgorithm) -> Result<Box<dyn Signature>>;

    /// Check if the provider supports a specific hash algorithm.
    fn supports_hash(&self, algorithm: HashAlgorithm) -> bool {
        self.hash(algorithm).is_ok()
    }

    /// Check if the provider supports a specific cipher.
    fn supports_cipher(&self, algorithm: CipherAlgorithm) -> bool {
        self.cipher(algorithm, &vec![0u8; algorithm.key_len()])
            .is_ok()
    }

    /// Check if the provider supports a specific curve.
    fn supports_curve(&self, curve: NamedCurve) -> bool {
        self.key_exchange(curve).is_ok()
    }

    /// Check if the provider supports a specific signature algorithm.
    fn supports_signature(&self, algorithm: SignatureAlgorithm) -> bool {
        self.signature(algorithm).is_ok()
    }
}
