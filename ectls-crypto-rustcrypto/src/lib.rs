//! # RustCrypto-based Provider for ectls
//!
//! Implements [`ectls_crypto::CryptoProvider`] on top of the RustCrypto
//! project crates.
//!
//! ## Supported Algorithms
//!
//! - **Hash**: SHA-256, SHA-384, SHA-512 (`sha2`)
//! - **HMAC**: over the hashes above (`hmac`)
//! - **Ciphers**: AES-128/256-CBC (`aes`, `cbc`), AES-128/256-GCM (`aes-gcm`)
//! - **Key Exchange**: ECDH on secp256r1 and secp384r1 (`p256`, `p384`)
//! - **Signatures**: ECDSA with SHA-256/384, RSA PKCS#1 v1.5 with SHA-256/384/512 (`rsa`)
//! - **RNG**: `rand::rngs::OsRng`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ectls_crypto::{CryptoProvider, ProviderRegistry};
//! use ectls_crypto_rustcrypto::RustCryptoProvider;
//!
//! let registry = ProviderRegistry::builder(Arc::new(RustCryptoProvider::new()))
//!     .with_all_supported()
//!     .build()
//!     .unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

use ectls_crypto::{
    Cipher, CipherAlgorithm, CryptoProvider, Hash, HashAlgorithm, Hmac, KeyExchange, NamedCurve,
    Random, Result, Signature, SignatureAlgorithm,
};

pub mod cipher;
pub mod hash;
pub mod hmac;
pub mod kex;
pub mod random;
pub mod signature;

use random::OsRandom;

/// Cryptography provider using RustCrypto implementations.
///
/// Stateless apart from the RNG handle, so one instance can back every
/// handshake in the process.
#[derive(Debug, Default)]
pub struct RustCryptoProvider {
    random: OsRandom,
}

impl CryptoProvider for RustCryptoProvider {
    fn new() -> Self {
        Self { random: OsRandom }
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
        hash::create_hash(algorithm)
    }

    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
        hmac::create_hmac(algorithm, key)
    }

    fn cipher(&self, algorithm: CipherAlgorithm, key: &[u8]) -> Result<Box<dyn Cipher>> {
        cipher::create_cipher(algorithm, key)
    }

    fn random(&self) -> &dyn Random {
        &self.random
    }

    fn key_exchange(&self, curve: NamedCurve) -> Result<Box<dyn KeyExchange>> {
        kex::create_key_exchange(curve)
    }

    fn signature(&self, algorithm: SignatureAlgorithm) -> Result<Box<dyn Signature>> {
        signature::create_signature(algorithm)
    }
}
