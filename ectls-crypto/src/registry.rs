//! Algorithm registration table.
//!
//! A [`ProviderRegistry`] pairs a [`CryptoProvider`] backend with the exact
//! set of algorithms the process is willing to use. It is assembled once at
//! startup, is immutable afterwards and is shared between handshakes behind
//! an `Arc`. Lookups of algorithms that were never registered fail with
//! [`Error::UnsupportedAlgorithm`] even when the backend could provide them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::{
    Cipher, CipherAlgorithm, CryptoProvider, Error, Hash, HashAlgorithm, Hmac, KeyExchange,
    NamedCurve, PrfAlgorithm, Random, Result, Signature, SignatureAlgorithm,
};

/// Read-only table of enabled algorithms backed by one provider.
#[derive(Clone)]
pub struct ProviderRegistry {
    provider: Arc<dyn CryptoProvider>,
    hashes: BTreeSet<HashAlgorithm>,
    ciphers: BTreeSet<CipherAlgorithm>,
    prfs: BTreeSet<PrfAlgorithm>,
    curves: BTreeSet<NamedCurve>,
    signatures: BTreeSet<SignatureAlgorithm>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("hashes", &self.hashes)
            .field("ciphers", &self.ciphers)
            .field("prfs", &self.prfs)
            .field("curves", &self.curves)
            .field("signatures", &self.signatures)
            .finish_non_exhaustive()
    }
}

impl ProviderRegistry {
    /// Start building a registry on top of `provider`.
    pub fn builder(provider: Arc<dyn CryptoProvider>) -> ProviderRegistryBuilder {
        ProviderRegistryBuilder {
            provider,
            hashes: BTreeSet::new(),
            ciphers: BTreeSet::new(),
            prfs: BTreeSet::new(),
            curves: BTreeSet::new(),
            signatures: BTreeSet::new(),
        }
    }

    /// Get a registered hash.
    pub fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
        if !self.hashes.contains(&algorithm) {
            return Err(unregistered(algorithm.name()));
        }
        self.provider.hash(algorithm)
    }

    /// Get a registered hash by name.
    pub fn hash_by_name(&self, name: &str) -> Result<Box<dyn Hash>> {
        let algorithm = HashAlgorithm::from_name(name).ok_or_else(|| unknown(name))?;
        self.hash(algorithm)
    }

    /// Get a keyed HMAC over a registered hash.
    pub fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
        if !self.hashes.contains(&algorithm) {
            return Err(unregistered(algorithm.hmac_name()));
        }
        self.provider.hmac(algorithm, key)
    }

    /// Get a keyed HMAC by name (`HmacSHA256`, ...).
    pub fn hmac_by_name(&self, name: &str, key: &[u8]) -> Result<Box<dyn Hmac>> {
        let algorithm = HashAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.hmac_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| unknown(name))?;
        self.hmac(algorithm, key)
    }

    /// Get a keyed cipher.
    pub fn cipher(&self, algorithm: CipherAlgorithm, key: &[u8]) -> Result<Box<dyn Cipher>> {
        if !self.ciphers.contains(&algorithm) {
            return Err(unregistered(algorithm.name()));
        }
        self.provider.cipher(algorithm, key)
    }

    /// Get a keyed cipher by name.
    pub fn cipher_by_name(&self, name: &str, key: &[u8]) -> Result<Box<dyn Cipher>> {
        let algorithm = CipherAlgorithm::from_name(name).ok_or_else(|| unknown(name))?;
        self.cipher(algorithm, key)
    }

    /// Resolve a registered PRF to the HMAC hash that drives it.
    pub fn prf(&self, algorithm: PrfAlgorithm) -> Result<HashAlgorithm> {
        if !self.prfs.contains(&algorithm) {
            return Err(unregistered(algorithm.name()));
        }
        Ok(algorithm.hash_algorithm())
    }

    /// Get EC group operations for a registered curve.
    pub fn key_exchange(&self, curve: NamedCurve) -> Result<Box<dyn KeyExchange>> {
        if !self.curves.contains(&curve) {
            return Err(unregistered(curve.name()));
        }
        self.provider.key_exchange(curve)
    }

    /// Get a verifier for a registered signature algorithm.
    pub fn signature(&self, algorithm: SignatureAlgorithm) -> Result<Box<dyn Signature>> {
        if !self.signatures.contains(&algorithm) {
            return Err(unregistered(algorithm.name()));
        }
        self.provider.signature(algorithm)
    }

    /// The provider's CSPRNG.
    pub fn random(&self) -> &dyn Random {
        self.provider.random()
    }

    /// Whether a cipher is registered.
    pub fn has_cipher(&self, algorithm: CipherAlgorithm) -> bool {
        self.ciphers.contains(&algorithm)
    }

    /// Whether a PRF is registered.
    pub fn has_prf(&self, algorithm: PrfAlgorithm) -> bool {
        self.prfs.contains(&algorithm)
    }

    /// Whether a curve is registered.
    pub fn has_curve(&self, curve: NamedCurve) -> bool {
        self.curves.contains(&curve)
    }

    /// Whether a signature algorithm is registered.
    pub fn has_signature(&self, algorithm: SignatureAlgorithm) -> bool {
        self.signatures.contains(&algorithm)
    }
}

fn unregistered(name: &str) -> Error {
    Error::UnsupportedAlgorithm(format!("{} is not registered", name))
}

fn unknown(name: &str) -> Error {
    Error::UnsupportedAlgorithm(format!("unknown algorithm name {:?}", name))
}

/// Builder for [`ProviderRegistry`].
pub struct ProviderRegistryBuilder {
    provider: Arc<dyn CryptoProvider>,
    hashes: BTreeSet<HashAlgorithm>,
    ciphers: BTreeSet<CipherAlgorithm>,
    prfs: BTreeSet<PrfAlgorithm>,
    curves: BTreeSet<NamedCurve>,
    signatures: BTreeSet<SignatureAlgorithm>,
}

impl fmt::Debug for ProviderRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistryBuilder")
            .field("hashes", &self.hashes)
            .field("ciphers", &self.ciphers)
            .finish_non_exhaustive()
    }
}

impl ProviderRegistryBuilder {
    /// Register a hash (and the HMAC over it).
    pub fn with_hash(mut self, algorithm: HashAlgorithm) -> Self {
        self.hashes.insert(algorithm);
        self
    }

    /// Register a bulk cipher.
    pub fn with_cipher(mut self, algorithm: CipherAlgorithm) -> Self {
        self.ciphers.insert(algorithm);
        self
    }

    /// Register a PRF. Its HMAC hash is registered too.
    pub fn with_prf(mut self, algorithm: PrfAlgorithm) -> Self {
        self.prfs.insert(algorithm);
        self.hashes.insert(algorithm.hash_algorithm());
        self
    }

    /// Register a named curve.
    pub fn with_curve(mut self, curve: NamedCurve) -> Self {
        self.curves.insert(curve);
        self
    }

    /// Register a signature algorithm. Its hash is registered too.
    pub fn with_signature(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signatures.insert(algorithm);
        self.hashes.insert(algorithm.hash_algorithm());
        self
    }

    /// Register every algorithm the provider reports as supported.
    pub fn with_all_supported(mut self) -> Self {
        for alg in HashAlgorithm::ALL {
            if self.provider.supports_hash(alg) {
                self.hashes.insert(alg);
            }
        }
        for alg in CipherAlgorithm::ALL {
            if self.provider.supports_cipher(alg) {
                self.ciphers.insert(alg);
            }
        }
        for alg in PrfAlgorithm::ALL {
            if self.provider.supports_hash(alg.hash_algorithm()) {
                self.prfs.insert(alg);
            }
        }
        for curve in NamedCurve::ALL {
            if self.provider.supports_curve(curve) {
                self.curves.insert(curve);
            }
        }
        for alg in SignatureAlgorithm::ALL {
            if self.provider.supports_signature(alg) {
                self.signatures.insert(alg);
            }
        }
        self
    }

    /// Validate every registration against the provider and freeze the table.
    pub fn build(self) -> Result<ProviderRegistry> {
        if let Some(alg) = self.hashes.iter().find(|a| !self.provider.supports_hash(**a)) {
            return Err(Error::Registry(format!("provider lacks {}", alg.name())));
        }
        if let Some(alg) = self.ciphers.iter().find(|a| !self.provider.supports_cipher(**a)) {
            return Err(Error::Registry(format!("provider lacks {}", alg.name())));
        }
        if let Some(curve) = self.curves.iter().find(|c| !self.provider.supports_curve(**c)) {
            return Err(Error::Registry(format!("provider lacks {}", curve.name())));
        }
        if let Some(alg) = self
            .signatures
            .iter()
            .find(|a| !self.provider.supports_signature(**a))
        {
            return Err(Error::Registry(format!("provider lacks {}", alg.name())));
        }

        Ok(ProviderRegistry {
            provider: self.provider,
            hashes: self.hashes,
            ciphers: self.ciphers,
            prfs: self.prfs,
            curves: self.curves,
            signatures: self.signatures,
        })
    }
}
