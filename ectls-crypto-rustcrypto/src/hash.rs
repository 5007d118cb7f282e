//! Hash function implementations using `sha2`.

use ectls_crypto::{Hash, HashAlgorithm, Result};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Create a hash instance for the specified algorithm.
pub fn create_hash(algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
    match algorithm {
        HashAlgorithm::Sha256 => Ok(Box::new(Sha2Hash::<Sha256>::new(algorithm))),
        HashAlgorithm::Sha384 => Ok(Box::new(Sha2Hash::<Sha384>::new(algorithm))),
        HashAlgorithm::Sha512 => Ok(Box::new(Sha2Hash::<Sha512>::new(algorithm))),
    }
}

/// One-shot digest, used by signature verification.
pub(crate) fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// SHA-2 family digest (FIPS 180-4).
///
/// Cloning the running state gives the non-destructive `snapshot` the
/// transcript needs.
struct Sha2Hash<D> {
    hasher: D,
    algorithm: HashAlgorithm,
}

impl<D: Digest> Sha2Hash<D> {
    fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            hasher: D::new(),
            algorithm,
        }
    }
}

impl<D> Hash for Sha2Hash<D>
where
    D: Digest + Clone + Send + 'static,
{
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }

    fn snapshot(&self) -> Vec<u8> {
        self.hasher.clone().finalize().to_vec()
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn reset(&mut self) {
        self.hasher = D::new();
    }
}
