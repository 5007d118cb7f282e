//! HMAC implementations using the `hmac` crate.

use ectls_crypto::{Error, HashAlgorithm, Hmac, Result};
use hmac::Mac;
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = hmac::Hmac<Sha256>;
type HmacSha384 = hmac::Hmac<Sha384>;
type HmacSha512 = hmac::Hmac<Sha512>;

/// Create an HMAC instance for the specified hash algorithm.
pub fn create_hmac(algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
    match algorithm {
        HashAlgorithm::Sha256 => Ok(Box::new(KeyedMac::new(
            HmacSha256::new_from_slice(key).map_err(|_| invalid_key(key))?,
            algorithm,
        ))),
        HashAlgorithm::Sha384 => Ok(Box::new(KeyedMac::new(
            HmacSha384::new_from_slice(key).map_err(|_| invalid_key(key))?,
            algorithm,
        ))),
        HashAlgorithm::Sha512 => Ok(Box::new(KeyedMac::new(
            HmacSha512::new_from_slice(key).map_err(|_| invalid_key(key))?,
            algorithm,
        ))),
    }
}

fn invalid_key(key: &[u8]) -> Error {
    Error::InvalidKeySize {
        expected: 0,
        actual: key.len(),
    }
}

/// HMAC with incremental updates (FIPS 198-1, RFC 2104).
///
/// `initial` holds the freshly keyed state so `reset` does not need the raw key.
struct KeyedMac<M> {
    mac: M,
    initial: M,
    algorithm: HashAlgorithm,
}

impl<M: Mac + Clone> KeyedMac<M> {
    fn new(mac: M, algorithm: HashAlgorithm) -> Self {
        Self {
            initial: mac.clone(),
            mac,
            algorithm,
        }
    }
}

impl<M> Hmac for KeyedMac<M>
where
    M: Mac + Clone + Send + 'static,
{
    fn update(&mut self, data: &[u8]) {
        Mac::update(&mut self.mac, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.mac.finalize().into_bytes().to_vec()
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        let done = std::mem::replace(&mut self.mac, self.initial.clone());
        done.finalize().into_bytes().to_vec()
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn reset(&mut self) {
        self.mac = self.initial.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test case 2
    const KEY: &[u8] = b"Jefe";
    const DATA: &[u8] = b"what do ya want for nothing?";

    #[test]
    fn test_hmac_sha256_rfc4231() {
        let mut mac = create_hmac(HashAlgorithm::Sha256, KEY).unwrap();
        mac.update(DATA);
        assert_eq!(
            hex::encode(mac.finalize()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_finalize_reset_restarts_keyed() {
        let mut mac = create_hmac(HashAlgorithm::Sha384, KEY).unwrap();
        mac.update(DATA);
        let first = mac.finalize_reset();
        mac.update(DATA);
        let second = mac.finalize_reset();
        assert_eq!(first, second);
        assert_eq!(first.len(), 48);
    }

    #[test]
    fn test_verify_constant_time() {
        let mut mac = create_hmac(HashAlgorithm::Sha256, KEY).unwrap();
        mac.update(DATA);
        let tag = mac.finalize_reset();
        mac.update(DATA);
        assert!(mac.verify(&tag));

        let mut wrong = tag.clone();
        wrong[0] ^= 1;
        let mut mac = create_hmac(HashAlgorithm::Sha256, KEY).unwrap();
        mac.update(DATA);
        assert!(!mac.verify(&wrong));
    }
}
