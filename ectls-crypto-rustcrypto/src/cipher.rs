//! Bulk cipher implementations: AES-CBC (`aes` + `cbc`) and AES-GCM (`aes-gcm`).

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::aead::{Aead as _, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use ectls_crypto::{Cipher, CipherAlgorithm, CipherMode, Error, Result};
use zeroize::Zeroizing;

/// Create a keyed cipher instance.
pub fn create_cipher(algorithm: CipherAlgorithm, key: &[u8]) -> Result<Box<dyn Cipher>> {
    if key.len() != algorithm.key_len() {
        return Err(Error::InvalidKeySize {
            expected: algorithm.key_len(),
            actual: key.len(),
        });
    }

    match algorithm.mode() {
        CipherMode::Cbc => Ok(Box::new(AesCbc {
            algorithm,
            key: Zeroizing::new(key.to_vec()),
        })),
        CipherMode::Aead => {
            let inner = match algorithm {
                CipherAlgorithm::Aes128Gcm => GcmKey::Aes128(Box::new(
                    Aes128Gcm::new_from_slice(key).map_err(|_| key_size(algorithm, key))?,
                )),
                CipherAlgorithm::Aes256Gcm => GcmKey::Aes256(Box::new(
                    Aes256Gcm::new_from_slice(key).map_err(|_| key_size(algorithm, key))?,
                )),
                other => {
                    return Err(Error::UnsupportedAlgorithm(format!(
                        "{} is not an AEAD cipher",
                        other.name()
                    )))
                },
            };
            Ok(Box::new(AesGcm { inner }))
        },
    }
}

fn key_size(algorithm: CipherAlgorithm, key: &[u8]) -> Error {
    Error::InvalidKeySize {
        expected: algorithm.key_len(),
        actual: key.len(),
    }
}

fn check_iv(algorithm: CipherAlgorithm, iv: &[u8]) -> Result<()> {
    if iv.len() != algorithm.iv_len() {
        return Err(Error::InvalidNonceSize {
            expected: algorithm.iv_len(),
            actual: iv.len(),
        });
    }
    Ok(())
}

/// AES in CBC mode without padding.
///
/// The key schedule is rebuilt per record because every record carries its
/// own explicit IV.
struct AesCbc {
    algorithm: CipherAlgorithm,
    key: Zeroizing<Vec<u8>>,
}

impl AesCbc {
    fn check(&self, iv: &[u8], data: &[u8]) -> Result<()> {
        check_iv(self.algorithm, iv)?;
        if data.len() % self.algorithm.block_len() != 0 {
            return Err(Error::InvalidLength);
        }
        Ok(())
    }
}

impl Cipher for AesCbc {
    fn seal(&self, iv: &[u8], _aad: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.check(iv, data)?;
        let out = match self.algorithm {
            CipherAlgorithm::Aes128Cbc => cbc::Encryptor::<aes::Aes128>::new_from_slices(&self.key, iv)
                .map_err(|_| key_size(self.algorithm, &self.key))?
                .encrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::Aes256Cbc => cbc::Encryptor::<aes::Aes256>::new_from_slices(&self.key, iv)
                .map_err(|_| key_size(self.algorithm, &self.key))?
                .encrypt_padded_vec_mut::<NoPadding>(data),
            other => return Err(Error::UnsupportedAlgorithm(other.name().into())),
        };
        Ok(out)
    }

    fn open(&self, iv: &[u8], _aad: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.check(iv, data)?;
        let out = match self.algorithm {
            CipherAlgorithm::Aes128Cbc => cbc::Decryptor::<aes::Aes128>::new_from_slices(&self.key, iv)
                .map_err(|_| key_size(self.algorithm, &self.key))?
                .decrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::Aes256Cbc => cbc::Decryptor::<aes::Aes256>::new_from_slices(&self.key, iv)
                .map_err(|_| key_size(self.algorithm, &self.key))?
                .decrypt_padded_vec_mut::<NoPadding>(data),
            other => return Err(Error::UnsupportedAlgorithm(other.name().into())),
        };
        out.map_err(|_| Error::InvalidLength)
    }

    fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }
}

enum GcmKey {
    Aes128(Box<Aes128Gcm>),
    Aes256(Box<Aes256Gcm>),
}

/// AES-GCM (NIST SP 800-38D) with a 12-byte nonce and 16-byte tag.
struct AesGcm {
    inner: GcmKey,
}

impl Cipher for AesGcm {
    fn seal(&self, iv: &[u8], aad: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        check_iv(self.algorithm(), iv)?;
        let payload = Payload { msg: data, aad };
        let nonce = Nonce::from_slice(iv);
        match &self.inner {
            GcmKey::Aes128(c) => c.encrypt(nonce, payload),
            GcmKey::Aes256(c) => c.encrypt(nonce, payload),
        }
        .map_err(|_| Error::InvalidLength)
    }

    fn open(&self, iv: &[u8], aad: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        check_iv(self.algorithm(), iv)?;
        let payload = Payload { msg: data, aad };
        let nonce = Nonce::from_slice(iv);
        match &self.inner {
            GcmKey::Aes128(c) => c.decrypt(nonce, payload),
            GcmKey::Aes256(c) => c.decrypt(nonce, payload),
        }
        .map_err(|_| Error::AuthenticationFailed)
    }

    fn algorithm(&self) -> CipherAlgorithm {
        match self.inner {
            GcmKey::Aes128(_) => CipherAlgorithm::Aes128Gcm,
            GcmKey::Aes256(_) => CipherAlgorithm::Aes256Gcm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcm_nist_vector() {
        // NIST GCM test case 2: zero key, zero nonce, one zero block
        let cipher = create_cipher(CipherAlgorithm::Aes128Gcm, &[0u8; 16]).unwrap();
        let sealed = cipher.seal(&[0u8; 12], &[], &[0u8; 16]).unwrap();
        assert_eq!(
            hex::encode(&sealed),
            "0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf"
        );
        assert_eq!(cipher.open(&[0u8; 12], &[], &sealed).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn test_gcm_tag_mismatch() {
        let cipher = create_cipher(CipherAlgorithm::Aes256Gcm, &[7u8; 32]).unwrap();
        let mut sealed = cipher.seal(&[1u8; 12], b"aad", b"payload").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x80;
        assert_eq!(
            cipher.open(&[1u8; 12], b"aad", &sealed),
            Err(Error::AuthenticationFailed)
        );
        assert_eq!(
            cipher.open(&[1u8; 12], b"other", &sealed),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn test_cbc_round_trip_and_alignment() {
        let cipher = create_cipher(CipherAlgorithm::Aes128Cbc, &[3u8; 16]).unwrap();
        let data = [0x5au8; 48];
        let sealed = cipher.seal(&[9u8; 16], &[], &data).unwrap();
        assert_eq!(sealed.len(), 48);
        assert_ne!(&sealed[..], &data[..]);
        assert_eq!(cipher.open(&[9u8; 16], &[], &sealed).unwrap(), data.to_vec());

        assert_eq!(
            cipher.seal(&[9u8; 16], &[], &data[..47]),
            Err(Error::InvalidLength)
        );
    }

    #[test]
    fn test_cbc_aes128_sp800_38a() {
        // NIST SP 800-38A F.2.1, first block
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let cipher = create_cipher(CipherAlgorithm::Aes128Cbc, &key).unwrap();
        assert_eq!(
            hex::encode(cipher.seal(&iv, &[], &pt).unwrap()),
            "7649abac8119b246cee98e9b12e9197d"
        );
    }

    #[test]
    fn test_key_size_validation() {
        assert!(matches!(
            create_cipher(CipherAlgorithm::Aes256Cbc, &[0u8; 16]),
            Err(Error::InvalidKeySize {
                expected: 32,
                actual: 16
            })
        ));
    }
}
