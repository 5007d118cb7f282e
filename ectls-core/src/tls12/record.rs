//! TLS 1.2 Record Protection
//!
//! Each direction starts out plaintext and is switched to a
//! [`CipherContext`] by its ChangeCipherSpec. Sequence numbers are kept per
//! direction and reset to zero on activation.
//!
//! # GenericBlockCipher (RFC 5246 Section 6.2.3.2)
//!
//! ```text
//! IV (16 bytes, fresh per record) ||
//! CBC(content || MAC || padding || padding_length)
//!
//! MAC = HMAC(mac_key, seq_num || type || version || length || content)
//! ```
//!
//! # GenericAEADCipher (RFC 5246 Section 6.2.3.3, RFC 5288 Section 3)
//!
//! ```text
//! nonce_explicit (8 bytes, = seq_num) || AEAD(content)
//!
//! nonce           = fixed_iv (4 bytes) || nonce_explicit
//! additional_data = seq_num (8) || type (1) || version (2) || length (2)
//! ```

use core::fmt;
use std::sync::Arc;

use ectls_crypto::{Cipher, CipherAlgorithm, Hmac, ProviderRegistry};
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::protocol::{ContentType, ProtocolVersion};
use crate::record::{TlsPlaintext, MAX_FRAGMENT_SIZE};
use crate::tls12::cipher_suites::CipherSuite;
use crate::tls12::prf::DirectionKeys;

/// Which half of the connection a context protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Records received from the peer
    Read,
    /// Records sent to the peer
    Write,
}

enum Protection {
    Cbc {
        cipher: Box<dyn Cipher>,
        mac: Box<dyn Hmac>,
        mac_len: usize,
    },
    Aead {
        cipher: Box<dyn Cipher>,
        fixed_iv: Zeroizing<Vec<u8>>,
    },
}

/// Keyed protection for one direction.
pub struct CipherContext {
    suite: CipherSuite,
    protection: Protection,
}

impl CipherContext {
    /// Build a context from one direction's keys.
    pub fn new(registry: &ProviderRegistry, keys: &DirectionKeys) -> Result<Self> {
        let suite = keys.cipher_suite;
        let algorithm = suite.cipher_algorithm();
        let cipher = registry.cipher(algorithm, &keys.cipher_key)?;

        let protection = match suite.mac_algorithm() {
            Some(mac_hash) => {
                if keys.mac_key.len() != suite.mac_len() {
                    return Err(Error::InternalError("MAC key length mismatch".into()));
                }
                Protection::Cbc {
                    cipher,
                    mac: registry.hmac(mac_hash, &keys.mac_key)?,
                    mac_len: suite.mac_len(),
                }
            },
            None => {
                if keys.iv.len() != algorithm.fixed_iv_len() {
                    return Err(Error::InternalError("fixed IV length mismatch".into()));
                }
                Protection::Aead {
                    cipher,
                    fixed_iv: keys.iv.clone(),
                }
            },
        };

        Ok(Self { suite, protection })
    }

    /// The suite this context was keyed for.
    pub fn cipher_suite(&self) -> CipherSuite {
        self.suite
    }

    fn seal(
        &mut self,
        registry: &ProviderRegistry,
        seq: u64,
        content_type: ContentType,
        version: ProtocolVersion,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let algorithm = self.suite.cipher_algorithm();
        match &mut self.protection {
            Protection::Cbc { cipher, mac, .. } => {
                let tag = record_mac(mac.as_mut(), seq, content_type, version, payload);

                let block = algorithm.block_len();
                let unpadded = payload.len() + tag.len() + 1;
                let pad_len = (block - unpadded % block) % block;

                let mut data = Zeroizing::new(Vec::with_capacity(unpadded + pad_len));
                data.extend_from_slice(payload);
                data.extend_from_slice(&tag);
                data.resize(unpadded + pad_len, pad_len as u8);

                let mut iv = vec![0u8; algorithm.record_iv_len()];
                registry.random().fill(&mut iv)?;

                let ciphertext = cipher.seal(&iv, &[], &data)?;
                iv.extend_from_slice(&ciphertext);
                Ok(iv)
            },
            Protection::Aead { cipher, fixed_iv } => {
                let explicit = seq.to_be_bytes();
                let nonce = aead_nonce(fixed_iv, &explicit);
                let aad = additional_data(seq, content_type, version, payload.len());

                let ciphertext = cipher.seal(&nonce, &aad, payload)?;
                let mut fragment = Vec::with_capacity(explicit.len() + ciphertext.len());
                fragment.extend_from_slice(&explicit);
                fragment.extend_from_slice(&ciphertext);
                Ok(fragment)
            },
        }
    }

    fn open(
        &mut self,
        seq: u64,
        content_type: ContentType,
        version: ProtocolVersion,
        fragment: &[u8],
    ) -> Result<Vec<u8>> {
        let algorithm = self.suite.cipher_algorithm();
        match &mut self.protection {
            Protection::Cbc {
                cipher,
                mac,
                mac_len,
            } => open_cbc(
                algorithm,
                cipher.as_ref(),
                mac.as_mut(),
                *mac_len,
                seq,
                content_type,
                version,
                fragment,
            ),
            Protection::Aead { cipher, fixed_iv } => {
                let explicit_len = algorithm.record_iv_len();
                let tag_len = algorithm.tag_len();
                if fragment.len() < explicit_len + tag_len {
                    return Err(Error::DecryptionFailed);
                }

                let (explicit, ciphertext) = fragment.split_at(explicit_len);
                let nonce = aead_nonce(fixed_iv, explicit);
                let aad = additional_data(seq, content_type, version, ciphertext.len() - tag_len);

                cipher
                    .open(&nonce, &aad, ciphertext)
                    .map_err(|_| Error::DecryptionFailed)
            },
        }
    }
}

impl fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherContext")
            .field("suite", &self.suite)
            .finish_non_exhaustive()
    }
}

fn aead_nonce(fixed_iv: &[u8], explicit: &[u8]) -> Vec<u8> {
    let mut nonce = Vec::with_capacity(fixed_iv.len() + explicit.len());
    nonce.extend_from_slice(fixed_iv);
    nonce.extend_from_slice(explicit);
    nonce
}

fn additional_data(
    seq: u64,
    content_type: ContentType,
    version: ProtocolVersion,
    length: usize,
) -> [u8; 13] {
    let mut ad = [0u8; 13];
    ad[..8].copy_from_slice(&seq.to_be_bytes());
    ad[8] = content_type.to_u8();
    ad[9..11].copy_from_slice(&version.to_u16().to_be_bytes());
    ad[11..13].copy_from_slice(&(length as u16).to_be_bytes());
    ad
}

fn record_mac(
    mac: &mut dyn Hmac,
    seq: u64,
    content_type: ContentType,
    version: ProtocolVersion,
    payload: &[u8],
) -> Vec<u8> {
    mac.update(&additional_data(seq, content_type, version, payload.len()));
    mac.update(payload);
    mac.finalize_reset()
}

/// Decrypt and authenticate a GenericBlockCipher fragment.
///
/// Padding and MAC failures are indistinguishable to the caller, and the MAC
/// is computed even when the padding is bad.
#[allow(clippy::too_many_arguments)]
fn open_cbc(
    algorithm: CipherAlgorithm,
    cipher: &dyn Cipher,
    mac: &mut dyn Hmac,
    mac_len: usize,
    seq: u64,
    content_type: ContentType,
    version: ProtocolVersion,
    fragment: &[u8],
) -> Result<Vec<u8>> {
    let block = algorithm.block_len();
    let iv_len = algorithm.record_iv_len();
    let min_ciphertext = (mac_len + 1).div_ceil(block) * block;

    if fragment.len() < iv_len + min_ciphertext || (fragment.len() - iv_len) % block != 0 {
        return Err(Error::DecryptionFailed);
    }

    let (iv, ciphertext) = fragment.split_at(iv_len);
    let mut plaintext = cipher
        .open(iv, &[], ciphertext)
        .map_err(|_| Error::DecryptionFailed)?;

    let total = plaintext.len();
    let pad_len = plaintext[total - 1] as usize;
    let fits = pad_len + 1 + mac_len <= total;

    let mut good = Choice::from(fits as u8);
    let checked = (pad_len + 1).min(total - mac_len);
    for byte in &plaintext[total - checked..] {
        good &= byte.ct_eq(&(pad_len as u8));
    }

    let content_len = if fits {
        total - pad_len - 1 - mac_len
    } else {
        total - mac_len - 1
    };

    let expected = record_mac(mac, seq, content_type, version, &plaintext[..content_len]);
    good &= expected
        .as_slice()
        .ct_eq(&plaintext[content_len..content_len + mac_len]);

    if !bool::from(good) {
        return Err(Error::DecryptionFailed);
    }

    plaintext.truncate(content_len);
    Ok(plaintext)
}

/// Record layer with independent read and write state.
pub struct RecordLayer {
    registry: Arc<ProviderRegistry>,
    version: ProtocolVersion,
    read: Option<CipherContext>,
    write: Option<CipherContext>,
    read_seq: u64,
    write_seq: u64,
    released: bool,
}

impl RecordLayer {
    /// Create a record layer with both directions in plaintext.
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            version: ProtocolVersion::Tls12,
            read: None,
            write: None,
            read_seq: 0,
            write_seq: 0,
            released: false,
        }
    }

    /// Drop both cipher contexts. Every later read or write fails, so
    /// nothing falls back to plaintext.
    pub fn release(&mut self) {
        if !self.released {
            debug!("Releasing record protection");
        }
        self.read = None;
        self.write = None;
        self.released = true;
    }

    /// True after [`release`](Self::release).
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn check_usable(&self) -> Result<()> {
        if self.released {
            return Err(Error::InternalError("record layer released after a fatal error".into()));
        }
        Ok(())
    }

    /// Switch one direction to `context` and reset its sequence number.
    pub fn activate_change_cipher_spec(&mut self, direction: Direction, context: CipherContext) {
        debug!(
            "Activating {:?} protection with {}",
            direction,
            context.cipher_suite()
        );
        match direction {
            Direction::Read => {
                self.read = Some(context);
                self.read_seq = 0;
            },
            Direction::Write => {
                self.write = Some(context);
                self.write_seq = 0;
            },
        }
    }

    /// True once the direction has been switched to a cipher.
    pub fn is_protected(&self, direction: Direction) -> bool {
        match direction {
            Direction::Read => self.read.is_some(),
            Direction::Write => self.write.is_some(),
        }
    }

    /// Next sequence number for a direction.
    pub fn sequence_number(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Read => self.read_seq,
            Direction::Write => self.write_seq,
        }
    }

    fn next_seq(counter: &mut u64) -> Result<u64> {
        let seq = *counter;
        *counter = seq
            .checked_add(1)
            .ok_or_else(|| Error::InternalError("sequence number exhausted".into()))?;
        Ok(seq)
    }

    /// Protect `payload` and return the complete record bytes.
    pub fn write_record(&mut self, content_type: ContentType, payload: &[u8]) -> Result<Vec<u8>> {
        self.check_usable()?;
        if payload.len() > MAX_FRAGMENT_SIZE {
            return Err(Error::RecordOverflow);
        }

        let fragment = match self.write.as_mut() {
            None => payload.to_vec(),
            Some(context) => {
                let seq = Self::next_seq(&mut self.write_seq)?;
                context.seal(&self.registry, seq, content_type, self.version, payload)?
            },
        };

        TlsPlaintext::new(content_type, self.version, fragment).encode()
    }

    /// Parse and unprotect one complete record.
    pub fn read_record(&mut self, raw: &[u8]) -> Result<(ContentType, Vec<u8>)> {
        let (record, consumed) = TlsPlaintext::decode(raw)?;
        if consumed != raw.len() {
            return Err(Error::MalformedMessage("trailing bytes after record".into()));
        }
        self.open_record(record)
    }

    /// Unprotect a record already split off the wire.
    pub fn open_record(&mut self, record: TlsPlaintext) -> Result<(ContentType, Vec<u8>)> {
        self.check_usable()?;
        let plaintext = match self.read.as_mut() {
            None => record.fragment,
            Some(context) => {
                let seq = Self::next_seq(&mut self.read_seq)?;
                context.open(seq, record.content_type, record.version, &record.fragment)?
            },
        };

        if plaintext.len() > MAX_FRAGMENT_SIZE {
            return Err(Error::RecordOverflow);
        }
        Ok((record.content_type, plaintext))
    }

    #[cfg(test)]
    pub(crate) fn set_sequence_number(&mut self, direction: Direction, seq: u64) {
        match direction {
            Direction::Read => self.read_seq = seq,
            Direction::Write => self.write_seq = seq,
        }
    }
}

impl fmt::Debug for RecordLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordLayer")
            .field("version", &self.version)
            .field("read", &self.read)
            .field("write", &self.write)
            .field("read_seq", &self.read_seq)
            .field("write_seq", &self.write_seq)
            .field("released", &self.released)
            .finish()
    }
}
