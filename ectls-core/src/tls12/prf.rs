//! TLS 1.2 PRF (Pseudorandom Function) - RFC 5246 Section 5
//!
//! PRF(secret, label, seed) = P_<hash>(secret, label + seed)
//!
//! Where P_hash is defined as:
//! P_hash(secret, seed) = HMAC_hash(secret, A(1) + seed) +
//!                         HMAC_hash(secret, A(2) + seed) +
//!                         HMAC_hash(secret, A(3) + seed) + ...
//!
//! A(0) = seed
//! A(i) = HMAC_hash(secret, A(i-1))
//!
//! Every function here is pure: the same inputs always give the same bytes.

use core::fmt;

use ectls_crypto::{PrfAlgorithm, ProviderRegistry};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::tls12::cipher_suites::CipherSuite;

/// Master secret length.
pub const MASTER_SECRET_LENGTH: usize = 48;

/// Finished label sent by the client.
pub const CLIENT_FINISHED_LABEL: &[u8] = b"client finished";

/// Finished label sent by the server.
pub const SERVER_FINISHED_LABEL: &[u8] = b"server finished";

/// TLS 1.2 PRF bound to a registry and a PRF algorithm.
#[derive(Debug, Clone, Copy)]
pub struct Tls12Prf<'a> {
    registry: &'a ProviderRegistry,
    algorithm: PrfAlgorithm,
}

impl<'a> Tls12Prf<'a> {
    /// Create a PRF instance.
    pub fn new(registry: &'a ProviderRegistry, algorithm: PrfAlgorithm) -> Self {
        Self {
            registry,
            algorithm,
        }
    }

    /// Compute `output_len` bytes of PRF(secret, label, seed).
    pub fn compute(
        &self,
        secret: &[u8],
        label: &[u8],
        seed: &[u8],
        output_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let hash = self.registry.prf(self.algorithm)?;
        let mut hmac = self.registry.hmac(hash, secret)?;

        let mut label_seed = Vec::with_capacity(label.len() + seed.len());
        label_seed.extend_from_slice(label);
        label_seed.extend_from_slice(seed);

        let mut output = Zeroizing::new(Vec::with_capacity(output_len));

        // A(0) = label + seed
        let mut a = Zeroizing::new(label_seed.clone());

        while output.len() < output_len {
            hmac.update(&a);
            a = Zeroizing::new(hmac.finalize_reset());

            hmac.update(&a);
            hmac.update(&label_seed);
            let block = Zeroizing::new(hmac.finalize_reset());

            let take = (output_len - output.len()).min(block.len());
            output.extend_from_slice(&block[..take]);
        }

        Ok(output)
    }
}

fn check_random(name: &str, random: &[u8]) -> Result<()> {
    if random.len() != 32 {
        return Err(Error::MalformedMessage(format!(
            "{} must be 32 bytes, got {}",
            name,
            random.len()
        )));
    }
    Ok(())
}

/// Derive the master secret.
///
/// master_secret = PRF(pre_master_secret, "master secret",
///                     ClientHello.random + ServerHello.random)[0..47]
pub fn derive_master_secret(
    registry: &ProviderRegistry,
    prf: PrfAlgorithm,
    pre_master_secret: &[u8],
    client_random: &[u8],
    server_random: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    check_random("client random", client_random)?;
    check_random("server random", server_random)?;

    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(client_random);
    seed.extend_from_slice(server_random);

    Tls12Prf::new(registry, prf).compute(
        pre_master_secret,
        b"master secret",
        &seed,
        MASTER_SECRET_LENGTH,
    )
}

/// Derive the key block.
///
/// key_block = PRF(master_secret, "key expansion",
///                 ServerHello.random + ClientHello.random)
///
/// Note the seed order is reversed relative to the master secret.
#[allow(clippy::too_many_arguments)]
pub fn derive_key_block(
    registry: &ProviderRegistry,
    prf: PrfAlgorithm,
    master_secret: &[u8],
    server_random: &[u8],
    client_random: &[u8],
    mac_len: usize,
    key_len: usize,
    iv_len: usize,
) -> Result<KeyBlock> {
    if master_secret.len() != MASTER_SECRET_LENGTH {
        return Err(Error::InternalError(format!(
            "master secret must be {} bytes, got {}",
            MASTER_SECRET_LENGTH,
            master_secret.len()
        )));
    }
    check_random("server random", server_random)?;
    check_random("client random", client_random)?;

    let length = mac_len
        .checked_add(key_len)
        .and_then(|len| len.checked_add(iv_len))
        .and_then(|len| len.checked_mul(2))
        .ok_or_else(|| Error::InternalError("key block length overflows".into()))?;

    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(server_random);
    seed.extend_from_slice(client_random);

    let bytes = Tls12Prf::new(registry, prf).compute(master_secret, b"key expansion", &seed, length)?;

    Ok(KeyBlock {
        bytes,
        mac_len,
        key_len,
        iv_len,
    })
}

/// Derive the key block sized for `suite`.
pub fn derive_key_block_for_suite(
    registry: &ProviderRegistry,
    suite: CipherSuite,
    master_secret: &[u8],
    server_random: &[u8],
    client_random: &[u8],
) -> Result<KeyBlock> {
    derive_key_block(
        registry,
        suite.prf_algorithm(),
        master_secret,
        server_random,
        client_random,
        suite.mac_len(),
        suite.key_len(),
        suite.fixed_iv_len(),
    )
}

/// Compute Finished verify data.
///
/// verify_data = PRF(master_secret, finished_label, Hash(handshake_messages))[0..11]
pub fn compute_verify_data(
    registry: &ProviderRegistry,
    prf: PrfAlgorithm,
    master_secret: &[u8],
    finished_label: &[u8],
    transcript_hash: &[u8],
) -> Result<[u8; 12]> {
    let out = Tls12Prf::new(registry, prf).compute(master_secret, finished_label, transcript_hash, 12)?;
    let mut verify_data = [0u8; 12];
    verify_data.copy_from_slice(&out);
    Ok(verify_data)
}

/// Key block split into its six parts.
///
/// Layout: client MAC key, server MAC key, client key, server key,
/// client IV, server IV.
pub struct KeyBlock {
    bytes: Zeroizing<Vec<u8>>,
    mac_len: usize,
    key_len: usize,
    iv_len: usize,
}

impl KeyBlock {
    /// The whole key block.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn slice(&self, start: usize, len: usize) -> &[u8] {
        &self.bytes[start..start + len]
    }

    /// client_write_MAC_key
    pub fn client_mac_key(&self) -> &[u8] {
        self.slice(0, self.mac_len)
    }

    /// server_write_MAC_key
    pub fn server_mac_key(&self) -> &[u8] {
        self.slice(self.mac_len, self.mac_len)
    }

    /// client_write_key
    pub fn client_key(&self) -> &[u8] {
        self.slice(2 * self.mac_len, self.key_len)
    }

    /// server_write_key
    pub fn server_key(&self) -> &[u8] {
        self.slice(2 * self.mac_len + self.key_len, self.key_len)
    }

    /// client_write_IV
    pub fn client_iv(&self) -> &[u8] {
        self.slice(2 * (self.mac_len + self.key_len), self.iv_len)
    }

    /// server_write_IV
    pub fn server_iv(&self) -> &[u8] {
        self.slice(2 * (self.mac_len + self.key_len) + self.iv_len, self.iv_len)
    }

    /// Split into per-direction keys for `suite`.
    pub fn into_session_keys(self, suite: CipherSuite) -> SessionKeys {
        let direction = |mac: &[u8], key: &[u8], iv: &[u8]| DirectionKeys {
            mac_key: Zeroizing::new(mac.to_vec()),
            cipher_key: Zeroizing::new(key.to_vec()),
            iv: Zeroizing::new(iv.to_vec()),
            cipher_suite: suite,
        };

        SessionKeys {
            client_write: direction(self.client_mac_key(), self.client_key(), self.client_iv()),
            server_write: direction(self.server_mac_key(), self.server_key(), self.server_iv()),
        }
    }
}

impl fmt::Debug for KeyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBlock")
            .field("mac_len", &self.mac_len)
            .field("key_len", &self.key_len)
            .field("iv_len", &self.iv_len)
            .finish_non_exhaustive()
    }
}

/// Keys protecting one direction of the connection.
///
/// Zeroized when dropped.
#[derive(Clone)]
pub struct DirectionKeys {
    /// HMAC key (empty for AEAD suites)
    pub mac_key: Zeroizing<Vec<u8>>,
    /// Bulk cipher key
    pub cipher_key: Zeroizing<Vec<u8>>,
    /// Fixed IV (4-byte salt for AEAD, empty for CBC)
    pub iv: Zeroizing<Vec<u8>>,
    /// Suite the keys belong to
    pub cipher_suite: CipherSuite,
}

impl fmt::Debug for DirectionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectionKeys")
            .field("cipher_suite", &self.cipher_suite)
            .field("mac_key", &"[REDACTED]")
            .field("cipher_key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

/// Output of a completed handshake.
#[derive(Debug, Clone)]
pub struct SessionKeys {
    /// Keys for client-to-server records
    pub client_write: DirectionKeys,
    /// Keys for server-to-client records
    pub server_write: DirectionKeys,
}

impl SessionKeys {
    /// The negotiated suite.
    pub fn cipher_suite(&self) -> CipherSuite {
        self.client_write.cipher_suite
    }
}
