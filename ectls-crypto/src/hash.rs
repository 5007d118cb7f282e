//! Hash function interface.

/// Hash algorithms known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    /// SHA-256 (32 bytes output)
    Sha256,
    /// SHA-384 (48 bytes output)
    Sha384,
    /// SHA-512 (64 bytes output)
    Sha512,
}

impl HashAlgorithm {
    /// Every variant, in preference order.
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Get the output size in bytes for this hash algorithm.
    pub const fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Get the name of this algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Name of the HMAC built on this hash.
    pub const fn hmac_name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "HmacSHA256",
            HashAlgorithm::Sha384 => "HmacSHA384",
            HashAlgorithm::Sha512 => "HmacSHA512",
        }
    }

    /// Look up a hash by name. Accepts `SHA-256`, `SHA256` and `sha256` spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "SHA256" => Some(HashAlgorithm::Sha256),
            "SHA384" => Some(HashAlgorithm::Sha384),
            "SHA512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }
}

/// Hash function trait.
///
/// Incremental digest over handshake bytes.
///
/// # Example
///
/// ```rust,ignore
/// use ectls_crypto::Hash;
///
/// fn hash_example(hash: &mut dyn Hash) -> Vec<u8> {
///     hash.update(b"Hello, ");
///     hash.update(b"world!");
///     hash.snapshot()
/// }
/// ```
pub trait Hash: Send {
    /// Update the hash state with more data.
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the digest.
    ///
    /// This consumes the hash state.
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Return the digest of everything absorbed so far without consuming
    /// the running state.
    ///
    /// The transcript needs intermediate digests (client Finished) while
    /// continuing to absorb later messages.
    fn snapshot(&self) -> Vec<u8>;

    /// Get the output size in bytes for this hash function.
    fn output_size(&self) -> usize {
        self.algorithm().output_size()
    }

    /// Get the algorithm this hash implements.
    fn algorithm(&self) -> HashAlgorithm;

    /// Reset the hash state to empty.
    fn reset(&mut self);
}
