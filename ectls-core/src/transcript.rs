//! Handshake transcript hash.
//!
//! The transcript is a running digest over every handshake message (4-byte
//! header included) from ClientHello up to the message being verified.
//! ChangeCipherSpec is not a handshake message and is never hashed.
//!
//! The digest algorithm is the PRF hash of the negotiated suite, which is
//! only known once ServerHello has been parsed. Messages arriving before
//! that are buffered and replayed when the transcript is seeded.

use core::fmt;

use ectls_crypto::{Hash, HashAlgorithm, ProviderRegistry};

use crate::error::{Error, Result};

/// Running transcript hash.
pub enum TranscriptHash {
    /// Suite not yet negotiated: raw messages are kept.
    Pending(Vec<Vec<u8>>),
    /// Hash chosen: messages are streamed into the digest.
    Running(Box<dyn Hash>),
}

impl TranscriptHash {
    /// Create an unseeded transcript.
    pub fn new() -> Self {
        TranscriptHash::Pending(Vec::new())
    }

    /// Add an encoded handshake message (header included).
    pub fn update(&mut self, message: &[u8]) {
        match self {
            TranscriptHash::Pending(messages) => messages.push(message.to_vec()),
            TranscriptHash::Running(hash) => hash.update(message),
        }
    }

    /// Fix the hash algorithm and replay every buffered message into it.
    pub fn seed(&mut self, registry: &ProviderRegistry, algorithm: HashAlgorithm) -> Result<()> {
        let TranscriptHash::Pending(messages) = self else {
            return Err(Error::InternalError("transcript already seeded".into()));
        };

        let mut hash = registry.hash(algorithm)?;
        for message in messages.iter() {
            hash.update(message);
        }
        *self = TranscriptHash::Running(hash);
        Ok(())
    }

    /// Hash of every message added so far; the transcript keeps running.
    pub fn current_hash(&self) -> Result<Vec<u8>> {
        match self {
            TranscriptHash::Pending(_) => {
                Err(Error::InternalError("transcript hash algorithm not yet known".into()))
            },
            TranscriptHash::Running(hash) => Ok(hash.snapshot()),
        }
    }

    /// The hash algorithm, once seeded.
    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        match self {
            TranscriptHash::Pending(_) => None,
            TranscriptHash::Running(hash) => Some(hash.algorithm()),
        }
    }
}

impl Default for TranscriptHash {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TranscriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptHash::Pending(messages) => {
                f.debug_tuple("Pending").field(&messages.len()).finish()
            },
            TranscriptHash::Running(hash) => f.debug_tuple("Running").field(&hash.algorithm()).finish(),
        }
    }
}
