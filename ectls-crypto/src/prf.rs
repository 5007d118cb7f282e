//! TLS 1.2 PRF algorithm identifiers.
//!
//! The PRF itself (P_hash over HMAC) lives in the core crate's key schedule;
//! the provider layer only has to know which HMAC drives it.

use crate::HashAlgorithm;

/// PRF algorithms usable for TLS 1.2 key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrfAlgorithm {
    /// P_SHA256, the default TLS 1.2 PRF
    TlsPrfSha256,
    /// P_SHA384, used by SHA-384 cipher suites
    TlsPrfSha384,
}

impl PrfAlgorithm {
    /// Every variant.
    pub const ALL: [PrfAlgorithm; 2] = [PrfAlgorithm::TlsPrfSha256, PrfAlgorithm::TlsPrfSha384];

    /// The HMAC hash driving P_hash.
    pub const fn hash_algorithm(self) -> HashAlgorithm {
        match self {
            PrfAlgorithm::TlsPrfSha256 => HashAlgorithm::Sha256,
            PrfAlgorithm::TlsPrfSha384 => HashAlgorithm::Sha384,
        }
    }

    /// Name of the algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            PrfAlgorithm::TlsPrfSha256 => "P_SHA256",
            PrfAlgorithm::TlsPrfSha384 => "P_SHA384",
        }
    }

    /// Look up a PRF by name or by the name of the HMAC driving it.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "P_SHA256" | "HmacSHA256" => Some(PrfAlgorithm::TlsPrfSha256),
            "P_SHA384" | "HmacSHA384" => Some(PrfAlgorithm::TlsPrfSha384),
            _ => None,
        }
    }
}
