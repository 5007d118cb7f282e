//! TLS 1.2 Cipher Suite Definitions
//!
//! A TLS 1.2 cipher suite names the whole construction:
//! - Key exchange (always ECDHE here)
//! - Authentication (RSA or ECDSA signature over the server's ECDH params)
//! - Bulk cipher (AES-CBC or AES-GCM)
//! - MAC (HMAC, CBC suites only) and PRF hash
//!
//! Format: TLS_{KeyExchange}_{Authentication}_WITH_{Encryption}_{Hash}

use ectls_crypto::{CipherAlgorithm, CipherMode, HashAlgorithm, PrfAlgorithm, SignatureFamily};

/// TLS 1.2 ECDHE cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CipherSuite {
    /// TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 (0xC02B) - RFC 5289
    EcdheEcdsaWithAes128GcmSha256 = 0xC02B,

    /// TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 (0xC02C) - RFC 5289
    EcdheEcdsaWithAes256GcmSha384 = 0xC02C,

    /// TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256 (0xC02F) - RFC 5289
    EcdheRsaWithAes128GcmSha256 = 0xC02F,

    /// TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384 (0xC030) - RFC 5289
    EcdheRsaWithAes256GcmSha384 = 0xC030,

    /// TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256 (0xC023) - RFC 5289
    EcdheEcdsaWithAes128CbcSha256 = 0xC023,

    /// TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384 (0xC024) - RFC 5289
    EcdheEcdsaWithAes256CbcSha384 = 0xC024,

    /// TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256 (0xC027) - RFC 5289
    EcdheRsaWithAes128CbcSha256 = 0xC027,

    /// TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384 (0xC028) - RFC 5289
    EcdheRsaWithAes256CbcSha384 = 0xC028,
}

impl CipherSuite {
    /// Every suite, AEAD first, in default preference order.
    pub const ALL: [CipherSuite; 8] = [
        CipherSuite::EcdheEcdsaWithAes128GcmSha256,
        CipherSuite::EcdheRsaWithAes128GcmSha256,
        CipherSuite::EcdheEcdsaWithAes256GcmSha384,
        CipherSuite::EcdheRsaWithAes256GcmSha384,
        CipherSuite::EcdheEcdsaWithAes128CbcSha256,
        CipherSuite::EcdheRsaWithAes128CbcSha256,
        CipherSuite::EcdheEcdsaWithAes256CbcSha384,
        CipherSuite::EcdheRsaWithAes256CbcSha384,
    ];

    /// Create from wire format (u16 big-endian).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0xC02B => Some(CipherSuite::EcdheEcdsaWithAes128GcmSha256),
            0xC02C => Some(CipherSuite::EcdheEcdsaWithAes256GcmSha384),
            0xC02F => Some(CipherSuite::EcdheRsaWithAes128GcmSha256),
            0xC030 => Some(CipherSuite::EcdheRsaWithAes256GcmSha384),
            0xC023 => Some(CipherSuite::EcdheEcdsaWithAes128CbcSha256),
            0xC024 => Some(CipherSuite::EcdheEcdsaWithAes256CbcSha384),
            0xC027 => Some(CipherSuite::EcdheRsaWithAes128CbcSha256),
            0xC028 => Some(CipherSuite::EcdheRsaWithAes256CbcSha384),
            _ => None,
        }
    }

    /// Convert to wire format (u16 big-endian).
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Look up a suite by its IANA name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Bulk cipher.
    pub const fn cipher_algorithm(self) -> CipherAlgorithm {
        match self {
            CipherSuite::EcdheEcdsaWithAes128GcmSha256 | CipherSuite::EcdheRsaWithAes128GcmSha256 => {
                CipherAlgorithm::Aes128Gcm
            },
            CipherSuite::EcdheEcdsaWithAes256GcmSha384 | CipherSuite::EcdheRsaWithAes256GcmSha384 => {
                CipherAlgorithm::Aes256Gcm
            },
            CipherSuite::EcdheEcdsaWithAes128CbcSha256 | CipherSuite::EcdheRsaWithAes128CbcSha256 => {
                CipherAlgorithm::Aes128Cbc
            },
            CipherSuite::EcdheEcdsaWithAes256CbcSha384 | CipherSuite::EcdheRsaWithAes256CbcSha384 => {
                CipherAlgorithm::Aes256Cbc
            },
        }
    }

    /// Record protection mode.
    pub const fn mode(self) -> CipherMode {
        self.cipher_algorithm().mode()
    }

    /// True for AEAD suites.
    pub const fn is_aead(self) -> bool {
        matches!(self.mode(), CipherMode::Aead)
    }

    /// PRF algorithm.
    pub const fn prf_algorithm(self) -> PrfAlgorithm {
        match self {
            CipherSuite::EcdheEcdsaWithAes128GcmSha256
            | CipherSuite::EcdheRsaWithAes128GcmSha256
            | CipherSuite::EcdheEcdsaWithAes128CbcSha256
            | CipherSuite::EcdheRsaWithAes128CbcSha256 => PrfAlgorithm::TlsPrfSha256,
            CipherSuite::EcdheEcdsaWithAes256GcmSha384
            | CipherSuite::EcdheRsaWithAes256GcmSha384
            | CipherSuite::EcdheEcdsaWithAes256CbcSha384
            | CipherSuite::EcdheRsaWithAes256CbcSha384 => PrfAlgorithm::TlsPrfSha384,
        }
    }

    /// Hash driving the PRF and the transcript.
    pub const fn prf_hash(self) -> HashAlgorithm {
        self.prf_algorithm().hash_algorithm()
    }

    /// Record MAC hash; `None` for AEAD suites.
    pub const fn mac_algorithm(self) -> Option<HashAlgorithm> {
        match self.mode() {
            CipherMode::Aead => None,
            CipherMode::Cbc => Some(self.prf_hash()),
        }
    }

    /// Record MAC length (0 for AEAD).
    pub const fn mac_len(self) -> usize {
        match self.mac_algorithm() {
            Some(hash) => hash.output_size(),
            None => 0,
        }
    }

    /// Bulk key length.
    pub const fn key_len(self) -> usize {
        self.cipher_algorithm().key_len()
    }

    /// IV length taken from the key block.
    ///
    /// CBC suites carry a fresh explicit IV per record and take none.
    pub const fn fixed_iv_len(self) -> usize {
        self.cipher_algorithm().fixed_iv_len()
    }

    /// Total key block length: 2 * (mac + key + fixed IV).
    pub const fn key_block_len(self) -> usize {
        2 * (self.mac_len() + self.key_len() + self.fixed_iv_len())
    }

    /// Public-key family that must sign the ServerKeyExchange.
    pub const fn signature_family(self) -> SignatureFamily {
        match self {
            CipherSuite::EcdheEcdsaWithAes128GcmSha256
            | CipherSuite::EcdheEcdsaWithAes256GcmSha384
            | CipherSuite::EcdheEcdsaWithAes128CbcSha256
            | CipherSuite::EcdheEcdsaWithAes256CbcSha384 => SignatureFamily::Ecdsa,
            CipherSuite::EcdheRsaWithAes128GcmSha256
            | CipherSuite::EcdheRsaWithAes256GcmSha384
            | CipherSuite::EcdheRsaWithAes128CbcSha256
            | CipherSuite::EcdheRsaWithAes256CbcSha384 => SignatureFamily::Rsa,
        }
    }

    /// Get cipher suite name as a string.
    pub const fn name(self) -> &'static str {
        match self {
            CipherSuite::EcdheEcdsaWithAes128GcmSha256 => "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
            CipherSuite::EcdheEcdsaWithAes256GcmSha384 => "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
            CipherSuite::EcdheRsaWithAes128GcmSha256 => "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
            CipherSuite::EcdheRsaWithAes256GcmSha384 => "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
            CipherSuite::EcdheEcdsaWithAes128CbcSha256 => "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256",
            CipherSuite::EcdheEcdsaWithAes256CbcSha384 => "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384",
            CipherSuite::EcdheRsaWithAes128CbcSha256 => "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256",
            CipherSuite::EcdheRsaWithAes256CbcSha384 => "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384",
        }
    }
}

impl core::fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_suite_conversion() {
        for suite in CipherSuite::ALL {
            assert_eq!(CipherSuite::from_u16(suite.to_u16()), Some(suite));
            assert_eq!(CipherSuite::from_name(suite.name()), Some(suite));
        }
        assert_eq!(CipherSuite::from_u16(0xCCA8), None);
        assert_eq!(CipherSuite::from_u16(0x002F), None);
    }

    #[test]
    fn test_key_block_lengths() {
        // AES-128-GCM: 2 * (0 + 16 + 4)
        assert_eq!(CipherSuite::EcdheRsaWithAes128GcmSha256.key_block_len(), 40);
        // AES-256-GCM: 2 * (0 + 32 + 4)
        assert_eq!(CipherSuite::EcdheEcdsaWithAes256GcmSha384.key_block_len(), 72);
        // AES-128-CBC/HMAC-SHA256: 2 * (32 + 16 + 0)
        assert_eq!(CipherSuite::EcdheRsaWithAes128CbcSha256.key_block_len(), 96);
        // AES-256-CBC/HMAC-SHA384: 2 * (48 + 32 + 0)
        assert_eq!(CipherSuite::EcdheEcdsaWithAes256CbcSha384.key_block_len(), 160);
    }

    #[test]
    fn test_suite_parameters() {
        let gcm = CipherSuite::EcdheEcdsaWithAes128GcmSha256;
        assert!(gcm.is_aead());
        assert_eq!(gcm.mac_algorithm(), None);
        assert_eq!(gcm.prf_hash(), HashAlgorithm::Sha256);
        assert_eq!(gcm.signature_family(), SignatureFamily::Ecdsa);

        let cbc = CipherSuite::EcdheRsaWithAes256CbcSha384;
        assert!(!cbc.is_aead());
        assert_eq!(cbc.mac_algorithm(), Some(HashAlgorithm::Sha384));
        assert_eq!(cbc.mac_len(), 48);
        assert_eq!(cbc.prf_algorithm(), PrfAlgorithm::TlsPrfSha384);
        assert_eq!(cbc.signature_family(), SignatureFamily::Rsa);
    }
}
