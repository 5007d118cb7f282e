//! # ectls Core
//!
//! Client-side TLS 1.2 handshake engine with ECDHE key exchange.
//!
//! This crate contains:
//! - Record framing and CBC/AEAD record protection
//! - Handshake message codec
//! - The TLS 1.2 PRF key schedule
//! - The client handshake state machine and its blocking driver
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Public API (ectls)              │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │       ectls-core (this crate)           │
//! │  ┌──────────────────────────────────┐   │
//! │  │   Handshaker / ClientConnection  │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   ClientHandshake state machine  │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Message codec  │  Key schedule │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Record layer                   │   │
//! │  └──────────────────────────────────┘   │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │      ectls-crypto (ProviderRegistry)    │
//! └─────────────────────────────────────────┘
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]
#![forbid(unsafe_code)]

// Re-export crypto interface
pub use ectls_crypto;

pub mod alert;
pub mod error;
pub mod extensions;
pub mod handshake_io;
pub mod messages;
pub mod protocol;
pub mod record;
pub mod tls12;
pub mod transcript;
pub mod transport;

pub use error::{AlertDescription, Error, Result};
pub use protocol::{ContentType, ProtocolVersion};
pub use tls12::{CipherSuite, DirectionKeys, Handshaker, SessionKeys};
pub use transport::Transport;

use ectls_crypto::{NamedCurve, SignatureAlgorithm};
use record::MAX_FRAGMENT_SIZE;

/// Smallest fragment length accepted in configuration (RFC 6066).
pub const MIN_FRAGMENT_LENGTH: u16 = 512;

/// Client handshake configuration.
///
/// # Example
///
/// ```rust
/// use ectls_core::{CipherSuite, ClientConfig};
///
/// let config = ClientConfig::builder()
///     .with_cipher_suites(&[CipherSuite::EcdheEcdsaWithAes128GcmSha256])
///     .with_server_name("example.com")
///     .build()
///     .unwrap();
/// assert_eq!(config.cipher_suites.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Cipher suites in preference order
    pub cipher_suites: Vec<CipherSuite>,

    /// Curves offered for ECDHE, in preference order
    pub curves: Vec<NamedCurve>,

    /// Signature algorithms accepted on ServerKeyExchange
    pub signature_algorithms: Vec<SignatureAlgorithm>,

    /// Host name sent in server_name
    pub server_name: Option<String>,

    /// Largest plaintext fragment written (default: 16384)
    pub max_fragment_length: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cipher_suites: CipherSuite::ALL.to_vec(),
            curves: NamedCurve::ALL.to_vec(),
            signature_algorithms: SignatureAlgorithm::ALL.to_vec(),
            server_name: None,
            max_fragment_length: MAX_FRAGMENT_SIZE as u16,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the cipher suites.
    pub fn with_cipher_suites(mut self, suites: &[CipherSuite]) -> Self {
        self.config.cipher_suites = suites.to_vec();
        self
    }

    /// Set the ECDHE curves.
    pub fn with_curves(mut self, curves: &[NamedCurve]) -> Self {
        self.config.curves = curves.to_vec();
        self
    }

    /// Set the accepted signature algorithms.
    pub fn with_signature_algorithms(mut self, algorithms: &[SignatureAlgorithm]) -> Self {
        self.config.signature_algorithms = algorithms.to_vec();
        self
    }

    /// Send server_name with this host.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.config.server_name = Some(name.into());
        self
    }

    /// Set maximum fragment length.
    pub fn with_max_fragment_length(mut self, length: u16) -> Self {
        self.config.max_fragment_length = length;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ClientConfig> {
        let config = self.config;

        if config.cipher_suites.is_empty() {
            return Err(Error::InvalidConfig("No cipher suites specified".into()));
        }
        if config.curves.is_empty() {
            return Err(Error::InvalidConfig("No curves specified".into()));
        }
        if config.signature_algorithms.is_empty() {
            return Err(Error::InvalidConfig(
                "No signature algorithms specified".into(),
            ));
        }

        if usize::from(config.max_fragment_length) > MAX_FRAGMENT_SIZE
            || config.max_fragment_length < MIN_FRAGMENT_LENGTH
        {
            return Err(Error::InvalidConfig(format!(
                "Max fragment length must be between {} and {}",
                MIN_FRAGMENT_LENGTH, MAX_FRAGMENT_SIZE
            )));
        }

        if let Some(name) = &config.server_name {
            if name.is_empty() || name.len() > 255 || !name.is_ascii() {
                return Err(Error::InvalidConfig(format!("Invalid server name {:?}", name)));
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.cipher_suites.len(), 8);
        assert!(config.cipher_suites[0].is_aead());
        assert_eq!(
            config.curves,
            vec![NamedCurve::Secp256r1, NamedCurve::Secp384r1]
        );
        assert_eq!(config.max_fragment_length, 16384);
        assert_eq!(config.server_name, None);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .with_cipher_suites(&[CipherSuite::EcdheRsaWithAes256CbcSha384])
            .with_curves(&[NamedCurve::Secp384r1])
            .with_signature_algorithms(&[SignatureAlgorithm::RsaPkcs1Sha384])
            .with_server_name("example.com")
            .with_max_fragment_length(4096)
            .build()
            .unwrap();

        assert_eq!(
            config.cipher_suites,
            vec![CipherSuite::EcdheRsaWithAes256CbcSha384]
        );
        assert_eq!(config.server_name.as_deref(), Some("example.com"));
        assert_eq!(config.max_fragment_length, 4096);
    }

    #[test]
    fn test_config_validation() {
        assert!(ClientConfig::builder().with_cipher_suites(&[]).build().is_err());
        assert!(ClientConfig::builder().with_curves(&[]).build().is_err());
        assert!(ClientConfig::builder()
            .with_signature_algorithms(&[])
            .build()
            .is_err());
        assert!(ClientConfig::builder()
            .with_max_fragment_length(20000)
            .build()
            .is_err());
        assert!(ClientConfig::builder()
            .with_max_fragment_length(100)
            .build()
            .is_err());
        assert!(ClientConfig::builder().with_server_name("").build().is_err());
    }
}
