//! Error types for the algorithm providers.

use std::fmt;

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested algorithm is unknown or not registered.
    UnsupportedAlgorithm(String),

    /// Invalid key size for the algorithm.
    InvalidKeySize {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Invalid nonce/IV size for the algorithm.
    InvalidNonceSize {
        /// Expected nonce size in bytes
        expected: usize,
        /// Actual nonce size in bytes
        actual: usize,
    },

    /// Input is not a multiple of the cipher block size.
    InvalidLength,

    /// Authentication tag verification failed (AEAD).
    AuthenticationFailed,

    /// Signature verification failed.
    SignatureVerificationFailed,

    /// Invalid signature encoding.
    InvalidSignature,

    /// Invalid or off-curve public key.
    InvalidPublicKey,

    /// Invalid private key.
    InvalidPrivateKey,

    /// Key exchange failed.
    KeyExchangeFailed,

    /// Random number generation failed.
    RandomGenerationFailed,

    /// Registry construction or lookup error.
    Registry(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedAlgorithm(s) => write!(f, "Algorithm not supported: {}", s),
            Error::InvalidKeySize { expected, actual } => {
                write!(
                    f,
                    "Invalid key size: expected {} bytes, got {}",
                    expected, actual
                )
            },
            Error::InvalidNonceSize { expected, actual } => {
                write!(
                    f,
                    "Invalid nonce size: expected {} bytes, got {}",
                    expected, actual
                )
            },
            Error::InvalidLength => write!(f, "Input length is not block aligned"),
            Error::AuthenticationFailed => write!(f, "Authentication tag verification failed"),
            Error::SignatureVerificationFailed => write!(f, "Signature verification failed"),
            Error::InvalidSignature => write!(f, "Invalid signature format"),
            Error::InvalidPublicKey => write!(f, "Invalid public key"),
            Error::InvalidPrivateKey => write!(f, "Invalid private key"),
            Error::KeyExchangeFailed => write!(f, "Key exchange failed"),
            Error::RandomGenerationFailed => write!(f, "Random number generation failed"),
            Error::Registry(msg) => write!(f, "Provider registry error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
