//! Error types for the ectls handshake engine.

use core::fmt;

/// Result type for ectls operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during a handshake or on the record layer.
///
/// Every variant is fatal: the connection is aborted and any derived key
/// material is dropped. Nothing in the engine retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration
    InvalidConfig(String),

    /// Truncated buffer or invalid required field
    MalformedMessage(String),

    /// Algorithm unknown or not registered
    UnsupportedAlgorithm(String),

    /// ServerKeyExchange named a curve type or curve we cannot use
    UnsupportedCurve(u16),

    /// Cipher suite code point unknown to the engine
    UnsupportedCipherSuite(u16),

    /// Server chose a parameter the client never offered
    NegotiationFailed(String),

    /// Message arrived out of order (protocol-sequence error)
    UnexpectedMessage(String),

    /// ServerKeyExchange signature did not verify
    SignatureVerificationFailed,

    /// Peer Finished verify data did not match
    FinishedVerificationFailed,

    /// Record could not be decrypted or authenticated
    DecryptionFailed,

    /// Record exceeded the maximum fragment size
    RecordOverflow,

    /// Transport read/write failure, EOF or timeout
    IoError(String),

    /// Fatal alert received from peer
    AlertReceived(AlertDescription),

    /// Cryptographic backend error
    CryptoError(String),

    /// Unsupported feature
    UnsupportedFeature(String),

    /// Internal error
    InternalError(String),
}

impl Error {
    /// Alert to send to the peer before aborting, if any.
    ///
    /// Transport failures and alerts from the peer get none. Integrity
    /// failures all map to `bad_record_mac` so the peer learns nothing about
    /// which check failed.
    pub fn alert_description(&self) -> Option<AlertDescription> {
        match self {
            Error::MalformedMessage(_) => Some(AlertDescription::DecodeError),
            Error::UnsupportedAlgorithm(_)
            | Error::UnsupportedCipherSuite(_)
            | Error::NegotiationFailed(_) => Some(AlertDescription::HandshakeFailure),
            Error::UnsupportedCurve(_) => Some(AlertDescription::IllegalParameter),
            Error::UnexpectedMessage(_) => Some(AlertDescription::UnexpectedMessage),
            Error::SignatureVerificationFailed | Error::FinishedVerificationFailed => {
                Some(AlertDescription::DecryptError)
            },
            Error::DecryptionFailed => Some(AlertDescription::BadRecordMac),
            Error::RecordOverflow => Some(AlertDescription::RecordOverflow),
            Error::CryptoError(_) | Error::InternalError(_) => {
                Some(AlertDescription::InternalError)
            },
            Error::UnsupportedFeature(_) => Some(AlertDescription::HandshakeFailure),
            Error::InvalidConfig(_) | Error::IoError(_) | Error::AlertReceived(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::MalformedMessage(msg) => write!(f, "Malformed message: {}", msg),
            Error::UnsupportedAlgorithm(msg) => write!(f, "Unsupported algorithm: {}", msg),
            Error::UnsupportedCurve(id) => write!(f, "Unsupported curve: 0x{:04x}", id),
            Error::UnsupportedCipherSuite(id) => {
                write!(f, "Unsupported cipher suite: 0x{:04x}", id)
            },
            Error::NegotiationFailed(msg) => write!(f, "Negotiation failed: {}", msg),
            Error::UnexpectedMessage(msg) => write!(f, "Unexpected message: {}", msg),
            Error::SignatureVerificationFailed => {
                write!(f, "Server key exchange signature verification failed")
            },
            Error::FinishedVerificationFailed => write!(f, "Finished verification failed"),
            Error::DecryptionFailed => write!(f, "Decryption failed"),
            Error::RecordOverflow => write!(f, "Record overflow"),
            Error::IoError(msg) => write!(f, "I/O error: {}", msg),
            Error::AlertReceived(desc) => write!(f, "Alert received: {:?}", desc),
            Error::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            Error::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {}", msg),
            Error::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<ectls_crypto::Error> for Error {
    fn from(e: ectls_crypto::Error) -> Self {
        match e {
            ectls_crypto::Error::UnsupportedAlgorithm(msg) => Error::UnsupportedAlgorithm(msg),
            ectls_crypto::Error::AuthenticationFailed => Error::DecryptionFailed,
            ectls_crypto::Error::SignatureVerificationFailed
            | ectls_crypto::Error::InvalidSignature => Error::SignatureVerificationFailed,
            ectls_crypto::Error::InvalidPublicKey => {
                Error::MalformedMessage("invalid public key".into())
            },
            other => Error::CryptoError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

/// TLS alert descriptions (RFC 5246 Section 7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertDescription {
    /// Close notify
    CloseNotify = 0,

    /// Unexpected message
    UnexpectedMessage = 10,

    /// Bad record MAC
    BadRecordMac = 20,

    /// Record overflow
    RecordOverflow = 22,

    /// Handshake failure
    HandshakeFailure = 40,

    /// Bad certificate
    BadCertificate = 42,

    /// Unsupported certificate
    UnsupportedCertificate = 43,

    /// Certificate unknown
    CertificateUnknown = 46,

    /// Illegal parameter
    IllegalParameter = 47,

    /// Decode error
    DecodeError = 50,

    /// Decrypt error
    DecryptError = 51,

    /// Protocol version
    ProtocolVersion = 70,

    /// Insufficient security
    InsufficientSecurity = 71,

    /// Internal error
    InternalError = 80,

    /// User canceled
    UserCanceled = 90,

    /// No renegotiation
    NoRenegotiation = 100,

    /// Unsupported extension
    UnsupportedExtension = 110,
}

impl AlertDescription {
    /// Convert from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AlertDescription::CloseNotify),
            10 => Some(AlertDescription::UnexpectedMessage),
            20 => Some(AlertDescription::BadRecordMac),
            22 => Some(AlertDescription::RecordOverflow),
            40 => Some(AlertDescription::HandshakeFailure),
            42 => Some(AlertDescription::BadCertificate),
            43 => Some(AlertDescription::UnsupportedCertificate),
            46 => Some(AlertDescription::CertificateUnknown),
            47 => Some(AlertDescription::IllegalParameter),
            50 => Some(AlertDescription::DecodeError),
            51 => Some(AlertDescription::DecryptError),
            70 => Some(AlertDescription::ProtocolVersion),
            71 => Some(AlertDescription::InsufficientSecurity),
            80 => Some(AlertDescription::InternalError),
            90 => Some(AlertDescription::UserCanceled),
            100 => Some(AlertDescription::NoRenegotiation),
            110 => Some(AlertDescription::UnsupportedExtension),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}
