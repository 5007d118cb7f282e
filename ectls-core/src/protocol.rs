//! TLS protocol constants and types.

/// TLS protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ProtocolVersion {
    /// TLS 1.0 (RFC 2246), only seen in the record header of a first flight
    Tls10 = 0x0301,

    /// TLS 1.1 (RFC 4346)
    Tls11 = 0x0302,

    /// TLS 1.2 (RFC 5246)
    Tls12 = 0x0303,
}

impl ProtocolVersion {
    /// Create from wire format (u16 big-endian).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0301 => Some(ProtocolVersion::Tls10),
            0x0302 => Some(ProtocolVersion::Tls11),
            0x0303 => Some(ProtocolVersion::Tls12),
            _ => None,
        }
    }

    /// Convert to wire format (u16 big-endian).
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Major version byte.
    pub const fn major(self) -> u8 {
        (self.to_u16() >> 8) as u8
    }

    /// Minor version byte.
    pub const fn minor(self) -> u8 {
        self.to_u16() as u8
    }

    /// Get the protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            ProtocolVersion::Tls10 => "TLS 1.0",
            ProtocolVersion::Tls11 => "TLS 1.1",
            ProtocolVersion::Tls12 => "TLS 1.2",
        }
    }
}

/// TLS content type (RFC 5246 Section 6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    /// Change cipher spec (20)
    ChangeCipherSpec = 20,

    /// Alert (21)
    Alert = 21,

    /// Handshake (22)
    Handshake = 22,

    /// Application data (23)
    ApplicationData = 23,
}

impl ContentType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            20 => Some(ContentType::ChangeCipherSpec),
            21 => Some(ContentType::Alert),
            22 => Some(ContentType::Handshake),
            23 => Some(ContentType::ApplicationData),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Handshake message type (RFC 5246 Section 7.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandshakeType {
    /// HelloRequest (0)
    HelloRequest = 0,

    /// ClientHello (1)
    ClientHello = 1,

    /// ServerHello (2)
    ServerHello = 2,

    /// Certificate (11)
    Certificate = 11,

    /// ServerKeyExchange (12)
    ServerKeyExchange = 12,

    /// CertificateRequest (13)
    CertificateRequest = 13,

    /// ServerHelloDone (14)
    ServerHelloDone = 14,

    /// CertificateVerify (15)
    CertificateVerify = 15,

    /// ClientKeyExchange (16)
    ClientKeyExchange = 16,

    /// Finished (20)
    Finished = 20,
}

impl HandshakeType {
    /// Create from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HandshakeType::HelloRequest),
            1 => Some(HandshakeType::ClientHello),
            2 => Some(HandshakeType::ServerHello),
            11 => Some(HandshakeType::Certificate),
            12 => Some(HandshakeType::ServerKeyExchange),
            13 => Some(HandshakeType::CertificateRequest),
            14 => Some(HandshakeType::ServerHelloDone),
            15 => Some(HandshakeType::CertificateVerify),
            16 => Some(HandshakeType::ClientKeyExchange),
            20 => Some(HandshakeType::Finished),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// TLS extension type (IANA registry subset relevant to TLS 1.2 clients).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ExtensionType {
    /// server_name (0)
    ServerName = 0,

    /// max_fragment_length (1)
    MaxFragmentLength = 1,

    /// status_request (5)
    StatusRequest = 5,

    /// elliptic_curves (10), renamed supported_groups later
    EllipticCurves = 10,

    /// ec_point_formats (11)
    EcPointFormats = 11,

    /// signature_algorithms (13)
    SignatureAlgorithms = 13,

    /// application_layer_protocol_negotiation (16)
    ApplicationLayerProtocolNegotiation = 16,

    /// signed_certificate_timestamp (18)
    SignedCertificateTimestamp = 18,

    /// padding (21)
    Padding = 21,

    /// encrypt_then_mac (22)
    EncryptThenMac = 22,

    /// extended_master_secret (23)
    ExtendedMasterSecret = 23,

    /// session_ticket (35)
    SessionTicket = 35,

    /// renegotiation_info (0xff01)
    RenegotiationInfo = 0xff01,
}

impl ExtensionType {
    /// Create from wire format (u16).
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(ExtensionType::ServerName),
            1 => Some(ExtensionType::MaxFragmentLength),
            5 => Some(ExtensionType::StatusRequest),
            10 => Some(ExtensionType::EllipticCurves),
            11 => Some(ExtensionType::EcPointFormats),
            13 => Some(ExtensionType::SignatureAlgorithms),
            16 => Some(ExtensionType::ApplicationLayerProtocolNegotiation),
            18 => Some(ExtensionType::SignedCertificateTimestamp),
            21 => Some(ExtensionType::Padding),
            22 => Some(ExtensionType::EncryptThenMac),
            23 => Some(ExtensionType::ExtendedMasterSecret),
            35 => Some(ExtensionType::SessionTicket),
            0xff01 => Some(ExtensionType::RenegotiationInfo),
            _ => None,
        }
    }

    /// Convert to wire format (u16).
    pub const fn to_u16(self) -> u16 {
        self as u16
    }
}
