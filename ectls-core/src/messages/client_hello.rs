//! ClientHello message (RFC 5246 Section 7.4.1.2).

use crate::error::{Error, Result};
use crate::extensions::Extensions;
use crate::handshake_io::Reader;
use crate::protocol::ProtocolVersion;
use crate::tls12::cipher_suites::CipherSuite;
use bytes::{BufMut, BytesMut};

/// ClientHello message.
///
/// ```text
/// struct {
///     ProtocolVersion client_version;
///     Random random;
///     SessionID session_id;
///     CipherSuite cipher_suites<2..2^16-2>;
///     CompressionMethod compression_methods<1..2^8-1>;
///     Extension extensions<0..2^16-1>;
/// } ClientHello;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Highest version the client supports
    pub client_version: ProtocolVersion,

    /// Random bytes (32 bytes)
    pub random: [u8; 32],

    /// Session ID (always empty: no resumption)
    pub session_id: Vec<u8>,

    /// Cipher suites offered, in preference order
    pub cipher_suites: Vec<CipherSuite>,

    /// Compression methods (always `[0]`)
    pub compression_methods: Vec<u8>,

    /// Extensions
    pub extensions: Extensions,
}

impl ClientHello {
    /// Create a new ClientHello.
    pub fn new(random: [u8; 32], cipher_suites: Vec<CipherSuite>) -> Self {
        Self {
            client_version: ProtocolVersion::Tls12,
            random,
            session_id: Vec::new(),
            cipher_suites,
            compression_methods: vec![0],
            extensions: Extensions::new(),
        }
    }

    /// Replace the extension list.
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Encode the ClientHello body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > 32 {
            return Err(Error::MalformedMessage("session id too long".into()));
        }
        if self.cipher_suites.is_empty() || self.cipher_suites.len() > 32767 {
            return Err(Error::MalformedMessage("invalid cipher suite count".into()));
        }
        if self.compression_methods.is_empty() || self.compression_methods.len() > 255 {
            return Err(Error::MalformedMessage("invalid compression methods".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u16(self.client_version.to_u16());
        buf.put_slice(&self.random);

        buf.put_u8(self.session_id.len() as u8);
        buf.put_slice(&self.session_id);

        buf.put_u16((self.cipher_suites.len() * 2) as u16);
        for suite in &self.cipher_suites {
            buf.put_u16(suite.to_u16());
        }

        buf.put_u8(self.compression_methods.len() as u8);
        buf.put_slice(&self.compression_methods);

        if !self.extensions.is_empty() {
            buf.put_slice(&self.extensions.encode()?);
        }

        Ok(buf.to_vec())
    }

    /// Decode a ClientHello body.
    ///
    /// Suites unknown to this crate are dropped from the list.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let version_raw = reader.u16()?;
        let client_version = ProtocolVersion::from_u16(version_raw).ok_or_else(|| {
            Error::MalformedMessage(format!("invalid client version 0x{:04x}", version_raw))
        })?;

        let mut random = [0u8; 32];
        random.copy_from_slice(reader.bytes(32)?);

        let session_id = reader.vec_u8()?;
        if session_id.len() > 32 {
            return Err(Error::MalformedMessage("session id too long".into()));
        }

        let suites_raw = reader.vec_u16()?;
        if suites_raw.is_empty() || suites_raw.len() % 2 != 0 {
            return Err(Error::MalformedMessage("invalid cipher suite list".into()));
        }
        let cipher_suites = suites_raw
            .chunks_exact(2)
            .filter_map(|c| CipherSuite::from_u16(u16::from_be_bytes([c[0], c[1]])))
            .collect();

        let compression_methods = reader.vec_u8()?.to_vec();
        if compression_methods.is_empty() {
            return Err(Error::MalformedMessage("no compression methods".into()));
        }

        let extensions = if reader.is_empty() {
            Extensions::new()
        } else {
            let rest = reader.bytes(reader.remaining())?;
            Extensions::decode(rest)?
        };

        Ok(Self {
            client_version,
            random,
            session_id: session_id.to_vec(),
            cipher_suites,
            compression_methods,
            extensions,
        })
    }
}
