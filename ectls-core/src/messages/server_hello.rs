//! ServerHello message (RFC 5246 Section 7.4.1.3).

use crate::error::{Error, Result};
use crate::extensions::Extensions;
use crate::handshake_io::Reader;
use crate::protocol::ProtocolVersion;
use crate::tls12::cipher_suites::CipherSuite;
use bytes::{BufMut, BytesMut};

/// ServerHello message.
///
/// ```text
/// struct {
///     ProtocolVersion server_version;
///     Random random;
///     SessionID session_id;
///     CipherSuite cipher_suite;
///     CompressionMethod compression_method;
///     Extension extensions<0..2^16-1>;
/// } ServerHello;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Version chosen by the server
    pub server_version: ProtocolVersion,

    /// Random bytes (32 bytes)
    pub random: [u8; 32],

    /// Session ID assigned by the server
    pub session_id: Vec<u8>,

    /// Selected cipher suite
    pub cipher_suite: CipherSuite,

    /// Selected compression method
    pub compression_method: u8,

    /// Extensions (the block may be absent on the wire)
    pub extensions: Extensions,
}

impl ServerHello {
    /// Create a new ServerHello.
    pub fn new(random: [u8; 32], cipher_suite: CipherSuite) -> Self {
        Self {
            server_version: ProtocolVersion::Tls12,
            random,
            session_id: Vec::new(),
            cipher_suite,
            compression_method: 0,
            extensions: Extensions::new(),
        }
    }

    /// Replace the extension list.
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Encode the ServerHello body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > 32 {
            return Err(Error::MalformedMessage("session id too long".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u16(self.server_version.to_u16());
        buf.put_slice(&self.random);
        buf.put_u8(self.session_id.len() as u8);
        buf.put_slice(&self.session_id);
        buf.put_u16(self.cipher_suite.to_u16());
        buf.put_u8(self.compression_method);
        if !self.extensions.is_empty() {
            buf.put_slice(&self.extensions.encode()?);
        }
        Ok(buf.to_vec())
    }

    /// Decode a ServerHello body.
    ///
    /// A suite code this crate does not implement fails with
    /// [`Error::UnsupportedCipherSuite`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let version_raw = reader.u16()?;
        let server_version = ProtocolVersion::from_u16(version_raw).ok_or_else(|| {
            Error::MalformedMessage(format!("invalid server version 0x{:04x}", version_raw))
        })?;

        let mut random = [0u8; 32];
        random.copy_from_slice(reader.bytes(32)?);

        let session_id = reader.vec_u8()?;
        if session_id.len() > 32 {
            return Err(Error::MalformedMessage("session id too long".into()));
        }

        let suite_raw = reader.u16()?;
        let cipher_suite =
            CipherSuite::from_u16(suite_raw).ok_or(Error::UnsupportedCipherSuite(suite_raw))?;

        let compression_method = reader.u8()?;

        let extensions = if reader.is_empty() {
            Extensions::new()
        } else {
            let rest = reader.bytes(reader.remaining())?;
            Extensions::decode(rest)?
        };

        Ok(Self {
            server_version,
            random,
            session_id: session_id.to_vec(),
            cipher_suite,
            compression_method,
            extensions,
        })
    }
}
