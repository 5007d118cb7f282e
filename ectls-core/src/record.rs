//! TLS record framing (RFC 5246 Section 6.2).
//!
//! This module only deals with the 5-byte record header and fragment
//! boundaries. Record protection lives in [`crate::tls12::record`].

use crate::error::{Error, Result};
use crate::protocol::{ContentType, ProtocolVersion};

/// Size of the record header.
pub const RECORD_HEADER_SIZE: usize = 5;

/// Maximum plaintext fragment size (2^14).
pub const MAX_FRAGMENT_SIZE: usize = 16384;

/// Maximum protected fragment size (2^14 + 2048).
pub const MAX_CIPHERTEXT_SIZE: usize = MAX_FRAGMENT_SIZE + 2048;

/// Parsed record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Content type
    pub content_type: ContentType,

    /// Record-layer version
    pub version: ProtocolVersion,

    /// Fragment length
    pub length: usize,
}

impl RecordHeader {
    /// Decode and validate a record header.
    ///
    /// Any SSL 3.x record version is accepted; servers commonly answer a
    /// TLS 1.2 hello inside a TLS 1.0 record.
    pub fn decode(header: &[u8; RECORD_HEADER_SIZE]) -> Result<Self> {
        let content_type = ContentType::from_u8(header[0]).ok_or_else(|| {
            Error::UnexpectedMessage(format!("unknown content type {}", header[0]))
        })?;

        let version_raw = u16::from_be_bytes([header[1], header[2]]);
        let version = ProtocolVersion::from_u16(version_raw).ok_or_else(|| {
            Error::MalformedMessage(format!("invalid record version 0x{:04x}", version_raw))
        })?;

        let length = u16::from_be_bytes([header[3], header[4]]) as usize;
        if length > MAX_CIPHERTEXT_SIZE {
            return Err(Error::RecordOverflow);
        }

        Ok(Self {
            content_type,
            version,
            length,
        })
    }

    /// Encode the header.
    pub fn encode(&self) -> [u8; RECORD_HEADER_SIZE] {
        let version = self.version.to_u16().to_be_bytes();
        let length = (self.length as u16).to_be_bytes();
        [
            self.content_type.to_u8(),
            version[0],
            version[1],
            length[0],
            length[1],
        ]
    }
}

/// A single record as it appears on the wire.
///
/// The fragment is opaque here: plaintext before ChangeCipherSpec,
/// ciphertext after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPlaintext {
    /// Content type
    pub content_type: ContentType,

    /// Record-layer version
    pub version: ProtocolVersion,

    /// Fragment
    pub fragment: Vec<u8>,
}

impl TlsPlaintext {
    /// Create a new record.
    pub fn new(content_type: ContentType, version: ProtocolVersion, fragment: Vec<u8>) -> Self {
        Self {
            content_type,
            version,
            fragment,
        }
    }

    /// Encode the record to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.fragment.len() > MAX_CIPHERTEXT_SIZE {
            return Err(Error::RecordOverflow);
        }

        let header = RecordHeader {
            content_type: self.content_type,
            version: self.version,
            length: self.fragment.len(),
        };

        let mut buf = Vec::with_capacity(RECORD_HEADER_SIZE + self.fragment.len());
        buf.extend_from_slice(&header.encode());
        buf.extend_from_slice(&self.fragment);
        Ok(buf)
    }

    /// Decode one complete record from bytes.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < RECORD_HEADER_SIZE {
            return Err(Error::MalformedMessage("record too short".into()));
        }

        let mut header_bytes = [0u8; RECORD_HEADER_SIZE];
        header_bytes.copy_from_slice(&data[..RECORD_HEADER_SIZE]);
        let header = RecordHeader::decode(&header_bytes)?;

        let end = RECORD_HEADER_SIZE + header.length;
        if data.len() < end {
            return Err(Error::MalformedMessage("incomplete record".into()));
        }

        Ok((
            Self {
                content_type: header.content_type,
                version: header.version,
                fragment: data[RECORD_HEADER_SIZE..end].to_vec(),
            },
            end,
        ))
    }
}

/// Split `data` into chunks no larger than `max_fragment_length`.
///
/// An empty payload still yields one empty fragment.
pub fn fragment(data: &[u8], max_fragment_length: usize) -> Vec<&[u8]> {
    if data.is_empty() {
        return vec![data];
    }
    data.chunks(max_fragment_length.clamp(1, MAX_FRAGMENT_SIZE))
        .collect()
}
