//! Blocking byte-stream seam.
//!
//! The handshake engine never touches sockets itself. It reads whole records
//! through [`read_record`], which is its only suspension point, and writes
//! whole flights through [`Transport::write_all`].

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};
use crate::record::{RecordHeader, TlsPlaintext, RECORD_HEADER_SIZE};

/// Reliable, ordered byte stream.
pub trait Transport {
    /// Fill `buf` completely. EOF before that is an error.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write all of `buf`.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Push buffered output to the peer.
    fn flush(&mut self) -> Result<()>;
}

impl<S: Read + Write> Transport for S {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        Read::read_exact(self, buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::IoError("connection closed by peer".into()),
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::IoError("read timed out".into()),
            _ => Error::from(e),
        })
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        Write::write_all(self, buf).map_err(Error::from)
    }

    fn flush(&mut self) -> Result<()> {
        Write::flush(self).map_err(Error::from)
    }
}

/// Read exactly one record: header first, then its fragment.
pub fn read_record<T: Transport + ?Sized>(transport: &mut T) -> Result<TlsPlaintext> {
    let mut header = [0u8; RECORD_HEADER_SIZE];
    transport.read_exact(&mut header)?;
    let header = RecordHeader::decode(&header)?;

    let mut fragment = vec![0u8; header.length];
    transport.read_exact(&mut fragment)?;

    Ok(TlsPlaintext::new(header.content_type, header.version, fragment))
}
