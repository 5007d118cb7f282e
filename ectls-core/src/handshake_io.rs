//! Handshake message framing.
//!
//! Handshake messages are carried inside handshake records but their
//! boundaries are independent of record boundaries: one record may carry
//! several messages and one message may span several records.
//! [`HandshakeMessageParser`] buffers record payloads and yields complete
//! messages.

use crate::error::{Error, Result};
use crate::protocol::HandshakeType;
use bytes::{Buf, BufMut, BytesMut};

/// Size of the handshake message header.
pub const HANDSHAKE_HEADER_SIZE: usize = 4;

/// Largest handshake message the client accepts.
///
/// Certificate chains are the only large server messages.
pub const MAX_HANDSHAKE_MESSAGE_SIZE: usize = 1 << 17;

/// Handshake message wrapper.
///
/// ```text
/// struct {
///     HandshakeType msg_type;    /* handshake type */
///     uint24 length;             /* bytes in message */
///     select (HandshakeType) { ... } body;
/// } Handshake;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Message type
    pub msg_type: HandshakeType,

    /// Message body (without the 4-byte header)
    pub payload: Vec<u8>,
}

impl HandshakeMessage {
    /// Create a new handshake message.
    pub fn new(msg_type: HandshakeType, payload: Vec<u8>) -> Self {
        Self { msg_type, payload }
    }

    /// Encode the message including its header.
    ///
    /// This is also the exact byte string fed to the transcript.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let len = self.payload.len();
        if len > 0x00FF_FFFF {
            return Err(Error::MalformedMessage("handshake message too large".into()));
        }

        let mut buf = BytesMut::with_capacity(HANDSHAKE_HEADER_SIZE + len);
        buf.put_u8(self.msg_type.to_u8());
        put_u24(&mut buf, len);
        buf.put_slice(&self.payload);
        Ok(buf.to_vec())
    }

    /// Decode a single message that fills `data` exactly.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let msg_type_raw = reader.u8()?;
        let msg_type = HandshakeType::from_u8(msg_type_raw).ok_or_else(|| {
            Error::UnexpectedMessage(format!("unknown handshake type {}", msg_type_raw))
        })?;
        let payload = reader.vec_u24()?.to_vec();
        reader.finish("handshake message")?;
        Ok(Self { msg_type, payload })
    }
}

/// Reassembles handshake messages from record payloads.
#[derive(Debug, Default)]
pub struct HandshakeMessageParser {
    buffer: BytesMut,
}

impl HandshakeMessageParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the payload of one handshake record.
    pub fn add_data(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Pop the next complete message, if one is buffered.
    pub fn next_message(&mut self) -> Result<Option<HandshakeMessage>> {
        if self.buffer.len() < HANDSHAKE_HEADER_SIZE {
            return Ok(None);
        }

        let length = read_u24(&self.buffer[1..HANDSHAKE_HEADER_SIZE]);
        if length > MAX_HANDSHAKE_MESSAGE_SIZE {
            return Err(Error::MalformedMessage(format!(
                "handshake message of {} bytes exceeds limit",
                length
            )));
        }
        if self.buffer.len() < HANDSHAKE_HEADER_SIZE + length {
            return Ok(None);
        }

        let raw = self.buffer.split_to(HANDSHAKE_HEADER_SIZE + length);
        HandshakeMessage::decode(&raw).map(Some)
    }

    /// Number of buffered bytes not yet forming a complete message.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// True when no partial message is pending.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn put_u24(buf: &mut BytesMut, value: usize) {
    buf.put_u8((value >> 16) as u8);
    buf.put_u8((value >> 8) as u8);
    buf.put_u8(value as u8);
}

fn read_u24(bytes: &[u8]) -> usize {
    ((bytes[0] as usize) << 16) | ((bytes[1] as usize) << 8) | bytes[2] as usize
}

/// Bounds-checked cursor over a message body.
///
/// Every read fails with [`Error::MalformedMessage`] instead of panicking on
/// truncated input.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Wrap a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.data.remaining() < n {
            return Err(Error::MalformedMessage(format!(
                "truncated: need {} bytes, have {}",
                n,
                self.data.remaining()
            )));
        }
        Ok(())
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.data.get_u8())
    }

    /// Read a big-endian u16.
    pub fn u16(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(self.data.get_u16())
    }

    /// Read a big-endian 24-bit length.
    pub fn u24(&mut self) -> Result<usize> {
        self.need(3)?;
        let value = read_u24(self.data);
        self.data.advance(3);
        Ok(value)
    }

    /// Read exactly `n` bytes.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Ok(head)
    }

    /// Read a vector with a 1-byte length prefix.
    pub fn vec_u8(&mut self) -> Result<&'a [u8]> {
        let len = self.u8()? as usize;
        self.bytes(len)
    }

    /// Read a vector with a 2-byte length prefix.
    pub fn vec_u16(&mut self) -> Result<&'a [u8]> {
        let len = self.u16()? as usize;
        self.bytes(len)
    }

    /// Read a vector with a 3-byte length prefix.
    pub fn vec_u24(&mut self) -> Result<&'a [u8]> {
        let len = self.u24()?;
        self.bytes(len)
    }

    /// Bytes left.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// True when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fail if trailing bytes remain after `what` was fully parsed.
    pub fn finish(&self, what: &str) -> Result<()> {
        if !self.data.is_empty() {
            return Err(Error::MalformedMessage(format!(
                "{} has {} trailing bytes",
                what,
                self.data.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_message_encode_decode() {
        let msg = HandshakeMessage::new(HandshakeType::ServerHelloDone, vec![]);
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded, vec![14, 0, 0, 0]);
        assert_eq!(HandshakeMessage::decode(&encoded).unwrap(), msg);

        let msg = HandshakeMessage::new(HandshakeType::Finished, vec![7u8; 12]);
        let encoded = msg.encode().unwrap();
        assert_eq!(&encoded[..4], &[20, 0, 0, 12]);
        assert_eq!(HandshakeMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        assert!(HandshakeMessage::decode(&[2, 0, 0, 5, 1, 2]).is_err());
        assert!(HandshakeMessage::decode(&[2, 0, 0, 1, 1, 2]).is_err());
        assert!(matches!(
            HandshakeMessage::decode(&[99, 0, 0, 0]),
            Err(Error::UnexpectedMessage(_))
        ));
    }

    #[test]
    fn test_parser_splits_coalesced_messages() {
        let mut parser = HandshakeMessageParser::new();
        let hello = HandshakeMessage::new(HandshakeType::ServerHello, vec![1, 2, 3]);
        let done = HandshakeMessage::new(HandshakeType::ServerHelloDone, vec![]);

        let mut record = hello.encode().unwrap();
        record.extend_from_slice(&done.encode().unwrap());
        parser.add_data(&record);

        assert_eq!(parser.next_message().unwrap(), Some(hello));
        assert_eq!(parser.next_message().unwrap(), Some(done));
        assert_eq!(parser.next_message().unwrap(), None);
        assert!(parser.is_empty());
    }

    #[test]
    fn test_parser_reassembles_across_records() {
        let mut parser = HandshakeMessageParser::new();
        let cert = HandshakeMessage::new(HandshakeType::Certificate, vec![0xab; 300]);
        let encoded = cert.encode().unwrap();

        parser.add_data(&encoded[..2]);
        assert_eq!(parser.next_message().unwrap(), None);
        parser.add_data(&encoded[2..100]);
        assert_eq!(parser.next_message().unwrap(), None);
        assert_eq!(parser.buffered(), 100);
        parser.add_data(&encoded[100..]);
        assert_eq!(parser.next_message().unwrap(), Some(cert));
    }

    #[test]
    fn test_parser_rejects_oversized_message() {
        let mut parser = HandshakeMessageParser::new();
        parser.add_data(&[11, 0x10, 0, 0]);
        assert!(matches!(
            parser.next_message(),
            Err(Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_reader_bounds() {
        let mut reader = Reader::new(&[0, 3, 1, 2, 3, 9]);
        assert_eq!(reader.vec_u16().unwrap(), &[1, 2, 3]);
        assert_eq!(reader.remaining(), 1);
        assert!(reader.finish("test").is_err());
        assert!(reader.u16().is_err());
        assert_eq!(reader.u8().unwrap(), 9);
        assert!(reader.is_empty());
        assert!(reader.u8().is_err());

        let mut reader = Reader::new(&[0, 0, 2, 0xaa]);
        assert!(matches!(reader.vec_u24(), Err(Error::MalformedMessage(_))));
    }
}
