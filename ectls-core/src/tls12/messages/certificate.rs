//! Certificate message (RFC 5246 Section 7.4.2).

use crate::error::{Error, Result};
use crate::handshake_io::Reader;
use bytes::{BufMut, BytesMut};

/// Certificate message: a chain of DER certificates, leaf first.
///
/// ```text
/// opaque ASN.1Cert<1..2^24-1>;
///
/// struct {
///     ASN.1Cert certificate_list<0..2^24-1>;
/// } Certificate;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// DER-encoded certificates; the first is the server's leaf
    pub certificate_list: Vec<Vec<u8>>,
}

impl Certificate {
    /// Create a Certificate message.
    pub fn new(certificate_list: Vec<Vec<u8>>) -> Self {
        Self { certificate_list }
    }

    /// The leaf certificate, if the chain is non-empty.
    pub fn leaf(&self) -> Option<&[u8]> {
        self.certificate_list.first().map(Vec::as_slice)
    }

    /// Encode the Certificate body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut list = BytesMut::new();
        for cert in &self.certificate_list {
            if cert.is_empty() || cert.len() > 0xFF_FFFF {
                return Err(Error::MalformedMessage("invalid certificate length".into()));
            }
            list.put_uint(cert.len() as u64, 3);
            list.put_slice(cert);
        }
        if list.len() > 0xFF_FFFF {
            return Err(Error::MalformedMessage("certificate list too large".into()));
        }

        let mut buf = BytesMut::with_capacity(3 + list.len());
        buf.put_uint(list.len() as u64, 3);
        buf.put_slice(&list);
        Ok(buf.to_vec())
    }

    /// Decode the Certificate body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut outer = Reader::new(data);
        let list = outer.vec_u24()?;
        outer.finish("Certificate")?;

        let mut reader = Reader::new(list);
        let mut certificate_list = Vec::new();
        while !reader.is_empty() {
            let cert = reader.vec_u24()?;
            if cert.is_empty() {
                return Err(Error::MalformedMessage("empty certificate entry".into()));
            }
            certificate_list.push(cert.to_vec());
        }

        Ok(Self { certificate_list })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_encode_decode() {
        let msg = Certificate::new(vec![vec![0x30; 10], vec![0x31; 300]]);
        let encoded = msg.encode().unwrap();
        assert_eq!(&encoded[..3], &[0, 1, 0x3a]); // 3 + 10 + 3 + 300
        assert_eq!(&encoded[3..6], &[0, 0, 10]);

        let decoded = Certificate::decode(&encoded).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.leaf(), Some(&[0x30u8; 10][..]));
    }

    #[test]
    fn test_certificate_empty_chain() {
        let decoded = Certificate::decode(&[0, 0, 0]).unwrap();
        assert!(decoded.leaf().is_none());
    }

    #[test]
    fn test_certificate_invalid() {
        // list length overruns
        assert!(Certificate::decode(&[0, 0, 10, 0, 0, 1, 0xaa]).is_err());
        // entry length overruns the list
        assert!(Certificate::decode(&[0, 0, 4, 0, 0, 5, 0xaa]).is_err());
        // trailing bytes after the list
        assert!(Certificate::decode(&[0, 0, 4, 0, 0, 1, 0xaa, 0xbb]).is_err());
        // zero-length entry
        assert!(Certificate::decode(&[0, 0, 3, 0, 0, 0]).is_err());
    }
}
