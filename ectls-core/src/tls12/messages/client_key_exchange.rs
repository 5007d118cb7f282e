//! ClientKeyExchange Message (ECDHE)
//!
//! RFC 4492 Section 5.7
//!
//! ```text
//! struct {
//!     ECPoint ecdh_Yc;   // opaque point <1..2^8-1>
//! } ClientECDiffieHellmanPublic;
//! ```

use crate::error::{Error, Result};
use crate::handshake_io::Reader;

/// ClientKeyExchange message for ECDHE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyExchange {
    /// Client's ephemeral public point
    pub public_key: Vec<u8>,
}

impl ClientKeyExchange {
    /// Create a ClientKeyExchange message.
    pub fn new(public_key: Vec<u8>) -> Self {
        Self { public_key }
    }

    /// Encode the ClientKeyExchange body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.public_key.is_empty() || self.public_key.len() > 255 {
            return Err(Error::MalformedMessage(format!(
                "invalid ECDH point length {}",
                self.public_key.len()
            )));
        }

        let mut bytes = Vec::with_capacity(1 + self.public_key.len());
        bytes.push(self.public_key.len() as u8);
        bytes.extend_from_slice(&self.public_key);
        Ok(bytes)
    }

    /// Decode the ClientKeyExchange body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let public_key = reader.vec_u8()?;
        if public_key.is_empty() {
            return Err(Error::MalformedMessage("empty ECDH point".into()));
        }
        reader.finish("ClientKeyExchange")?;
        Ok(Self::new(public_key.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_exchange_codec() {
        let msg = ClientKeyExchange::new(vec![0x04; 65]);
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded[0], 65);
        assert_eq!(encoded.len(), 66);
        assert_eq!(ClientKeyExchange::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_client_key_exchange_invalid() {
        assert!(ClientKeyExchange::new(vec![]).encode().is_err());
        assert!(ClientKeyExchange::decode(&[]).is_err());
        assert!(ClientKeyExchange::decode(&[0]).is_err());
        assert!(ClientKeyExchange::decode(&[3, 1, 2]).is_err());
        assert!(ClientKeyExchange::decode(&[1, 1, 2]).is_err());
    }
}
