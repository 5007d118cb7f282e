//! Finished message (RFC 5246 Section 7.4.9).

use crate::error::{Error, Result};
use subtle::ConstantTimeEq;

/// Length of TLS 1.2 verify data.
pub const VERIFY_DATA_LENGTH: usize = 12;

/// Finished message.
///
/// Carries PRF(master_secret, finished_label, Hash(handshake_messages))[0..12].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// Verify data
    pub verify_data: [u8; VERIFY_DATA_LENGTH],
}

impl Finished {
    /// Create a Finished message.
    pub fn new(verify_data: [u8; VERIFY_DATA_LENGTH]) -> Self {
        Self { verify_data }
    }

    /// Encode the Finished body.
    pub fn encode(&self) -> Vec<u8> {
        self.verify_data.to_vec()
    }

    /// Decode the Finished body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let verify_data: [u8; VERIFY_DATA_LENGTH] = data.try_into().map_err(|_| {
            Error::MalformedMessage(format!(
                "Finished must be {} bytes, got {}",
                VERIFY_DATA_LENGTH,
                data.len()
            ))
        })?;
        Ok(Self { verify_data })
    }

    /// Compare against the expected verify data in constant time.
    pub fn verify(&self, expected: &[u8]) -> Result<()> {
        if bool::from(self.verify_data.as_slice().ct_eq(expected)) {
            Ok(())
        } else {
            Err(Error::FinishedVerificationFailed)
        }
    }
}
