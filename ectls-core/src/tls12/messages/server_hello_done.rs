//! ServerHelloDone Message
//!
//! RFC 5246 Section 7.4.5. An empty body marking the end of the server's
//! first flight.

use crate::error::{Error, Result};

/// ServerHelloDone message (empty).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerHelloDone;

impl ServerHelloDone {
    /// Encode the ServerHelloDone body (empty).
    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Decode the ServerHelloDone body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if !data.is_empty() {
            return Err(Error::MalformedMessage(format!(
                "ServerHelloDone must be empty, got {} bytes",
                data.len()
            )));
        }
        Ok(ServerHelloDone)
    }
}
