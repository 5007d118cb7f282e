//! TLS 1.2 ECDHE key exchange (RFC 8422).
//!
//! The server's ephemeral point arrives in ServerKeyExchange. The client
//! answers with a fresh point of its own in ClientKeyExchange; the ECDH
//! x-coordinate is the pre-master secret.

use ectls_crypto::{NamedCurve, ProviderRegistry, SharedSecret};

use crate::error::{Error, Result};

/// Client side of one ECDHE agreement.
#[derive(Debug)]
pub struct EcdheAgreement {
    /// Uncompressed point for ClientKeyExchange
    pub public_key: Vec<u8>,
    /// ECDH output, zeroized on drop
    pub pre_master_secret: SharedSecret,
}

/// Validate the server's point, generate a local key pair and agree.
///
/// The private scalar never leaves this function.
pub fn client_agreement(
    registry: &ProviderRegistry,
    curve: NamedCurve,
    server_point: &[u8],
) -> Result<EcdheAgreement> {
    if server_point.len() != curve.public_key_size() {
        return Err(Error::MalformedMessage(format!(
            "{} point must be {} bytes, got {}",
            curve.name(),
            curve.public_key_size(),
            server_point.len()
        )));
    }

    let group = registry.key_exchange(curve)?;
    let peer = group.decode_point(server_point)?;
    let (private_key, public_key) = group.generate_keypair()?;
    let pre_master_secret = group.exchange(&private_key, &peer)?;

    Ok(EcdheAgreement {
        public_key: public_key.into_bytes(),
        pre_master_secret,
    })
}
