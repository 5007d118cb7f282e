//! ServerKeyExchange Message (ECDHE)
//!
//! RFC 4492 Section 5.4 / RFC 5246 Section 7.4.3
//!
//! Structure:
//! ```text
//! struct {
//!     ECCurveType    curve_type;      // 3 = named_curve
//!     NamedCurve     namedcurve;
//!     opaque         point <1..2^8-1>;
//! } ServerECDHParams;
//!
//! struct {
//!     ServerECDHParams params;
//!     digitally-signed struct {
//!         opaque client_random[32];
//!         opaque server_random[32];
//!         ServerECDHParams params;
//!     } signed_params;
//! } ServerKeyExchange;
//! ```

use crate::error::{Error, Result};
use crate::handshake_io::Reader;
use bytes::{BufMut, BytesMut};
use ectls_crypto::{NamedCurve, SignatureAlgorithm};

/// ECCurveType named_curve.
pub const CURVE_TYPE_NAMED_CURVE: u8 = 3;

/// ServerKeyExchange message for ECDHE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerKeyExchange {
    /// Named curve
    pub named_curve: NamedCurve,
    /// Server's ephemeral public point (uncompressed)
    pub public_key: Vec<u8>,
    /// SignatureAndHashAlgorithm
    pub signature_algorithm: SignatureAlgorithm,
    /// Signature over the randoms and params
    pub signature: Vec<u8>,
}

impl ServerKeyExchange {
    /// Create a ServerKeyExchange message.
    pub fn new(
        named_curve: NamedCurve,
        public_key: Vec<u8>,
        signature_algorithm: SignatureAlgorithm,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            named_curve,
            public_key,
            signature_algorithm,
            signature,
        }
    }

    /// The encoded ServerECDHParams.
    pub fn params(&self) -> Result<Vec<u8>> {
        encode_params(self.named_curve, &self.public_key)
    }

    /// The exact byte string the server signed:
    /// client_random || server_random || ServerECDHParams.
    pub fn signed_data(&self, client_random: &[u8; 32], server_random: &[u8; 32]) -> Result<Vec<u8>> {
        signed_data(client_random, server_random, self.named_curve, &self.public_key)
    }

    /// Encode the ServerKeyExchange body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.signature.len() > 0xFFFF {
            return Err(Error::MalformedMessage("signature too large".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_slice(&self.params()?);
        buf.put_u16(self.signature_algorithm.to_u16());
        buf.put_u16(self.signature.len() as u16);
        buf.put_slice(&self.signature);
        Ok(buf.to_vec())
    }

    /// Decode the ServerKeyExchange body.
    ///
    /// A curve type other than named_curve, or a curve id this crate does
    /// not implement, fails with [`Error::UnsupportedCurve`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let curve_type = reader.u8()?;
        if curve_type != CURVE_TYPE_NAMED_CURVE {
            return Err(Error::UnsupportedCurve(curve_type as u16));
        }

        let curve_id = reader.u16()?;
        let named_curve = NamedCurve::from_u16(curve_id).ok_or(Error::UnsupportedCurve(curve_id))?;

        let public_key = reader.vec_u8()?;
        if public_key.is_empty() {
            return Err(Error::MalformedMessage("empty ECDH point".into()));
        }

        let sig_raw = reader.u16()?;
        let signature_algorithm = SignatureAlgorithm::from_u16(sig_raw).ok_or_else(|| {
            Error::UnsupportedAlgorithm(format!("signature algorithm 0x{:04x}", sig_raw))
        })?;

        let signature = reader.vec_u16()?;
        if signature.is_empty() {
            return Err(Error::MalformedMessage("empty signature".into()));
        }
        reader.finish("ServerKeyExchange")?;

        Ok(Self {
            named_curve,
            public_key: public_key.to_vec(),
            signature_algorithm,
            signature: signature.to_vec(),
        })
    }
}

fn encode_params(curve: NamedCurve, public_key: &[u8]) -> Result<Vec<u8>> {
    if public_key.is_empty() || public_key.len() > 255 {
        return Err(Error::MalformedMessage(format!(
            "invalid ECDH point length {}",
            public_key.len()
        )));
    }

    let mut buf = BytesMut::with_capacity(4 + public_key.len());
    buf.put_u8(CURVE_TYPE_NAMED_CURVE);
    buf.put_u16(curve.to_u16());
    buf.put_u8(public_key.len() as u8);
    buf.put_slice(public_key);
    Ok(buf.to_vec())
}

/// Build the signed byte string for the given randoms and ECDH params.
pub fn signed_data(
    client_random: &[u8; 32],
    server_random: &[u8; 32],
    curve: NamedCurve,
    public_key: &[u8],
) -> Result<Vec<u8>> {
    let params = encode_params(curve, public_key)?;
    let mut data = Vec::with_capacity(64 + params.len());
    data.extend_from_slice(client_random);
    data.extend_from_slice(server_random);
    data.extend_from_slice(&params);
    Ok(data)
}
