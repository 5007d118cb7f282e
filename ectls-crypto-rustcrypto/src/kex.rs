//! ECDHE over the NIST curves using `p256` and `p384`.

use ectls_crypto::{
    Error, KeyExchange, NamedCurve, PrivateKey, PublicKey, Result, SharedSecret,
};
use rand::rngs::OsRng;

/// Create EC group operations for a named curve.
pub fn create_key_exchange(curve: NamedCurve) -> Result<Box<dyn KeyExchange>> {
    match curve {
        NamedCurve::Secp256r1 => Ok(Box::new(P256KeyExchange)),
        NamedCurve::Secp384r1 => Ok(Box::new(P384KeyExchange)),
    }
}

/// Only uncompressed points are accepted; the client advertises
/// `ec_point_formats = [uncompressed]`.
fn require_uncompressed(curve: NamedCurve, bytes: &[u8]) -> Result<()> {
    if bytes.len() != curve.public_key_size() || bytes.first() != Some(&0x04) {
        return Err(Error::InvalidPublicKey);
    }
    Ok(())
}

macro_rules! nist_key_exchange {
    ($name:ident, $krate:ident, $curve:expr) => {
        #[derive(Debug)]
        struct $name;

        impl KeyExchange for $name {
            fn generate_keypair(&self) -> Result<(PrivateKey, PublicKey)> {
                use $krate::elliptic_curve::sec1::ToEncodedPoint;

                let secret = $krate::SecretKey::random(&mut OsRng);
                let public = secret.public_key().to_encoded_point(false);
                Ok((
                    PrivateKey::from_bytes(secret.to_bytes().to_vec()),
                    PublicKey::from_bytes(public.as_bytes().to_vec()),
                ))
            }

            fn decode_point(&self, bytes: &[u8]) -> Result<PublicKey> {
                require_uncompressed($curve, bytes)?;
                $krate::PublicKey::from_sec1_bytes(bytes).map_err(|_| Error::InvalidPublicKey)?;
                Ok(PublicKey::from_bytes(bytes.to_vec()))
            }

            fn exchange(
                &self,
                private_key: &PrivateKey,
                peer_public_key: &PublicKey,
            ) -> Result<SharedSecret> {
                let secret = $krate::SecretKey::from_slice(private_key.as_bytes())
                    .map_err(|_| Error::InvalidPrivateKey)?;
                let peer = $krate::PublicKey::from_sec1_bytes(peer_public_key.as_bytes())
                    .map_err(|_| Error::InvalidPublicKey)?;
                let shared =
                    $krate::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
                Ok(SharedSecret::from_bytes(shared.raw_secret_bytes().to_vec()))
            }

            fn curve(&self) -> NamedCurve {
                $curve
            }
        }
    };
}

nist_key_exchange!(P256KeyExchange, p256, NamedCurve::Secp256r1);
nist_key_exchange!(P384KeyExchange, p384, NamedCurve::Secp384r1);
