//! TLS 1.2 hello extension builders and parsers.
//!
//! The client sends:
//! - `server_name` (SNI) - RFC 6066, when a name is configured
//! - `elliptic_curves` - RFC 4492 Section 5.1.1
//! - `ec_point_formats` - RFC 4492 Section 5.1.2 (uncompressed only)
//! - `signature_algorithms` - RFC 5246 Section 7.4.1.4.1
//! - `renegotiation_info` - RFC 5746, empty on an initial handshake

use crate::error::{Error, Result};
use crate::extensions::Extension;
use crate::handshake_io::Reader;
use crate::protocol::ExtensionType;
use bytes::{BufMut, BytesMut};
use ectls_crypto::{NamedCurve, SignatureAlgorithm};

/// The uncompressed point format code.
pub const POINT_FORMAT_UNCOMPRESSED: u8 = 0;

/// Build an `elliptic_curves` extension.
pub fn elliptic_curves_extension(curves: &[NamedCurve]) -> Result<Extension> {
    if curves.is_empty() {
        return Err(Error::InvalidConfig("no curves to offer".into()));
    }

    let mut buf = BytesMut::with_capacity(2 + curves.len() * 2);
    buf.put_u16((curves.len() * 2) as u16);
    for curve in curves {
        buf.put_u16(curve.to_u16());
    }
    Ok(Extension::new(ExtensionType::EllipticCurves, buf.to_vec()))
}

/// Parse an `elliptic_curves` extension. Unknown curve ids are dropped.
pub fn parse_elliptic_curves(data: &[u8]) -> Result<Vec<NamedCurve>> {
    let mut outer = Reader::new(data);
    let list = outer.vec_u16()?;
    outer.finish("elliptic_curves")?;
    if list.len() % 2 != 0 {
        return Err(Error::MalformedMessage("odd elliptic_curves length".into()));
    }

    let mut reader = Reader::new(list);
    let mut curves = Vec::with_capacity(list.len() / 2);
    while !reader.is_empty() {
        if let Some(curve) = NamedCurve::from_u16(reader.u16()?) {
            curves.push(curve);
        }
    }
    Ok(curves)
}

/// Build an `ec_point_formats` extension advertising uncompressed points.
pub fn ec_point_formats_extension() -> Extension {
    Extension::new(
        ExtensionType::EcPointFormats,
        vec![0x01, POINT_FORMAT_UNCOMPRESSED],
    )
}

/// Parse an `ec_point_formats` extension into raw format codes.
pub fn parse_ec_point_formats(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::new(data);
    let formats = reader.vec_u8()?;
    reader.finish("ec_point_formats")?;
    if formats.is_empty() {
        return Err(Error::MalformedMessage("empty ec_point_formats".into()));
    }
    Ok(formats.to_vec())
}

/// Build a `signature_algorithms` extension.
pub fn signature_algorithms_extension(algorithms: &[SignatureAlgorithm]) -> Result<Extension> {
    if algorithms.is_empty() {
        return Err(Error::InvalidConfig("no signature algorithms to offer".into()));
    }

    let mut buf = BytesMut::with_capacity(2 + algorithms.len() * 2);
    buf.put_u16((algorithms.len() * 2) as u16);
    for alg in algorithms {
        buf.put_u16(alg.to_u16());
    }
    Ok(Extension::new(ExtensionType::SignatureAlgorithms, buf.to_vec()))
}

/// Parse a `signature_algorithms` extension. Unknown pairs are dropped.
pub fn parse_signature_algorithms(data: &[u8]) -> Result<Vec<SignatureAlgorithm>> {
    let mut outer = Reader::new(data);
    let list = outer.vec_u16()?;
    outer.finish("signature_algorithms")?;
    if list.len() % 2 != 0 {
        return Err(Error::MalformedMessage("odd signature_algorithms length".into()));
    }

    let mut reader = Reader::new(list);
    let mut algorithms = Vec::with_capacity(list.len() / 2);
    while !reader.is_empty() {
        if let Some(alg) = SignatureAlgorithm::from_u16(reader.u16()?) {
            algorithms.push(alg);
        }
    }
    Ok(algorithms)
}

/// Build a `server_name` extension with a single host_name entry.
pub fn server_name_extension(hostname: &str) -> Result<Extension> {
    if hostname.is_empty() || hostname.len() > 0xFFFF - 3 {
        return Err(Error::InvalidConfig("invalid server name length".into()));
    }

    let mut buf = BytesMut::with_capacity(5 + hostname.len());
    buf.put_u16((1 + 2 + hostname.len()) as u16);
    buf.put_u8(0x00); // host_name
    buf.put_u16(hostname.len() as u16);
    buf.put_slice(hostname.as_bytes());
    Ok(Extension::new(ExtensionType::ServerName, buf.to_vec()))
}

/// Parse a client `server_name` extension.
pub fn parse_server_name(data: &[u8]) -> Result<String> {
    let mut outer = Reader::new(data);
    let list = outer.vec_u16()?;
    outer.finish("server_name")?;

    let mut reader = Reader::new(list);
    let name_type = reader.u8()?;
    if name_type != 0x00 {
        return Err(Error::MalformedMessage(format!(
            "unsupported name type {}",
            name_type
        )));
    }
    let name = reader.vec_u16()?;
    String::from_utf8(name.to_vec())
        .map_err(|_| Error::MalformedMessage("server name is not UTF-8".into()))
}

/// Build an empty `renegotiation_info` extension (initial handshake).
pub fn renegotiation_info_extension() -> Extension {
    Extension::new(ExtensionType::RenegotiationInfo, vec![0x00])
}

/// Parse `renegotiation_info`, returning the renegotiated_connection bytes.
///
/// On an initial handshake the server must echo an empty value.
pub fn parse_renegotiation_info(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::new(data);
    let value = reader.vec_u8()?;
    reader.finish("renegotiation_info")?;
    Ok(value.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elliptic_curves_encoding() {
        let ext = elliptic_curves_extension(&NamedCurve::ALL).unwrap();
        assert_eq!(ext.data, vec![0, 4, 0, 0x17, 0, 0x18]);
        assert_eq!(parse_elliptic_curves(&ext.data).unwrap(), NamedCurve::ALL.to_vec());

        // x25519 (0x1d) is dropped, secp256r1 kept
        assert_eq!(
            parse_elliptic_curves(&[0, 4, 0, 0x1d, 0, 0x17]).unwrap(),
            vec![NamedCurve::Secp256r1]
        );
        assert!(parse_elliptic_curves(&[0, 3, 0, 0x17, 0]).is_err());
    }

    #[test]
    fn test_ec_point_formats() {
        let ext = ec_point_formats_extension();
        assert_eq!(ext.code, 11);
        assert_eq!(parse_ec_point_formats(&ext.data).unwrap(), vec![0]);
        assert!(parse_ec_point_formats(&[0]).is_err());
    }

    #[test]
    fn test_signature_algorithms_encoding() {
        let algs = [SignatureAlgorithm::EcdsaSha256, SignatureAlgorithm::RsaPkcs1Sha256];
        let ext = signature_algorithms_extension(&algs).unwrap();
        assert_eq!(ext.data, vec![0, 4, 0x04, 0x03, 0x04, 0x01]);
        assert_eq!(parse_signature_algorithms(&ext.data).unwrap(), algs.to_vec());
    }

    #[test]
    fn test_server_name_encoding() {
        let ext = server_name_extension("example.com").unwrap();
        assert_eq!(&ext.data[..5], &[0, 14, 0, 0, 11]);
        assert_eq!(parse_server_name(&ext.data).unwrap(), "example.com");
        assert!(server_name_extension("").is_err());
    }

    #[test]
    fn test_renegotiation_info() {
        let ext = renegotiation_info_extension();
        assert_eq!(ext.code, 0xff01);
        assert!(parse_renegotiation_info(&ext.data).unwrap().is_empty());
        assert!(parse_renegotiation_info(&[2, 1]).is_err());
    }
}
