//! Scripted in-memory TLS 1.2 server used to drive the client.
//!
//! The server side of the key schedule is computed with `hmac`/`sha2`
//! directly, so a successful handshake cross-checks the client's PRF, key
//! block slicing and Finished computation.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;

use ectls_core::alert::Alert;
use ectls_core::ectls_crypto::{
    HashAlgorithm, NamedCurve, PrivateKey, ProviderRegistry, SignatureAlgorithm,
};
use ectls_core::extensions::Extensions;
use ectls_core::handshake_io::{HandshakeMessage, HandshakeMessageParser};
use ectls_core::messages::{ClientHello, Finished, ServerHello};
use ectls_core::protocol::{ContentType, HandshakeType};
use ectls_core::tls12::extensions::{ec_point_formats_extension, renegotiation_info_extension};
use ectls_core::tls12::messages::{
    Certificate, ClientKeyExchange, ServerHelloDone, ServerKeyExchange,
};
use ectls_core::tls12::record::{CipherContext, Direction, RecordLayer};
use ectls_core::{AlertDescription, CipherSuite, DirectionKeys, SessionKeys};
use ectls_crypto_rustcrypto::RustCryptoProvider;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::SigningKey;
use p256::pkcs8::DecodePrivateKey;
use sha2::{Digest, Sha256, Sha384};
use zeroize::Zeroizing;

/// Registry with everything the RustCrypto backend supports.
pub fn registry() -> Arc<ProviderRegistry> {
    Arc::new(
        ProviderRegistry::builder(Arc::new(RustCryptoProvider::default()))
            .with_all_supported()
            .build()
            .expect("registry"),
    )
}

/// TLS 1.2 P_hash computed straight from the `hmac` crate.
pub fn p_hash(hash: HashAlgorithm, secret: &[u8], label: &[u8], seed: &[u8], len: usize) -> Vec<u8> {
    match hash {
        HashAlgorithm::Sha256 => p_hash_with::<Hmac<Sha256>>(secret, label, seed, len),
        HashAlgorithm::Sha384 => p_hash_with::<Hmac<Sha384>>(secret, label, seed, len),
        other => panic!("no TLS 1.2 PRF over {:?}", other),
    }
}

fn p_hash_with<M: Mac + KeyInit>(secret: &[u8], label: &[u8], seed: &[u8], len: usize) -> Vec<u8> {
    let mut label_seed = label.to_vec();
    label_seed.extend_from_slice(seed);

    let hmac = |parts: &[&[u8]]| {
        let mut mac = <M as KeyInit>::new_from_slice(secret).expect("any key length");
        for part in parts {
            mac.update(part);
        }
        mac.finalize().into_bytes().to_vec()
    };

    let mut out = Vec::with_capacity(len);
    let mut a = hmac(&[&label_seed]);
    while out.len() < len {
        out.extend_from_slice(&hmac(&[&a, &label_seed]));
        a = hmac(&[&a]);
    }
    out.truncate(len);
    out
}

fn digest(hash: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match hash {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        other => panic!("unexpected transcript hash {:?}", other),
    }
}

/// Ways the server deviates from a correct handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misbehavior {
    /// Follow the protocol
    None,
    /// Flip a bit in the ServerKeyExchange signature
    CorruptSignature,
    /// Flip a bit in the server's verify data
    CorruptFinished,
    /// Answer ClientHello with a fatal alert
    AlertAfterHello(AlertDescription),
    /// Send ServerKeyExchange ahead of ServerHello
    KeyExchangeFirst,
    /// Pick a suite regardless of what the client offered
    ForceSuite(CipherSuite),
    /// Never answer
    Silent,
    /// Flip the last byte of the protected Finished record
    TamperFinishedRecord,
    /// Send a fatal alert right after ChangeCipherSpec instead of Finished
    AlertAfterChangeCipherSpec(AlertDescription),
}

/// Fixed 2048-bit RSA key for RSA certificates.
const RSA_KEY_PEM: &str = include_str!("rsa_server_key.pem");

/// Long-term key behind the server certificate.
enum ServerKey {
    Ecdsa(SigningKey),
    Rsa(rsa::pkcs1v15::SigningKey<Sha256>),
}

impl ServerKey {
    fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            ServerKey::Ecdsa(_) => SignatureAlgorithm::EcdsaSha256,
            ServerKey::Rsa(_) => SignatureAlgorithm::RsaPkcs1Sha256,
        }
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            ServerKey::Ecdsa(key) => {
                let signature: p256::ecdsa::Signature = key.sign(message);
                signature.to_der().as_bytes().to_vec()
            },
            ServerKey::Rsa(key) => {
                let signature: rsa::pkcs1v15::Signature = rsa::signature::Signer::sign(key, message);
                rsa::signature::SignatureEncoding::to_vec(&signature)
            },
        }
    }
}

/// Server end of an in-memory connection.
///
/// Bytes written by the client are processed immediately; the server's
/// replies are queued for the client to read.
pub struct ScriptedServer {
    registry: Arc<ProviderRegistry>,
    suite: CipherSuite,
    curve: NamedCurve,
    misbehavior: Misbehavior,
    fragment_size: usize,
    signing_key: ServerKey,
    certificate: Vec<u8>,
    server_random: [u8; 32],
    client_random: [u8; 32],
    ephemeral: Option<PrivateKey>,
    master_secret: Vec<u8>,
    keys: Option<SessionKeys>,
    records: RecordLayer,
    parser: HandshakeMessageParser,
    transcript: Vec<u8>,
    inbound: Vec<u8>,
    outbound: VecDeque<u8>,
    /// Alerts received from the client
    pub alerts: Vec<Alert>,
    /// Application data received from the client (echoed back)
    pub application_data: Vec<u8>,
    /// Suites listed in the ClientHello
    pub offered_suites: Vec<CipherSuite>,
    /// True once the client's Finished matched
    pub client_finished_verified: bool,
}

impl ScriptedServer {
    /// Server with a fresh self-signed P-256 certificate.
    pub fn new(suite: CipherSuite) -> Self {
        let certified = rcgen::generate_simple_self_signed(vec!["server.test".to_string()])
            .expect("certificate");
        let signing_key =
            SigningKey::from_pkcs8_der(&certified.key_pair.serialize_der()).expect("pkcs8 key");
        let registry = registry();

        Self {
            records: RecordLayer::new(registry.clone()),
            registry,
            suite,
            curve: NamedCurve::Secp256r1,
            misbehavior: Misbehavior::None,
            fragment_size: 16384,
            signing_key: ServerKey::Ecdsa(signing_key),
            certificate: certified.cert.der().to_vec(),
            server_random: [0x5a; 32],
            client_random: [0; 32],
            ephemeral: None,
            master_secret: Vec::new(),
            keys: None,
            parser: HandshakeMessageParser::new(),
            transcript: Vec::new(),
            inbound: Vec::new(),
            outbound: VecDeque::new(),
            alerts: Vec::new(),
            application_data: Vec::new(),
            offered_suites: Vec::new(),
            client_finished_verified: false,
        }
    }

    /// Deviate from the protocol.
    pub fn misbehave(mut self, misbehavior: Misbehavior) -> Self {
        self.misbehavior = misbehavior;
        self
    }

    /// Swap the certificate for a self-signed RSA one.
    pub fn with_rsa_certificate(mut self) -> Self {
        let key_pair = rcgen::KeyPair::from_pem_and_sign_algo(RSA_KEY_PEM, &rcgen::PKCS_RSA_SHA256)
            .expect("rsa key pair");
        let certificate = rcgen::CertificateParams::new(vec!["server.test".to_string()])
            .expect("certificate params")
            .self_signed(&key_pair)
            .expect("rsa certificate");
        let private_key = <rsa::RsaPrivateKey as rsa::pkcs8::DecodePrivateKey>::from_pkcs8_pem(RSA_KEY_PEM)
            .expect("rsa pkcs8 key");

        self.signing_key = ServerKey::Rsa(rsa::pkcs1v15::SigningKey::<Sha256>::new(private_key));
        self.certificate = certificate.der().to_vec();
        self
    }

    /// ECDHE curve to use.
    pub fn with_curve(mut self, curve: NamedCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Split handshake flights into records of at most `size` bytes.
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size;
        self
    }

    /// Keys derived on the server side.
    pub fn session_keys(&self) -> Option<&SessionKeys> {
        self.keys.as_ref()
    }

    /// Master secret derived on the server side.
    pub fn master_secret(&self) -> &[u8] {
        &self.master_secret
    }

    fn prf_hash(&self) -> HashAlgorithm {
        self.suite.prf_hash()
    }

    fn send_record(&mut self, content_type: ContentType, payload: &[u8]) -> io::Result<()> {
        let wire = self.records.write_record(content_type, payload).map_err(to_io)?;
        self.outbound.extend(wire);
        Ok(())
    }

    fn send_handshake(&mut self, flight: &[u8]) -> io::Result<()> {
        for chunk in flight.chunks(self.fragment_size) {
            self.send_record(ContentType::Handshake, chunk)?;
        }
        Ok(())
    }

    fn hashed(&mut self, msg_type: HandshakeType, payload: Vec<u8>) -> io::Result<Vec<u8>> {
        let encoded = HandshakeMessage::new(msg_type, payload).encode().map_err(to_io)?;
        self.transcript.extend_from_slice(&encoded);
        Ok(encoded)
    }

    fn on_record(&mut self, content_type: ContentType, body: Vec<u8>) -> io::Result<()> {
        match content_type {
            ContentType::Handshake => {
                self.parser.add_data(&body);
                while let Some(message) = self.parser.next_message().map_err(to_io)? {
                    self.on_handshake(message)?;
                }
            },
            ContentType::ChangeCipherSpec => {
                let keys = self.keys.as_ref().ok_or_else(|| other("CCS before keys"))?;
                let context =
                    CipherContext::new(&self.registry, &keys.client_write).map_err(to_io)?;
                self.records.activate_change_cipher_spec(Direction::Read, context);
            },
            ContentType::Alert => {
                self.alerts.push(Alert::decode(&body).map_err(to_io)?);
            },
            ContentType::ApplicationData => {
                self.application_data.extend_from_slice(&body);
                self.send_record(ContentType::ApplicationData, &body)?;
            },
        }
        Ok(())
    }

    fn on_handshake(&mut self, message: HandshakeMessage) -> io::Result<()> {
        match message.msg_type {
            HandshakeType::ClientHello => {
                self.transcript.extend_from_slice(&message.encode().map_err(to_io)?);
                self.on_client_hello(&message.payload)
            },
            HandshakeType::ClientKeyExchange => {
                self.transcript.extend_from_slice(&message.encode().map_err(to_io)?);
                self.on_client_key_exchange(&message.payload)
            },
            HandshakeType::Finished => self.on_client_finished(&message),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("server got unexpected {:?}", other),
            )),
        }
    }

    fn on_client_hello(&mut self, payload: &[u8]) -> io::Result<()> {
        let hello = ClientHello::decode(payload).map_err(to_io)?;
        self.client_random = hello.random;
        self.offered_suites = hello.cipher_suites.clone();

        match self.misbehavior {
            Misbehavior::Silent => return Ok(()),
            Misbehavior::AlertAfterHello(description) => {
                return self.send_record(ContentType::Alert, &Alert::fatal(description).encode());
            },
            Misbehavior::ForceSuite(suite) => self.suite = suite,
            _ => {
                if !self.offered_suites.contains(&self.suite) {
                    return Err(other("client did not offer the scripted suite"));
                }
            },
        }

        let mut extensions = Extensions::new();
        extensions.add(renegotiation_info_extension());
        extensions.add(ec_point_formats_extension());
        let server_hello = ServerHello::new(self.server_random, self.suite)
            .with_extensions(extensions)
            .encode()
            .map_err(to_io)?;

        let group = self.registry.key_exchange(self.curve).map_err(to_io)?;
        let (private_key, public_key) = group.generate_keypair().map_err(to_io)?;
        self.ephemeral = Some(private_key);

        let mut ske = ServerKeyExchange::new(
            self.curve,
            public_key.into_bytes(),
            self.signing_key.algorithm(),
            Vec::new(),
        );
        let signed = ske
            .signed_data(&self.client_random, &self.server_random)
            .map_err(to_io)?;
        ske.signature = self.signing_key.sign(&signed);
        if self.misbehavior == Misbehavior::CorruptSignature {
            let last = ske.signature.len() - 1;
            ske.signature[last] ^= 0x01;
        }
        let ske = ske.encode().map_err(to_io)?;
        let certificate = Certificate::new(vec![self.certificate.clone()])
            .encode()
            .map_err(to_io)?;

        let mut flight = Vec::new();
        if self.misbehavior == Misbehavior::KeyExchangeFirst {
            flight.extend(self.hashed(HandshakeType::ServerKeyExchange, ske.clone())?);
        }
        flight.extend(self.hashed(HandshakeType::ServerHello, server_hello)?);
        flight.extend(self.hashed(HandshakeType::Certificate, certificate)?);
        flight.extend(self.hashed(HandshakeType::ServerKeyExchange, ske)?);
        flight.extend(self.hashed(HandshakeType::ServerHelloDone, ServerHelloDone.encode())?);
        self.send_handshake(&flight)
    }

    fn on_client_key_exchange(&mut self, payload: &[u8]) -> io::Result<()> {
        let cke = ClientKeyExchange::decode(payload).map_err(to_io)?;
        let group = self.registry.key_exchange(self.curve).map_err(to_io)?;
        let peer = group.decode_point(&cke.public_key).map_err(to_io)?;
        let private_key = self.ephemeral.take().ok_or_else(|| other("no ephemeral key"))?;
        let pre_master = group.exchange(&private_key, &peer).map_err(to_io)?;

        let mut seed = self.client_random.to_vec();
        seed.extend_from_slice(&self.server_random);
        self.master_secret = p_hash(self.prf_hash(), pre_master.as_bytes(), b"master secret", &seed, 48);

        let (mac, key, iv) = (self.suite.mac_len(), self.suite.key_len(), self.suite.fixed_iv_len());
        let mut seed = self.server_random.to_vec();
        seed.extend_from_slice(&self.client_random);
        let block = p_hash(
            self.prf_hash(),
            &self.master_secret,
            b"key expansion",
            &seed,
            2 * (mac + key + iv),
        );

        let suite = self.suite;
        let part = |offset: usize, len: usize| Zeroizing::new(block[offset..offset + len].to_vec());
        self.keys = Some(SessionKeys {
            client_write: DirectionKeys {
                mac_key: part(0, mac),
                cipher_key: part(2 * mac, key),
                iv: part(2 * (mac + key), iv),
                cipher_suite: suite,
            },
            server_write: DirectionKeys {
                mac_key: part(mac, mac),
                cipher_key: part(2 * mac + key, key),
                iv: part(2 * (mac + key) + iv, iv),
                cipher_suite: suite,
            },
        });
        Ok(())
    }

    fn on_client_finished(&mut self, message: &HandshakeMessage) -> io::Result<()> {
        let finished = Finished::decode(&message.payload).map_err(to_io)?;
        let expected = p_hash(
            self.prf_hash(),
            &self.master_secret,
            b"client finished",
            &digest(self.prf_hash(), &self.transcript),
            12,
        );
        self.client_finished_verified = finished.verify_data.as_slice() == expected.as_slice();
        if !self.client_finished_verified {
            return Err(other("client Finished mismatch"));
        }
        self.transcript.extend_from_slice(&message.encode().map_err(to_io)?);

        let mut verify_data = [0u8; 12];
        verify_data.copy_from_slice(&p_hash(
            self.prf_hash(),
            &self.master_secret,
            b"server finished",
            &digest(self.prf_hash(), &self.transcript),
            12,
        ));
        if self.misbehavior == Misbehavior::CorruptFinished {
            verify_data[0] ^= 0x80;
        }

        self.send_record(ContentType::ChangeCipherSpec, &[1])?;
        let keys = self.keys.as_ref().ok_or_else(|| other("Finished before keys"))?;
        let context = CipherContext::new(&self.registry, &keys.server_write).map_err(to_io)?;
        self.records.activate_change_cipher_spec(Direction::Write, context);

        if let Misbehavior::AlertAfterChangeCipherSpec(description) = self.misbehavior {
            return self.send_record(ContentType::Alert, &Alert::fatal(description).encode());
        }

        let finished = HandshakeMessage::new(HandshakeType::Finished, Finished::new(verify_data).encode())
            .encode()
            .map_err(to_io)?;
        self.send_handshake(&finished)?;

        if self.misbehavior == Misbehavior::TamperFinishedRecord {
            if let Some(last) = self.outbound.back_mut() {
                *last ^= 0x01;
            }
        }
        Ok(())
    }
}

impl Read for ScriptedServer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.outbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for ScriptedServer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inbound.extend_from_slice(buf);
        while self.inbound.len() >= 5 {
            let length = u16::from_be_bytes([self.inbound[3], self.inbound[4]]) as usize;
            if self.inbound.len() < 5 + length {
                break;
            }
            let raw: Vec<u8> = self.inbound.drain(..5 + length).collect();
            let (content_type, body) = self.records.read_record(&raw).map_err(to_io)?;
            self.on_record(content_type, body)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn to_io(error: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error.to_string())
}

fn other(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, message.to_string())
}
