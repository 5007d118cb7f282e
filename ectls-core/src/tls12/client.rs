//! TLS 1.2 Client Handshake State Machine
//!
//! Sans-IO: the machine consumes decoded handshake messages and
//! ChangeCipherSpec bodies, and returns the [`ClientOutput`]s the driver has
//! to carry out, in order.
//!
//! ## State Transitions
//! ```text
//! Start
//!   | send ClientHello
//!   v
//! SentClientHello
//!   | recv ServerHello
//!   v
//! ReceivedServerHello
//!   | recv Certificate
//!   v
//! ReceivedCertificate
//!   | recv ServerKeyExchange
//!   v
//! ReceivedServerKeyExchange
//!   | recv ServerHelloDone
//!   | send ClientKeyExchange, ChangeCipherSpec, Finished
//!   v
//! AwaitServerChangeCipherSpec
//!   | recv ChangeCipherSpec
//!   v
//! AwaitServerFinished
//!   | recv Finished
//!   v
//! Established
//! ```
//!
//! A message that does not fit the current state is rejected with
//! `UnexpectedMessage` and the state is left as it was. Any other failure
//! moves the machine to `Failed` and drops every secret it held. The
//! connection calls [`ClientHandshake::abort`] on every fatal error, which
//! does the same from any state.

use core::fmt;
use std::sync::Arc;

use ectls_crypto::{NamedCurve, ProviderRegistry, SignatureAlgorithm};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::extensions::Extensions;
use crate::handshake_io::HandshakeMessage;
use crate::messages::{ClientHello, Finished, ServerHello};
use crate::protocol::{ExtensionType, HandshakeType, ProtocolVersion};
use crate::tls12::certificate_parser::LeafCertificate;
use crate::tls12::cipher_suites::CipherSuite;
use crate::tls12::extensions::{
    ec_point_formats_extension, elliptic_curves_extension, parse_ec_point_formats,
    parse_renegotiation_info, renegotiation_info_extension, server_name_extension,
    signature_algorithms_extension, POINT_FORMAT_UNCOMPRESSED,
};
use crate::tls12::key_exchange::{client_agreement, EcdheAgreement};
use crate::tls12::messages::{Certificate, ClientKeyExchange, ServerHelloDone, ServerKeyExchange};
use crate::tls12::prf::{
    compute_verify_data, derive_key_block_for_suite, derive_master_secret, SessionKeys,
    CLIENT_FINISHED_LABEL, SERVER_FINISHED_LABEL,
};
use crate::tls12::record::CipherContext;
use crate::transcript::TranscriptHash;
use crate::ClientConfig;

/// Hello randoms of both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Randoms {
    /// ClientHello.random
    pub client: [u8; 32],
    /// ServerHello.random
    pub server: [u8; 32],
}

/// Handshake state. Each variant holds only what is valid at that point.
pub enum ClientState {
    /// Nothing sent yet
    Start,
    /// ClientHello sent, waiting for ServerHello
    SentClientHello {
        /// Our hello random
        client_random: [u8; 32],
        /// ClientHello, buffered until the hash is known
        transcript: TranscriptHash,
    },
    /// Suite negotiated, waiting for Certificate
    ReceivedServerHello {
        /// Hello randoms
        randoms: Randoms,
        /// Negotiated suite
        suite: CipherSuite,
        /// Running transcript
        transcript: TranscriptHash,
    },
    /// Leaf key known, waiting for ServerKeyExchange
    ReceivedCertificate {
        /// Hello randoms
        randoms: Randoms,
        /// Negotiated suite
        suite: CipherSuite,
        /// Running transcript
        transcript: TranscriptHash,
        /// Server's leaf certificate
        leaf: LeafCertificate,
    },
    /// Pre-master secret agreed, waiting for ServerHelloDone
    ReceivedServerKeyExchange {
        /// Hello randoms
        randoms: Randoms,
        /// Negotiated suite
        suite: CipherSuite,
        /// Running transcript
        transcript: TranscriptHash,
        /// Our ECDHE point and the pre-master secret
        agreement: EcdheAgreement,
    },
    /// Our Finished sent, waiting for the server's ChangeCipherSpec
    AwaitServerChangeCipherSpec {
        /// Negotiated suite
        suite: CipherSuite,
        /// Running transcript
        transcript: TranscriptHash,
        /// Master secret
        master_secret: Zeroizing<Vec<u8>>,
        /// Derived keys
        keys: SessionKeys,
    },
    /// Read direction protected, waiting for the server's Finished
    AwaitServerFinished {
        /// Negotiated suite
        suite: CipherSuite,
        /// Running transcript
        transcript: TranscriptHash,
        /// Master secret
        master_secret: Zeroizing<Vec<u8>>,
        /// Derived keys
        keys: SessionKeys,
    },
    /// Both Finished messages verified
    Established {
        /// Keys handed to the application
        keys: SessionKeys,
    },
    /// A fatal error occurred
    Failed,
}

impl ClientState {
    /// Short state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ClientState::Start => "Start",
            ClientState::SentClientHello { .. } => "SentClientHello",
            ClientState::ReceivedServerHello { .. } => "ReceivedServerHello",
            ClientState::ReceivedCertificate { .. } => "ReceivedCertificate",
            ClientState::ReceivedServerKeyExchange { .. } => "ReceivedServerKeyExchange",
            ClientState::AwaitServerChangeCipherSpec { .. } => "AwaitServerChangeCipherSpec",
            ClientState::AwaitServerFinished { .. } => "AwaitServerFinished",
            ClientState::Established { .. } => "Established",
            ClientState::Failed => "Failed",
        }
    }

    /// Handshake message this state accepts, if any.
    pub fn expected_message(&self) -> Option<HandshakeType> {
        match self {
            ClientState::SentClientHello { .. } => Some(HandshakeType::ServerHello),
            ClientState::ReceivedServerHello { .. } => Some(HandshakeType::Certificate),
            ClientState::ReceivedCertificate { .. } => Some(HandshakeType::ServerKeyExchange),
            ClientState::ReceivedServerKeyExchange { .. } => Some(HandshakeType::ServerHelloDone),
            ClientState::AwaitServerFinished { .. } => Some(HandshakeType::Finished),
            _ => None,
        }
    }
}

impl fmt::Debug for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Action the driver must perform, in the order returned.
#[derive(Debug)]
pub enum ClientOutput {
    /// Send an encoded handshake message (header included)
    SendHandshake(Vec<u8>),
    /// Send ChangeCipherSpec in the current (plaintext) write state
    SendChangeCipherSpec,
    /// Protect everything written from now on
    ActivateWrite(CipherContext),
    /// Unprotect everything read from now on
    ActivateRead(CipherContext),
}

/// What the client offers, restricted to what the registry can run.
#[derive(Debug, Clone)]
struct Offer {
    suites: Vec<CipherSuite>,
    curves: Vec<NamedCurve>,
    signature_algorithms: Vec<SignatureAlgorithm>,
    server_name: Option<String>,
}

impl Offer {
    fn new(registry: &ProviderRegistry, config: &ClientConfig) -> Result<Self> {
        let suites: Vec<CipherSuite> = config
            .cipher_suites
            .iter()
            .copied()
            .filter(|suite| {
                registry.has_cipher(suite.cipher_algorithm()) && registry.has_prf(suite.prf_algorithm())
            })
            .collect();
        let curves: Vec<NamedCurve> = config
            .curves
            .iter()
            .copied()
            .filter(|curve| registry.has_curve(*curve))
            .collect();
        let signature_algorithms: Vec<SignatureAlgorithm> = config
            .signature_algorithms
            .iter()
            .copied()
            .filter(|alg| registry.has_signature(*alg))
            .collect();

        if suites.is_empty() {
            return Err(Error::InvalidConfig(
                "no configured cipher suite is available from the provider".into(),
            ));
        }
        if curves.is_empty() {
            return Err(Error::InvalidConfig(
                "no configured curve is available from the provider".into(),
            ));
        }
        if signature_algorithms.is_empty() {
            return Err(Error::InvalidConfig(
                "no configured signature algorithm is available from the provider".into(),
            ));
        }

        Ok(Self {
            suites,
            curves,
            signature_algorithms,
            server_name: config.server_name.clone(),
        })
    }
}

/// Client side of a TLS 1.2 ECDHE handshake.
pub struct ClientHandshake {
    registry: Arc<ProviderRegistry>,
    offer: Offer,
    state: ClientState,
}

impl ClientHandshake {
    /// Create a handshake for `config`, offering only what `registry` supports.
    pub fn new(registry: Arc<ProviderRegistry>, config: &ClientConfig) -> Result<Self> {
        let offer = Offer::new(&registry, config)?;
        Ok(Self {
            registry,
            offer,
            state: ClientState::Start,
        })
    }

    /// Current state.
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Suites offered in ClientHello.
    pub fn offered_suites(&self) -> &[CipherSuite] {
        &self.offer.suites
    }

    /// True once the server's Finished has been verified.
    pub fn is_established(&self) -> bool {
        matches!(self.state, ClientState::Established { .. })
    }

    /// Negotiated keys, once established.
    pub fn session_keys(&self) -> Option<&SessionKeys> {
        match &self.state {
            ClientState::Established { keys } => Some(keys),
            _ => None,
        }
    }

    /// Negotiated suite, once ServerHello has been processed.
    pub fn negotiated_suite(&self) -> Option<CipherSuite> {
        match &self.state {
            ClientState::ReceivedServerHello { suite, .. }
            | ClientState::ReceivedCertificate { suite, .. }
            | ClientState::ReceivedServerKeyExchange { suite, .. }
            | ClientState::AwaitServerChangeCipherSpec { suite, .. }
            | ClientState::AwaitServerFinished { suite, .. } => Some(*suite),
            ClientState::Established { keys } => Some(keys.cipher_suite()),
            _ => None,
        }
    }

    /// Build the ClientHello.
    pub fn start(&mut self) -> Result<Vec<ClientOutput>> {
        if !matches!(self.state, ClientState::Start) {
            return Err(Error::InternalError(format!(
                "ClientHello cannot be sent in state {}",
                self.state.name()
            )));
        }

        let mut client_random = [0u8; 32];
        self.registry.random().fill(&mut client_random)?;

        let mut extensions = Extensions::new();
        if let Some(name) = &self.offer.server_name {
            extensions.add(server_name_extension(name)?);
        }
        extensions.add(elliptic_curves_extension(&self.offer.curves)?);
        extensions.add(ec_point_formats_extension());
        extensions.add(signature_algorithms_extension(&self.offer.signature_algorithms)?);
        extensions.add(renegotiation_info_extension());

        let hello = ClientHello::new(client_random, self.offer.suites.clone()).with_extensions(extensions);
        let encoded = HandshakeMessage::new(HandshakeType::ClientHello, hello.encode()?).encode()?;

        let mut transcript = TranscriptHash::new();
        transcript.update(&encoded);

        self.transition(ClientState::SentClientHello {
            client_random,
            transcript,
        });
        Ok(vec![ClientOutput::SendHandshake(encoded)])
    }

    /// Process one handshake message from the server.
    pub fn handle_handshake(&mut self, message: &HandshakeMessage) -> Result<Vec<ClientOutput>> {
        if self.state.expected_message() != Some(message.msg_type) {
            return Err(Error::UnexpectedMessage(format!(
                "{:?} in state {}",
                message.msg_type,
                self.state.name()
            )));
        }

        let encoded = message.encode()?;
        let state = core::mem::replace(&mut self.state, ClientState::Failed);
        let (next, outputs) = self.advance(state, message, &encoded)?;
        self.transition(next);
        Ok(outputs)
    }

    /// Process the server's ChangeCipherSpec body.
    pub fn handle_change_cipher_spec(&mut self, body: &[u8]) -> Result<Vec<ClientOutput>> {
        if !matches!(self.state, ClientState::AwaitServerChangeCipherSpec { .. }) {
            return Err(Error::UnexpectedMessage(format!(
                "ChangeCipherSpec in state {}",
                self.state.name()
            )));
        }
        if body != [1] {
            self.state = ClientState::Failed;
            return Err(Error::MalformedMessage("invalid ChangeCipherSpec body".into()));
        }

        let ClientState::AwaitServerChangeCipherSpec {
            suite,
            transcript,
            master_secret,
            keys,
        } = core::mem::replace(&mut self.state, ClientState::Failed)
        else {
            return Err(Error::InternalError("state changed unexpectedly".into()));
        };

        let context = CipherContext::new(&self.registry, &keys.server_write)?;
        self.transition(ClientState::AwaitServerFinished {
            suite,
            transcript,
            master_secret,
            keys,
        });
        Ok(vec![ClientOutput::ActivateRead(context)])
    }

    /// Drop every secret held by the current state and move to `Failed`.
    pub fn abort(&mut self) {
        if !matches!(self.state, ClientState::Failed) {
            self.transition(ClientState::Failed);
        }
    }

    fn transition(&mut self, next: ClientState) {
        debug!("TLS 1.2 client: {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn advance(
        &self,
        state: ClientState,
        message: &HandshakeMessage,
        encoded: &[u8],
    ) -> Result<(ClientState, Vec<ClientOutput>)> {
        match state {
            ClientState::SentClientHello {
                client_random,
                mut transcript,
            } => {
                let hello = ServerHello::decode(&message.payload)?;
                let suite = self.check_server_hello(&hello)?;
                info!("Negotiated {}", suite);

                transcript.update(encoded);
                transcript.seed(&self.registry, suite.prf_hash())?;

                let randoms = Randoms {
                    client: client_random,
                    server: hello.random,
                };
                Ok((
                    ClientState::ReceivedServerHello {
                        randoms,
                        suite,
                        transcript,
                    },
                    Vec::new(),
                ))
            },

            ClientState::ReceivedServerHello {
                randoms,
                suite,
                mut transcript,
            } => {
                let certificate = Certificate::decode(&message.payload)?;
                let leaf_der = certificate
                    .leaf()
                    .ok_or_else(|| Error::MalformedMessage("empty certificate chain".into()))?;
                let leaf = LeafCertificate::parse(leaf_der)?;
                if leaf.family() != suite.signature_family() {
                    return Err(Error::NegotiationFailed(format!(
                        "{:?} certificate cannot authenticate {}",
                        leaf.family(),
                        suite
                    )));
                }

                transcript.update(encoded);
                Ok((
                    ClientState::ReceivedCertificate {
                        randoms,
                        suite,
                        transcript,
                        leaf,
                    },
                    Vec::new(),
                ))
            },

            ClientState::ReceivedCertificate {
                randoms,
                suite,
                mut transcript,
                leaf,
            } => {
                let ske = ServerKeyExchange::decode(&message.payload)?;
                if !self.offer.curves.contains(&ske.named_curve) {
                    return Err(Error::NegotiationFailed(format!(
                        "server chose {} which was not offered",
                        ske.named_curve.name()
                    )));
                }
                if !self.offer.signature_algorithms.contains(&ske.signature_algorithm) {
                    return Err(Error::NegotiationFailed(format!(
                        "server signed with {} which was not offered",
                        ske.signature_algorithm.name()
                    )));
                }
                if ske.signature_algorithm.family() != suite.signature_family() {
                    return Err(Error::NegotiationFailed(format!(
                        "{} does not match {}",
                        ske.signature_algorithm.name(),
                        suite
                    )));
                }

                let signed = ske.signed_data(&randoms.client, &randoms.server)?;
                leaf.verify(
                    &self.registry,
                    ske.signature_algorithm,
                    &signed,
                    &ske.signature,
                )?;
                debug!(
                    "ServerKeyExchange signature verified ({})",
                    ske.signature_algorithm.name()
                );

                let agreement = client_agreement(&self.registry, ske.named_curve, &ske.public_key)?;

                transcript.update(encoded);
                Ok((
                    ClientState::ReceivedServerKeyExchange {
                        randoms,
                        suite,
                        transcript,
                        agreement,
                    },
                    Vec::new(),
                ))
            },

            ClientState::ReceivedServerKeyExchange {
                randoms,
                suite,
                mut transcript,
                agreement,
            } => {
                ServerHelloDone::decode(&message.payload)?;
                transcript.update(encoded);

                let master_secret = derive_master_secret(
                    &self.registry,
                    suite.prf_algorithm(),
                    agreement.pre_master_secret.as_bytes(),
                    &randoms.client,
                    &randoms.server,
                )?;
                let keys = derive_key_block_for_suite(
                    &self.registry,
                    suite,
                    &master_secret,
                    &randoms.server,
                    &randoms.client,
                )?
                .into_session_keys(suite);
                let write_context = CipherContext::new(&self.registry, &keys.client_write)?;

                let client_key_exchange = HandshakeMessage::new(
                    HandshakeType::ClientKeyExchange,
                    ClientKeyExchange::new(agreement.public_key.clone()).encode()?,
                )
                .encode()?;
                transcript.update(&client_key_exchange);

                let verify_data = compute_verify_data(
                    &self.registry,
                    suite.prf_algorithm(),
                    &master_secret,
                    CLIENT_FINISHED_LABEL,
                    &transcript.current_hash()?,
                )?;
                let finished =
                    HandshakeMessage::new(HandshakeType::Finished, Finished::new(verify_data).encode())
                        .encode()?;
                transcript.update(&finished);

                Ok((
                    ClientState::AwaitServerChangeCipherSpec {
                        suite,
                        transcript,
                        master_secret,
                        keys,
                    },
                    vec![
                        ClientOutput::SendHandshake(client_key_exchange),
                        ClientOutput::SendChangeCipherSpec,
                        ClientOutput::ActivateWrite(write_context),
                        ClientOutput::SendHandshake(finished),
                    ],
                ))
            },

            ClientState::AwaitServerFinished {
                suite,
                transcript,
                master_secret,
                keys,
            } => {
                let expected = compute_verify_data(
                    &self.registry,
                    suite.prf_algorithm(),
                    &master_secret,
                    SERVER_FINISHED_LABEL,
                    &transcript.current_hash()?,
                )?;
                Finished::decode(&message.payload)?.verify(&expected)?;

                info!("TLS 1.2 handshake complete with {}", suite);
                Ok((ClientState::Established { keys }, Vec::new()))
            },

            other => Err(Error::InternalError(format!(
                "no handler for {:?} in state {}",
                message.msg_type,
                other.name()
            ))),
        }
    }

    /// Validate ServerHello against what was offered.
    fn check_server_hello(&self, hello: &ServerHello) -> Result<CipherSuite> {
        if hello.server_version != ProtocolVersion::Tls12 {
            return Err(Error::NegotiationFailed(format!(
                "server chose {}",
                hello.server_version.name()
            )));
        }
        if !self.offer.suites.contains(&hello.cipher_suite) {
            return Err(Error::NegotiationFailed(format!(
                "server chose {} which was not offered",
                hello.cipher_suite
            )));
        }
        if hello.compression_method != 0 {
            return Err(Error::NegotiationFailed(format!(
                "server chose compression method {}",
                hello.compression_method
            )));
        }

        for extension in hello.extensions.iter() {
            match extension.extension_type() {
                Some(ExtensionType::RenegotiationInfo) => {
                    if !parse_renegotiation_info(&extension.data)?.is_empty() {
                        return Err(Error::NegotiationFailed(
                            "non-empty renegotiation_info on initial handshake".into(),
                        ));
                    }
                },
                Some(ExtensionType::EcPointFormats) => {
                    if !parse_ec_point_formats(&extension.data)?.contains(&POINT_FORMAT_UNCOMPRESSED) {
                        return Err(Error::NegotiationFailed(
                            "server does not accept uncompressed points".into(),
                        ));
                    }
                },
                Some(ExtensionType::ServerName) if self.offer.server_name.is_some() => {
                    if !extension.data.is_empty() {
                        return Err(Error::MalformedMessage(
                            "server_name acknowledgement must be empty".into(),
                        ));
                    }
                },
                Some(other) => {
                    return Err(Error::NegotiationFailed(format!(
                        "unsolicited {:?} extension",
                        other
                    )));
                },
                None => {},
            }
        }

        Ok(hello.cipher_suite)
    }
}

impl fmt::Debug for ClientHandshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandshake")
            .field("state", &self.state)
            .field("offer", &self.offer)
            .finish()
    }
}
