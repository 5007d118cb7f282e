//! Sans-IO client connection.
//!
//! Couples the handshake state machine with the record layer and the
//! handshake reassembly buffer. Callers feed it one record at a time and
//! write out whatever bytes it returns; the blocking [`Handshaker`] and the
//! async facade driver both work this way.
//!
//! [`Handshaker`]: crate::tls12::handshaker::Handshaker

use std::sync::Arc;

use ectls_crypto::ProviderRegistry;
use tracing::{debug, warn};

use crate::alert::{Alert, AlertLevel};
use crate::error::{AlertDescription, Error, Result};
use crate::handshake_io::HandshakeMessageParser;
use crate::protocol::{ContentType, HandshakeType};
use crate::record::{fragment, TlsPlaintext};
use crate::tls12::client::{ClientHandshake, ClientOutput, ClientState};
use crate::tls12::prf::SessionKeys;
use crate::tls12::record::{Direction, RecordLayer};
use crate::ClientConfig;

/// Client connection state above the transport.
#[derive(Debug)]
pub struct ClientConnection {
    handshake: ClientHandshake,
    records: RecordLayer,
    parser: HandshakeMessageParser,
    max_fragment_length: usize,
    received: Vec<u8>,
    peer_closed: bool,
    failed: bool,
}

impl ClientConnection {
    /// Create a connection; nothing is sent until [`start`](Self::start).
    pub fn new(registry: Arc<ProviderRegistry>, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            handshake: ClientHandshake::new(registry.clone(), config)?,
            records: RecordLayer::new(registry),
            parser: HandshakeMessageParser::new(),
            max_fragment_length: usize::from(config.max_fragment_length),
            received: Vec::new(),
            peer_closed: false,
            failed: false,
        })
    }

    /// Wire bytes of the ClientHello flight.
    pub fn start(&mut self) -> Result<Vec<u8>> {
        let outputs = self.handshake.start()?;
        let mut outgoing = Vec::new();
        self.apply(outputs, &mut outgoing)?;
        Ok(outgoing)
    }

    /// Handshake state.
    pub fn state(&self) -> &ClientState {
        self.handshake.state()
    }

    /// True once both Finished messages have been verified.
    pub fn is_established(&self) -> bool {
        self.handshake.is_established()
    }

    /// Negotiated keys, once established.
    pub fn session_keys(&self) -> Option<&SessionKeys> {
        self.handshake.session_keys()
    }

    /// True after the peer sent close_notify.
    pub fn peer_closed(&self) -> bool {
        self.peer_closed
    }

    /// Record layer, for inspection.
    pub fn record_layer(&self) -> &RecordLayer {
        &self.records
    }

    /// Process one record and return the bytes to send in response.
    pub fn handle_record(&mut self, record: TlsPlaintext) -> Result<Vec<u8>> {
        if self.failed {
            return Err(Error::InternalError("connection already failed".into()));
        }

        let result = self.process(record);
        if result.is_err() {
            self.failed = true;
            self.handshake.abort();
        }
        result
    }

    /// Application data received so far; the buffer is emptied.
    pub fn take_application_data(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.received)
    }

    /// Protect application data, split into records of at most the
    /// configured fragment length.
    pub fn write_application_data(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        if !self.is_established() || self.failed {
            return Err(Error::UnexpectedMessage(
                "application data before the handshake completed".into(),
            ));
        }

        let mut outgoing = Vec::new();
        for chunk in fragment(data, self.max_fragment_length) {
            outgoing.extend_from_slice(&self.records.write_record(ContentType::ApplicationData, chunk)?);
        }
        Ok(outgoing)
    }

    /// A close_notify alert record.
    pub fn close_notify(&mut self) -> Result<Vec<u8>> {
        if self.failed {
            return Err(Error::InternalError("connection already failed".into()));
        }
        self.records
            .write_record(ContentType::Alert, &Alert::close_notify().encode())
    }

    /// Best-effort fatal alert for a local error, if it maps to one.
    ///
    /// Marks the connection failed and releases all key material; the
    /// alert is protected with the write keys in force before the release.
    pub fn fatal_alert(&mut self, error: &Error) -> Option<Vec<u8>> {
        warn!("Aborting connection in state {}: {}", self.state().name(), error);
        let alert = error.alert_description().and_then(|description| {
            self.records
                .write_record(ContentType::Alert, &Alert::fatal(description).encode())
                .ok()
        });

        self.failed = true;
        self.handshake.abort();
        self.records.release();
        alert
    }

    /// True after a fatal error.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn process(&mut self, record: TlsPlaintext) -> Result<Vec<u8>> {
        let (content_type, plaintext) = self.records.open_record(record)?;
        let mut outgoing = Vec::new();

        match content_type {
            ContentType::Alert => self.handle_alert(&plaintext, &mut outgoing)?,

            ContentType::ChangeCipherSpec => {
                if !self.parser.is_empty() {
                    return Err(Error::UnexpectedMessage(
                        "ChangeCipherSpec inside a fragmented handshake message".into(),
                    ));
                }
                let outputs = self.handshake.handle_change_cipher_spec(&plaintext)?;
                self.apply(outputs, &mut outgoing)?;
            },

            ContentType::Handshake => {
                self.parser.add_data(&plaintext);
                while let Some(message) = self.parser.next_message()? {
                    if message.msg_type == HandshakeType::HelloRequest {
                        self.refuse_renegotiation(&mut outgoing)?;
                        continue;
                    }
                    if self.is_established() {
                        return Err(Error::UnexpectedMessage(format!(
                            "{:?} after the handshake completed",
                            message.msg_type
                        )));
                    }
                    let outputs = self.handshake.handle_handshake(&message)?;
                    self.apply(outputs, &mut outgoing)?;
                }
            },

            ContentType::ApplicationData => {
                if !self.is_established() {
                    return Err(Error::UnexpectedMessage(
                        "application data during the handshake".into(),
                    ));
                }
                self.received.extend_from_slice(&plaintext);
            },
        }

        Ok(outgoing)
    }

    fn handle_alert(&mut self, body: &[u8], outgoing: &mut Vec<u8>) -> Result<()> {
        let alert = Alert::decode(body)?;

        if !self.is_established() || alert.is_fatal() {
            warn!("Received {:?} alert {:?}", alert.level, alert.description);
            return Err(Error::AlertReceived(alert.description));
        }

        match alert.description {
            AlertDescription::CloseNotify => {
                debug!("Peer sent close_notify");
                self.peer_closed = true;
                outgoing.extend_from_slice(&self.close_notify()?);
            },
            other => debug!("Ignoring warning alert {:?}", other),
        }
        Ok(())
    }

    /// HelloRequest is ignored during the handshake and answered with a
    /// no_renegotiation warning afterwards.
    fn refuse_renegotiation(&mut self, outgoing: &mut Vec<u8>) -> Result<()> {
        if !self.is_established() {
            debug!("Ignoring HelloRequest during handshake");
            return Ok(());
        }
        let alert = Alert::new(AlertLevel::Warning, AlertDescription::NoRenegotiation);
        outgoing.extend_from_slice(&self.records.write_record(ContentType::Alert, &alert.encode())?);
        Ok(())
    }

    fn apply(&mut self, outputs: Vec<ClientOutput>, outgoing: &mut Vec<u8>) -> Result<()> {
        for output in outputs {
            match output {
                ClientOutput::SendHandshake(message) => {
                    for chunk in fragment(&message, self.max_fragment_length) {
                        outgoing.extend_from_slice(&self.records.write_record(ContentType::Handshake, chunk)?);
                    }
                },
                ClientOutput::SendChangeCipherSpec => {
                    outgoing.extend_from_slice(&self.records.write_record(ContentType::ChangeCipherSpec, &[1])?);
                },
                ClientOutput::ActivateWrite(context) => {
                    self.records.activate_change_cipher_spec(Direction::Write, context);
                },
                ClientOutput::ActivateRead(context) => {
                    self.records.activate_change_cipher_spec(Direction::Read, context);
                },
            }
        }
        Ok(())
    }
}
