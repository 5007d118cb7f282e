//! Blocking handshake driver.
//!
//! ```rust,no_run
//! use std::net::TcpStream;
//! use std::sync::Arc;
//! use ectls_core::tls12::handshaker::Handshaker;
//! use ectls_core::ClientConfig;
//! # fn registry() -> Arc<ectls_core::ectls_crypto::ProviderRegistry> { unimplemented!() }
//!
//! # fn main() -> ectls_core::Result<()> {
//! let stream = TcpStream::connect("example.com:443")?;
//! let config = ClientConfig::builder().with_server_name("example.com").build()?;
//! let mut handshaker = Handshaker::new(registry(), config, stream)?;
//! let keys = handshaker.kickstart(true)?;
//! println!("negotiated {}", keys.cipher_suite());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ectls_crypto::ProviderRegistry;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::tls12::client::ClientState;
use crate::tls12::connection::ClientConnection;
use crate::tls12::prf::SessionKeys;
use crate::transport::{read_record, Transport};
use crate::ClientConfig;

/// Runs a client handshake over a blocking [`Transport`].
#[derive(Debug)]
pub struct Handshaker<T> {
    connection: ClientConnection,
    transport: T,
}

impl<T: Transport> Handshaker<T> {
    /// Create a handshaker. The registry is shared; everything else is
    /// private to this connection.
    pub fn new(registry: Arc<ProviderRegistry>, config: ClientConfig, transport: T) -> Result<Self> {
        Ok(Self {
            connection: ClientConnection::new(registry, &config)?,
            transport,
        })
    }

    /// Run the handshake to completion.
    ///
    /// Only the client role exists; `kickstart(false)` fails with
    /// `UnsupportedFeature`. On a local failure a fatal alert is sent before
    /// the error is returned.
    ///
    /// Calling it again after success returns the same keys. After a failure
    /// it returns `InternalError` and sends nothing.
    pub fn kickstart(&mut self, is_client: bool) -> Result<SessionKeys> {
        if !is_client {
            return Err(Error::UnsupportedFeature(
                "server-side TLS 1.2 handshake".into(),
            ));
        }
        if let Some(keys) = self.connection.session_keys() {
            debug!("Handshake already complete");
            return Ok(keys.clone());
        }
        if !matches!(self.connection.state(), ClientState::Start) {
            return Err(Error::InternalError(format!(
                "handshake already attempted, state {}",
                self.connection.state().name()
            )));
        }

        match self.run() {
            Ok(keys) => Ok(keys),
            Err(error) => {
                if let Some(alert) = self.connection.fatal_alert(&error) {
                    let _ = self
                        .transport
                        .write_all(&alert)
                        .and_then(|()| self.transport.flush());
                }
                Err(error)
            },
        }
    }

    fn run(&mut self) -> Result<SessionKeys> {
        let hello = self.connection.start()?;
        self.send(&hello)?;
        info!("ClientHello sent");

        while !self.connection.is_established() {
            let record = read_record(&mut self.transport)?;
            debug!(
                "Received {:?} record ({} bytes)",
                record.content_type,
                record.fragment.len()
            );
            let outgoing = self.connection.handle_record(record)?;
            self.send(&outgoing)?;
        }

        self.connection
            .session_keys()
            .cloned()
            .ok_or_else(|| Error::InternalError("established without keys".into()))
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.transport.write_all(bytes)?;
        self.transport.flush()
    }

    /// The connection state.
    pub fn connection(&self) -> &ClientConnection {
        &self.connection
    }

    /// Split into the connection and the transport, to keep using the
    /// session after the handshake.
    pub fn into_parts(self) -> (ClientConnection, T) {
        (self.connection, self.transport)
    }
}
