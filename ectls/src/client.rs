//! Blocking TLS client.

use std::io::{Read, Write};
use std::net::IpAddr;
use std::sync::Arc;

use ectls_core::ectls_crypto::{CryptoProvider, ProviderRegistry};
use ectls_core::tls12::{ClientConnection, Handshaker};
use ectls_core::transport::{read_record, Transport};
use ectls_core::{CipherSuite, ClientConfig, Result, SessionKeys};
use ectls_crypto_rustcrypto::RustCryptoProvider;
use tracing::{debug, info};

/// Creates client connections that share one algorithm registry and
/// configuration.
#[derive(Debug, Clone)]
pub struct TlsConnector {
    registry: Arc<ProviderRegistry>,
    config: ClientConfig,
}

impl TlsConnector {
    /// Connector backed by the RustCrypto provider with every algorithm it
    /// supports enabled.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let registry = ProviderRegistry::builder(Arc::new(RustCryptoProvider::new()))
            .with_all_supported()
            .build()?;
        Ok(Self::with_registry(Arc::new(registry), config))
    }

    /// Connector using a caller-built registry.
    pub fn with_registry(registry: Arc<ProviderRegistry>, config: ClientConfig) -> Self {
        Self { registry, config }
    }

    /// The base configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Configuration for one connection to `server_name`.
    ///
    /// IP literals are not sent as server_name.
    pub(crate) fn config_for(&self, server_name: &str) -> Result<ClientConfig> {
        let builder = ClientConfig::builder()
            .with_cipher_suites(&self.config.cipher_suites)
            .with_curves(&self.config.curves)
            .with_signature_algorithms(&self.config.signature_algorithms)
            .with_max_fragment_length(self.config.max_fragment_length);

        if server_name.parse::<IpAddr>().is_ok() {
            builder.build()
        } else {
            builder.with_server_name(server_name).build()
        }
    }

    /// Run a handshake with `server_name` over `stream`.
    pub fn connect<S: Read + Write>(&self, server_name: &str, stream: S) -> Result<TlsConnection<S>> {
        let config = self.config_for(server_name)?;
        let mut handshaker = Handshaker::new(self.registry.clone(), config, stream)?;
        let keys = handshaker.kickstart(true)?;
        info!("Connected to {} with {}", server_name, keys.cipher_suite());

        let (connection, stream) = handshaker.into_parts();
        Ok(TlsConnection {
            connection,
            stream,
            keys,
        })
    }
}

/// Established client connection over a blocking stream.
#[derive(Debug)]
pub struct TlsConnection<S> {
    connection: ClientConnection,
    stream: S,
    keys: SessionKeys,
}

impl<S: Read + Write> TlsConnection<S> {
    /// Keys negotiated by the handshake.
    pub fn session_keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// The negotiated suite.
    pub fn cipher_suite(&self) -> CipherSuite {
        self.keys.cipher_suite()
    }

    /// Send `data`, split into records of at most the configured fragment
    /// length.
    pub fn write_application_data(&mut self, data: &[u8]) -> Result<()> {
        let wire = self.connection.write_application_data(data)?;
        self.send(&wire)
    }

    /// Read until at least one byte of application data arrives.
    ///
    /// Returns an empty vector once the peer has sent close_notify.
    pub fn read_application_data(&mut self) -> Result<Vec<u8>> {
        loop {
            let data = self.connection.take_application_data();
            if !data.is_empty() {
                return Ok(data);
            }
            if self.connection.peer_closed() {
                return Ok(Vec::new());
            }

            let record = read_record(&mut self.stream)?;
            match self.connection.handle_record(record) {
                Ok(outgoing) => self.send(&outgoing)?,
                Err(error) => {
                    if let Some(alert) = self.connection.fatal_alert(&error) {
                        let _ = self.send(&alert);
                    }
                    return Err(error);
                },
            }
        }
    }

    /// Send close_notify and hand back the stream.
    pub fn close(mut self) -> Result<S> {
        if !self.connection.peer_closed() {
            let alert = self.connection.close_notify()?;
            self.send(&alert)?;
        }
        debug!("Connection closed");
        Ok(self.stream)
    }

    /// The underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        Transport::write_all(&mut self.stream, bytes)?;
        Transport::flush(&mut self.stream)
    }
}
