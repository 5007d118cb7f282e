//! Async TLS client over tokio streams.
//!
//! Drives the same sans-IO [`ClientConnection`] as the blocking
//! [`Handshaker`](ectls_core::Handshaker); the only await points are record
//! reads and flight writes.

use async_trait::async_trait;
use ectls_core::record::{RecordHeader, TlsPlaintext, RECORD_HEADER_SIZE};
use ectls_core::tls12::ClientConnection;
use ectls_core::{CipherSuite, Error, Result, SessionKeys};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::client::TlsConnector;

/// Reliable, ordered async byte stream.
#[async_trait]
pub trait AsyncTransport {
    /// Fill `buf` completely. EOF before that is an error.
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write all of `buf` and flush.
    async fn write_all(&mut self, buf: &[u8]) -> Result<()>;
}

#[async_trait]
impl<S> AsyncTransport for S
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match AsyncReadExt::read_exact(self, buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(Error::IoError("connection closed by peer".into()))
            },
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        AsyncWriteExt::write_all(self, buf).await?;
        AsyncWriteExt::flush(self).await?;
        Ok(())
    }
}

/// Read exactly one record.
pub async fn read_record<T: AsyncTransport + Send + ?Sized>(transport: &mut T) -> Result<TlsPlaintext> {
    let mut header = [0u8; RECORD_HEADER_SIZE];
    transport.read_exact(&mut header).await?;
    let header = RecordHeader::decode(&header)?;

    let mut fragment = vec![0u8; header.length];
    transport.read_exact(&mut fragment).await?;

    Ok(TlsPlaintext::new(header.content_type, header.version, fragment))
}

impl TlsConnector {
    /// Run a handshake with `server_name` over a tokio stream.
    pub async fn connect_async<S>(&self, server_name: &str, mut stream: S) -> Result<TlsStream<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let config = self.config_for(server_name)?;
        let mut connection = ClientConnection::new(self.registry().clone(), &config)?;

        match handshake(&mut connection, &mut stream).await {
            Ok(keys) => {
                info!("Connected to {} with {}", server_name, keys.cipher_suite());
                Ok(TlsStream {
                    connection,
                    stream,
                    keys,
                })
            },
            Err(error) => {
                abort(&mut connection, &mut stream, &error).await;
                Err(error)
            },
        }
    }
}

async fn handshake<S>(connection: &mut ClientConnection, stream: &mut S) -> Result<SessionKeys>
where
    S: AsyncTransport + Send + ?Sized,
{
    let hello = connection.start()?;
    send(stream, &hello).await?;

    while !connection.is_established() {
        let record = read_record(stream).await?;
        debug!(
            "Received {:?} record ({} bytes)",
            record.content_type,
            record.fragment.len()
        );
        let outgoing = connection.handle_record(record)?;
        send(stream, &outgoing).await?;
    }

    connection
        .session_keys()
        .cloned()
        .ok_or_else(|| Error::InternalError("established without keys".into()))
}

async fn abort<S>(connection: &mut ClientConnection, stream: &mut S, error: &Error)
where
    S: AsyncTransport + Send + ?Sized,
{
    if let Some(alert) = connection.fatal_alert(error) {
        let _ = send(stream, &alert).await;
    }
}

async fn send<S>(stream: &mut S, bytes: &[u8]) -> Result<()>
where
    S: AsyncTransport + Send + ?Sized,
{
    if bytes.is_empty() {
        return Ok(());
    }
    stream.write_all(bytes).await
}

/// Established client connection over a tokio stream.
#[derive(Debug)]
pub struct TlsStream<S> {
    connection: ClientConnection,
    stream: S,
    keys: SessionKeys,
}

impl<S> TlsStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Keys negotiated by the handshake.
    pub fn session_keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// The negotiated suite.
    pub fn cipher_suite(&self) -> CipherSuite {
        self.keys.cipher_suite()
    }

    /// Send `data` as application data records.
    pub async fn write_application_data(&mut self, data: &[u8]) -> Result<()> {
        let wire = self.connection.write_application_data(data)?;
        send(&mut self.stream, &wire).await
    }

    /// Read until at least one byte of application data arrives; empty once
    /// the peer has sent close_notify.
    pub async fn read_application_data(&mut self) -> Result<Vec<u8>> {
        loop {
            let data = self.connection.take_application_data();
            if !data.is_empty() {
                return Ok(data);
            }
            if self.connection.peer_closed() {
                return Ok(Vec::new());
            }

            let record = read_record(&mut self.stream).await?;
            match self.connection.handle_record(record) {
                Ok(outgoing) => send(&mut self.stream, &outgoing).await?,
                Err(error) => {
                    abort(&mut self.connection, &mut self.stream, &error).await;
                    return Err(error);
                },
            }
        }
    }

    /// Send close_notify and hand back the stream.
    pub async fn close(mut self) -> Result<S> {
        if !self.connection.peer_closed() {
            let alert = self.connection.close_notify()?;
            send(&mut self.stream, &alert).await?;
        }
        debug!("Connection closed");
        Ok(self.stream)
    }
}
