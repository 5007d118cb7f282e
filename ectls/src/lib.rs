//! # ectls
//!
//! TLS 1.2 client with ECDHE key exchange, ECDSA/RSA server authentication
//! and AES-GCM or AES-CBC record protection.
//!
//! ## Quick Start
//!
//! ### Blocking Client
//!
//! ```rust,no_run
//! use std::net::TcpStream;
//! use ectls::{ClientConfig, TlsConnector};
//!
//! # fn main() -> ectls::Result<()> {
//! let connector = TlsConnector::new(ClientConfig::default())?;
//! let tcp = TcpStream::connect("example.com:443")?;
//! let mut tls = connector.connect("example.com", tcp)?;
//!
//! tls.write_application_data(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n")?;
//! let response = tls.read_application_data()?;
//! println!("{}", String::from_utf8_lossy(&response));
//! tls.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Async Client
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # async fn example() -> ectls::Result<()> {
//! use ectls::{ClientConfig, TlsConnector};
//! use tokio::net::TcpStream;
//!
//! let connector = TlsConnector::new(ClientConfig::default())?;
//! let tcp = TcpStream::connect("example.com:443").await?;
//! let mut tls = connector.connect_async("example.com", tcp).await?;
//! tls.write_application_data(b"ping").await?;
//! # Ok(())
//! # }
//! ```
//!
//! The server certificate's signature on the key exchange is always checked.
//! Chain validation against trust anchors is not performed; callers that
//! need it can inspect the peer and decide before sending data.
//!
//! ## Feature Flags
//!
//! - `async`: tokio driver ([`TlsConnector::connect_async`])

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]
#![forbid(unsafe_code)]

// Re-export core types
pub use ectls_core::{
    self, AlertDescription, CipherSuite, ClientConfig, DirectionKeys, Error, Result, SessionKeys,
};

// Re-export crypto interface
pub use ectls_core::ectls_crypto;

pub mod client;

#[cfg(feature = "async")]
pub mod stream;

pub use client::{TlsConnection, TlsConnector};

#[cfg(feature = "async")]
pub use stream::TlsStream;

/// ectls version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the ectls version.
pub fn version() -> &'static str {
    VERSION
}
