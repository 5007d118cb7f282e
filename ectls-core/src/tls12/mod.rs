//! TLS 1.2 ECDHE client.
//!
//! ## Architecture
//!
//! ```text
//! tls12/
//! ├── mod.rs                 - Module root (this file)
//! ├── cipher_suites.rs       - ECDHE suites and their parameters
//! ├── messages/              - Certificate, ServerKeyExchange, ServerHelloDone, ClientKeyExchange
//! ├── extensions.rs          - Hello extension bodies
//! ├── prf.rs                 - PRF, master secret, key block, verify data
//! ├── key_exchange.rs        - ECDHE agreement
//! ├── certificate_parser.rs  - Leaf public key extraction (x509-parser)
//! ├── record.rs              - CBC and AEAD record protection, RecordLayer
//! ├── client.rs              - Sans-IO handshake state machine
//! ├── connection.rs          - State machine + record layer, fed one record at a time
//! └── handshaker.rs          - Blocking driver, kickstart()
//! ```
//!
//! ## Supported
//!
//! - ECDHE_ECDSA and ECDHE_RSA with AES-128/256-GCM
//! - ECDHE_ECDSA and ECDHE_RSA with AES-128-CBC-SHA256 and AES-256-CBC-SHA384
//! - secp256r1 and secp384r1
//! - RSA PKCS#1 v1.5 and ECDSA signatures on ServerKeyExchange
//!
//! ## Not supported
//!
//! - session resumption and renegotiation
//! - client certificates
//! - static RSA and non-EC Diffie-Hellman
//! - the server role

pub mod certificate_parser;
pub mod cipher_suites;
pub mod client;
pub mod connection;
pub mod extensions;
pub mod handshaker;
pub mod key_exchange;
pub mod messages;
pub mod prf;
pub mod record;

pub use cipher_suites::CipherSuite;
pub use client::{ClientHandshake, ClientState};
pub use connection::ClientConnection;
pub use handshaker::Handshaker;
pub use prf::{DirectionKeys, SessionKeys, Tls12Prf};
pub use record::{CipherContext, Direction, RecordLayer};
