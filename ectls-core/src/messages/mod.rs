//! Handshake messages shared by every key exchange.
//!
//! The ECDHE-specific messages live in [`crate::tls12::messages`].

pub mod client_hello;
pub mod finished;
pub mod server_hello;

pub use client_hello::ClientHello;
pub use finished::{Finished, VERIFY_DATA_LENGTH};
pub use server_hello::ServerHello;
