//! ECDHE handshake messages.
//!
//! - Certificate: the server's chain, leaf first
//! - ServerKeyExchange: the server's ephemeral point and its signature
//! - ServerHelloDone: end of the server's first flight
//! - ClientKeyExchange: the client's ephemeral point

pub mod certificate;
pub mod client_key_exchange;
pub mod server_hello_done;
pub mod server_key_exchange;

pub use certificate::Certificate;
pub use client_key_exchange::ClientKeyExchange;
pub use server_hello_done::ServerHelloDone;
pub use server_key_exchange::ServerKeyExchange;
