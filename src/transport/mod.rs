//! Connection establishment and byte-level transport.
//!
//! TCP (direct, CONNECT tunnel, or SOCKS5) plus a fingerprint-constrained
//! TLS handshake via tokio-boring.

pub mod connection;
pub mod framing;
pub mod proxy;
pub mod socks5;

pub use connection::{CertPolicy, Connection, Deadline};
pub use proxy::{ProxyConfig, ProxyScheme};
