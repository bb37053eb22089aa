//! # Wraith
//!
//! HTTP/1.1 client with JA3-based TLS fingerprint impersonation.
//!
//! Wraith opens BoringSSL connections whose ClientHello (protocol version,
//! cipher suites, curves, ALPN) is driven by a JA3 descriptor string, then
//! speaks plain HTTP/1.1 over them. It supports HTTP CONNECT and SOCKS5
//! proxies, an in-memory cookie jar, automatic redirects with method
//! rewriting, and transparent gzip/deflate/brotli response decoding.
//!
//! ```no_run
//! # async fn run() -> wraith::Result<()> {
//! let mut client = wraith::Client::builder()
//!     .descriptor("771,4865-4866,0-23-16,29-23,0")?
//!     .build();
//! let response = client.get("https://example.com/").await?;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod cookie;
pub mod error;
pub mod fingerprint;
pub mod headers;
pub mod request;
pub mod response;
pub mod transport;
pub mod wire;

pub use client::{Client, ClientBuilder};
pub use cookie::{Cookie, CookieJar};
pub use error::{Error, Result};
pub use fingerprint::{Ja3Fingerprint, Profile, TlsVersion};
pub use request::Request;
pub use response::Response;
pub use transport::{CertPolicy, ProxyConfig, ProxyScheme};
