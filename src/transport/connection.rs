//! TLS connection establishment and request/response exchange.
//!
//! A `Connection` is bound to one (host, port) pair. Opening one performs
//! the TCP connect (directly or through a proxy), then a BoringSSL
//! handshake constrained to a JA3 fingerprint. Every blocking step shares
//! one caller-supplied timeout.

use std::future::Future;
use std::time::Duration;

use boring::ssl::{SslConnector, SslMethod, SslVerifyMode, SslVersion};
use tokio::net::TcpStream;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tokio_boring::SslStream;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fingerprint::{Ja3Fingerprint, TlsVersion};
use crate::transport::framing;
use crate::transport::proxy::{self, ProxyConfig, ProxyScheme};
use crate::transport::socks5;

/// Shared deadline for every blocking step of one wire hop.
///
/// Created once per hop from the configured timeout; connect, proxy
/// negotiation, handshake, send, and read all race against the same
/// instant, so a hop can never block longer than the budget in total.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Run a step under the deadline.
    async fn bound<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.budget)),
        }
    }
}

/// Server certificate acceptance policy.
///
/// `AcceptAny` is the default: an impersonation client must complete the
/// handshake against whatever certificate the origin (or an interception
/// box) presents. Swap in `Verify` to restore normal peer verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertPolicy {
    #[default]
    AcceptAny,
    Verify,
}

/// An open, handshake-complete TLS connection to one origin.
#[derive(Debug)]
pub struct Connection {
    stream: SslStream<TcpStream>,
    host: String,
    port: u16,
}

impl Connection {
    /// Open a connection and complete the TLS handshake.
    pub async fn open(
        host: &str,
        port: u16,
        fingerprint: &Ja3Fingerprint,
        proxy: Option<&ProxyConfig>,
        cert_policy: CertPolicy,
        deadline: Deadline,
    ) -> Result<Self> {
        // Fail fast before touching the network.
        let version = fingerprint.tls_version().ok_or_else(|| {
            Error::tls(format!(
                "unsupported protocol version code {}",
                fingerprint.version
            ))
        })?;

        let (tcp_host, tcp_port) = match proxy {
            Some(p) => (p.host.as_str(), p.port),
            None => (host, port),
        };
        let addr = format!("{}:{}", tcp_host, tcp_port);
        let mut tcp = deadline
            .bound(async {
                TcpStream::connect(&addr)
                    .await
                    .map_err(|e| Error::connect(format!("{}: {}", addr, e)))
            })
            .await?;

        if let Some(p) = proxy {
            match p.scheme {
                ProxyScheme::Http => {
                    deadline
                        .bound(proxy::connect_tunnel(&mut tcp, p, host, port))
                        .await?;
                }
                ProxyScheme::Socks5 => {
                    deadline
                        .bound(socks5::handshake(&mut tcp, p, host, port))
                        .await?;
                }
            }
            debug!(proxy = %addr, target = %host, "proxy tunnel established");
        }

        let connector = configure_tls(fingerprint, version, cert_policy)?;
        let mut config = connector
            .configure()
            .map_err(|e| Error::tls(format!("failed to configure TLS session: {}", e)))?;
        if cert_policy == CertPolicy::AcceptAny {
            config.set_verify_hostname(false);
        }

        let stream = deadline
            .bound(async {
                tokio_boring::connect(config, host, tcp)
                    .await
                    .map_err(|e| Error::tls(e.to_string()))
            })
            .await?;

        debug!(host, port, "TLS handshake complete");
        Ok(Self {
            stream,
            host: host.to_string(),
            port,
        })
    }

    /// Whether this connection is bound to the given target.
    pub fn is_for(&self, host: &str, port: u16) -> bool {
        self.port == port && self.host.eq_ignore_ascii_case(host)
    }

    /// Write request bytes and read back the full raw response
    /// (header block plus decoded body bytes).
    ///
    /// On any failure the connection must be discarded, not reused.
    pub async fn send(&mut self, request: &[u8], deadline: Deadline) -> Result<Vec<u8>> {
        deadline
            .bound(async {
                self.stream.write_all(request).await?;
                self.stream.flush().await?;
                Ok(())
            })
            .await?;

        deadline.bound(framing::read_response(&mut self.stream)).await
    }
}

/// Build an `SslConnector` pinned to the fingerprint's parameters.
fn configure_tls(
    fingerprint: &Ja3Fingerprint,
    version: TlsVersion,
    cert_policy: CertPolicy,
) -> Result<SslConnector> {
    let mut builder = SslConnector::builder(SslMethod::tls_client())
        .map_err(|e| Error::tls(format!("failed to create TLS connector: {}", e)))?;

    let ssl_version = match version {
        TlsVersion::Tls10 => SslVersion::TLS1,
        TlsVersion::Tls11 => SslVersion::TLS1_1,
        TlsVersion::Tls12 => SslVersion::TLS1_2,
    };
    // The fingerprint names exactly one negotiable version.
    builder
        .set_min_proto_version(Some(ssl_version))
        .map_err(|e| Error::tls(format!("failed to set min TLS version: {}", e)))?;
    builder
        .set_max_proto_version(Some(ssl_version))
        .map_err(|e| Error::tls(format!("failed to set max TLS version: {}", e)))?;

    let ciphers = fingerprint.cipher_names()?;
    if !ciphers.is_empty() {
        builder
            .set_cipher_list(&ciphers.join(":"))
            .map_err(|e| Error::tls(format!("failed to set cipher list: {}", e)))?;
    }

    let curves = fingerprint.curve_names();
    if !curves.is_empty() {
        builder
            .set_curves_list(&curves.join(":"))
            .map_err(|e| Error::tls(format!("failed to set curves: {}", e)))?;
    }

    let alpn = encode_alpn(&fingerprint.alpn_protocols());
    if !alpn.is_empty() {
        builder
            .set_alpn_protos(&alpn)
            .map_err(|e| Error::tls(format!("failed to set ALPN: {}", e)))?;
    }

    match cert_policy {
        CertPolicy::AcceptAny => builder.set_verify(SslVerifyMode::NONE),
        CertPolicy::Verify => builder.set_verify(SslVerifyMode::PEER),
    }

    Ok(builder.build())
}

/// Encode protocol names into the ALPN wire format (length-prefixed).
fn encode_alpn(protocols: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in protocols {
        out.push(p.len() as u8);
        out.extend_from_slice(p.as_bytes());
    }
    out
}
