//! Error types for the wraith crate.

use std::io;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building fingerprints or performing requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed JA3 descriptor or profile misuse.
    #[error("Invalid fingerprint descriptor: {0}")]
    InvalidFormat(String),

    /// Cipher suite ID absent from the translation table.
    #[error("Unsupported cipher suite ID: {0}")]
    UnsupportedCipherSuite(u16),

    /// Named fingerprint profile has no built-in descriptor.
    #[error("Unsupported fingerprint profile: {0}")]
    UnsupportedProfile(String),

    /// TCP connect to the origin or proxy failed.
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Proxy negotiation (CONNECT tunnel or SOCKS5 handshake) failed.
    #[error("Proxy negotiation failed: {0}")]
    ProxyFailed(String),

    /// TLS handshake failed or the fingerprint's protocol version is unusable.
    #[error("TLS handshake failed: {0}")]
    TlsHandshakeFailed(String),

    /// A blocking step exceeded the per-call budget.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// No header/body boundary found in the response stream.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Redirect limit exceeded.
    #[error("Redirect limit exceeded ({count} redirects)")]
    TooManyRedirects { count: u32 },

    /// Cookie parsing error.
    #[error("Cookie parse error: {0}")]
    CookieParse(String),

    /// Decompression error.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an invalid-descriptor error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }

    /// Create a connect error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::ConnectFailed(message.into())
    }

    /// Create a proxy negotiation error.
    pub fn proxy(message: impl Into<String>) -> Self {
        Self::ProxyFailed(message.into())
    }

    /// Create a TLS handshake error.
    pub fn tls(message: impl Into<String>) -> Self {
        Self::TlsHandshakeFailed(message.into())
    }

    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}
