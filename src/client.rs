//! Client orchestration: connection reuse, cookies, redirects.

use std::time::Duration;

use tracing::{debug, trace};

use crate::cookie::CookieJar;
use crate::error::{Error, Result};
use crate::fingerprint::{Ja3Fingerprint, Profile};
use crate::request::Request;
use crate::response::Response;
use crate::transport::{CertPolicy, Connection, Deadline, ProxyConfig};
use crate::wire;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// HTTP client that impersonates a TLS fingerprint.
///
/// Holds at most one open connection, keyed by (host, port); a request to
/// a different target releases it and opens a new one. `send` takes
/// `&mut self`, so one call is in flight per instance by construction.
/// Run independent clients for concurrency.
pub struct Client {
    fingerprint: Ja3Fingerprint,
    proxy: Option<ProxyConfig>,
    cert_policy: CertPolicy,
    jar: CookieJar,
    allow_redirects: bool,
    max_redirects: u32,
    timeout: Duration,
    connection: Option<Connection>,
}

impl Client {
    /// Client with the default fingerprint and settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn cookie_jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn cookie_jar_mut(&mut self) -> &mut CookieJar {
        &mut self.jar
    }

    /// Convenience GET.
    pub async fn get(&mut self, url: &str) -> Result<Response> {
        self.send(Request::get(url)?).await
    }

    /// Send a request, following redirects when enabled.
    ///
    /// The timeout budget applies per wire hop (connect, handshake, send,
    /// read); each redirect starts a fresh budget.
    pub async fn send(&mut self, request: Request) -> Result<Response> {
        let mut request = request;
        let mut redirects = 0u32;

        loop {
            let url = request.url.clone();
            let host = url
                .host_str()
                .ok_or_else(|| Error::invalid_format("request URL has no host"))?
                .to_string();
            let port = url.port().unwrap_or(443);

            // One deadline per hop, shared by connect, handshake, send,
            // and read.
            let deadline = Deadline::after(self.timeout);

            // Reuse the cached connection only for the same target; a
            // mismatched one is released here by going out of scope.
            let mut connection = match self.connection.take() {
                Some(c) if c.is_for(&host, port) => {
                    trace!(host = %host, port, "reusing connection");
                    c
                }
                _ => {
                    debug!(host = %host, port, "opening connection");
                    Connection::open(
                        &host,
                        port,
                        &self.fingerprint,
                        self.proxy.as_ref(),
                        self.cert_policy,
                        deadline,
                    )
                    .await?
                }
            };

            if !request.has_header("accept-encoding") {
                request.push_header("Accept-Encoding", "gzip, deflate, br");
            }
            if let Some(cookie_header) = self.jar.cookie_header(&url) {
                request.remove_header("cookie");
                request.push_header("Cookie", cookie_header);
            }

            let request_bytes = wire::serialize_request(&request);
            let raw = match connection.send(&request_bytes, deadline).await {
                Ok(raw) => {
                    // Keep the connection only after a clean exchange.
                    self.connection = Some(connection);
                    raw
                }
                Err(e) => return Err(e),
            };

            let response = wire::parse_response(&raw)?;

            for set_cookie in response.get_headers("set-cookie") {
                self.jar.apply_set_cookie(set_cookie, &url);
            }

            if self.allow_redirects && is_redirect_status(response.status) {
                if redirects >= self.max_redirects {
                    return Err(Error::TooManyRedirects { count: redirects });
                }
                if let Some(location) = response.redirect_url() {
                    let new_url = url.join(location)?;
                    debug!(status = response.status, location, "following redirect");
                    request = wire::clone_for_redirect(&request, new_url, response.status);
                    redirects += 1;
                    continue;
                }
            }

            return Ok(response);
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

fn is_redirect_status(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    fingerprint: Ja3Fingerprint,
    proxy: Option<ProxyConfig>,
    cert_policy: CertPolicy,
    allow_redirects: bool,
    max_redirects: u32,
    timeout: Duration,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            fingerprint: Ja3Fingerprint::default(),
            proxy: None,
            cert_policy: CertPolicy::default(),
            allow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientBuilder {
    /// Use an explicit fingerprint.
    pub fn fingerprint(mut self, fingerprint: Ja3Fingerprint) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Use a named profile's fingerprint.
    pub fn profile(mut self, profile: Profile) -> Result<Self> {
        self.fingerprint = profile.fingerprint(None)?;
        Ok(self)
    }

    /// Parse and use a JA3 descriptor string.
    pub fn descriptor(mut self, descriptor: &str) -> Result<Self> {
        self.fingerprint = Ja3Fingerprint::parse(descriptor)?;
        Ok(self)
    }

    /// Route all connections through a proxy.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Parse a proxy URI and route all connections through it.
    pub fn proxy_uri(mut self, uri: &str) -> Result<Self> {
        self.proxy = Some(ProxyConfig::parse(uri)?);
        Ok(self)
    }

    /// Override the certificate acceptance policy.
    pub fn cert_policy(mut self, policy: CertPolicy) -> Self {
        self.cert_policy = policy;
        self
    }

    /// Enable or disable automatic redirects.
    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = allow;
        self
    }

    /// Cap the number of automatic redirects per call.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = max;
        self
    }

    /// Timeout budget for each wire hop.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Client {
        Client {
            fingerprint: self.fingerprint,
            proxy: self.proxy,
            cert_policy: self.cert_policy,
            jar: CookieJar::new(),
            allow_redirects: self.allow_redirects,
            max_redirects: self.max_redirects,
            timeout: self.timeout,
            connection: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_statuses() {
        for status in [301, 302, 303, 307, 308] {
            assert!(is_redirect_status(status));
        }
        for status in [200, 204, 300, 304, 400, 500] {
            assert!(!is_redirect_status(status));
        }
    }

    #[test]
    fn test_builder_defaults() {
        let client = Client::new();
        assert!(client.allow_redirects);
        assert_eq!(client.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
        assert_eq!(client.cert_policy, CertPolicy::AcceptAny);
        assert!(client.cookie_jar().is_empty());
    }

    #[test]
    fn test_builder_with_profile_and_proxy() {
        let client = Client::builder()
            .profile(Profile::Chrome)
            .unwrap()
            .proxy_uri("socks5://127.0.0.1:1080")
            .unwrap()
            .max_redirects(3)
            .allow_redirects(false)
            .build();
        assert_eq!(client.fingerprint.version, 771);
        assert!(!client.allow_redirects);
        assert_eq!(client.max_redirects, 3);
        assert!(client.proxy.is_some());
    }
}
