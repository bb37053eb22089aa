//! RFC 6265 style cookie handling.
//!
//! Manual cookie storage keyed by origin; no automatic engine. The jar is
//! in-memory only and lives exactly as long as its owning client.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use url::Url;

use crate::error::{Error, Result};

/// A single cookie with its RFC 6265 attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<i64>,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: normalize_domain(&domain.into()),
            path: "/".to_string(),
            secure: false,
            http_only: false,
            same_site: None,
            expires: None,
            max_age: None,
        }
    }

    /// Parse a `Set-Cookie` header value observed on a response to
    /// `request_url`.
    pub fn from_set_cookie_header(header: &str, request_url: &Url) -> Result<Self> {
        let request_domain = request_url
            .host_str()
            .ok_or_else(|| Error::CookieParse("no host in URL".to_string()))?;

        let parts: Vec<&str> = header.split(';').map(str::trim).collect();
        let (name, value) = match parts[0].split_once('=') {
            Some((n, v)) => (n.trim().to_string(), v.trim().to_string()),
            None => return Err(Error::CookieParse("no = in cookie".to_string())),
        };
        if name.is_empty() {
            return Err(Error::CookieParse("empty cookie name".to_string()));
        }

        let mut cookie = Cookie::new(name, value, request_domain);
        for attr in parts.iter().skip(1) {
            let attr_lower = attr.to_lowercase();
            if attr_lower == "secure" {
                cookie.secure = true;
            } else if attr_lower == "httponly" {
                cookie.http_only = true;
            } else if let Some((key, val)) = attr.split_once('=') {
                match key.trim().to_lowercase().as_str() {
                    "domain" => cookie.domain = normalize_domain(val.trim()),
                    "path" => cookie.path = val.trim().to_string(),
                    "expires" => cookie.expires = parse_cookie_date(val.trim()),
                    "max-age" => cookie.max_age = val.trim().parse().ok(),
                    "samesite" => cookie.same_site = Some(val.trim().to_string()),
                    _ => {}
                }
            }
        }
        Ok(cookie)
    }

    /// Whether this cookie should be sent on a request to `url`.
    pub fn matches_url(&self, url: &Url) -> bool {
        let request_domain = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };

        if self.secure && url.scheme() != "https" {
            return false;
        }
        if let Some(expires) = self.expires {
            if expires < Utc::now() {
                return false;
            }
        }

        let cookie_domain = self.domain.to_lowercase();
        if request_domain != cookie_domain
            && !request_domain.ends_with(&format!(".{}", cookie_domain))
        {
            return false;
        }

        let request_path = url.path();
        request_path == self.path
            || request_path.starts_with(&format!("{}/", self.path.trim_end_matches('/')))
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// In-memory cookie jar, keyed by normalized domain.
#[derive(Debug, Default, Clone)]
pub struct CookieJar {
    cookies: HashMap<String, HashMap<String, Cookie>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cookie under its domain and name.
    pub fn store(&mut self, cookie: Cookie) {
        self.cookies
            .entry(cookie.domain.clone())
            .or_default()
            .insert(cookie.name.clone(), cookie);
    }

    /// Parse a `Set-Cookie` value and store it, keyed by the request URL.
    /// Unparseable cookies are dropped.
    pub fn apply_set_cookie(&mut self, header: &str, request_url: &Url) {
        if let Ok(cookie) = Cookie::from_set_cookie_header(header, request_url) {
            self.store(cookie);
        }
    }

    /// All cookies that match a request URL.
    pub fn cookies_for_url(&self, url: &Url) -> Vec<&Cookie> {
        self.cookies
            .values()
            .flat_map(|m| m.values())
            .filter(|c| c.matches_url(url))
            .collect()
    }

    /// Combined `Cookie` header value for a request URL, if any match.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies_for_url(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn get(&self, domain: &str, name: &str) -> Option<&Cookie> {
        self.cookies.get(&normalize_domain(domain))?.get(name)
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn len(&self) -> usize {
        self.cookies.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

fn normalize_domain(domain: &str) -> String {
    domain.strip_prefix('.').unwrap_or(domain).to_lowercase()
}

fn parse_cookie_date(date_str: &str) -> Option<DateTime<Utc>> {
    for fmt in [
        "%a, %d %b %Y %H:%M:%S GMT",
        "%a, %d-%b-%Y %H:%M:%S GMT",
        "%a, %d-%b-%y %H:%M:%S GMT",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, fmt) {
            return Some(dt.and_utc());
        }
    }
    None
}
