//! HTTP response model and content decompression.

use std::io::Read;

use crate::error::{Error, Result};

/// A parsed HTTP response.
///
/// Built once per wire round-trip and immutable to the caller. The body is
/// text, decoded after transport decompression.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    headers: Vec<(String, String)>,
    /// The decoded body text.
    pub body: String,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// All headers in wire order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value for a header name, case-insensitive.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value for a header name, case-insensitive.
    pub fn get_headers(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// The `Location` header, if present.
    pub fn redirect_url(&self) -> Option<&str> {
        self.get_header("Location")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get_header("Content-Type")
    }

    /// The decoded response body.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Error::from)
    }
}

/// Content coding named by a `Content-Encoding` header.
///
/// `Identity` covers both an absent header and any unrecognized value; the
/// body is then taken as raw UTF-8 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Gzip,
    Deflate,
    Brotli,
    Identity,
}

impl ContentCoding {
    /// Select the coding from a `Content-Encoding` value.
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Identity;
        };
        let value = value.to_ascii_lowercase();
        if value.contains("gzip") {
            Self::Gzip
        } else if value.contains("deflate") {
            Self::Deflate
        } else if value.contains("br") {
            Self::Brotli
        } else {
            Self::Identity
        }
    }

    /// Decompress a body with this coding.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Gzip => decode_gzip(data),
            Self::Deflate => decode_deflate(data),
            Self::Brotli => decode_brotli(data),
            Self::Identity => Ok(data.to_vec()),
        }
    }
}

fn decode_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decoded = Vec::new();
    decoder
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Decompression(format!("gzip: {}", e)))?;
    Ok(decoded)
}

fn decode_deflate(data: &[u8]) -> Result<Vec<u8>> {
    // Servers send both zlib-wrapped and raw deflate under this name.
    let mut decoded = Vec::new();
    if flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut decoded)
        .is_ok()
    {
        return Ok(decoded);
    }
    decoded.clear();
    flate2::read::DeflateDecoder::new(data)
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Decompression(format!("deflate: {}", e)))?;
    Ok(decoded)
}

fn decode_brotli(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = brotli::Decompressor::new(data, 4096);
    let mut decoded = Vec::new();
    decoder
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Decompression(format!("brotli: {}", e)))?;
    Ok(decoded)
}
