//! JA3 fingerprint model.
//!
//! A JA3 descriptor is five comma-separated fields: the TLS version code,
//! then dash-joined decimal lists of cipher suites, extensions, supported
//! groups, and point formats. The parsed value drives every handshake the
//! connection layer performs.

use crate::error::{Error, Result};
use crate::fingerprint::tables;

/// Default handshake descriptor: TLS 1.2 with a Chrome-era suite list.
const DEFAULT_DESCRIPTOR: &str = "771,4865-4866-4867-49195-49199-49196-49200-52393-52392-49171-49172-156-157-47-53,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-21-41-28-19,29-23-24,0";

/// TLS extension type for ALPN.
const ALPN_EXTENSION: u16 = 16;

/// Negotiable protocol version derived from a fingerprint's version code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
}

/// Parsed JA3 fingerprint.
///
/// Immutable once constructed; the connection layer consumes it on every
/// handshake. All lists preserve descriptor order. Empty lists are legal
/// for every field except the version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Fingerprint {
    pub version: u16,
    pub cipher_suites: Vec<u16>,
    pub extensions: Vec<u16>,
    pub curves: Vec<u16>,
    pub point_formats: Vec<u8>,
}

impl Default for Ja3Fingerprint {
    fn default() -> Self {
        // The built-in descriptor is well-formed; parse cannot fail.
        Self::parse(DEFAULT_DESCRIPTOR).expect("default descriptor is valid")
    }
}

impl Ja3Fingerprint {
    /// Parse a textual JA3 descriptor.
    ///
    /// Fails with `InvalidFormat` on a wrong field count or any
    /// non-integer token.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let fields: Vec<&str> = descriptor.split(',').collect();
        if fields.len() != 5 {
            return Err(Error::invalid_format(format!(
                "expected 5 comma-separated fields, got {}",
                fields.len()
            )));
        }

        let version = fields[0]
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::invalid_format(format!("bad version code: {:?}", fields[0])))?;

        Ok(Self {
            version,
            cipher_suites: parse_id_list(fields[1])?,
            extensions: parse_id_list(fields[2])?,
            curves: parse_id_list(fields[3])?,
            point_formats: parse_format_list(fields[4])?,
        })
    }

    /// Re-serialize the fingerprint to descriptor text.
    pub fn to_descriptor(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.version,
            join_ids(&self.cipher_suites),
            join_ids(&self.extensions),
            join_ids(&self.curves),
            self.point_formats
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("-"),
        )
    }

    /// Map the version code to a negotiable protocol version.
    ///
    /// `None` means the code is outside the supported range and the
    /// handshake must fail fast.
    pub fn tls_version(&self) -> Option<TlsVersion> {
        match self.version {
            0x0303 => Some(TlsVersion::Tls12),
            0x0302 => Some(TlsVersion::Tls11),
            0x0301 => Some(TlsVersion::Tls10),
            _ => None,
        }
    }

    /// Translate the cipher suite IDs to handshake identifiers, in order.
    ///
    /// Fails with `UnsupportedCipherSuite` if any ID is absent from the
    /// lookup table; an unknown suite is never silently dropped.
    pub fn cipher_names(&self) -> Result<Vec<&'static str>> {
        self.cipher_suites
            .iter()
            .map(|&id| tables::cipher_suite_name(id).ok_or(Error::UnsupportedCipherSuite(id)))
            .collect()
    }

    /// Curve names for the supported-group IDs, in order.
    ///
    /// Groups the backend has no name for are skipped.
    pub fn curve_names(&self) -> Vec<&'static str> {
        self.curves
            .iter()
            .filter_map(|&id| tables::curve_name(id))
            .collect()
    }

    /// ALPN protocols to offer.
    ///
    /// `http/1.1` is offered iff the extension list contains the ALPN
    /// extension type; no other protocol is ever offered.
    pub fn alpn_protocols(&self) -> Vec<&'static str> {
        if self.extensions.contains(&ALPN_EXTENSION) {
            vec!["http/1.1"]
        } else {
            Vec::new()
        }
    }
}

fn parse_id_list(field: &str) -> Result<Vec<u16>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split('-')
        .map(|token| {
            token
                .parse::<u16>()
                .map_err(|_| Error::invalid_format(format!("bad integer token: {:?}", token)))
        })
        .collect()
}

// Point formats are single bytes on the wire; 256 and up is a format
// error, not a value to truncate.
fn parse_format_list(field: &str) -> Result<Vec<u8>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split('-')
        .map(|token| {
            token
                .parse::<u8>()
                .map_err(|_| Error::invalid_format(format!("bad point format token: {:?}", token)))
        })
        .collect()
}

fn join_ids(ids: &[u16]) -> String {
    ids.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
