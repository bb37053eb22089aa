//! HTTP/1.1 wire codec.
//!
//! Stateless request serialization, response parsing, and redirect cloning.
//! Framing (chunked decode, content-length reads) happens in the transport
//! layer; this module sees a response only as a finished byte buffer.

use http::Method;
use url::Url;

use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::{ContentCoding, Response};

/// Serialize a request into its HTTP/1.1 byte form.
///
/// Emits the request line, a `Host` line, every caller header in insertion
/// order, a `Content-Length` for the body when the caller did not set one,
/// a blank line, then the body. Nothing else is injected.
pub fn serialize_request(request: &Request) -> Vec<u8> {
    let mut out = Vec::with_capacity(1024);

    out.extend_from_slice(request.method.as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(request.url.path().as_bytes());
    if let Some(query) = request.url.query() {
        out.push(b'?');
        out.extend_from_slice(query.as_bytes());
    }
    out.extend_from_slice(b" HTTP/1.1\r\n");

    out.extend_from_slice(b"Host: ");
    if let Some(host) = request.url.host_str() {
        out.extend_from_slice(host.as_bytes());
        if let Some(port) = request.url.port() {
            out.push(b':');
            out.extend_from_slice(port.to_string().as_bytes());
        }
    }
    out.extend_from_slice(b"\r\n");

    for (name, value) in request.headers() {
        // Host is recomputed above; a caller copy would duplicate it.
        if name.eq_ignore_ascii_case("host") {
            continue;
        }
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }

    if let Some(body) = request.body_bytes() {
        if !request.has_header("content-length") {
            out.extend_from_slice(b"Content-Length: ");
            out.extend_from_slice(body.len().to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b"\r\n");

    if let Some(body) = request.body_bytes() {
        out.extend_from_slice(body);
    }

    out
}

/// Parse a raw response byte buffer into a `Response`.
///
/// The status code stays 0 when the status line is missing or short. Header
/// lines split on the first colon with trimmed key and value. The body is
/// decompressed per `Content-Encoding`; a decompression failure degrades to
/// raw UTF-8 text instead of propagating.
pub fn parse_response(bytes: &[u8]) -> Result<Response> {
    let header_end = find_header_end(bytes)
        .ok_or_else(|| Error::malformed("no header/body boundary in response"))?;

    let header_text = String::from_utf8_lossy(&bytes[..header_end]);
    let mut lines = header_text.split("\r\n");

    let mut status = 0u16;
    if let Some(status_line) = lines.next() {
        let parts: Vec<&str> = status_line.split_whitespace().collect();
        if parts.len() >= 3 {
            status = parts[1].parse().unwrap_or(0);
        }
    }

    let mut headers = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let body_bytes = &bytes[header_end..];
    let body = decode_body(&headers, body_bytes);

    Ok(Response::new(status, headers, body))
}

/// Decode a body per the declared content coding.
///
/// An empty body is always an empty string, whatever the declared
/// encoding says.
fn decode_body(headers: &[(String, String)], body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }
    let encoding = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-encoding"))
        .map(|(_, v)| v.as_str());
    let coding = ContentCoding::from_header(encoding);
    match coding.decompress(body) {
        Ok(decoded) => String::from_utf8_lossy(&decoded).into_owned(),
        // Graceful degradation: a broken coding falls back to raw text.
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Clone a request for a redirect to `new_url`.
///
/// 303 always rewrites to GET; 301/302 rewrite to GET only when the
/// original method was POST. Headers are copied minus `Host`; a header that
/// fails validation is skipped, never fatal. The body survives only when
/// the final method is POST, PUT, or PATCH.
pub fn clone_for_redirect(old: &Request, new_url: Url, redirect_status: u16) -> Request {
    let rewrite_to_get = redirect_status == 303
        || ((redirect_status == 301 || redirect_status == 302) && old.method == Method::POST);

    let method = if rewrite_to_get {
        Method::GET
    } else {
        old.method.clone()
    };

    let mut request = Request::new(method.clone(), new_url);
    for (name, value) in old.headers() {
        if name.eq_ignore_ascii_case("host") {
            continue;
        }
        if valid_header_name(name) && valid_header_value(value) {
            request.push_header(name.clone(), value.clone());
        }
    }

    if matches!(method, Method::POST | Method::PUT | Method::PATCH) {
        if let Some(body) = old.body_bytes() {
            request = request.body(body.clone());
        }
    }

    request
}

/// Find the end of the HTTP header block (the byte after CR LF CR LF).
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    for i in 0..buffer.len().saturating_sub(3) {
        if &buffer[i..i + 4] == b"\r\n\r\n" {
            return Some(i + 4);
        }
    }
    None
}

fn valid_header_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_tchar)
}

fn valid_header_value(value: &str) -> bool {
    value.bytes().all(|b| b != 0 && b != b'\r' && b != b'\n')
}

fn is_tchar(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z'
    )
}
