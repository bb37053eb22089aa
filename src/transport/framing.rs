//! HTTP/1.1 response framing.
//!
//! Reads a raw response off a byte stream: header block first, then the
//! body under one of three framing modes (chunked, content-length,
//! best-effort). Chunked framing is removed here, so callers always get
//! `header block + plain body bytes`. Generic over the stream so the logic
//! is testable without a socket.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

/// Read increment for body data.
const BLOCK_SIZE: usize = 8192;

/// Read a complete response: header block plus decoded body bytes.
pub async fn read_response<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>> {
    let header = read_header_block(stream).await?;

    let (content_length, chunked) = scan_framing_headers(&header);

    let mut out = header;
    if chunked {
        read_chunked_body(stream, &mut out).await?;
    } else if content_length > 0 {
        read_sized_body(stream, &mut out, content_length).await?;
    } else {
        // No framing declared: one best-effort block.
        let mut buf = vec![0u8; BLOCK_SIZE];
        let n = stream.read(&mut buf).await?;
        out.extend_from_slice(&buf[..n]);
    }

    Ok(out)
}

/// Accumulate bytes one at a time until the CR LF CR LF terminator.
///
/// EOF before the terminator means the response is unusable.
async fn read_header_block<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(1024);
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            return Err(Error::malformed("stream ended before end of headers"));
        }
        header.push(byte[0]);
        if header.len() >= 4 && header[header.len() - 4..] == *b"\r\n\r\n" {
            return Ok(header);
        }
    }
}

/// Pick the body framing mode from the raw header block.
fn scan_framing_headers(header: &[u8]) -> (usize, bool) {
    let text = String::from_utf8_lossy(header);
    let mut content_length = 0usize;
    let mut chunked = false;

    for line in text.split("\r\n") {
        let lower = line.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("content-length:") {
            content_length = rest.trim().parse().unwrap_or(0);
        }
        if lower.starts_with("transfer-encoding:") && lower.contains("chunked") {
            chunked = true;
        }
    }

    (content_length, chunked)
}

/// Read exactly `len` body bytes in bounded increments.
///
/// An early stream close yields a partial body, not an error.
async fn read_sized_body<S: AsyncRead + Unpin>(
    stream: &mut S,
    out: &mut Vec<u8>,
    len: usize,
) -> Result<()> {
    let mut remaining = len;
    let mut buf = vec![0u8; BLOCK_SIZE];
    while remaining > 0 {
        let want = remaining.min(buf.len());
        let n = stream.read(&mut buf[..want]).await?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
        remaining -= n;
    }
    Ok(())
}

/// Decode a chunked body, appending only chunk data to `out`.
///
/// Chunk-size lines may carry `;`-delimited extensions, which are ignored.
/// A zero-size chunk terminates the body after one trailing line. EOF
/// anywhere before the zero chunk is a `MalformedResponse`.
async fn read_chunked_body<S: AsyncRead + Unpin>(
    stream: &mut S,
    out: &mut Vec<u8>,
) -> Result<()> {
    loop {
        let mut line = read_line(stream)
            .await?
            .ok_or_else(|| Error::malformed("stream ended inside chunked body"))?;
        if line.trim().is_empty() {
            line = read_line(stream)
                .await?
                .ok_or_else(|| Error::malformed("stream ended inside chunked body"))?;
        }

        let size_token = line.split(';').next().unwrap_or("").trim();
        let chunk_size = usize::from_str_radix(size_token, 16)
            .map_err(|_| Error::malformed(format!("bad chunk size line: {:?}", line)))?;

        if chunk_size == 0 {
            // Trailing line after the terminator; EOF here is tolerated.
            let _ = read_line(stream).await?;
            break;
        }

        let mut chunk = vec![0u8; chunk_size];
        let mut filled = 0;
        while filled < chunk_size {
            let n = stream.read(&mut chunk[filled..]).await?;
            if n == 0 {
                return Err(Error::malformed("stream ended inside chunk data"));
            }
            filled += n;
        }
        out.extend_from_slice(&chunk);

        read_line(stream).await?;
    }
    Ok(())
}

/// Read one text line, byte by byte, stripping the trailing CR LF.
///
/// `None` means EOF before any byte of the line.
async fn read_line<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Option<String>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            if line.is_empty() {
                return Ok(None);
            }
            break;
        }
        line.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    let text = String::from_utf8_lossy(&line);
    Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
}
