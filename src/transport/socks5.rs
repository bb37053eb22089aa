//! SOCKS5 client handshake (RFC 1928/1929).
//!
//! Speaks the byte-level protocol directly over any async stream: method
//! negotiation, optional username/password sub-negotiation, then a CONNECT
//! command with a domain-name destination. The proxy's bound address in the
//! reply is skipped, not validated.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::transport::proxy::ProxyConfig;

pub const SOCKS5_VERSION: u8 = 0x05;

const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_USER_PASS: u8 = 0x02;
const METHOD_NO_ACCEPTABLE: u8 = 0xFF;

const CMD_CONNECT: u8 = 0x01;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

/// Negotiate a SOCKS5 tunnel to `dest_host:dest_port` over an open stream
/// to the proxy.
///
/// Any short read before the expected byte count is a fatal `ProxyFailed`.
pub async fn handshake<S>(
    stream: &mut S,
    proxy: &ProxyConfig,
    dest_host: &str,
    dest_port: u16,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let credentials = proxy.credentials();

    // Method negotiation: no-auth, plus username/password when configured.
    let greeting: &[u8] = if credentials.is_some() {
        &[SOCKS5_VERSION, 2, METHOD_NO_AUTH, METHOD_USER_PASS]
    } else {
        &[SOCKS5_VERSION, 1, METHOD_NO_AUTH]
    };
    stream.write_all(greeting).await?;
    stream.flush().await?;

    let mut reply = [0u8; 2];
    read_exact(stream, &mut reply).await?;
    if reply[0] != SOCKS5_VERSION {
        return Err(Error::proxy(format!(
            "SOCKS5: bad protocol version {:#04x}",
            reply[0]
        )));
    }
    match reply[1] {
        METHOD_NO_ACCEPTABLE => {
            return Err(Error::proxy("SOCKS5: no acceptable authentication method"))
        }
        METHOD_USER_PASS => {
            let (user, pass) = credentials.ok_or_else(|| {
                Error::proxy("SOCKS5: proxy demands credentials but none configured")
            })?;
            authenticate(stream, user, pass).await?;
        }
        _ => {}
    }

    // CONNECT with a domain-name address; the proxy resolves it.
    if dest_host.len() > 255 {
        return Err(Error::invalid_format("destination host exceeds 255 bytes"));
    }
    let mut request = Vec::with_capacity(7 + dest_host.len());
    request.extend_from_slice(&[SOCKS5_VERSION, CMD_CONNECT, 0x00, ATYP_DOMAIN]);
    request.push(dest_host.len() as u8);
    request.extend_from_slice(dest_host.as_bytes());
    request.extend_from_slice(&dest_port.to_be_bytes());
    stream.write_all(&request).await?;
    stream.flush().await?;

    let mut reply = [0u8; 4];
    read_exact(stream, &mut reply).await?;

    // Skip the bound address and port; contents are irrelevant here.
    let addr_len = match reply[3] {
        ATYP_IPV4 => 4,
        ATYP_DOMAIN => {
            let mut len = [0u8; 1];
            read_exact(stream, &mut len).await?;
            len[0] as usize
        }
        ATYP_IPV6 => 16,
        other => {
            return Err(Error::proxy(format!(
                "SOCKS5: unknown address type {:#04x}",
                other
            )))
        }
    };
    let mut skip = vec![0u8; addr_len + 2];
    read_exact(stream, &mut skip).await?;

    Ok(())
}

/// RFC 1929 username/password sub-negotiation.
async fn authenticate<S>(stream: &mut S, user: &str, pass: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if user.len() > 255 || pass.len() > 255 {
        return Err(Error::invalid_format("SOCKS5 credentials exceed 255 bytes"));
    }
    let mut request = Vec::with_capacity(3 + user.len() + pass.len());
    request.push(0x01);
    request.push(user.len() as u8);
    request.extend_from_slice(user.as_bytes());
    request.push(pass.len() as u8);
    request.extend_from_slice(pass.as_bytes());
    stream.write_all(&request).await?;
    stream.flush().await?;

    let mut reply = [0u8; 2];
    read_exact(stream, &mut reply).await?;
    if reply[1] != 0x00 {
        return Err(Error::proxy("SOCKS5: username/password rejected"));
    }
    Ok(())
}

/// Fill the buffer or fail with `ProxyFailed`; a handshake never tolerates
/// a short read.
async fn read_exact<S: AsyncRead + Unpin>(stream: &mut S, buf: &mut [u8]) -> Result<()> {
    stream
        .read_exact(buf)
        .await
        .map_err(|e| Error::proxy(format!("SOCKS5: {}", e)))?;
    Ok(())
}
