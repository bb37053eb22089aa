//! Mock HTTPS origin for integration tests.
//!
//! Serves scripted responses over a self-signed TLS endpoint and records
//! every request it receives, so tests can assert on exactly what went
//! over the wire.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use boring::pkey::PKey;
use boring::ssl::{SslAcceptor, SslMethod};
use boring::x509::X509;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Self-signed acceptor for 127.0.0.1 that negotiates http/1.1 via ALPN.
pub fn tls_acceptor() -> SslAcceptor {
    let cert =
        rcgen::generate_simple_self_signed(vec!["127.0.0.1".to_string(), "localhost".to_string()])
            .expect("failed to generate cert");
    let cert_pem = cert.cert.pem();
    let key_pem = cert.key_pair.serialize_pem();

    let pkey = PKey::private_key_from_pem(key_pem.as_bytes()).expect("failed to parse key");
    let x509 = X509::from_pem(cert_pem.as_bytes()).expect("failed to parse cert");

    let mut builder =
        SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).expect("failed to create acceptor");
    builder.set_private_key(&pkey).expect("failed to set key");
    builder.set_certificate(&x509).expect("failed to set cert");
    builder.set_alpn_select_callback(|_, client_protos| {
        boring::ssl::select_next_proto(b"\x08http/1.1", client_protos)
            .ok_or(boring::ssl::AlpnError::NOACK)
    });
    builder.build()
}

/// What the server observed: raw requests in arrival order, plus how many
/// TCP connections were accepted.
pub struct ServerLog {
    pub requests: Mutex<Vec<String>>,
    pub connections: AtomicUsize,
}

impl ServerLog {
    pub async fn request(&self, index: usize) -> String {
        self.requests.lock().await[index].clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub struct MockTlsServer {
    listener: TcpListener,
    port: u16,
}

impl MockTlsServer {
    pub async fn new() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("https://127.0.0.1:{}", self.port)
    }

    /// Serve the given responses in order across all connections,
    /// keeping each connection alive between requests.
    pub fn start(self, responses: Vec<Vec<u8>>) -> (JoinHandle<()>, Arc<ServerLog>) {
        let acceptor = tls_acceptor();
        let log = Arc::new(ServerLog {
            requests: Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
        });
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));

        let accept_log = Arc::clone(&log);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((tcp, _)) = self.listener.accept().await else {
                    break;
                };
                accept_log.connections.fetch_add(1, Ordering::SeqCst);
                let queue = Arc::clone(&queue);
                let log = Arc::clone(&accept_log);
                let acceptor = acceptor.clone();
                tokio::spawn(async move {
                    let Ok(mut tls) = tokio_boring::accept(&acceptor, tcp).await else {
                        return;
                    };
                    while let Some(request) = read_request(&mut tls).await {
                        log.requests.lock().await.push(request);
                        let Some(response) = queue.lock().await.pop_front() else {
                            break;
                        };
                        if tls.write_all(&response).await.is_err() {
                            break;
                        }
                        let _ = tls.flush().await;
                    }
                });
            }
        });
        (handle, log)
    }

    /// Accept, handshake, read one request, and never answer.
    pub fn start_stalled(self) -> JoinHandle<()> {
        let acceptor = tls_acceptor();
        tokio::spawn(async move {
            let Ok((tcp, _)) = self.listener.accept().await else {
                return;
            };
            let Ok(mut tls) = tokio_boring::accept(&acceptor, tcp).await else {
                return;
            };
            let _ = read_request(&mut tls).await;
            std::future::pending::<()>().await;
        })
    }
}

/// Build a canned HTTP/1.1 response. Adds Content-Length unless the
/// caller supplied a Transfer-Encoding header.
pub fn canned(status: u16, extra_headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let reason = match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        307 => "Temporary Redirect",
        _ => "Status",
    };
    let mut out = format!("HTTP/1.1 {} {}\r\n", status, reason).into_bytes();
    let chunked = extra_headers
        .iter()
        .any(|(k, _)| k.eq_ignore_ascii_case("transfer-encoding"));
    for (k, v) in extra_headers {
        out.extend_from_slice(format!("{}: {}\r\n", k, v).as_bytes());
    }
    if !chunked {
        out.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

/// Read one full request (head plus Content-Length body) as a string.
/// Returns None once the peer hangs up.
async fn read_request<S>(stream: &mut S) -> Option<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => return None,
            Ok(_) => head.push(byte[0]),
        }
        if head.ends_with(b"\r\n\r\n") {
            break;
        }
    }

    let head = String::from_utf8_lossy(&head).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        stream.read_exact(&mut body).await.ok()?;
    }
    Some(format!("{}{}", head, String::from_utf8_lossy(&body)))
}
