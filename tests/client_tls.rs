//! End-to-end tests against a mock TLS origin.

use std::io::Write as _;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use wraith::{Client, Error, Request};

mod helpers;
use helpers::mock_tls::{canned, MockTlsServer};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn test_get_roundtrip() {
    init_tracing();
    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let (_handle, log) = server.start(vec![canned(
        200,
        &[("Content-Type", "text/plain")],
        b"hello",
    )]);

    let mut client = Client::new();
    let response = client.get(&format!("{}/index", url)).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "hello");
    assert_eq!(response.content_type(), Some("text/plain"));

    let request = log.request(0).await;
    assert!(request.starts_with("GET /index HTTP/1.1\r\n"));
    assert!(request.contains("Host: 127.0.0.1:"));
    assert!(request.contains("Accept-Encoding: gzip, deflate, br\r\n"));
}

#[tokio::test]
async fn test_chunked_gzip_body() {
    init_tracing();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"compressed payload").unwrap();
    let gzipped = encoder.finish().unwrap();

    // Split the gzip stream across two chunks.
    let mid = gzipped.len() / 2;
    let mut body = Vec::new();
    for part in [&gzipped[..mid], &gzipped[mid..]] {
        body.extend_from_slice(format!("{:x}\r\n", part.len()).as_bytes());
        body.extend_from_slice(part);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(b"0\r\n\r\n");

    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let (_handle, _log) = server.start(vec![canned(
        200,
        &[
            ("Transfer-Encoding", "chunked"),
            ("Content-Encoding", "gzip"),
        ],
        &body,
    )]);

    let mut client = Client::new();
    let response = client.get(&url).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "compressed payload");
}

#[tokio::test]
async fn test_cookie_set_and_echoed() {
    init_tracing();
    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let (_handle, log) = server.start(vec![
        canned(200, &[("Set-Cookie", "sid=abc123; Path=/")], b"first"),
        canned(200, &[], b"second"),
    ]);

    let mut client = Client::new();
    client.get(&url).await.unwrap();
    assert_eq!(client.cookie_jar().len(), 1);

    client.get(&url).await.unwrap();
    let second = log.request(1).await;
    assert!(second.contains("Cookie: sid=abc123\r\n"));
}

#[tokio::test]
async fn test_redirect_rewrites_post_to_get() {
    init_tracing();
    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let (_handle, log) = server.start(vec![
        canned(302, &[("Location", "/next")], b""),
        canned(200, &[], b"landed"),
    ]);

    let mut client = Client::new();
    let request = Request::post(&format!("{}/submit", url))
        .unwrap()
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("a=1&b=2");
    let response = client.send(request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "landed");
    assert_eq!(log.request_count().await, 2);

    let first = log.request(0).await;
    assert!(first.starts_with("POST /submit HTTP/1.1\r\n"));
    assert!(first.ends_with("a=1&b=2"));

    let second = log.request(1).await;
    assert!(second.starts_with("GET /next HTTP/1.1\r\n"));
    assert!(!second.contains("Content-Length"));
    assert!(second.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn test_307_preserves_method_and_body() {
    init_tracing();
    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let (_handle, log) = server.start(vec![
        canned(307, &[("Location", "/retry")], b""),
        canned(200, &[], b"ok"),
    ]);

    let mut client = Client::new();
    let request = Request::post(&url).unwrap().body("payload");
    let response = client.send(request).await.unwrap();

    assert_eq!(response.status, 200);
    let second = log.request(1).await;
    assert!(second.starts_with("POST /retry HTTP/1.1\r\n"));
    assert!(second.ends_with("payload"));
}

#[tokio::test]
async fn test_too_many_redirects_at_bound() {
    init_tracing();
    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let (_handle, _log) = server.start(vec![
        canned(302, &[("Location", "/a")], b""),
        canned(302, &[("Location", "/b")], b""),
        canned(302, &[("Location", "/c")], b""),
    ]);

    let mut client = Client::builder().max_redirects(2).build();
    let err = client.get(&url).await.unwrap_err();
    assert!(matches!(err, Error::TooManyRedirects { count: 2 }));
}

#[tokio::test]
async fn test_redirects_disabled_returns_redirect_response() {
    init_tracing();
    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let (_handle, log) = server.start(vec![canned(302, &[("Location", "/next")], b"")]);

    let mut client = Client::builder().allow_redirects(false).build();
    let response = client.get(&url).await.unwrap();

    assert_eq!(response.status, 302);
    assert!(response.is_redirect());
    assert_eq!(response.redirect_url(), Some("/next"));
    assert_eq!(log.request_count().await, 1);
}

#[tokio::test]
async fn test_connection_reuse_and_replacement() {
    init_tracing();
    let server_a = MockTlsServer::new().await.unwrap();
    let url_a = server_a.url();
    let (_ha, log_a) = server_a.start(vec![
        canned(200, &[], b"a1"),
        canned(200, &[], b"a2"),
        canned(200, &[], b"a3"),
    ]);

    let server_b = MockTlsServer::new().await.unwrap();
    let url_b = server_b.url();
    let (_hb, log_b) = server_b.start(vec![canned(200, &[], b"b1")]);

    let mut client = Client::new();
    client.get(&url_a).await.unwrap();
    client.get(&url_a).await.unwrap();
    assert_eq!(log_a.connection_count(), 1);

    // Different port forces a new connection and drops the cached one.
    client.get(&url_b).await.unwrap();
    assert_eq!(log_b.connection_count(), 1);

    client.get(&url_a).await.unwrap();
    assert_eq!(log_a.connection_count(), 2);
    assert_eq!(log_a.request_count().await, 3);
}

#[tokio::test]
async fn test_timeout_on_stalled_server() {
    init_tracing();
    let server = MockTlsServer::new().await.unwrap();
    let url = server.url();
    let _handle = server.start_stalled();

    let mut client = Client::builder()
        .timeout(Duration::from_millis(300))
        .build();
    let err = client.get(&url).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}
