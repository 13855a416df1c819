//! Exercises `HttpGateway` against a one-shot local HTTP server.

use std::time::Duration;

use flexi_core::error::FlexiError;
use flexi_core::gateway::{BackendGateway, Credentials};
use flexi_core::marketplace::JobFilters;
use flexi_interaction::HttpGateway;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one response and hands back the raw request it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(base_url, Duration::from_secs(5)).unwrap()
}

fn has_bearer(request: &str) -> bool {
    request
        .lines()
        .any(|line| line.to_ascii_lowercase().starts_with("authorization: bearer"))
}

#[tokio::test]
async fn test_login_is_public_even_with_a_token() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"access": "new-token", "refresh": "r", "user": {"id": 1, "username": "ada"}}"#,
    )
    .await;
    let gateway = gateway(&base_url);
    gateway.set_token(Some("old-token".to_string()));

    let response = gateway
        .login(&Credentials {
            username: "ada".to_string(),
            password: "Secret123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.access, "new-token");
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/auth/login/ "));
    assert!(!has_bearer(&request));
    assert!(request.contains(r#""username":"ada""#));
}

#[tokio::test]
async fn test_profile_carries_bearer() {
    let (base_url, server) = serve_once("200 OK", r#"{"id": 7, "username": "grace"}"#).await;
    let gateway = gateway(&base_url);
    gateway.set_token(Some("tok-7".to_string()));

    let user = gateway.profile().await.unwrap();

    assert_eq!(user.id, 7);
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/auth/profile/ "));
    assert!(request.contains("tok-7"));
    assert!(has_bearer(&request));
}

#[tokio::test]
async fn test_job_search_sends_query_and_accepts_pagination() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"count": 1, "next": null, "previous": null, "results": [{"id": 3, "title": "Rust CLI"}]}"#,
    )
    .await;
    let gateway = gateway(&base_url);

    let jobs = gateway.jobs(&JobFilters::with_search("rust")).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Rust CLI");
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/jobs/?search=rust "));
}

#[tokio::test]
async fn test_backend_error_detail_is_surfaced() {
    let (base_url, _server) = serve_once(
        "401 Unauthorized",
        r#"{"detail": "Given token not valid for any token type"}"#,
    )
    .await;

    let err = gateway(&base_url).profile().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Given token not valid for any token type");
}

#[tokio::test]
async fn test_non_json_error_body() {
    let (base_url, _server) = serve_once("500 Internal Server Error", "<h1>Server Error</h1>").await;

    let err = gateway(&base_url).my_contracts().await.unwrap_err();

    assert!(matches!(err, FlexiError::Backend { status: 500, .. }));
    assert_eq!(err.user_message(), "HTTP 500: Internal Server Error");
}

#[tokio::test]
async fn test_success_with_undecodable_body_is_malformed() {
    let (base_url, _server) = serve_once("200 OK", "<html>not json</html>").await;

    let err = gateway(&base_url).conversations().await.unwrap_err();

    assert!(matches!(err, FlexiError::MalformedResponse { .. }));
    assert_eq!(err.user_message(), "An error occurred");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());
    drop(listener);

    let err = gateway(&base_url).job_categories().await.unwrap_err();

    assert!(err.is_transport());
}
