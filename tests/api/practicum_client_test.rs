//! `PracticumClient` against a one-shot local HTTP server.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use homework_bot::api::{HomeworkApi, PracticumClient};
use homework_bot::error::PollError;

const TOKEN: &str = "y0_secret_practicum_token";

/// Serve one response and hand back the raw request text.
async fn serve_once(status_line: &str, body: &str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should expose addr");

    let (request_tx, request_rx) = oneshot::channel();
    let status_line_owned = status_line.to_owned();
    let body_owned = body.to_owned();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut read_buf = [0_u8; 4096];
            let n = socket.read(&mut read_buf).await.unwrap_or(0);
            let _ = request_tx.send(String::from_utf8_lossy(&read_buf[..n]).into_owned());

            let response = format!(
                "HTTP/1.1 {status_line_owned}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body_owned}",
                body_owned.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (format!("http://{addr}/api/user_api/homework_statuses/"), request_rx)
}

#[tokio::test]
async fn fetch_sends_auth_header_and_from_date() {
    let (url, request_rx) = serve_once("200 OK", r#"{"homeworks":[],"current_date":5}"#).await;
    let client = PracticumClient::with_endpoint(url, TOKEN.to_owned());

    let body = client.fetch(1_700_000_000).await.expect("fetch should succeed");
    assert_eq!(body["current_date"], 5);

    let request = request_rx.await.expect("server should capture request");
    assert!(request.starts_with("GET /api/user_api/homework_statuses/?from_date=1700000000 "));
    let lowered = request.to_lowercase();
    assert!(lowered.contains(&format!("authorization: oauth {}", TOKEN.to_lowercase())));
}

#[tokio::test]
async fn non_200_is_bad_endpoint() {
    let (url, _request_rx) = serve_once("404 Not Found", "{}").await;
    let client = PracticumClient::with_endpoint(url.clone(), TOKEN.to_owned());

    match client.fetch(0).await {
        Err(PollError::BadEndpoint { status, context }) => {
            assert_eq!(status, 404);
            assert_eq!(context.url, url);
            assert_eq!(
                context.params,
                vec![("from_date".to_owned(), "0".to_owned())]
            );
        }
        other => panic!("expected bad endpoint, got {other:?}"),
    }
}

#[tokio::test]
async fn non_200_success_code_is_still_bad_endpoint() {
    let (url, _request_rx) = serve_once("204 No Content", "").await;
    let client = PracticumClient::with_endpoint(url, TOKEN.to_owned());

    assert!(matches!(
        client.fetch(0).await,
        Err(PollError::BadEndpoint { status: 204, .. })
    ));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let (url, _request_rx) = serve_once("200 OK", "<html>maintenance</html>").await;
    let client = PracticumClient::with_endpoint(url, TOKEN.to_owned());

    assert!(matches!(
        client.fetch(0).await,
        Err(PollError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn valid_json_list_is_returned_as_is() {
    let (url, _request_rx) = serve_once("200 OK", "[1, 2, 3]").await;
    let client = PracticumClient::with_endpoint(url, TOKEN.to_owned());

    let body = client.fetch(0).await.expect("json parses");
    assert!(body.is_array());
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let url = format!("http://{addr}/");
    let client = PracticumClient::with_endpoint(url.clone(), TOKEN.to_owned());

    match client.fetch(42).await {
        Err(PollError::Transport { message, context }) => {
            let lowered = message.to_lowercase();
            assert!(
                lowered.contains("refused") || lowered.contains("connect"),
                "message should name the cause: {message}"
            );
            assert_eq!(context.url, url);
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_text_never_contains_token() {
    let (url, _request_rx) = serve_once("500 Internal Server Error", "{}").await;
    let client = PracticumClient::with_endpoint(url, TOKEN.to_owned());

    let err = client.fetch(0).await.expect_err("500 must fail");
    let text = err.to_string();
    assert!(!text.contains(TOKEN));
    assert!(text.contains("OAuth [REDACTED]"));
    assert!(text.contains("from_date: 0"));
}
