//! Response handling.
//!
//! # Responsibilities
//! - Read the final response body in full
//! - Emit response telemetry (timing, status, headers, body)
//! - Hand status, headers and raw bytes back to the caller
//!
//! # Design Decisions
//! - No status interpretation: 4xx/5xx are successful calls
//! - The body stays opaque bytes; typed decoding is the caller's choice

use std::borrow::Cow;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ClientError, Result};

/// Longest body prefix rendered into debug events.
const BODY_PREVIEW_LIMIT: usize = 1024;

/// The final response of a call, after any redirects.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status of the final response.
    pub status: StatusCode,
    /// Headers of the final response.
    pub headers: HeaderMap,
    /// Complete response body.
    pub body: Bytes,
    /// URL that produced the final response.
    pub url: Url,
    /// Redirect hops followed to get here.
    pub redirects: u32,
}

impl RawResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Consume `response`, logging it and reading the body in full.
///
/// The response (and its connection) is released when this returns, whether
/// the body was read or not. `timeout` is the client ceiling in force, used to
/// classify a stalled body read.
pub(crate) async fn read_response(
    response: reqwest::Response,
    start: Instant,
    redirects: u32,
    timeout: Option<Duration>,
) -> Result<RawResponse> {
    let status = response.status();
    let headers = response.headers().clone();
    let url = response.url().clone();

    // Timings recorded as part of internal metrics
    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Response Time");
    tracing::debug!(status = %status, "Response Status");
    tracing::debug!(headers = ?headers, "Response Headers");

    let body = response
        .bytes()
        .await
        .map_err(|e| ClientError::from_reqwest(e, timeout, ClientError::Read))?;
    tracing::debug!(
        body_len = body.len(),
        body = %body_preview(&body),
        "Response Body"
    );

    Ok(RawResponse {
        status,
        headers,
        body,
        url,
        redirects,
    })
}

fn body_preview(body: &[u8]) -> Cow<'_, str> {
    if body.len() <= BODY_PREVIEW_LIMIT {
        return String::from_utf8_lossy(body);
    }
    let mut preview = String::from_utf8_lossy(&body[..BODY_PREVIEW_LIMIT]).into_owned();
    preview.push_str("...");
    Cow::Owned(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tracing_test::traced_test;

    fn response(status: u16, body: &'static [u8]) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(body),
            url: Url::parse("https://rancher.example.com/v3").unwrap(),
            redirects: 0,
        }
    }

    #[test]
    fn server_error_is_not_success_but_keeps_body() {
        let resp = response(500, br#"{"error":"boom"}"#);
        assert!(!resp.is_success());
        assert_eq!(resp.text(), r#"{"error":"boom"}"#);
    }

    #[test]
    fn decodes_json_body() {
        #[derive(serde::Deserialize)]
        struct Thing {
            name: String,
        }
        let resp = response(200, br#"{"name":"x"}"#);
        let thing: Thing = resp.json().unwrap();
        assert_eq!(thing.name, "x");
        assert!(resp.json::<Vec<u8>>().is_err());
    }

    #[test]
    fn long_bodies_are_truncated_in_preview() {
        let body = vec![b'a'; BODY_PREVIEW_LIMIT + 10];
        let preview = body_preview(&body);
        assert_eq!(preview.len(), BODY_PREVIEW_LIMIT + 3);
        assert!(preview.ends_with("..."));
        assert_eq!(body_preview(b"short"), "short");
    }

    #[tokio::test]
    #[traced_test]
    async fn reading_emits_response_events() {
        let response = axum::http::Response::builder()
            .status(201)
            .header("x-api-id", "c-1")
            .body(r#"{"id":"c-1"}"#)
            .unwrap();

        let raw = read_response(reqwest::Response::from(response), Instant::now(), 2, None)
            .await
            .unwrap();
        assert_eq!(raw.status, StatusCode::CREATED);
        assert_eq!(raw.redirects, 2);
        assert_eq!(&raw.body[..], br#"{"id":"c-1"}"#);

        assert!(logs_contain("Response Time"));
        assert!(logs_contain("elapsed_ms="));
        assert!(logs_contain("Response Status"));
        assert!(logs_contain("201 Created"));
        assert!(logs_contain("Response Headers"));
        assert!(logs_contain("x-api-id"));
        assert!(logs_contain("Response Body"));
        assert!(logs_contain("body_len=12"));
    }

    #[tokio::test]
    async fn stalled_body_read_is_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"partial\":";
            socket.write_all(head.as_bytes()).await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let timeout = Duration::from_millis(300);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        let response = client
            .get(format!("http://{addr}/v3"))
            .send()
            .await
            .unwrap();

        let err = read_response(response, Instant::now(), 0, Some(timeout))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ClientError::Timeout(t) if t == timeout),
            "got {err:?}"
        );
    }
}
