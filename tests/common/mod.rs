//! Shared utilities for integration testing: local mock backends.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use rancher_client::ClientConfig;

pub const TEST_CA: &str = include_str!("../fixtures/ca.pem");
const SERVER_CERT: &[u8] = include_bytes!("../fixtures/server.pem");
const SERVER_KEY: &[u8] = include_bytes!("../fixtures/server.key");

/// One request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Shared log of the requests a backend received.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn push(&self, method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) {
        self.0.lock().unwrap().push(Recorded {
            method,
            path: uri.path().to_string(),
            headers,
            body,
        });
    }
}

/// What a backend answers with.
#[derive(Clone)]
enum Behavior {
    /// Fixed status and body.
    Fixed { status: StatusCode, body: &'static str },
    /// `/hop/{n}` redirects to `/hop/{n-1}`; `/hop/0` answers 200.
    Chain { status: StatusCode },
    /// Every request redirects to `target`.
    RedirectTo { status: StatusCode, target: String },
    /// Waits before answering 200.
    Slow { delay: Duration },
}

#[derive(Clone)]
struct Backend {
    recorder: Recorder,
    behavior: Behavior,
}

async fn handle(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    backend.recorder.push(method, &uri, headers, body);

    match backend.behavior {
        Behavior::Fixed { status, body } => (status, body).into_response(),
        Behavior::Chain { status } => {
            let remaining: u32 = uri
                .path()
                .strip_prefix("/hop/")
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            if remaining == 0 {
                (StatusCode::OK, r#"{"hops":"done"}"#).into_response()
            } else {
                redirect(status, &format!("/hop/{}", remaining - 1))
            }
        }
        Behavior::RedirectTo { status, target } => redirect(status, &target),
        Behavior::Slow { delay } => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, "late").into_response()
        }
    }
}

fn redirect(status: StatusCode, location: &str) -> Response {
    let mut response = status.into_response();
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_str(location).unwrap());
    response
}

fn router(behavior: Behavior) -> (Router, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new().fallback(handle).with_state(Backend {
        recorder: recorder.clone(),
        behavior,
    });
    (app, recorder)
}

async fn serve_plain(behavior: Behavior) -> (SocketAddr, Recorder) {
    let (app, recorder) = router(behavior);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, recorder)
}

/// Start a plain-HTTP backend that records requests and answers `status` with `body`.
pub async fn start_recording_backend(
    status: StatusCode,
    body: &'static str,
) -> (SocketAddr, Recorder) {
    serve_plain(Behavior::Fixed { status, body }).await
}

/// Start a backend serving redirect chains under `/hop/{n}`.
pub async fn start_redirect_chain(status: StatusCode) -> (SocketAddr, Recorder) {
    serve_plain(Behavior::Chain { status }).await
}

/// Start a backend that redirects every request to `target`.
pub async fn start_redirecting_backend(
    status: StatusCode,
    target: String,
) -> (SocketAddr, Recorder) {
    serve_plain(Behavior::RedirectTo { status, target }).await
}

/// Start a backend that answers only after `delay`.
pub async fn start_slow_backend(delay: Duration) -> (SocketAddr, Recorder) {
    serve_plain(Behavior::Slow { delay }).await
}

/// Start a raw backend that sends headers and part of the body, then stalls.
pub async fn start_stalled_body_backend() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let head = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"partial\":";
                let _ = socket.write_all(head.as_bytes()).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });
    addr
}

/// Start an HTTPS backend presenting the fixture certificate (issued by [`TEST_CA`]
/// for `localhost` and `127.0.0.1`).
pub async fn start_tls_backend(status: StatusCode, body: &'static str) -> (SocketAddr, Recorder) {
    let (app, recorder) = router(Behavior::Fixed { status, body });

    let certs = rustls_pemfile::certs(&mut &SERVER_CERT[..])
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = rustls_pemfile::private_key(&mut &SERVER_KEY[..])
        .unwrap()
        .unwrap();
    let mut server = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(certs, key)
    .unwrap();
    server.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    let tls = axum_server::tls_rustls::RustlsConfig::from_config(Arc::new(server));
    let handle = axum_server::Handle::new();
    let server_handle = handle.clone();
    tokio::spawn(async move {
        axum_server::bind_rustls("127.0.0.1:0".parse().unwrap(), tls)
            .handle(server_handle)
            .serve(app.into_make_service())
            .await
            .unwrap();
    });

    let addr = handle.listening().await.unwrap();
    (addr, recorder)
}

/// Client configuration for talking to local backends.
pub fn test_config(api_url: &str) -> ClientConfig {
    let mut config = ClientConfig::new(api_url);
    config.use_env_proxy = false;
    config.ignore_system_ca = true;
    config.timeout = Duration::from_secs(5);
    config
}
