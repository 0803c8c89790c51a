//! Helpers for testing interactors, the coalescer and the image downloader.
//!
//! When writing tests, keep the following points in mind:
//!
//!  - In every test, call [`setup`]. This will set up the logger so that all console output
//!    is captured by the test runner.
//!
//!  - Prefer [`MockTransport`] over a real [`Server`]. It does not touch the network, counts
//!    every call per URL and simulates latency with `tokio::time`, so tests can run with a
//!    paused clock.
//!
//!  - When using [`Server`], hold it until all requests have been made. Dropping it stops the
//!    server and further connections are refused.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{self, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::routing::{any, get};
use axum::{Json, Router};
use bytes::Bytes;
use fetchkit_core::{NetworkError, NetworkInteractor, NetworkResult, Request, Response};
use image::{ImageBuffer, ImageFormat, Rgba};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::fmt;
use url::Url;

/// Setup the test environment.
///
///  - Initializes logs: The logger only captures logs from the fetchkit crates and mutes all
///    other logs (such as hyper or reqwest).
pub fn setup() {
    fmt()
        .with_env_filter(EnvFilter::new(
            "fetchkit_core=trace,fetchkit_json=trace,fetchkit_images=trace",
        ))
        .with_target(false)
        .pretty()
        .with_test_writer()
        .try_init()
        .ok();
}

/// Parses a URL, panicking on invalid input.
pub fn url(s: &str) -> Url {
    s.parse().unwrap()
}

/// Encodes a `width` by `height` PNG with a deterministic gradient.
pub fn png_fixture(width: u32, height: u32) -> Bytes {
    let image = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });

    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    Bytes::from(buf.into_inner())
}

/// An in-memory [`NetworkInteractor`].
///
/// Responses are configured per URL, with an optional fallback for all other URLs. URLs
/// without a response fail with a transport error. Every call is counted before the
/// simulated latency elapses, so in-flight calls are visible in [`calls`](Self::calls).
///
/// Clones share their call counters.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    responses: HashMap<Url, NetworkResult<Response>>,
    fallback: Option<NetworkResult<Response>>,
    latency: Duration,
    calls: Arc<Mutex<HashMap<Url, usize>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers requests to `url` with `response`.
    pub fn with_response(mut self, url: &Url, response: Response) -> Self {
        self.responses.insert(url.clone(), Ok(response));
        self
    }

    /// Fails requests to `url` with `error`.
    pub fn with_error(mut self, url: &Url, error: NetworkError) -> Self {
        self.responses.insert(url.clone(), Err(error));
        self
    }

    /// Answers requests to all unconfigured URLs with `response`.
    pub fn fallback(mut self, response: Response) -> Self {
        self.fallback = Some(Ok(response));
        self
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The number of requests made to `url` so far.
    pub fn calls(&self, url: &Url) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or_default()
    }

    /// The number of requests made to any URL so far.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl NetworkInteractor for MockTransport {
    async fn response(&self, request: Request) -> NetworkResult<Response> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(request.url.clone())
            .or_default() += 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.responses
            .get(&request.url)
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_else(|| {
                Err(NetworkError::Transport(format!(
                    "no response for {}",
                    request.url
                )))
            })
    }
}

/// A local HTTP server on an ephemeral port.
pub struct Server {
    handle: tokio::task::JoinHandle<()>,
    socket: SocketAddr,
    hits: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl Server {
    /// Serves `router`, counting hits per path.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_router(router: Router) -> Self {
        let hits = Arc::new(Mutex::new(BTreeMap::new()));
        let router = router.layer(middleware::from_fn_with_state(hits.clone(), count_hits));

        let listener = std::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        listener.set_nonblocking(true).unwrap();
        let socket = listener.local_addr().unwrap();
        let listener = tokio::net::TcpListener::from_std(listener).unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            handle,
            socket,
            hits,
        }
    }

    /// A server with a fixed set of routes:
    ///
    ///  - `/hello`: responds with `hello`
    ///  - `/missing`: responds with `404 Not Found`
    ///  - `/headers`: responds with the request headers as a JSON object
    ///  - `/echo`: responds with the request method and body, for any method
    ///  - `/todo`: responds with a JSON todo item
    ///  - `/image.png`: responds with a 4x4 PNG
    ///  - `/slow`: responds after two seconds
    pub fn new() -> Self {
        let router = Router::new()
            .route("/hello", get(|| async { "hello" }))
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "not found") }),
            )
            .route("/headers", get(echo_headers))
            .route("/echo", any(echo))
            .route(
                "/todo",
                get(|| async {
                    Json(serde_json::json!({"id": 1, "title": "write tests", "done": false}))
                }),
            )
            .route(
                "/image.png",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_fixture(4, 4)) }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "slow"
                }),
            );

        Self::with_router(router)
    }

    pub fn port(&self) -> u16 {
        self.socket.port()
    }

    pub fn url(&self, path: &str) -> Url {
        let path = path.trim_start_matches('/');
        format!("http://127.0.0.1:{}/{}", self.port(), path)
            .parse()
            .unwrap()
    }

    /// The number of requests made to `path` so far.
    pub fn hits(&self, path: &str) -> usize {
        let path = format!("/{}", path.trim_start_matches('/'));
        self.hits.lock().unwrap().get(&path).copied().unwrap_or_default()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn count_hits(
    State(hits): State<Arc<Mutex<BTreeMap<String, usize>>>>,
    request: extract::Request,
    next: Next,
) -> axum::response::Response {
    {
        let mut hits = hits.lock().unwrap();
        *hits.entry(request.uri().path().to_owned()).or_default() += 1;
    }
    next.run(request).await
}

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_owned(), value)
        })
        .collect();
    Json(headers)
}

async fn echo(method: Method, body: Bytes) -> String {
    format!("{method} {}", String::from_utf8_lossy(&body))
}
