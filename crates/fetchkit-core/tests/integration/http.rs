use std::collections::BTreeMap;
use std::time::Duration;

use fetchkit_core::{
    Authentication, Bytes, CachePolicy, Coalescer, Config, HttpClient, HttpMethod, NetworkError,
    NetworkInteractor, Request, StatusCode,
};
use fetchkit_test::{Server, setup, url};

fn client() -> HttpClient {
    HttpClient::from_config(&Config::default()).unwrap()
}

async fn echoed_headers(client: &HttpClient, request: Request) -> BTreeMap<String, String> {
    let body = client.fetch(request).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_fetch_body() {
    setup();

    let server = Server::new();
    let body = client()
        .fetch(Request::get(server.url("/hello")))
        .await
        .unwrap();

    assert_eq!(body, Bytes::from_static(b"hello"));
    assert_eq!(server.hits("/hello"), 1);
}

#[tokio::test]
async fn test_unexpected_status_is_not_a_transport_error() {
    setup();

    let server = Server::new();
    let client = client();

    let err = client
        .fetch(Request::get(server.url("/missing")))
        .await
        .unwrap_err();
    assert_eq!(err, NetworkError::Status(StatusCode::NOT_FOUND));
    assert!(!err.is_transport());

    let response = client
        .response(Request::get(server.url("/missing")))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, Bytes::from_static(b"not found"));
}

#[tokio::test]
async fn test_request_headers() {
    setup();

    let server = Server::new();
    let request = Request::get(server.url("/headers"))
        .with_header("X-Trace", "42")
        .with_authentication(&[Authentication::Token("secret".into())])
        .with_cache_policy(CachePolicy::ReloadIgnoringCache);

    let headers = echoed_headers(&client(), request).await;

    assert_eq!(headers["x-trace"], "42");
    assert_eq!(headers["authorization"], "Bearer secret");
    assert_eq!(headers["accept"], "application/json");
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["pragma"], "no-cache");
    assert!(headers["user-agent"].starts_with("fetchkit/"));
}

#[tokio::test]
async fn test_user_agent_override() {
    setup();

    let server = Server::new();
    let config = Config {
        user_agent: "configured/1.0".into(),
        ..Config::default()
    };
    let client = HttpClient::from_config(&config).unwrap();

    let headers = echoed_headers(&client, Request::get(server.url("/headers"))).await;
    assert_eq!(headers["user-agent"], "configured/1.0");
    assert!(!headers.contains_key("cache-control"));

    let request = Request::get(server.url("/headers")).with_header("User-Agent", "custom/2.0");
    let headers = echoed_headers(&client, request).await;
    assert_eq!(headers["user-agent"], "custom/2.0");
}

#[tokio::test]
async fn test_json_body() {
    setup();

    let server = Server::new();
    let request = Request::json(
        server.url("/echo"),
        &serde_json::json!({"title": "fetch"}),
        HttpMethod::Patch,
    )
    .unwrap();

    let body = client().fetch(request).await.unwrap();
    assert_eq!(body, Bytes::from_static(br#"PATCH {"title":"fetch"}"#));

    let body = client()
        .fetch(Request::post(server.url("/echo"), HttpMethod::Delete))
        .await
        .unwrap();
    assert_eq!(body, Bytes::from_static(b"DELETE "));
}

#[tokio::test]
async fn test_timeout() {
    setup();

    let server = Server::new();
    let timeout = Duration::from_millis(100);
    let request = Request::get(server.url("/slow")).with_timeout(timeout);

    let err = client().fetch(request).await.unwrap_err();
    assert_eq!(err, NetworkError::Timeout(timeout));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_connection_refused() {
    setup();

    // Bind and immediately release a port so nothing listens on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let request = Request::get(url(&format!("http://127.0.0.1:{port}/")));

    let err = client().fetch(request).await.unwrap_err();
    assert!(matches!(err, NetworkError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn test_coalescer_over_http() {
    setup();

    let server = Server::new();
    let coalescer = Coalescer::new(client());
    let url = server.url("/hello");

    let (a, b) = futures::join!(
        coalescer.fetch(Request::get(url.clone())),
        coalescer.fetch(Request::get(url.clone())),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(server.hits("/hello"), 1);
    assert_eq!(coalescer.in_flight_count(), 0);
}
