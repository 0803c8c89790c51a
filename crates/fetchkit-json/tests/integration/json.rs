use std::time::Duration;

use fetchkit_core::{Coalescer, NetworkError, Request, Response, StatusCode};
use fetchkit_json::JsonInteractor;
use fetchkit_test::{MockTransport, setup, url};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Greeting {
    message: String,
}

fn greeting() -> Greeting {
    Greeting {
        message: "Hello, World!".into(),
    }
}

#[tokio::test]
async fn test_fetch_json() {
    setup();

    let url = url("https://example.test/greeting");
    let transport = MockTransport::new()
        .with_response(&url, Response::ok(r#"{"message":"Hello, World!"}"#));

    let decoded: Greeting = transport.fetch_json(Request::get(url)).await.unwrap();
    assert_eq!(decoded, greeting());
}

#[tokio::test]
async fn test_invalid_json() {
    setup();

    let url = url("https://example.test/greeting");
    let transport = MockTransport::new().with_response(&url, Response::ok("invalid json"));

    let err = transport
        .fetch_json::<Greeting>(Request::get(url))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn test_wrong_shape() {
    setup();

    let url = url("https://example.test/greeting");
    let transport = MockTransport::new().with_response(&url, Response::ok(r#"{"msg":1}"#));

    let err = transport
        .fetch_json::<Greeting>(Request::get(url))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn test_network_error_is_propagated() {
    setup();

    let url = url("https://example.test/greeting");
    let error = NetworkError::Transport("not connected".into());
    let transport = MockTransport::new().with_error(&url, error.clone());

    let err = transport
        .fetch_json::<Greeting>(Request::get(url))
        .await
        .unwrap_err();
    assert_eq!(err, error);
}

#[tokio::test]
async fn test_status_is_checked_before_decoding() {
    setup();

    let url = url("https://example.test/greeting");
    let body = r#"{"message":"Hello, World!"}"#;
    let transport = MockTransport::new()
        .with_response(&url, Response::new(StatusCode::CREATED, body));

    let err = transport
        .fetch_json::<Greeting>(Request::get(url.clone()))
        .await
        .unwrap_err();
    assert_eq!(err, NetworkError::Status(StatusCode::CREATED));

    let decoded: Greeting = transport
        .fetch_json_expecting(Request::get(url), StatusCode::CREATED)
        .await
        .unwrap();
    assert_eq!(decoded, greeting());
}

#[tokio::test(start_paused = true)]
async fn test_coalesced_json() {
    setup();

    let url = url("https://example.test/greeting");
    let transport = MockTransport::new()
        .with_response(&url, Response::ok(r#"{"message":"Hello, World!"}"#))
        .with_latency(Duration::from_millis(300));
    let coalescer = Coalescer::new(transport.clone());

    let (a, b) = futures::join!(
        coalescer.fetch_json::<Greeting>(Request::get(url.clone())),
        coalescer.fetch_json::<serde_json::Value>(Request::get(url.clone())),
    );

    assert_eq!(a.unwrap(), greeting());
    assert_eq!(b.unwrap()["message"], "Hello, World!");
    assert_eq!(transport.calls(&url), 1);
}
