use std::time::Duration;

use fetchkit_core::{Coalescer, Config, HttpClient, NetworkError, Response};
use fetchkit_images::{ImageDownloader, ImageInteractor, fetch_decoded};
use fetchkit_test::{MockTransport, Server, png_fixture, setup, url};
use image::GenericImageView;

#[tokio::test]
async fn test_http_client_fetches_images() {
    setup();

    let server = Server::new();
    let client = HttpClient::from_config(&Config::default()).unwrap();

    let image = client.fetch_image(server.url("/image.png")).await.unwrap();
    assert_eq!(image.dimensions(), (4, 4));

    let err = client.fetch_image(server.url("/hello")).await.unwrap_err();
    assert_eq!(err, NetworkError::InvalidData);
}

#[tokio::test]
async fn test_downloader_over_http() {
    setup();

    let server = Server::new();
    let client = HttpClient::from_config(&Config::default()).unwrap();
    let downloader = ImageDownloader::new(client);

    for _ in 0..3 {
        let image = downloader
            .fetch_image(server.url("/image.png"))
            .await
            .unwrap();
        assert_eq!(image.dimensions(), (4, 4));
    }
    assert_eq!(server.hits("/image.png"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_coalescer_does_not_cache_images() {
    setup();

    let url = url("https://example.test/swifty.png");
    let transport = MockTransport::new()
        .fallback(Response::ok(png_fixture(2, 2)))
        .with_latency(Duration::from_millis(300));
    let coalescer = Coalescer::new(transport.clone());

    let (a, b) = tokio::join!(
        coalescer.fetch_image(url.clone()),
        coalescer.fetch_image(url.clone()),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(transport.calls(&url), 1);

    coalescer.fetch_image(url.clone()).await.unwrap();
    assert_eq!(transport.calls(&url), 2);
}

#[tokio::test]
async fn test_fetch_decoded() {
    setup();

    let url = url("https://example.test/swifty.png");
    let transport = MockTransport::new().with_response(&url, Response::ok(png_fixture(5, 1)));

    let image = fetch_decoded(&transport, url).await.unwrap();
    assert_eq!(image.dimensions(), (5, 1));
}
