//! Fetching and decoding images.
//!
//! [`HttpClient`] and [`Coalescer`] fetch images without caching them. The
//! [`ImageDownloader`] keeps every image it has downloaded and shares in-flight downloads
//! between callers.

use std::future::Future;

use fetchkit_core::{Coalescer, HttpClient, KeyStrategy, NetworkError, NetworkInteractor};
use fetchkit_core::{NetworkResult, Request};
use url::Url;

mod downloader;

pub use downloader::ImageDownloader;
pub use image::DynamicImage;

/// Something that can fetch images.
pub trait ImageInteractor: Send + Sync {
    /// Fetches the image at `url` with a **GET** request and decodes it.
    ///
    /// Responses that are not a supported image format fail with
    /// [`NetworkError::InvalidData`].
    fn fetch_image(&self, url: Url) -> impl Future<Output = NetworkResult<DynamicImage>> + Send;
}

/// Decodes an image, guessing its format from the content.
pub fn decode_image(bytes: &[u8]) -> NetworkResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|err| {
        tracing::debug!(error = %err, "Failed to decode image");
        NetworkError::InvalidData
    })
}

/// Fetches the image at `url` through `interactor` and decodes it.
pub async fn fetch_decoded<I>(interactor: &I, url: Url) -> NetworkResult<DynamicImage>
where
    I: NetworkInteractor,
{
    let body = interactor.fetch(Request::get(url)).await?;
    decode_image(&body)
}

impl ImageInteractor for HttpClient {
    fn fetch_image(&self, url: Url) -> impl Future<Output = NetworkResult<DynamicImage>> + Send {
        fetch_decoded(self, url)
    }
}

impl<I, S> ImageInteractor for Coalescer<I, S>
where
    I: NetworkInteractor + 'static,
    S: KeyStrategy,
{
    fn fetch_image(&self, url: Url) -> impl Future<Output = NetworkResult<DynamicImage>> + Send {
        fetch_decoded(self, url)
    }
}
