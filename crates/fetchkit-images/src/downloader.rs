use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use fetchkit_core::utils::CallOnDrop;
use fetchkit_core::{HttpClient, NetworkError, NetworkInteractor, NetworkResult, metric};
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use image::DynamicImage;
use parking_lot::Mutex;
use url::Url;

use crate::{ImageInteractor, fetch_decoded};

type ImageChannel = Shared<oneshot::Receiver<NetworkResult<Arc<DynamicImage>>>>;

enum ImageStatus {
    Downloading(ImageChannel),
    Downloaded(Arc<DynamicImage>),
}

type ImageCache = Arc<Mutex<HashMap<Url, ImageStatus>>>;

/// Downloads images and keeps them in memory.
///
/// Each URL is downloaded at most once at a time. Successfully decoded images are kept
/// for the lifetime of the downloader, failures are not remembered. Every caller receives
/// its own copy of the image, so modifying it never affects the cache or other callers.
pub struct ImageDownloader<I = HttpClient> {
    interactor: Arc<I>,
    cache: ImageCache,
}

impl ImageDownloader {
    /// A process-wide downloader backed by a default [`HttpClient`].
    pub fn shared() -> &'static ImageDownloader {
        static SHARED: OnceLock<ImageDownloader> = OnceLock::new();
        SHARED.get_or_init(|| ImageDownloader::new(HttpClient::default()))
    }
}

impl<I> ImageDownloader<I> {
    pub fn new(interactor: I) -> Self {
        Self {
            interactor: Arc::new(interactor),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn interactor(&self) -> &I {
        &self.interactor
    }

    /// The number of images that finished downloading.
    pub fn cached_count(&self) -> usize {
        self.cache
            .lock()
            .values()
            .filter(|status| matches!(status, ImageStatus::Downloaded(_)))
            .count()
    }
}

impl<I> ImageDownloader<I>
where
    I: NetworkInteractor + 'static,
{
    /// Fetches the image at `url`, from the cache if possible.
    pub async fn fetch_image(&self, url: Url) -> NetworkResult<DynamicImage> {
        let channel = {
            let mut cache = self.cache.lock();
            match cache.get(&url) {
                Some(ImageStatus::Downloaded(image)) => {
                    let image = Arc::clone(image);
                    drop(cache);
                    metric!(counter("images.cache.hit") += 1, "status" => "downloaded");
                    return Ok(DynamicImage::clone(&image));
                }
                Some(ImageStatus::Downloading(channel)) => {
                    metric!(counter("images.cache.hit") += 1, "status" => "downloading");
                    tracing::trace!(%url, "Joining image download");
                    channel.clone()
                }
                None => {
                    metric!(counter("images.cache.miss") += 1);
                    let channel = self.spawn_download(url.clone());
                    cache.insert(url, ImageStatus::Downloading(channel.clone()));
                    channel
                }
            }
        };

        let image = channel.await.unwrap_or(Err(NetworkError::Cancelled))?;
        Ok(DynamicImage::clone(&image))
    }

    fn spawn_download(&self, url: Url) -> ImageChannel {
        let (sender, receiver) = oneshot::channel();

        // Failed downloads are evicted, finished ones have already been replaced.
        let remove_token = {
            let cache = Arc::clone(&self.cache);
            let url = url.clone();
            CallOnDrop::new(move || {
                let mut cache = cache.lock();
                if let Some(ImageStatus::Downloading(_)) = cache.get(&url) {
                    cache.remove(&url);
                }
            })
        };

        let interactor = Arc::clone(&self.interactor);
        let cache = Arc::clone(&self.cache);
        let download = async move {
            tracing::debug!(%url, "Downloading image");
            let result = fetch_decoded(&*interactor, url.clone()).await.map(Arc::new);

            match &result {
                Ok(image) => {
                    cache
                        .lock()
                        .insert(url, ImageStatus::Downloaded(Arc::clone(image)));
                }
                Err(err) => tracing::debug!(%url, error = %err, "Image download failed"),
            }

            drop(remove_token);
            sender.send(result).ok();
        };

        tokio::spawn(download);

        receiver.shared()
    }
}

impl<I> ImageInteractor for ImageDownloader<I>
where
    I: NetworkInteractor + 'static,
{
    fn fetch_image(&self, url: Url) -> impl Future<Output = NetworkResult<DynamicImage>> + Send {
        ImageDownloader::fetch_image(self, url)
    }
}
