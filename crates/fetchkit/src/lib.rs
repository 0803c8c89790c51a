//! Ergonomic HTTP fetching.
//!
//! This crate bundles the fetchkit crates:
//!
//! - `fetchkit-core`: requests, the [`HttpClient`] transport and the request [`Coalescer`]
//! - `fetchkit-json`: decoding JSON responses with [`JsonInteractor`]
//! - `fetchkit-images`: decoding images and caching them in an [`ImageDownloader`]
//!
//! ```no_run
//! use fetchkit::{Coalescer, HttpClient, JsonInteractor, Request};
//!
//! # async fn run() -> fetchkit::NetworkResult<()> {
//! let client = Coalescer::new(HttpClient::default());
//! let url = "https://example.test/todos".parse().unwrap();
//! let todos: Vec<serde_json::Value> = client.fetch_json(Request::get(url)).await?;
//! # Ok(())
//! # }
//! ```

pub use fetchkit_core::{
    Authentication, Bytes, CachePolicy, Coalescer, Config, FullIdentity, HttpClient, HttpMethod,
    KeyStrategy, NetworkError, NetworkInteractor, NetworkResult, Pagination, ReducedFields,
    Request, Response, StatusCode, Url, UserCredentials, paginate,
};
pub use fetchkit_images::{DynamicImage, ImageDownloader, ImageInteractor};
pub use fetchkit_json::JsonInteractor;
