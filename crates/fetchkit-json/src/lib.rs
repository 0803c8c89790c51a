//! Fetching JSON documents with any [`NetworkInteractor`].
//!
//! ```no_run
//! use fetchkit_core::{HttpClient, Request};
//! use fetchkit_json::JsonInteractor;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Todo {
//!     title: String,
//! }
//!
//! # async fn run() -> fetchkit_core::NetworkResult<()> {
//! let url = "https://example.test/todos/1".parse().unwrap();
//! let todo: Todo = HttpClient::default().fetch_json(Request::get(url)).await?;
//! println!("{}", todo.title);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use fetchkit_core::{NetworkResult, Request, StatusCode};
use serde::de::DeserializeOwned;

pub use fetchkit_core::{NetworkError, NetworkInteractor};

/// Decodes JSON response bodies.
///
/// Implemented for every [`NetworkInteractor`], including a
/// [`Coalescer`](fetchkit_core::Coalescer). When coalesced, the response body is shared and
/// every caller decodes its own copy.
pub trait JsonInteractor: NetworkInteractor {
    /// Fetches `request` and decodes the body of a `200 OK` response as `T`.
    ///
    /// Bodies that don't match `T` fail with [`NetworkError::Decode`].
    fn fetch_json<T>(&self, request: Request) -> impl Future<Output = NetworkResult<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        self.fetch_json_expecting(request, StatusCode::OK)
    }

    /// Like [`fetch_json`](Self::fetch_json), accepting the status `expected` instead.
    fn fetch_json_expecting<T>(
        &self,
        request: Request,
        expected: StatusCode,
    ) -> impl Future<Output = NetworkResult<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let url = request.url.clone();
            let body = self.fetch_expecting(request, expected).await?;
            serde_json::from_slice(&body).map_err(|err| {
                tracing::debug!(%url, error = %err, "Failed to decode JSON response");
                NetworkError::from(err)
            })
        }
    }
}

impl<I: NetworkInteractor> JsonInteractor for I {}
