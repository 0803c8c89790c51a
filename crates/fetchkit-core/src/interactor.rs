//! The seam between request consumers and the transport that executes them.

use std::future::Future;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::error::{NetworkError, NetworkResult};
use crate::request::Request;

/// A response received from the transport, whatever its status.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Returns the body if the status matches `expected`.
    pub fn expect_status(self, expected: StatusCode) -> NetworkResult<Bytes> {
        if self.status != expected {
            return Err(NetworkError::Status(self.status));
        }
        Ok(self.body)
    }
}

/// Something that can execute [`Request`]s.
///
/// Implementors only provide [`response`](Self::response); status checking and the
/// convenience methods are built on top of it.
pub trait NetworkInteractor: Send + Sync {
    /// Executes `request` and returns the raw response.
    ///
    /// Fails only if no response was received at all.
    fn response(&self, request: Request) -> impl Future<Output = NetworkResult<Response>> + Send;

    /// Executes `request` and returns the body if the response status is `expected`.
    fn fetch_expecting(
        &self,
        request: Request,
        expected: StatusCode,
    ) -> impl Future<Output = NetworkResult<Bytes>> + Send {
        async move { self.response(request).await?.expect_status(expected) }
    }

    /// Executes `request` and returns the body of a `200 OK` response.
    fn fetch(&self, request: Request) -> impl Future<Output = NetworkResult<Bytes>> + Send {
        self.fetch_expecting(request, StatusCode::OK)
    }

    /// Executes `request` for its side effects, discarding the body.
    fn send(&self, request: Request) -> impl Future<Output = NetworkResult<()>> + Send {
        async move { self.fetch(request).await.map(|_| ()) }
    }
}
