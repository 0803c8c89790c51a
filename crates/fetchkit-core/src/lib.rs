//! Building blocks for talking to HTTP APIs.
//!
//! The crate is layered:
//!
//! - [`Request`](request::Request) describes a single HTTP request and comes with builders for
//!   the common cases, [`Authentication`](auth::Authentication) and
//!   [`Pagination`](pagination::Pagination) helpers.
//! - [`NetworkInteractor`](interactor::NetworkInteractor) is the seam every transport implements.
//!   [`HttpClient`](http::HttpClient) is the `reqwest` backed implementation.
//! - [`Coalescer`](coalescer::Coalescer) wraps any interactor and makes sure that concurrent
//!   identical requests share a single round-trip.

#[macro_use]
pub mod metrics;

pub mod auth;
pub mod coalescer;
pub mod config;
pub mod error;
pub mod http;
pub mod interactor;
pub mod logging;
pub mod pagination;
pub mod request;
pub mod utils;

pub use auth::{Authentication, UserCredentials};
pub use coalescer::{Coalescer, FullIdentity, KeyStrategy, ReducedFields};
pub use config::Config;
pub use error::{NetworkError, NetworkResult};
pub use http::HttpClient;
pub use interactor::{NetworkInteractor, Response};
pub use pagination::{Pagination, paginate};
pub use request::{CachePolicy, HttpMethod, Request};

pub use bytes::Bytes;
pub use reqwest::StatusCode;
pub use url::Url;
