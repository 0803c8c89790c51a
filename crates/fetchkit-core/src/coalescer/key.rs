//! Strategies for deciding when two requests are the same fetch.

use std::collections::BTreeMap;
use std::hash::Hash;
use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::request::{HttpMethod, Request};

/// Derives the coalescing key of a request.
///
/// The implementing type is the key itself. Derivation must be a pure function of the
/// request, so equal requests always produce equal keys.
pub trait KeyStrategy: Hash + Eq + Clone + Send + Sync + 'static {
    fn derive(request: &Request) -> Self;
}

/// Keys requests by every one of their fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FullIdentity(Request);

impl KeyStrategy for FullIdentity {
    fn derive(request: &Request) -> Self {
        Self(request.clone())
    }
}

/// Keys requests by the fields that influence the response.
///
/// The cache policy is ignored, so a forced reload joins a regular fetch of the same
/// resource that is already running.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReducedFields {
    url: Url,
    method: HttpMethod,
    timeout: Duration,
    body: Option<Bytes>,
    headers: BTreeMap<String, String>,
}

impl KeyStrategy for ReducedFields {
    fn derive(request: &Request) -> Self {
        Self {
            url: request.url.clone(),
            method: request.method,
            timeout: request.timeout,
            body: request.body.clone(),
            headers: request.headers.clone(),
        }
    }
}
