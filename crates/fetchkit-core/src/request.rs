//! The request model and its builders.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

/// The timeout applied to requests that don't set their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf8";
const JSON_ACCEPT: &str = "application/json";

/// The HTTP methods supported by the request builders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl HttpMethod {
    /// The standard (uppercased) method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// How intermediate HTTP caches should treat a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// Leave caching decisions to the protocol.
    #[default]
    UseProtocolCachePolicy,
    /// Ask every cache on the way to revalidate with the origin.
    ReloadIgnoringCache,
}

/// A single HTTP request.
///
/// Header names are stored lowercased, so two requests that only differ in header name
/// casing are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Request {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Duration,
    pub cache_policy: CachePolicy,
}

impl Request {
    /// Creates a plain **GET** request without any headers.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            cache_policy: CachePolicy::default(),
        }
    }

    /// Creates a **GET** request that accepts JSON.
    pub fn get(url: Url) -> Self {
        Self::new(url).with_header("accept", JSON_ACCEPT)
    }

    /// Creates a request without a body that sends and accepts JSON.
    ///
    /// Useful as is for **DELETE**, or as the base of [`Request::json`].
    pub fn post(url: Url, method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::new(url)
        }
        .with_header("content-type", JSON_CONTENT_TYPE)
        .with_header("accept", JSON_ACCEPT)
    }

    /// Creates a request with `data` encoded as its JSON body.
    pub fn json<T>(url: Url, data: &T, method: HttpMethod) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(data)?;
        Ok(Self::post(url, method).with_body(body))
    }

    /// Sets a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Returns the value of the header `name`, ignoring its casing.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }
}
