//! The `reqwest` backed transport.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::error::{NetworkError, NetworkResult};
use crate::interactor::{NetworkInteractor, Response};
use crate::request::{CachePolicy, Request};

/// Creates a [`reqwest::Client`] configured by `config`.
///
/// Connection pooling, TLS and redirects are left to `reqwest`.
pub fn create_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .gzip(config.gzip)
        .hickory_dns(true)
        .connect_timeout(config.timeouts.connect)
        .pool_idle_timeout(Duration::from_secs(30))
        .user_agent(config.user_agent.as_str())
        .build()
        .context("failed to create HTTP client")
}

/// A [`NetworkInteractor`] that executes requests over HTTP.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    max_timeout: Option<Duration>,
}

impl HttpClient {
    /// Wraps an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            max_timeout: Some(config.timeouts.request),
        })
    }

    fn effective_timeout(&self, requested: Duration) -> Duration {
        match self.max_timeout {
            Some(max) => requested.min(max),
            None => requested,
        }
    }

    async fn execute(&self, request: Request) -> NetworkResult<Response> {
        let Request {
            url,
            method,
            headers,
            body,
            timeout,
            cache_policy,
        } = request;

        let timeout = self.effective_timeout(timeout);
        let mut builder = self
            .client
            .request(method.into(), url)
            .timeout(timeout);

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if cache_policy == CachePolicy::ReloadIgnoringCache {
            builder = builder
                .header("cache-control", "no-cache")
                .header("pragma", "no-cache");
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let map_err = |err: reqwest::Error| {
            if err.is_timeout() {
                NetworkError::Timeout(timeout)
            } else {
                NetworkError::from(err)
            }
        };

        let response = builder.send().await.map_err(map_err)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_err)?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::new(client)
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(error: reqwest::Error) -> Self {
        NetworkError::transport(&error)
    }
}

impl NetworkInteractor for HttpClient {
    async fn response(&self, request: Request) -> NetworkResult<Response> {
        let method = request.method;
        tracing::trace!(url = %request.url, %method, "sending request");

        let start = Instant::now();
        let result = self.execute(request).await;

        let status = match &result {
            Ok(response) => response.status.as_str().to_owned(),
            Err(_) => "error".to_owned(),
        };
        metric!(
            timer("http.request.duration") = start.elapsed(),
            "method" => method.as_str(),
            "status" => &status,
        );

        result
    }
}
