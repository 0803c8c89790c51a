use std::error::Error;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// An error that happens while fetching a resource.
///
/// Errors are cloneable so that the outcome of one shared request can be handed to every
/// caller that waited on it. The variants separate "never got a response"
/// ([`Transport`](Self::Transport), [`Timeout`](Self::Timeout)) from "got a response that was
/// not wanted" ([`Status`](Self::Status)) from "got a response that could not be parsed"
/// ([`Decode`](Self::Decode), [`InvalidData`](Self::InvalidData)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The request could not be completed by the transport, for example due to a DNS
    /// failure, a refused connection or a broken TLS handshake.
    ///
    /// The attached string contains the root cause reported by the transport.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The transport did not produce a response within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// A response was received, but its status differs from the accepted one.
    #[error("unexpected HTTP status: {0}")]
    Status(StatusCode),
    /// The payload did not decode into the expected JSON shape.
    #[error("JSON error: {0}")]
    Decode(String),
    /// The payload does not represent a valid resource, like non-image bytes.
    #[error("content does not match expectation")]
    InvalidData,
    /// The work was cancelled before it completed.
    #[error("request was cancelled")]
    Cancelled,
}

impl NetworkError {
    /// Creates a [`Transport`](Self::Transport) error from the innermost cause of `error`.
    pub fn transport(mut error: &dyn Error) -> Self {
        while let Some(src) = error.source() {
            error = src;
        }

        let mut error_string = error.to_string();

        if error_string.contains("certificate verify failed") {
            error_string = "certificate verify failed".to_string();
        }

        Self::Transport(error_string)
    }

    /// Whether the request never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// The outcome of a network operation.
pub type NetworkResult<T> = Result<T, NetworkError>;
