//! Authentication headers for requests.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::request::Request;

/// An account name and password, sent as HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub account: String,
    pub password: String,
}

impl UserCredentials {
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.account
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The ways a request can authenticate itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication {
    /// Sets an arbitrary header field.
    Custom { header: String, value: String },
    /// A bearer token in the `authorization` header.
    Token(String),
    /// Basic authentication in the `authorization` header.
    Credentials(UserCredentials),
    /// An API key in the `x-api-key` header.
    ApiKey(String),
}

impl Authentication {
    /// The header name and value this authentication method contributes.
    pub fn header(&self) -> (&str, String) {
        match self {
            Authentication::Custom { header, value } => (header.as_str(), value.clone()),
            Authentication::Token(token) => ("authorization", format!("Bearer {token}")),
            Authentication::Credentials(user) => {
                let login = format!("{}:{}", user.account, user.password);
                ("authorization", format!("Basic {}", STANDARD.encode(login)))
            }
            Authentication::ApiKey(key) => ("x-api-key", key.clone()),
        }
    }
}

impl Request {
    /// Adds the headers for every given authentication method.
    ///
    /// When two methods use the same header, the later one wins.
    pub fn with_authentication(mut self, authentication: &[Authentication]) -> Self {
        for auth in authentication {
            let (name, value) = auth.header();
            self.set_header(name, value);
        }
        self
    }
}
