//! Authenticator implementation
//!
//! Applies HTTP Basic authentication to outgoing requests.

use super::types::Credentials;
use crate::error::Result;
use reqwest::RequestBuilder;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
}

impl Authenticator {
    /// Create an authenticator, failing on malformed credentials
    pub fn basic(credentials: Credentials) -> Result<Self> {
        credentials.validate()?;
        Ok(Self { credentials })
    }

    /// Username the session authenticates as
    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }
}
