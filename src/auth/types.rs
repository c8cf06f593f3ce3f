//! Credential types

use crate::error::{Error, Result};
use std::fmt;

/// Username/password pair for HTTP Basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials without validating them
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject credentials that cannot be sent as an HTTP Basic header
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::auth_config("username is empty"));
        }
        // RFC 7617: the user-id ends at the first colon
        if self.username.contains(':') {
            return Err(Error::auth_config("username must not contain ':'"));
        }
        if self.username.chars().any(char::is_control) {
            return Err(Error::auth_config("username contains control characters"));
        }
        if self.password.chars().any(char::is_control) {
            return Err(Error::auth_config("password contains control characters"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
