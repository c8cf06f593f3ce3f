//! Error types for snsoap
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for snsoap
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Query Errors
    // ============================================================================
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("Remote query '{operation}' on table '{table}' failed: {message}")]
    RemoteQuery {
        table: String,
        operation: String,
        message: String,
    },

    // ============================================================================
    // Connection Errors
    // ============================================================================
    #[error("Invalid credentials: {message}")]
    AuthConfig { message: String },

    #[error("Failed to resolve endpoint for table '{table}': {message}")]
    Endpoint { table: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Document Errors
    // ============================================================================
    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a remote query error
    pub fn remote_query(
        table: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RemoteQuery {
            table: table.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an auth config error
    pub fn auth_config(message: impl Into<String>) -> Self {
        Self::AuthConfig {
            message: message.into(),
        }
    }

    /// Create an endpoint error
    pub fn endpoint(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Endpoint {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an XML parse error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::XmlParse {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from a remote call made while paging
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::RemoteQuery { .. } | Error::Endpoint { .. })
    }
}

/// Result type alias for snsoap
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
