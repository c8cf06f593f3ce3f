//! Authentication module
//!
//! HTTP Basic credentials for the SOAP session. Credentials are validated once
//! when the session is built and applied to every request afterwards.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::Credentials;
