//! Authenticated HTTP session
//!
//! Wraps a reqwest client with HTTP Basic credentials, a user agent and an
//! optional timeout. Bodies are buffered as text; callers decide how to
//! classify the status.

use crate::auth::{Authenticator, Credentials};
use crate::config::InstanceConfig;
use crate::error::{Error, Result};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method};
use tracing::debug;

/// Status and buffered body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl HttpReply {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client carrying the session's credentials
#[derive(Debug, Clone)]
pub struct SoapSession {
    client: Client,
    authenticator: Authenticator,
}

impl SoapSession {
    /// Build a session from instance config
    pub fn new(config: &InstanceConfig) -> Result<Self> {
        let authenticator =
            Authenticator::basic(Credentials::new(&config.username, &config.password))?;

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| Error::config(format!("invalid user agent: {e}")))?;
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::auth_config(format!("failed to build HTTP session: {e}")))?;

        Ok(Self {
            client,
            authenticator,
        })
    }

    /// Username the session authenticates as
    pub fn username(&self) -> &str {
        self.authenticator.username()
    }

    /// GET a document
    pub async fn get(&self, url: &str) -> Result<HttpReply> {
        debug!(url, "GET");
        let req = self.authenticator.apply(self.client.request(Method::GET, url));
        Self::send(req).await
    }

    /// POST a SOAP 1.1 envelope
    pub async fn post_soap(&self, url: &str, soap_action: &str, envelope: String) -> Result<HttpReply> {
        debug!(url, soap_action, "POST");
        let req = self
            .client
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{soap_action}\""))
            .body(envelope);
        Self::send(self.authenticator.apply(req)).await
    }

    async fn send(req: reqwest::RequestBuilder) -> Result<HttpReply> {
        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "response");
        Ok(HttpReply { status, body })
    }
}
