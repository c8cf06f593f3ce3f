//! Instance configuration
//!
//! Connection settings for a ServiceNow instance, loadable from YAML:
//!
//! ```yaml
//! instance: dev12345
//! username: soap.reader
//! password: hunter2
//! timeout_secs: 120
//! cache_wsdl: true
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Domain every instance is hosted under
pub const PLATFORM_DOMAIN: &str = "service-now.com";

/// Largest page the records call accepts
pub const MAX_PAGE_SIZE: usize = 250;

/// Connection settings for one instance
#[derive(Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Instance name, the host part of `{instance}.service-now.com`
    pub instance: String,

    /// Basic auth user
    #[serde(default)]
    pub username: String,

    /// Basic auth password
    #[serde(default)]
    pub password: String,

    /// Replaces `https://{instance}.service-now.com` (proxies, tests)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Session-wide request timeout; none by default
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Keep resolved WSDL descriptors per table across queries
    #[serde(default)]
    pub cache_wsdl: bool,

    /// Default page size for queries
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("instance", &self.instance)
            .field("username", &self.username)
            .field("password", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("cache_wsdl", &self.cache_wsdl)
            .field("page_size", &self.page_size)
            .finish()
    }
}

fn default_user_agent() -> String {
    format!("snsoap/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl InstanceConfig {
    /// Create a config for an instance with basic credentials
    pub fn new(
        instance: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            username: username.into(),
            password: password.into(),
            base_url: None,
            timeout_secs: None,
            user_agent: default_user_agent(),
            cache_wsdl: false,
            page_size: default_page_size(),
        }
    }

    /// Create a new config builder
    pub fn builder(instance: impl Into<String>) -> InstanceConfigBuilder {
        InstanceConfigBuilder {
            config: Self::new(instance, "", ""),
        }
    }

    /// Load config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load config from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and bounds
    pub fn validate(&self) -> Result<()> {
        if self.instance.trim().is_empty() && self.base_url.is_none() {
            return Err(Error::config("either 'instance' or 'base_url' is required"));
        }
        validate_page_size(self.page_size)?;
        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)?;
        }
        Ok(())
    }

    /// Root URL of the instance, without trailing slash
    pub fn instance_url(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.{PLATFORM_DOMAIN}", self.instance),
        }
    }

    /// WSDL location for a table
    pub fn wsdl_url(&self, table: &str) -> String {
        format!("{}/{table}.do?WSDL", self.instance_url())
    }

    /// Session timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Check that a page size is within `1..=MAX_PAGE_SIZE`
pub fn validate_page_size(page_size: usize) -> Result<()> {
    if (1..=MAX_PAGE_SIZE).contains(&page_size) {
        Ok(())
    } else {
        Err(Error::invalid_argument(
            "page_size",
            format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
        ))
    }
}

/// Builder for instance config
pub struct InstanceConfigBuilder {
    config: InstanceConfig,
}

impl InstanceConfigBuilder {
    /// Set basic credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    /// Set the base URL override
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the session timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Enable or disable the per-table WSDL cache
    pub fn cache_wsdl(mut self, enabled: bool) -> Self {
        self.config.cache_wsdl = enabled;
        self
    }

    /// Set the default page size
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Build the config
    pub fn build(self) -> InstanceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_instance_url() {
        let config = InstanceConfig::new("dev12345", "u", "p");
        assert_eq!(config.instance_url(), "https://dev12345.service-now.com");
        assert_eq!(
            config.wsdl_url("incident"),
            "https://dev12345.service-now.com/incident.do?WSDL"
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = InstanceConfig::builder("dev12345")
            .base_url("http://127.0.0.1:8080/")
            .build();
        assert_eq!(
            config.wsdl_url("cmdb_ci"),
            "http://127.0.0.1:8080/cmdb_ci.do?WSDL"
        );
    }

    #[test]
    fn test_builder() {
        let config = InstanceConfig::builder("acme")
            .credentials("admin", "secret")
            .timeout(Duration::from_secs(90))
            .user_agent("test-agent/1.0")
            .cache_wsdl(true)
            .page_size(100)
            .build();

        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert!(config.cache_wsdl);
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_from_yaml_defaults() {
        let config = InstanceConfig::from_yaml_str("instance: acme\nusername: bob\n").unwrap();
        assert_eq!(config.instance, "acme");
        assert_eq!(config.username, "bob");
        assert_eq!(config.password, "");
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert!(!config.cache_wsdl);
        assert!(config.timeout().is_none());
        assert!(config.user_agent.starts_with("snsoap/"));
    }

    #[test]
    fn test_from_yaml_rejects_bad_page_size() {
        let err = InstanceConfig::from_yaml_str("instance: acme\npage_size: 500\n").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_from_yaml_requires_instance() {
        let err = InstanceConfig::from_yaml_str("instance: ''\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "instance: acme\nusername: reader\npassword: pw\ntimeout_secs: 30\ncache_wsdl: true"
        )
        .unwrap();

        let config = InstanceConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.password, "pw");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.cache_wsdl);
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let err = InstanceConfig::from_yaml_file("/nonexistent/snsoap.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", InstanceConfig::new("acme", "bob", "hunter2"));
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_validate_page_size_bounds() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(MAX_PAGE_SIZE).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(MAX_PAGE_SIZE + 1).is_err());
    }
}
