//! # Core Configuration Module
//!
//! Configuration for the marketplace client core, built with a fail-fast
//! builder: every required bridge must be present (or injectable via the
//! `desktop-shims` feature) before [`CoreConfig`] can be constructed.
//!
//! ## Required Dependencies
//!
//! - `api_base_url` - Origin of the marketplace API
//! - `SecureStore` - Session credential persistence
//!
//! ## Optional Dependencies (with desktop defaults)
//!
//! - `HttpTransport` - HTTP exchanges (desktop default: reqwest)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `HttpTransport` and `SecureStore` are injected automatically if not
//! provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.example.com")
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpTransport, SecureStore};
use std::sync::Arc;
use std::time::Duration;

/// Default per-call timeout for API requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of additional attempts after the first
pub const DEFAULT_RETRIES: u32 = 1;

/// Default base delay for the backoff schedule
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(300);

/// Core configuration for the marketplace client.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Origin of the marketplace API (e.g. `https://api.example.com`)
    pub api_base_url: String,

    /// Per-call timeout applied by the request engine unless a descriptor
    /// overrides it
    pub request_timeout: Duration,

    /// Default retry budget (additional attempts after the first)
    pub default_retries: u32,

    /// Base delay for the `base × (attempt + 1)` backoff schedule
    pub retry_base_delay: Duration,

    /// HTTP transport for API and upload exchanges
    pub transport: Arc<dyn HttpTransport>,

    /// Secure credential storage for the session token
    pub secure_store: Arc<dyn SecureStore>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("default_retries", &self.default_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("transport", &"HttpTransport { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`] with fail-fast validation.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    request_timeout: Option<Duration>,
    default_retries: Option<u32>,
    retry_base_delay: Option<Duration>,
    transport: Option<Arc<dyn HttpTransport>>,
    secure_store: Option<Arc<dyn SecureStore>>,
}

impl CoreConfigBuilder {
    /// Set the marketplace API origin. Required.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Override the default per-call timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Override the default retry budget.
    pub fn default_retries(mut self, retries: u32) -> Self {
        self.default_retries = Some(retries);
        self
    }

    /// Override the base backoff delay.
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    /// Provide a custom HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Provide a custom secure store.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `api_base_url` is missing or malformed,
    /// and [`Error::CapabilityMissing`] when a required bridge was neither
    /// provided nor injectable via `desktop-shims`.
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = self
            .api_base_url
            .ok_or_else(|| Error::Config("api_base_url is required".to_string()))?;

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "api_base_url must be an http(s) origin, got '{}'",
                api_base_url
            )));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Self::default_transport()?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => Self::default_secure_store()?,
        };

        Ok(CoreConfig {
            api_base_url,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            default_retries: self.default_retries.unwrap_or(DEFAULT_RETRIES),
            retry_base_delay: self.retry_base_delay.unwrap_or(DEFAULT_RETRY_BASE_DELAY),
            transport,
            secure_store,
        })
    }

    #[cfg(feature = "desktop-shims")]
    fn default_transport() -> Result<Arc<dyn HttpTransport>> {
        Ok(Arc::new(bridge_desktop::ReqwestTransport::new()))
    }

    #[cfg(not(feature = "desktop-shims"))]
    fn default_transport() -> Result<Arc<dyn HttpTransport>> {
        Err(Error::CapabilityMissing {
            capability: "HttpTransport".to_string(),
            message: "No HTTP transport provided. \
                      Desktop: enable the desktop-shims feature. \
                      Mobile: inject a platform-native adapter."
                .to_string(),
        })
    }

    #[cfg(feature = "desktop-shims")]
    fn default_secure_store() -> Result<Arc<dyn SecureStore>> {
        Ok(Arc::new(bridge_desktop::KeyringSecureStore::new()))
    }

    #[cfg(not(feature = "desktop-shims"))]
    fn default_secure_store() -> Result<Arc<dyn SecureStore>> {
        Err(Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "No secure store provided. \
                      Desktop: enable the desktop-shims feature. \
                      Mobile: inject a platform-native adapter."
                .to_string(),
        })
    }
}
