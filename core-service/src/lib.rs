//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP transport,
//! secure storage) into the shared client core. Desktop apps typically enable
//! the `desktop-shims` feature (which pulls in `bridge-desktop` defaults);
//! mobile hosts inject platform-native adapters through the config builder.

use std::sync::Arc;

use core_api::{MarketApi, RequestEngine};
use core_runtime::config::CoreConfig;
use core_session::SessionStore;
use core_upload::UploadCoordinator;
use tracing::info;

pub use core_runtime::config::{CoreConfig as Config, CoreConfigBuilder};
pub use core_runtime::error::{Error, Result};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

/// Primary façade exposed to host applications.
///
/// Cheap to clone; all clones share the same session, engine, and transport.
///
/// ```ignore
/// use core_service::{Config, CoreService};
///
/// let config = Config::builder()
///     .api_base_url("https://api.example.com")
///     .build()?;
/// let core = CoreService::new(config);
///
/// let categories = core.api().list_categories().await?;
/// ```
#[derive(Clone)]
pub struct CoreService {
    session: SessionStore,
    engine: Arc<RequestEngine>,
    api: MarketApi,
    uploads: UploadCoordinator,
}

impl CoreService {
    /// Assemble the core from a validated configuration.
    pub fn new(config: CoreConfig) -> Self {
        let session = SessionStore::new(Arc::clone(&config.secure_store));
        let engine = Arc::new(
            RequestEngine::new(
                Arc::clone(&config.transport),
                session.clone(),
                &config.api_base_url,
            )
            .default_timeout(config.request_timeout)
            .default_retries(config.default_retries)
            .default_base_delay(config.retry_base_delay),
        );
        let api = MarketApi::new(Arc::clone(&engine));
        let uploads = UploadCoordinator::new(Arc::clone(&engine));

        info!(base_url = %config.api_base_url, "Core service assembled");

        Self {
            session,
            engine,
            api,
            uploads,
        }
    }

    /// The named API operations (auth, profile, catalog).
    pub fn api(&self) -> &MarketApi {
        &self.api
    }

    /// The upload coordinator for presigned transfers.
    pub fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    /// The session token store shared by every component.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The request engine, for callers composing their own descriptors.
    pub fn engine(&self) -> Arc<RequestEngine> {
        Arc::clone(&self.engine)
    }

    /// Whether a session token is currently cached in memory.
    pub fn is_signed_in(&self) -> bool {
        self.session.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse, HttpTransport};
    use bridge_traits::storage::SecureStore;

    struct NullTransport;

    #[async_trait]
    impl HttpTransport for NullTransport {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(bridge_traits::BridgeError::NotAvailable(
                "null transport".to_string(),
            ))
        }
    }

    struct NullStore;

    #[async_trait]
    impl SecureStore for NullStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_secret(&self, _key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(None)
        }
        async fn delete_secret(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn service() -> CoreService {
        let config = Config::builder()
            .api_base_url("https://api.example.com")
            .transport(Arc::new(NullTransport))
            .secure_store(Arc::new(NullStore))
            .build()
            .expect("config should build");
        CoreService::new(config)
    }

    #[tokio::test]
    async fn components_share_one_session() {
        let core = service();
        assert!(!core.is_signed_in());

        core.session().set("tok-1");
        assert!(core.is_signed_in());
        assert_eq!(
            core.api().engine().session().get(),
            Some("tok-1".to_string())
        );

        core.api().sign_out();
        assert!(!core.is_signed_in());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let core = service();
        let other = core.clone();

        core.session().set("tok-2");
        assert!(other.is_signed_in());
    }
}
