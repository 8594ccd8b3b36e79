//! Secure Credential Storage Abstraction
//!
//! Platform-agnostic trait for persisting the session credential across
//! process restarts:
//! - macOS/iOS: Keychain
//! - Android: Keystore (hardware-backed when available)
//! - Windows: DPAPI
//! - Linux: Secret Service / libsecret
//!
//! # Security Requirements
//!
//! Implementations MUST:
//! - Encrypt data at rest using platform-provided secure storage
//! - Never log or expose secret values
//!
//! Durable storage is assumed local and fast; no retries or timeouts are
//! layered on top of it.

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn remember_session(store: &dyn SecureStore, token: &str) -> Result<()> {
///     store.set_secret("session_token", token.as_bytes()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, overwriting any previous value for the key.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret. Idempotent: succeeds when the key is already absent.
    async fn delete_secret(&self, key: &str) -> Result<()>;
}
