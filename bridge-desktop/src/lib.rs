//! # Desktop Bridge Implementations
//!
//! Desktop-ready adapters for the bridge traits:
//!
//! - [`ReqwestTransport`] - HTTP transport backed by reqwest
//! - [`KeyringSecureStore`] - credential persistence backed by the OS keychain
//!   (behind the `secure-store` feature, on by default)
//!
//! Mobile hosts ship their own adapters; this crate exists so desktop builds
//! and integration tests work out of the box.

pub mod http;

#[cfg(feature = "secure-store")]
pub mod secure_store;

pub use http::ReqwestTransport;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
