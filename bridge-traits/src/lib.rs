//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the marketplace client core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (desktop, iOS, Android).
//!
//! ## Traits
//!
//! - [`HttpTransport`](http::HttpTransport) - A single HTTP exchange; no retry, no auth
//! - [`SecureStore`](storage::SecureStore) - Session credential persistence (Keychain/Keystore)
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Transport implementations must map "no response obtained" failures to
//! [`BridgeError::Timeout`] or [`BridgeError::Connection`] so the request
//! engine can classify them for its retry schedule.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use storage::SecureStore;
