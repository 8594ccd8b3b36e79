//! # Session Token Lifecycle
//!
//! The in-memory session token cache, its durable mirror, and the
//! exactly-once hydration protocol that loads the persisted token at cold
//! start. The request engine in `core-api` calls
//! [`SessionStore::ensure_hydrated`] before every authenticated exchange.

pub mod store;

pub use store::SessionStore;
