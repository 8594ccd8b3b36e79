//! # Core Runtime
//!
//! Shared runtime plumbing for the marketplace client core: configuration
//! with fail-fast bridge validation, and the tracing/logging bootstrap.
//!
//! Host applications build a [`config::CoreConfig`] once at startup and hand
//! it to `core-service`, which wires the session store, request engine, API
//! surface, and upload coordinator together.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
