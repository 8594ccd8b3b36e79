//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack for the client core:
//! - Pretty, JSON, or compact output formats
//! - Module-level filtering via `RUST_LOG` / explicit directives
//! - Safe to call once per process; later calls are rejected
//!
//! Secret values (session tokens, passwords) are never emitted as tracing
//! fields anywhere in the core; redaction is enforced at call sites rather
//! than in a subscriber layer.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(LoggingConfig::default().with_format(LogFormat::Compact))
//!     .expect("Failed to initialize logging");
//!
//! tracing::info!("client core started");
//! ```

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{filter::EnvFilter, fmt, util::SubscriberInitExt};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directives; falls back to `RUST_LOG`, then this default
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_directive: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns [`Error::Internal`] if logging was already initialized or a global
/// subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(Error::Internal(
            "logging already initialized".to_string(),
        ));
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive.clone()));

    let result = match config.format {
        LogFormat::Pretty => fmt()
            .pretty()
            .with_env_filter(filter)
            .finish()
            .try_init(),
        LogFormat::Json => fmt().json().with_env_filter(filter).finish().try_init(),
        LogFormat::Compact => fmt()
            .compact()
            .with_env_filter(filter)
            .finish()
            .try_init(),
    };

    result.map_err(|e| Error::Internal(format!("failed to set subscriber: {}", e)))
}
