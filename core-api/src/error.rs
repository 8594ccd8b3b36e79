//! Classified API errors.
//!
//! Every failure path out of the request engine and the upload coordinator
//! ends in one of these variants. The classification tag decides retry and
//! propagation behavior; callers decide user-facing behavior.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server returned HTML (or another non-JSON payload) where JSON was
    /// expected: a misconfigured base URL, proxy error page, or down service.
    /// Never retried.
    #[error("Expected JSON but got {content_type} (status {status}): {snippet}")]
    ProtocolViolation {
        status: u16,
        content_type: String,
        snippet: String,
    },

    /// No HTTP response was obtained and the failure was not the timeout
    /// signal. Retried on the server-error schedule.
    #[error("Network error: {message}")]
    Transport { message: String },

    /// The call's cancellation signal fired before any response arrived.
    /// Retried on the server-error schedule.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// 429 after the retry budget was exhausted.
    #[error("Rate limited: {message}")]
    RateLimited { message: String, raw: Option<Value> },

    /// 5xx after the retry budget was exhausted.
    #[error("Server error {status}: {message}")]
    ServerError {
        status: u16,
        message: String,
        raw: Option<Value>,
    },

    /// Any other non-2xx status. Terminal on the first occurrence.
    #[error("Request failed ({status}): {message}")]
    ClientError {
        status: u16,
        message: String,
        raw: Option<Value>,
    },

    /// Local payload exceeds the upload ticket's byte limit. Raised before
    /// any transfer is attempted.
    #[error("Payload of {actual_bytes} bytes exceeds the {max_bytes}-byte upload limit")]
    SizeLimit { max_bytes: u64, actual_bytes: u64 },

    /// The direct-to-storage transfer was rejected. Not retried here;
    /// tickets are single-use.
    #[error("Upload transfer failed ({status}): {message}")]
    TransferFailure { status: u16, message: String },

    /// Request body encoding or typed response decoding failed.
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl ApiError {
    /// HTTP status carried by this error, absent for pure transport and
    /// timeout failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ProtocolViolation { status, .. }
            | Self::ServerError { status, .. }
            | Self::ClientError { status, .. }
            | Self::TransferFailure { status, .. } => Some(*status),
            // Definitionally 429; the variant carries no status field.
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Whether the session credential was rejected (HTTP 401).
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::ClientError { status: 401, .. })
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
