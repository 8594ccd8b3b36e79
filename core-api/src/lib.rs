//! # Marketplace API Core
//!
//! The network access core: request descriptors, the resilient request
//! engine, the classified error taxonomy, and the convenience API surface
//! over the marketplace backend.
//!
//! ## Layers
//!
//! - [`descriptor`] - immutable description of one logical call
//! - [`url`] - base normalization and final-URL assembly
//! - [`retry`] - status decision table and per-call backoff schedule
//! - [`engine`] - hydrate → authenticate → send → classify → retry
//! - [`endpoints`] - named operations (auth, profile, catalog)
//! - [`types`] - wire payload models
//!
//! ## Error taxonomy
//!
//! Every failure is a classified [`error::ApiError`]; the engine never
//! surfaces a bare transport error. Callers branch on the variant to decide
//! user-facing behavior.

pub mod descriptor;
pub mod endpoints;
pub mod engine;
pub mod error;
pub mod retry;
pub mod types;
pub mod url;

pub use descriptor::{IntoQueryValue, RequestBody, RequestDescriptor};
pub use endpoints::MarketApi;
pub use engine::RequestEngine;
pub use error::{ApiError, Result};
pub use types::{
    AccountRole, AuthSession, Category, NewAccount, ProviderSummary, ServiceFilter,
    ServiceListing, SocialProvider, UserProfile,
};
