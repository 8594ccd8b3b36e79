//! Domain payload models for the marketplace API.
//!
//! Wire shapes use camelCase field names; everything optional on the server
//! side is optional (or defaulted) here so a partial payload never fails a
//! whole listing screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Client,
    Provider,
}

/// The signed-in user's profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: AccountRole,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Authentication response: session token plus the authenticated profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    #[serde(default)]
    pub token: Option<String>,
    pub user: UserProfile,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: AccountRole,
}

/// Identity provider for social sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Apple,
    Facebook,
}

/// Service category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Condensed provider info embedded in listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

/// A service offered on the marketplace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub provider: Option<ProviderSummary>,
}

/// Query filter for service listings.
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ServiceFilter {
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_profile_deserializes_camel_case() {
        let profile: UserProfile = serde_json::from_str(
            r#"{
                "id": 7,
                "name": "Dana",
                "email": "dana@example.com",
                "role": "provider",
                "avatarUrl": "https://cdn.example.com/u/7.jpg",
                "createdAt": "2026-01-15T10:30:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(profile.id, 7);
        assert_eq!(profile.role, AccountRole::Provider);
        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://cdn.example.com/u/7.jpg")
        );
        assert!(profile.created_at.is_some());
        assert_eq!(profile.phone, None);
    }

    #[test]
    fn auth_session_token_is_optional() {
        let session: AuthSession = serde_json::from_str(
            r#"{"user": {"id": 1, "name": "A", "email": "a@b.c", "role": "client"}}"#,
        )
        .unwrap();

        assert!(session.token.is_none());
        assert_eq!(session.user.role, AccountRole::Client);
    }

    #[test]
    fn service_listing_tolerates_sparse_payloads() {
        let listing: ServiceListing =
            serde_json::from_str(r#"{"id": 3, "title": "Lawn mowing"}"#).unwrap();

        assert_eq!(listing.id, 3);
        assert!(listing.images.is_empty());
        assert!(!listing.featured);
        assert!(listing.provider.is_none());
    }
}
