//! Convenience API Surface
//!
//! Named operations over the request engine with fixed methods and paths.
//! No retry, backoff, or validation logic lives here beyond minimal input
//! shaping (e-mail trimming and lower-casing); resilience belongs to the
//! engine.
//!
//! Successful authentication stores the returned session token as a side
//! effect, so the session is live without an extra step by the caller.

use crate::descriptor::RequestDescriptor;
use crate::engine::RequestEngine;
use crate::error::Result;
use crate::types::{
    AuthSession, Category, NewAccount, ServiceFilter, ServiceListing, SocialProvider, UserProfile,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// High-level marketplace API client.
#[derive(Clone)]
pub struct MarketApi {
    engine: Arc<RequestEngine>,
}

impl MarketApi {
    pub fn new(engine: Arc<RequestEngine>) -> Self {
        Self { engine }
    }

    /// The underlying engine, for callers composing their own descriptors.
    pub fn engine(&self) -> &RequestEngine {
        &self.engine
    }

    /// Sign in with e-mail and password.
    ///
    /// The e-mail is trimmed and lower-cased before sending. A token in the
    /// response is written into the session store.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let descriptor = RequestDescriptor::post("/auth/login")
            .json(json!({
                "email": normalize_email(email),
                "password": password,
            }))
            .tag("auth.sign_in");

        let session: AuthSession = self.engine.execute_as(&descriptor).await?;
        self.adopt_token(&session);
        Ok(session)
    }

    /// Create an account. On success the returned token (if any) is adopted
    /// the same way as [`MarketApi::sign_in`].
    pub async fn register(&self, account: &NewAccount) -> Result<AuthSession> {
        let descriptor = RequestDescriptor::post("/auth/register")
            .json(json!({
                "name": account.name,
                "email": normalize_email(&account.email),
                "password": account.password,
                "role": account.role,
            }))
            .tag("auth.register");

        let session: AuthSession = self.engine.execute_as(&descriptor).await?;
        self.adopt_token(&session);
        Ok(session)
    }

    /// Exchange a social identity provider token for a session.
    pub async fn social_sign_in(
        &self,
        provider: SocialProvider,
        access_token: &str,
    ) -> Result<AuthSession> {
        let descriptor = RequestDescriptor::post("/auth/social")
            .json(json!({
                "provider": provider,
                "accessToken": access_token,
            }))
            .tag("auth.social");

        let session: AuthSession = self.engine.execute_as(&descriptor).await?;
        self.adopt_token(&session);
        Ok(session)
    }

    /// Ask the backend to send a password-reset message.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let descriptor = RequestDescriptor::post("/auth/forgot-password")
            .json(json!({ "email": normalize_email(email) }))
            .tag("auth.forgot_password");

        self.engine.execute(&descriptor).await?;
        Ok(())
    }

    /// Complete a password reset with the token from the reset message.
    pub async fn confirm_password_reset(&self, reset_token: &str, new_password: &str) -> Result<()> {
        let descriptor = RequestDescriptor::post("/auth/reset-password")
            .json(json!({
                "token": reset_token,
                "password": new_password,
            }))
            .tag("auth.reset_password");

        self.engine.execute(&descriptor).await?;
        Ok(())
    }

    /// Fetch the signed-in user's profile.
    ///
    /// A 401 means the cached token is no longer valid; the session is
    /// cleared before the error propagates.
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        let descriptor = RequestDescriptor::get("/users/me").tag("users.me");

        match self.engine.execute_as(&descriptor).await {
            Ok(profile) => Ok(profile),
            Err(e) if e.is_unauthenticated() => {
                info!("Session token rejected; clearing session");
                self.engine.session().clear();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Forget the session locally.
    pub fn sign_out(&self) {
        self.engine.session().clear();
    }

    /// List service categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let descriptor = RequestDescriptor::get("/categories").tag("categories.list");
        self.engine.execute_as(&descriptor).await
    }

    /// List services matching a filter.
    pub async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<ServiceListing>> {
        let descriptor = RequestDescriptor::get("/services")
            .query("category", filter.category_id)
            .query("search", filter.search.clone())
            .query("page", filter.page)
            .query("perPage", filter.per_page)
            .tag("services.list");

        self.engine.execute_as(&descriptor).await
    }

    /// List the featured services for the home screen.
    pub async fn list_featured(&self) -> Result<Vec<ServiceListing>> {
        let descriptor = RequestDescriptor::get("/services/featured").tag("services.featured");
        self.engine.execute_as(&descriptor).await
    }

    fn adopt_token(&self, session: &AuthSession) {
        if let Some(token) = &session.token {
            self.engine.session().set(token.clone());
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
