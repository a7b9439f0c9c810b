//! Access token sourcing for calendar API calls.
//!
//! Token acquisition and refresh are owned by the account-management
//! surface; the sync pipeline only needs a valid bearer token per user.

use async_trait::async_trait;
use preppulse_domain::{PrepPulseError, Result};

/// Trait supplying a valid calendar access token for a user.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Return a bearer token valid for the user's calendar.
    async fn access_token(&self, user_id: &str) -> Result<String>;
}

/// Token source backed by a per-process environment variable.
///
/// Suitable for single-tenant deployments and local testing; multi-user
/// deployments plug in a store-backed implementation.
pub struct EnvTokenSource {
    var_name: String,
}

impl EnvTokenSource {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self { var_name: var_name.into() }
    }
}

impl Default for EnvTokenSource {
    fn default() -> Self {
        Self::new("PREPPULSE_CALENDAR_ACCESS_TOKEN")
    }
}

#[async_trait]
impl AccessTokenSource for EnvTokenSource {
    async fn access_token(&self, _user_id: &str) -> Result<String> {
        std::env::var(&self.var_name).map_err(|_| {
            PrepPulseError::Config(format!("calendar access token not set: {}", self.var_name))
        })
    }
}

/// Fixed-token source for tests.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self, _user_id: &str) -> Result<String> {
        Ok(self.token.clone())
    }
}
