//! Port interfaces for notification channel providers.
//!
//! Each provider is a narrow boundary returning a fixed result shape: a
//! provider message id on success or a domain error. Provider-specific
//! response parsing never leaks past these traits.

use async_trait::async_trait;
use preppulse_domain::Result;

use super::message::{ChatMessage, EmailMessage};

/// Trait for the chat-app direct message channel.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Whether credentials for this provider are configured.
    fn is_configured(&self) -> bool;

    /// Post a structured message to the user's DM channel.
    ///
    /// Implementations must report application-level failure distinctly: a
    /// 200-status transport response can still carry a logical error.
    async fn post_message(&self, user_id: &str, message: &ChatMessage) -> Result<String>;
}

/// Trait for the SMS channel.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Whether credentials for this provider are configured.
    fn is_configured(&self) -> bool;

    /// Send a plain-text message, returning the provider message id.
    async fn send(&self, to_number: &str, body: &str) -> Result<String>;
}

/// Trait for the email channel.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Whether credentials for this provider are configured.
    fn is_configured(&self) -> bool;

    /// Send a subject + HTML + plain-text email, returning the provider
    /// message id.
    async fn send(&self, to_address: &str, message: &EmailMessage) -> Result<String>;
}
