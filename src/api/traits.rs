use async_trait::async_trait;

use super::types::ApiError;
use crate::models::{MessagePage, Timestamp};

/// The server side of the transcript protocol.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Newest page when `before` is `None`, otherwise the page strictly older than it.
    async fn fetch_page(&self, before: Option<Timestamp>) -> Result<MessagePage, ApiError>;

    async fn send_message(&self, text: &str) -> Result<(), ApiError>;

    /// Drains pending notifications.
    async fn fetch_notifications(&self) -> Result<Vec<String>, ApiError>;

    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError>;
}
