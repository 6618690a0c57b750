use serde::{Deserialize, Serialize};

use super::message::Message;
use super::timestamp::Timestamp;

/// Response body of `GET /api/messages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<Message>,
    // Sent by the server; the client tracks its own cursor.
    #[allow(dead_code)]
    #[serde(default)]
    pub oldest: Option<Timestamp>,
    #[serde(default)]
    pub login_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationBatch {
    #[serde(default)]
    pub notifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage<'a> {
    pub text: &'a str,
}
