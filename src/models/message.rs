use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Bot => "Scarlet",
        }
    }
}

/// One chat message as delivered by the server.
///
/// Two messages are equal when timestamp, role and text all match; this is
/// the identity used by the transcript merge to drop adjacent duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: Timestamp,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp,
        }
    }
}
