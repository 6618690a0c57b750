use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::database::Database;
use crate::config::{DEFAULT_BUBBLE_WIDTH, DEFAULT_POLL_SECS, DEFAULT_SERVER_URL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub server_url: String,
    #[serde(default)]
    pub last_username: Option<String>,
    pub bubble_width: u16,
    pub poll_secs: u64,
    pub show_avatars: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            last_username: None,
            bubble_width: DEFAULT_BUBBLE_WIDTH,
            poll_secs: DEFAULT_POLL_SECS,
            show_avatars: true,
        }
    }
}

pub struct SettingsService;

impl SettingsService {
    pub async fn load(db: &Database) -> ClientSettings {
        match db.get_setting("client_settings").await {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable settings: {}", e);
                ClientSettings::default()
            }),
            Ok(None) => ClientSettings::default(),
            Err(e) => {
                tracing::warn!("Failed to load settings: {}", e);
                ClientSettings::default()
            }
        }
    }

    pub async fn save(db: &Database, settings: &ClientSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        db.set_setting("client_settings", &json).await
    }
}
