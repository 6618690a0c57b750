use std::time::Duration;

pub const APP_ID: &str = "scarlet";
pub const APP_NAME: &str = "ScarletAgent";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_BUBBLE_WIDTH: u16 = 72;
pub const DEFAULT_POLL_SECS: u64 = 3;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Consecutive messages further apart than this get a timestamp separator.
pub const SEPARATOR_GAP_MS: i64 = 60 * 60 * 1000;

/// Before unlock, the newest page hides messages older than `login_at` minus this.
pub const LOGIN_GRACE_MS: i64 = 24 * 60 * 60 * 1000;

/// Minimum spacing between two top-edge pulls for both to count.
pub const PULL_COOLDOWN: Duration = Duration::from_millis(450);
pub const PULLS_TO_UNLOCK: u8 = 2;
