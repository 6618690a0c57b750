pub mod chat;
pub mod database;
pub mod export;
pub mod markdown;
pub mod merge;
pub mod notifications;
pub mod render;
pub mod settings;
pub mod transcript;
pub mod unlock;

#[cfg(test)]
pub mod testing;

pub use database::Database;
pub use settings::{ClientSettings, SettingsService};
pub use transcript::{FetchOutcome, FetchTicket, TranscriptSession, TranscriptView};
