//! In-memory `MessageSource` used by protocol tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::TimeDelta;

use crate::api::{ApiError, MessageSource};
use crate::models::{Message, MessagePage, Role, Timestamp};

/// Serves queued page responses in order and records every request.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Result<MessagePage, ApiError>>>,
    notifications: Mutex<VecDeque<Result<Vec<String>, ApiError>>>,
    pub page_requests: Mutex<Vec<Option<Timestamp>>>,
    pub sent: Mutex<Vec<String>>,
    fail_sends: bool,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose `send_message` always fails with a network error.
    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn push_page(&self, page: Result<MessagePage, ApiError>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub fn push_notifications(&self, batch: Vec<String>) {
        self.notifications.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_notification_error(&self, error: ApiError) {
        self.notifications.lock().unwrap().push_back(Err(error));
    }

    pub fn request_count(&self) -> usize {
        self.page_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn fetch_page(&self, before: Option<Timestamp>) -> Result<MessagePage, ApiError> {
        self.page_requests.lock().unwrap().push(before);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(MessagePage::default()))
    }

    async fn send_message(&self, text: &str) -> Result<(), ApiError> {
        if self.fail_sends {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn fetch_notifications(&self) -> Result<Vec<String>, ApiError> {
        self.notifications
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// `2025-03-01` at the given `HH:MM`.
pub fn clock(hhmm: &str) -> Timestamp {
    format!("2025-03-01T{}:00", hhmm).parse().unwrap()
}

pub fn days_before(ts: Timestamp, days: i64) -> Timestamp {
    ts.minus(TimeDelta::days(days))
}

pub fn msg(role: Role, hhmm: &str) -> Message {
    Message::new(role, format!("{} at {}", role.display_name(), hhmm), clock(hhmm))
}

pub fn page(messages: Vec<Message>, login_at: Option<Timestamp>) -> MessagePage {
    MessagePage {
        oldest: messages.first().map(|m| m.timestamp),
        messages,
        login_at,
    }
}
