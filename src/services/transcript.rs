use std::time::Instant;

use chrono::TimeDelta;

use crate::api::{ApiError, MessageSource};
use crate::config::LOGIN_GRACE_MS;
use crate::models::{Message, MessagePage, Role, Timestamp};
use crate::services::merge::merge_chronologically;
use crate::services::render::{render, DisplayItem};
use crate::services::unlock::{PullAction, PullToUnlock, UnlockState};

/// Handle for one issued page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    before: Option<Timestamp>,
}

impl FetchTicket {
    pub fn before(&self) -> Option<Timestamp> {
        self.before
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub count: usize,
}

/// Everything the front end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct TranscriptView {
    pub items: Vec<DisplayItem>,
    pub unlock: UnlockState,
    pub loading: bool,
    pub reached_end: bool,
}

/// Client-side state of one chat transcript.
///
/// Owns both transcript windows, the cursor, the login marker and the
/// pull-to-unlock controller. At most one page request is in flight; a
/// request attempted while another is pending is dropped. Every issued
/// request gets a sequence number and only the latest one is applied.
#[derive(Debug)]
pub struct TranscriptSession {
    newest_batch: Vec<Message>,
    all_messages: Vec<Message>,
    oldest: Option<Timestamp>,
    login_at: Option<Timestamp>,
    reached_end: bool,
    loading: bool,
    issued_seq: u64,
    unlock: PullToUnlock,
}

impl Default for TranscriptSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSession {
    pub fn new() -> Self {
        Self {
            newest_batch: Vec::new(),
            all_messages: Vec::new(),
            oldest: None,
            login_at: None,
            reached_end: false,
            loading: false,
            issued_seq: 0,
            unlock: PullToUnlock::new(),
        }
    }

    /// Drop all loaded state. A request still in flight becomes stale.
    pub fn reset(&mut self) {
        let issued_seq = self.issued_seq + 1;
        *self = Self::new();
        self.issued_seq = issued_seq;
    }

    pub fn displayed(&self) -> &[Message] {
        if self.unlock.is_unlocked() {
            &self.all_messages
        } else {
            &self.newest_batch
        }
    }

    #[cfg(test)]
    pub fn oldest(&self) -> Option<Timestamp> {
        self.oldest
    }

    pub fn login_at(&self) -> Option<Timestamp> {
        self.login_at
    }

    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn unlock_state(&self) -> UnlockState {
        self.unlock.state()
    }

    pub fn view(&self) -> TranscriptView {
        TranscriptView {
            items: render(self.displayed(), self.login_at),
            unlock: self.unlock_state(),
            loading: self.is_loading(),
            reached_end: self.reached_end(),
        }
    }

    /// Reserve the single request slot, or `None` when the fetch must be skipped.
    pub fn begin_fetch(&mut self, before: Option<Timestamp>) -> Option<FetchTicket> {
        if self.loading {
            tracing::debug!("Fetch skipped: another page is loading");
            return None;
        }
        if before.is_some() && self.reached_end {
            tracing::debug!("Fetch skipped: start of history reached");
            return None;
        }
        self.loading = true;
        self.issued_seq += 1;
        Some(FetchTicket {
            seq: self.issued_seq,
            before,
        })
    }

    /// Apply the result of the request identified by `ticket`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<MessagePage, ApiError>,
    ) -> FetchOutcome {
        if ticket.seq != self.issued_seq {
            tracing::debug!(seq = ticket.seq, latest = self.issued_seq, "Discarding stale page");
            return FetchOutcome::default();
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch messages: {}", e);
                return FetchOutcome::default();
            }
        };

        if self.login_at.is_none() {
            self.login_at = page.login_at;
        }

        let mut messages = page.messages;
        let unlocked = self.unlock.is_unlocked();

        if ticket.before.is_none() && !unlocked {
            if let Some(login_at) = self.login_at {
                let cutoff = login_at.minus(TimeDelta::milliseconds(LOGIN_GRACE_MS));
                messages.retain(|m| m.timestamp >= cutoff);
            }
        }

        if ticket.before.is_some() && messages.is_empty() {
            tracing::info!("Reached the start of the conversation history");
            self.reached_end = true;
            self.unlock.mark_exhausted();
            return FetchOutcome::default();
        }

        let count = messages.len();
        self.advance_cursor(&messages);
        let window = if unlocked {
            &mut self.all_messages
        } else {
            &mut self.newest_batch
        };
        let merged = if ticket.before.is_some() {
            merge_chronologically(&messages, window)
        } else {
            merge_chronologically(window, &messages)
        };
        *window = merged;

        tracing::debug!(count, before = ?ticket.before, oldest = ?self.oldest, "Page merged");

        FetchOutcome { count }
    }

    /// Issue one page request against `source` and apply the result.
    pub async fn fetch_batch(
        &mut self,
        source: &dyn MessageSource,
        before: Option<Timestamp>,
    ) -> FetchOutcome {
        let Some(ticket) = self.begin_fetch(before) else {
            return FetchOutcome::default();
        };
        let result = source.fetch_page(ticket.before).await;
        self.complete_fetch(ticket, result)
    }

    /// The transcript was scrolled to its top edge.
    ///
    /// Returns the page request to issue, if the pull unlocked history or
    /// asked for an older page.
    pub fn on_top_reached(&mut self, now: Instant) -> Option<FetchTicket> {
        match self.unlock.on_top_reached(now) {
            PullAction::Unlock => {
                self.all_messages = self.newest_batch.clone();
                self.begin_fetch(self.oldest)
            }
            PullAction::LoadOlder => self.begin_fetch(self.oldest),
            PullAction::Counted | PullAction::Ignored => None,
        }
    }

    /// Show polled notifications as bot messages received at `received_at`.
    pub fn push_notifications(&mut self, texts: Vec<String>, received_at: Timestamp) -> usize {
        let synthetic: Vec<Message> = texts
            .into_iter()
            .map(|text| Message::new(Role::Bot, text, received_at))
            .collect();
        let count = synthetic.len();
        if count == 0 {
            return 0;
        }

        let window = if self.unlock.is_unlocked() {
            &mut self.all_messages
        } else {
            &mut self.newest_batch
        };
        let merged = merge_chronologically(window, &synthetic);
        *window = merged;
        count
    }

    /// Move the cursor back to the earliest message of a server page.
    /// Locally stamped notifications never move it.
    fn advance_cursor(&mut self, page: &[Message]) {
        if self.reached_end {
            return;
        }
        if let Some(earliest) = page.iter().map(|m| m.timestamp).min() {
            self.oldest = Some(match self.oldest {
                Some(current) => current.min(earliest),
                None => earliest,
            });
        }
    }
}
