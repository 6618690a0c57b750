use chrono::TimeDelta;

use crate::config::SEPARATOR_GAP_MS;
use crate::models::{Message, Role, Timestamp};
use crate::services::markdown::{flatten_blocks, parse_markdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    pub session_start: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub role: Role,
    pub align: Align,
    pub avatar: &'static str,
    pub time: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayItem {
    Separator(Separator),
    Bubble(Bubble),
}

/// Turn an ascending message list into display items.
///
/// Items come out in input order; nothing is sorted or filtered here. A
/// separator precedes the first message, any message at least an hour after
/// the one before it in `messages`, and the first message at or after
/// `login_at` whose predecessor in `messages` is before it.
pub fn render(messages: &[Message], login_at: Option<Timestamp>) -> Vec<DisplayItem> {
    let mut items = Vec::with_capacity(messages.len() * 2);
    let mut prev: Option<&Message> = None;

    for msg in messages {
        let session_start = crosses_login(prev, msg, login_at);
        let needs_separator = match prev {
            None => true,
            Some(p) => session_start || msg.timestamp.since(&p.timestamp) >= separator_gap(),
        };

        if needs_separator {
            items.push(DisplayItem::Separator(separator_for(msg.timestamp, session_start)));
        }
        items.push(DisplayItem::Bubble(bubble_for(msg)));
        prev = Some(msg);
    }

    items
}

fn separator_gap() -> TimeDelta {
    TimeDelta::milliseconds(SEPARATOR_GAP_MS)
}

fn crosses_login(prev: Option<&Message>, cur: &Message, login_at: Option<Timestamp>) -> bool {
    match (prev, login_at) {
        (Some(p), Some(login)) => p.timestamp < login && cur.timestamp >= login,
        _ => false,
    }
}

fn separator_for(at: Timestamp, session_start: bool) -> Separator {
    let when = at.as_datetime().format("%b %-d, %Y %H:%M").to_string();
    let label = if session_start {
        format!("New session · {}", when)
    } else {
        when
    };
    Separator {
        session_start,
        label,
    }
}

fn bubble_for(msg: &Message) -> Bubble {
    let (align, avatar) = match msg.role {
        Role::User => (Align::Right, "🙂"),
        Role::Bot => (Align::Left, "🤖"),
    };
    Bubble {
        role: msg.role,
        align,
        avatar,
        time: msg.timestamp.as_datetime().format("%H:%M").to_string(),
        lines: flatten_blocks(&parse_markdown(&msg.text)),
    }
}
