use crate::config::{APP_NAME, PULLS_TO_UNLOCK};
use crate::services::render::DisplayItem;
use crate::services::unlock::UnlockState;
use crate::services::TranscriptView;
use crate::ui::message_widget::{bubble_lines, separator_line};

#[derive(Debug, Clone, Copy)]
pub struct DrawOptions {
    pub width: usize,
    pub show_avatars: bool,
}

/// Lay out a full frame: status line, then the transcript.
pub fn draw(view: &TranscriptView, opts: &DrawOptions) -> String {
    let mut out = String::new();
    out.push_str(&status_line(view));
    out.push('\n');

    if view.items.is_empty() {
        out.push_str("\n  No messages yet. Say hello!\n");
        return out;
    }

    for item in &view.items {
        match item {
            DisplayItem::Separator(sep) => {
                out.push('\n');
                out.push_str(&separator_line(sep, opts.width));
                out.push('\n');
            }
            DisplayItem::Bubble(bubble) => {
                for line in bubble_lines(bubble, opts.width, opts.show_avatars) {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
    }
    out
}

pub fn status_line(view: &TranscriptView) -> String {
    let history = match view.unlock {
        UnlockState::Locked => {
            format!("recent messages · /top {}x for full history", PULLS_TO_UNLOCK)
        }
        UnlockState::Unlocking { pulls } => {
            format!("unlocking history {}/{} · /top again", pulls, PULLS_TO_UNLOCK)
        }
        UnlockState::Unlocked if view.reached_end => "full history · start reached".to_string(),
        UnlockState::Unlocked => "full history · /top for older".to_string(),
    };
    let loading = if view.loading { " · loading…" } else { "" };
    format!("[{}] {}{}", APP_NAME, history, loading)
}

pub fn intro_banner() -> String {
    format!(
        "Welcome to {}.\n\
         Type a message and press Enter to send it.\n\
         Commands: /top (scroll to top), /retry, /reload, /export <file>, /quit\n",
        APP_NAME
    )
}
