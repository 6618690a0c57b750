use textwrap::core::display_width;

use crate::services::render::{Align, Bubble, Separator};

/// Text lines for one message bubble, laid out inside `width` columns.
pub fn bubble_lines(bubble: &Bubble, width: usize, show_avatar: bool) -> Vec<String> {
    let body_width = (width * 3 / 4).max(16);
    let header = if show_avatar {
        format!("{} {} · {}", bubble.avatar, bubble.role.display_name(), bubble.time)
    } else {
        format!("{} · {}", bubble.role.display_name(), bubble.time)
    };

    let mut lines = vec![header];
    for line in &bubble.lines {
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }
        for wrapped in textwrap::wrap(line, body_width) {
            lines.push(format!("  {}", wrapped));
        }
    }

    match bubble.align {
        Align::Left => lines,
        Align::Right => lines
            .into_iter()
            .map(|line| pad_left(&line, width))
            .collect(),
    }
}

/// A centered rule carrying the separator label. Session boundaries get a
/// double rule.
pub fn separator_line(separator: &Separator, width: usize) -> String {
    let rule = if separator.session_start { "═" } else { "─" };
    let label = format!(" {} ", separator.label);
    let fill = width.saturating_sub(display_width(&label));
    let left = fill / 2;
    format!("{}{}{}", rule.repeat(left), label, rule.repeat(fill - left))
}

fn pad_left(line: &str, width: usize) -> String {
    let used = display_width(line);
    if used >= width {
        return line.to_string();
    }
    format!("{}{}", " ".repeat(width - used), line)
}
