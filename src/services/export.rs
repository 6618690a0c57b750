use crate::models::{Message, Timestamp};

pub fn export_to_markdown(messages: &[Message], login_at: Option<Timestamp>) -> String {
    let mut output = String::from("# Transcript\n\n");
    if let Some(login_at) = login_at {
        output.push_str(&format!(
            "> Session started: {}\n\n",
            login_at.as_datetime().format("%Y-%m-%d %H:%M")
        ));
    }
    output.push_str("---\n\n");

    for msg in messages {
        output.push_str(&format!(
            "### {} · {}\n\n{}\n\n",
            msg.role.display_name(),
            msg.timestamp.as_datetime().format("%Y-%m-%d %H:%M"),
            msg.text
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::testing::clock;

    #[test]
    fn test_export_lists_messages_in_order() {
        let messages = vec![
            Message::new(Role::User, "What is due?", clock("10:00")),
            Message::new(Role::Bot, "- Essay", clock("10:01")),
        ];
        let md = export_to_markdown(&messages, Some(clock("09:30")));
        assert!(md.starts_with("# Transcript"));
        assert!(md.contains("> Session started: 2025-03-01 09:30"));
        let you = md.find("### You · 2025-03-01 10:00").unwrap();
        let bot = md.find("### Scarlet · 2025-03-01 10:01").unwrap();
        assert!(you < bot);
        assert!(md.contains("- Essay"));
    }
}
