use crate::models::Message;

/// Merge two ascending transcripts into one ascending transcript.
///
/// Both inputs must already be sorted by timestamp. On equal timestamps the
/// element from `a` is emitted first. A message identical to the one emitted
/// right before it is dropped; duplicates that are not adjacent in the output
/// are kept.
pub fn merge_chronologically(a: &[Message], b: &[Message]) -> Vec<Message> {
    let mut out: Vec<Message> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].timestamp <= b[j].timestamp {
            push_unless_repeat(&mut out, &a[i]);
            i += 1;
        } else {
            push_unless_repeat(&mut out, &b[j]);
            j += 1;
        }
    }
    for msg in &a[i..] {
        push_unless_repeat(&mut out, msg);
    }
    for msg in &b[j..] {
        push_unless_repeat(&mut out, msg);
    }

    out
}

fn push_unless_repeat(out: &mut Vec<Message>, msg: &Message) {
    if out.last() != Some(msg) {
        out.push(msg.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Timestamp};

    fn at(secs: i64, role: Role, text: &str) -> Message {
        let base: Timestamp = "2025-03-01T00:00:00".parse().unwrap();
        let ts = Timestamp::from_datetime(base.as_datetime() + chrono::TimeDelta::seconds(secs));
        Message::new(role, text, ts)
    }

    fn seconds(list: &[Message]) -> Vec<i64> {
        let base: Timestamp = "2025-03-01T00:00:00".parse().unwrap();
        list.iter()
            .map(|m| m.timestamp.since(&base).num_seconds())
            .collect()
    }

    #[test]
    fn test_adjacent_duplicate_across_inputs_is_dropped() {
        let a = vec![at(1, Role::User, "x"), at(2, Role::Bot, "y")];
        let b = vec![at(2, Role::Bot, "y")];
        let merged = merge_chronologically(&a, &b);
        assert_eq!(seconds(&merged), vec![1, 2]);
    }

    #[test]
    fn test_interleaves_in_ascending_order() {
        let a = vec![at(1, Role::User, "a1"), at(4, Role::User, "a4"), at(9, Role::User, "a9")];
        let b = vec![at(2, Role::Bot, "b2"), at(3, Role::Bot, "b3"), at(10, Role::Bot, "b10")];
        let merged = merge_chronologically(&a, &b);
        assert_eq!(seconds(&merged), vec![1, 2, 3, 4, 9, 10]);
        assert!(merged.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_tie_prefers_left_input() {
        let a = vec![at(5, Role::User, "from a")];
        let b = vec![at(5, Role::Bot, "from b")];
        let merged = merge_chronologically(&a, &b);
        assert_eq!(merged[0].text, "from a");
        assert_eq!(merged[1].text, "from b");
    }

    #[test]
    fn test_same_time_different_text_is_kept() {
        let a = vec![at(5, Role::Bot, "one")];
        let b = vec![at(5, Role::Bot, "two")];
        assert_eq!(merge_chronologically(&a, &b).len(), 2);
    }

    #[test]
    fn test_overlapping_pages_collapse() {
        let page = vec![at(1, Role::User, "q"), at(2, Role::Bot, "r"), at(3, Role::User, "s")];
        let merged = merge_chronologically(&page, &page);
        assert_eq!(merged, page);
    }

    #[test]
    fn test_non_adjacent_duplicates_survive() {
        // Two messages share a timestamp, so the copies of "a" end up apart.
        let a = vec![at(5, Role::User, "a"), at(5, Role::Bot, "b")];
        let b = vec![at(5, Role::User, "a")];
        let merged = merge_chronologically(&a, &b);
        let texts: Vec<&str> = merged.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_empty_inputs() {
        let a = vec![at(1, Role::User, "only")];
        assert_eq!(merge_chronologically(&a, &[]), a);
        assert_eq!(merge_chronologically(&[], &a), a);
        assert!(merge_chronologically(&[], &[]).is_empty());
    }
}
