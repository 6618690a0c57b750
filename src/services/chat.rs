use crate::api::MessageSource;

/// Result of handing a message to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    Delivered,
    /// The text is handed back so the user can resend it.
    Failed { draft: String, error: String },
}

/// Trim user input; `None` when there is nothing to send.
pub fn prepare_outgoing(input: &str) -> Option<String> {
    let text = input.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Post one message. The reply is not returned here; callers pick it up with
/// a fresh newest-page fetch.
pub async fn deliver(source: &dyn MessageSource, text: String) -> SendResult {
    match source.send_message(&text).await {
        Ok(()) => {
            tracing::debug!(len = text.len(), "Message delivered");
            SendResult::Delivered
        }
        Err(e) => {
            tracing::error!("Failed to send message: {}", e);
            SendResult::Failed {
                draft: text,
                error: e.to_string(),
            }
        }
    }
}
