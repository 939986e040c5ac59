//! Small helpers for consuming chat event streams.

use futures_util::StreamExt;

use crate::{ChatEvent, ChatEventStream, ClassifiedError, TurnSummary};

/// Text a plain-text UI would append for this event, if any.
///
/// ```rust
/// use daisy::{ChatEvent, render_plain};
///
/// assert_eq!(render_plain(&ChatEvent::Fragment("Hi".into())).as_deref(), Some("Hi"));
/// assert_eq!(
///     render_plain(&ChatEvent::ToolCall { name: "chart_lookup".into() }).as_deref(),
///     Some("\n[Consulting chart_lookup...]\n")
/// );
/// ```
pub fn render_plain(event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::Fragment(text) => Some(text.clone()),
        ChatEvent::TurnComplete(_) => None,
        marker => marker.inline_marker(),
    }
}

/// Drives a turn to completion and returns its summary.
pub async fn collect_turn(mut stream: ChatEventStream<'_>) -> Result<TurnSummary, ClassifiedError> {
    while let Some(event) = stream.next().await {
        if let ChatEvent::TurnComplete(summary) = event? {
            return Ok(summary);
        }
    }

    Err(ClassifiedError::internal())
}
