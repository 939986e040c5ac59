//! Pseudo-streaming of single-shot replies.
//!
//! Kept apart from event decoding so it can be switched off without
//! touching the streamed path.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub enabled: bool,
    pub delay: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Duration::from_millis(50),
        }
    }
}

impl PacingPolicy {
    pub fn new(delay: Duration) -> Self {
        Self {
            enabled: true,
            delay,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn segments<'t>(&self, text: &'t str) -> Vec<&'t str> {
        if text.is_empty() {
            return Vec::new();
        }

        if self.enabled {
            split_sentences(text)
        } else {
            vec![text]
        }
    }

    pub(crate) fn pause_between_segments(&self) -> Option<Duration> {
        (self.enabled && !self.delay.is_zero()).then_some(self.delay)
    }
}

/// Splits after `.`, `!` or `?` followed by whitespace; the whitespace stays
/// with the preceding segment so concatenation is lossless.
///
/// ```rust
/// use dchat::split_sentences;
///
/// let text = "Sales rose 3.5% this week! Want details?  Ask away.";
/// let segments = split_sentences(text);
///
/// assert_eq!(segments, ["Sales rose 3.5% this week! ", "Want details?  ", "Ask away."]);
/// assert_eq!(segments.concat(), text);
/// ```
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }

        let mut end = None;
        while let Some(&(index, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }

            chars.next();
            end = Some(index + next.len_utf8());
        }

        if let Some(end) = end {
            segments.push(&text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
}
