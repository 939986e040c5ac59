//! Events yielded to callers while a turn is in flight.

use std::pin::Pin;

use dcommon::SessionId;
use dprovider::ResponseMetadata;
use futures_core::Stream;

use crate::ClassifiedError;

#[derive(Debug, Clone, PartialEq)]
pub struct TurnSummary {
    pub session_id: SessionId,
    /// Concatenated fragments, exactly as committed to history.
    pub text: String,
    pub tool_calls: Vec<String>,
    pub specialists: Vec<String>,
    pub metadata: Option<ResponseMetadata>,
}

impl TurnSummary {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            text: String::new(),
            tool_calls: Vec::new(),
            specialists: Vec::new(),
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Fragment(String),
    ToolCall { name: String },
    Specialist { name: String },
    TurnComplete(TurnSummary),
}

impl ChatEvent {
    /// Plain-text rendering of marker events for text-only UIs.
    ///
    /// ```rust
    /// use dchat::ChatEvent;
    ///
    /// let marker = ChatEvent::Specialist { name: "Neo4j Knowledge Graph".into() };
    /// assert_eq!(
    ///     marker.inline_marker().as_deref(),
    ///     Some("\n[Neo4j Knowledge Graph specialist activated]\n")
    /// );
    /// assert!(ChatEvent::Fragment("hi".into()).inline_marker().is_none());
    /// ```
    pub fn inline_marker(&self) -> Option<String> {
        match self {
            Self::ToolCall { name } => Some(format!("\n[Consulting {name}...]\n")),
            Self::Specialist { name } => Some(format!("\n[{name} specialist activated]\n")),
            Self::Fragment(_) | Self::TurnComplete(_) => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Self::ToolCall { .. } | Self::Specialist { .. })
    }
}

pub type ChatEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatEvent, ClassifiedError>> + Send + 'a>>;
