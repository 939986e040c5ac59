//! Wire-level request, response, and conversation turn types.
//!
//! ```rust
//! use dprovider::{OutboundRequest, ProviderErrorKind, Turn};
//!
//! let ok = OutboundRequest::builder("Which artists trend this week?")
//!     .session_id("session-1")
//!     .user_id("user-1")
//!     .previous_messages(vec![Turn::user("hi"), Turn::assistant("hello")])
//!     .build();
//! assert!(ok.is_ok());
//!
//! let err = OutboundRequest::builder("   ").build().err().expect("blank message should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use serde::{Deserialize, Serialize};

use crate::ProviderError;

/// Longest accepted user message, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Upper bound on prior turns sent as request context.
pub const MAX_PREVIOUS_MESSAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_messages: Option<Vec<Turn>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<RequestContext>,
}

impl OutboundRequest {
    pub fn builder(message: impl Into<String>) -> OutboundRequestBuilder {
        OutboundRequestBuilder::new(message)
    }

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            context: None,
        }
    }

    pub fn previous_messages(&self) -> &[Turn] {
        self.context
            .as_ref()
            .and_then(|context| context.previous_messages.as_deref())
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        validate_message(&self.message)?;

        if self.previous_messages().len() > MAX_PREVIOUS_MESSAGES {
            return Err(ProviderError::invalid_request(format!(
                "at most {MAX_PREVIOUS_MESSAGES} previous messages are allowed"
            )));
        }

        Ok(())
    }
}

/// Checks the user-supplied message bounds shared by requests and the client.
pub fn validate_message(message: &str) -> Result<(), ProviderError> {
    if message.trim().is_empty() {
        return Err(ProviderError::invalid_request("message must not be empty"));
    }

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ProviderError::invalid_request(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequestBuilder {
    message: String,
    session_id: Option<String>,
    user_id: Option<String>,
    previous_messages: Option<Vec<Turn>>,
}

impl OutboundRequestBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            user_id: None,
            previous_messages: None,
        }
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn previous_messages(mut self, turns: Vec<Turn>) -> Self {
        self.previous_messages = Some(turns);
        self
    }

    pub fn build(self) -> Result<OutboundRequest, ProviderError> {
        let context = if self.user_id.is_none() && self.previous_messages.is_none() {
            None
        } else {
            Some(RequestContext {
                user_id: self.user_id,
                previous_messages: self.previous_messages,
            })
        };

        let request = OutboundRequest {
            message: self.message,
            session_id: self.session_id,
            context,
        };

        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub session_id: String,
}

/// Single structured reply returned by non-streaming backend configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl BackendResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
