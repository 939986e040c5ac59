use serde::Deserialize;

use crate::{BackendResponse, ProviderError};

/// Error envelope shared by Google APIs and callable functions.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiErrorBody {
    Detailed(ApiError),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ErrorDetails {
    pub message: Option<String>,
    pub code: Option<String>,
}

pub(crate) fn extract_error_details(body: &str) -> ErrorDetails {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(ApiErrorEnvelope {
            error: ApiErrorBody::Detailed(error),
        }) => ErrorDetails {
            message: error.message.filter(|message| !message.trim().is_empty()),
            code: error.status.filter(|status| !status.trim().is_empty()),
        },
        Ok(ApiErrorEnvelope {
            error: ApiErrorBody::Text(message),
        }) => ErrorDetails {
            message: Some(message),
            code: None,
        },
        Err(_) => ErrorDetails::default(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyEnvelope {
    Wrapped { result: BackendResponse },
    Bare(BackendResponse),
}

pub(crate) fn parse_reply(body: &[u8]) -> Result<BackendResponse, ProviderError> {
    let envelope = serde_json::from_slice::<ReplyEnvelope>(body)
        .map_err(|err| ProviderError::decode(format!("malformed backend reply: {err}")))?;

    Ok(match envelope {
        ReplyEnvelope::Wrapped { result } => result,
        ReplyEnvelope::Bare(response) => response,
    })
}
