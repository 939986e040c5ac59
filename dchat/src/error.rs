//! Classification of backend failures into a small, user-safe taxonomy.
//!
//! ```rust
//! use dchat::{ClassifiedErrorKind, classify};
//! use dprovider::ProviderError;
//!
//! let throttled = ProviderError::transport("quota").with_code("RESOURCE_EXHAUSTED");
//! let classified = classify(&throttled);
//!
//! assert_eq!(classified.kind, ClassifiedErrorKind::RateLimited);
//! assert_eq!(classified.message, "Service is busy. Try again shortly.");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use dprovider::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifiedErrorKind {
    Unauthenticated,
    InvalidInput,
    RateLimited,
    Timeout,
    Internal,
}

impl ClassifiedErrorKind {
    /// Canned message that is safe to show to an end user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Please sign in to continue.",
            Self::InvalidInput => "Invalid message format. Please try again.",
            Self::RateLimited => "Service is busy. Try again shortly.",
            Self::Timeout => "Request timed out. Try a simpler query.",
            Self::Internal => "Unable to process your request. Please try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ClassifiedErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ClassifiedErrorKind) -> Self {
        Self {
            kind,
            message: kind.user_message().to_string(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(ClassifiedErrorKind::Unauthenticated)
    }

    pub fn invalid_input() -> Self {
        Self::new(ClassifiedErrorKind::InvalidInput)
    }

    pub fn rate_limited() -> Self {
        Self::new(ClassifiedErrorKind::RateLimited)
    }

    pub fn timeout() -> Self {
        Self::new(ClassifiedErrorKind::Timeout)
    }

    pub fn internal() -> Self {
        Self::new(ClassifiedErrorKind::Internal)
    }

    pub fn retryable(&self) -> bool {
        matches!(
            self.kind,
            ClassifiedErrorKind::RateLimited | ClassifiedErrorKind::Timeout
        )
    }
}

impl Display for ClassifiedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ClassifiedError {}

impl From<ProviderError> for ClassifiedError {
    fn from(value: ProviderError) -> Self {
        classify(&value)
    }
}

/// Maps a transport-level failure to its user-facing kind.
///
/// Backend codes win over HTTP status, which wins over the transport kind.
/// The raw failure is logged and never copied into the result.
pub fn classify(error: &ProviderError) -> ClassifiedError {
    let kind = error
        .code
        .as_deref()
        .and_then(kind_for_code)
        .or_else(|| error.status.and_then(kind_for_status))
        .unwrap_or_else(|| kind_for_provider_kind(error.kind));

    tracing::warn!(
        classified_kind = ?kind,
        error_kind = ?error.kind,
        status = error.status,
        code = error.code.as_deref(),
        error = %error,
        "backend call failed"
    );

    ClassifiedError::new(kind)
}

fn kind_for_code(code: &str) -> Option<ClassifiedErrorKind> {
    let code = code.trim().to_ascii_uppercase();
    let kind = match code.as_str() {
        "UNAUTHENTICATED"
        | "PERMISSION_DENIED"
        | "AUTH/ID-TOKEN-EXPIRED"
        | "AUTH/USER-TOKEN-EXPIRED"
        | "AUTH/INVALID-ID-TOKEN"
        | "TOKEN_EXPIRED" => ClassifiedErrorKind::Unauthenticated,
        "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" => {
            ClassifiedErrorKind::InvalidInput
        }
        "RESOURCE_EXHAUSTED" => ClassifiedErrorKind::RateLimited,
        "DEADLINE_EXCEEDED" => ClassifiedErrorKind::Timeout,
        _ => return None,
    };

    Some(kind)
}

fn kind_for_status(status: u16) -> Option<ClassifiedErrorKind> {
    match status {
        401 | 403 => Some(ClassifiedErrorKind::Unauthenticated),
        400 | 413 | 422 => Some(ClassifiedErrorKind::InvalidInput),
        429 => Some(ClassifiedErrorKind::RateLimited),
        408 | 504 => Some(ClassifiedErrorKind::Timeout),
        _ => None,
    }
}

fn kind_for_provider_kind(kind: ProviderErrorKind) -> ClassifiedErrorKind {
    match kind {
        ProviderErrorKind::Authentication => ClassifiedErrorKind::Unauthenticated,
        ProviderErrorKind::InvalidRequest => ClassifiedErrorKind::InvalidInput,
        ProviderErrorKind::RateLimited => ClassifiedErrorKind::RateLimited,
        ProviderErrorKind::Timeout => ClassifiedErrorKind::Timeout,
        ProviderErrorKind::Transport
        | ProviderErrorKind::Unavailable
        | ProviderErrorKind::Decode
        | ProviderErrorKind::Other => ClassifiedErrorKind::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_code_takes_precedence_over_status() {
        let error = ProviderError::transport("boom")
            .with_status(500)
            .with_code("DEADLINE_EXCEEDED");
        assert_eq!(classify(&error).kind, ClassifiedErrorKind::Timeout);
    }

    #[test]
    fn expired_token_codes_classify_as_unauthenticated() {
        for code in ["auth/id-token-expired", "TOKEN_EXPIRED", "permission_denied"] {
            let error = ProviderError::other("expired").with_code(code);
            assert_eq!(
                classify(&error).kind,
                ClassifiedErrorKind::Unauthenticated,
                "{code}"
            );
        }
    }

    #[test]
    fn status_is_used_when_code_is_unknown() {
        let error = ProviderError::transport("throttled")
            .with_status(429)
            .with_code("SOMETHING_NEW");
        assert_eq!(classify(&error).kind, ClassifiedErrorKind::RateLimited);

        let error = ProviderError::transport("bad").with_status(413);
        assert_eq!(classify(&error).kind, ClassifiedErrorKind::InvalidInput);
    }

    #[test]
    fn provider_kind_is_the_last_resort() {
        assert_eq!(
            classify(&ProviderError::timeout("slow")).kind,
            ClassifiedErrorKind::Timeout
        );
        assert_eq!(
            classify(&ProviderError::decode("garbled")).kind,
            ClassifiedErrorKind::Internal
        );
        assert_eq!(
            classify(&ProviderError::unavailable("down").with_status(503)).kind,
            ClassifiedErrorKind::Internal
        );
    }

    #[test]
    fn classified_message_never_contains_raw_backend_text() {
        let error = ProviderError::transport("stack trace at frame 0x7f")
            .with_status(500)
            .with_code("INTERNAL");
        let classified = classify(&error);

        assert_eq!(classified.kind, ClassifiedErrorKind::Internal);
        assert!(!classified.message.contains("stack trace"));
        assert!(!classified.to_string().contains("INTERNAL"));
    }

    #[test]
    fn only_rate_limit_and_timeout_are_retryable() {
        assert!(ClassifiedError::rate_limited().retryable());
        assert!(ClassifiedError::timeout().retryable());
        assert!(!ClassifiedError::unauthenticated().retryable());
        assert!(!ClassifiedError::invalid_input().retryable());
        assert!(!ClassifiedError::internal().retryable());
    }
}
