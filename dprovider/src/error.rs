//! Transport-level error kinds and error value helpers.
//!
//! These values carry raw detail (HTTP status, backend status codes, provider
//! messages) and are meant for logs and classification, not for display.
//!
//! ```rust
//! use dprovider::{ProviderError, ProviderErrorKind};
//!
//! let auth = ProviderError::authentication("token expired").with_status(401);
//! assert!(!auth.is_transient());
//! assert_eq!(auth.status, Some(401));
//!
//! let throttled = ProviderError::rate_limited("quota").with_code("RESOURCE_EXHAUSTED");
//! assert_eq!(throttled.kind, ProviderErrorKind::RateLimited);
//! assert!(throttled.is_transient());
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

/// HTTP statuses where the backend never started a turn and may accept a resend.
pub const TRANSIENT_STATUSES: [u16; 4] = [429, 502, 503, 504];

/// Backend status codes with the same meaning as [`TRANSIENT_STATUSES`].
pub const TRANSIENT_CODES: [&str; 3] = ["RESOURCE_EXHAUSTED", "UNAVAILABLE", "DEADLINE_EXCEEDED"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Decode,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    /// HTTP status returned by the backend, when one was received.
    pub status: Option<u16>,
    /// Backend-reported status code such as `RESOURCE_EXHAUSTED`.
    pub code: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Decode, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Whether resending the same request could succeed.
    ///
    /// Decided by the backend code first, then the HTTP status. Without a
    /// response only a client-side timeout counts.
    pub fn is_transient(&self) -> bool {
        if let Some(code) = &self.code
            && TRANSIENT_CODES
                .iter()
                .any(|transient| transient.eq_ignore_ascii_case(code))
        {
            return true;
        }

        match self.status {
            Some(status) => TRANSIENT_STATUSES.contains(&status),
            None => self.kind == ProviderErrorKind::Timeout,
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (status {status})")?;
        }

        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }

        Ok(())
    }
}

impl Error for ProviderError {}
