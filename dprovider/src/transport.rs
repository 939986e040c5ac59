//! Backend transport contract.

use dcommon::BoxFuture;

use crate::{BackendResponse, ByteStream, Credential, OutboundRequest, ProviderError};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

/// What the backend answered with: one structured object or an event stream.
pub enum BackendReply<'a> {
    Complete(BackendResponse),
    Stream(ByteStream<'a>),
}

impl BackendReply<'_> {
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl std::fmt::Debug for BackendReply<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(response) => f
                .debug_tuple("BackendReply::Complete")
                .field(response)
                .finish(),
            Self::Stream(_) => f.write_str("BackendReply::Stream(..)"),
        }
    }
}

pub trait BackendTransport: Send + Sync {
    /// Sends one request authenticated with `credential`.
    ///
    /// Implementations map HTTP and backend failures to [`ProviderError`]
    /// values carrying `status` and `code` where available.
    fn send<'a>(
        &'a self,
        request: OutboundRequest,
        credential: Credential,
    ) -> ProviderFuture<'a, Result<BackendReply<'a>, ProviderError>>;
}
