//! Common `dprovider` imports for downstream crates.

pub use crate::{
    BackendReply, BackendResponse, BackendTransport, BoxedEventStream, ByteStream, Credential,
    CredentialKind, CredentialSupplier, ExecutionContext, NoopOperationHooks, OutboundRequest,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderOperationHooks, RetryPolicy, Role,
    StreamEvent, Turn, decode_event_stream, open_with_retry,
};
pub use dcommon::{BoxFuture, SessionId, UserId};
