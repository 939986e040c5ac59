//! Backend-facing building blocks for the daisy orchestrator client.
//!
//! This crate owns everything that touches the remote agent engine:
//! credential suppliers, the request/response wire model, the transport
//! contract, and incremental decoding of `data: <json>` event streams.
//!
//! ```rust
//! use dprovider::{OutboundRequest, RetryPolicy, Turn};
//!
//! let request = OutboundRequest::builder("Summarize today's streams")
//!     .session_id("session-abc")
//!     .previous_messages(vec![Turn::user("hello")])
//!     .build()
//!     .expect("request should validate");
//!
//! assert_eq!(request.previous_messages().len(), 1);
//! assert_eq!(RetryPolicy::disabled().max_attempts, 1);
//! ```

mod credentials;
mod decoder;
mod endpoint;
mod error;
mod model;
mod resilience;
mod transport;

pub mod adapters;
pub mod prelude;

pub use credentials::{
    Credential, CredentialKind, CredentialSupplier, DEFAULT_REFRESH_SKEW, ExecutionContext,
    IdentitySession, IdentityTokenRefresher, InteractiveCredentialSupplier, SecretString,
    ServiceCredentialSupplier, ServiceToken, ServiceTokenExchange,
};
pub use decoder::{
    BoxedEventStream, ByteStream, EVENT_PREFIX, EventDecoder, StreamEvent, decode_event_stream,
    decode_line,
};
pub use endpoint::{AgentEngineResource, DEFAULT_LOCATION, default_api_base};
pub use error::{ProviderError, ProviderErrorKind, TRANSIENT_CODES, TRANSIENT_STATUSES};
pub use model::{
    BackendResponse, MAX_MESSAGE_CHARS, MAX_PREVIOUS_MESSAGES, OutboundRequest,
    OutboundRequestBuilder, RequestContext, ResponseMetadata, Role, Turn, validate_message,
};
pub use resilience::{
    NoopOperationHooks, ProviderOperationHooks, RetryPolicy, STREAM_QUERY_OPERATION,
    open_with_retry,
};
pub use transport::{BackendReply, BackendTransport, ProviderFuture};

#[cfg(feature = "http")]
pub use adapters::http::{CLOUD_PLATFORM_SCOPE, GcpServiceTokenExchange, HttpBackendTransport};
