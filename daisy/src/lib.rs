//! Unified facade over the daisy workspace crates.
//!
//! This crate is the single dependency most applications need: it
//! re-exports the orchestrator client, credential suppliers, and error
//! taxonomy, and wires them together from a [`ClientConfig`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use daisy::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let identity = Arc::new(InteractiveCredentialSupplier::new());
//! identity.sign_in("uid-1", "firebase-id-token", None)?;
//!
//! let credentials = credentials_for(&config, identity).await?;
//! let mut client = build_client(&config, credentials)?;
//!
//! let summary = collect_turn(client.send("Which artists trend this week?").await?).await?;
//! println!("{}", summary.text);
//! # Ok(())
//! # }
//! ```

mod config;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use dchat;
pub use dcommon;
pub use dobserve;
pub use dprovider;

pub use config::{
    AgentInfo, ClientConfig, DEFAULT_DISPLAY_NAME, DEFAULT_TIMEOUT, ENV_DISPLAY_NAME,
    ENV_ENDPOINT, ENV_ENGINE_ID, ENV_EXECUTION_CONTEXT, ENV_FALLBACK_USER_ID, ENV_LOCATION,
    ENV_PROJECT_ID, ENV_PSEUDO_STREAM, ENV_TIMEOUT_SECS,
};
pub use dchat::{
    ChatEvent, ChatEventStream, ChatPolicy, ClassifiedError, ClassifiedErrorKind, NoopTurnHooks,
    OrchestratorClient, OrchestratorClientBuilder, PacingPolicy, SessionStore, TurnHooks,
    TurnSummary, classify,
};
pub use dcommon::{BoxFuture, SessionId, UserId};
pub use dobserve::{
    MetricsObservabilityHooks, SafeProviderHooks, SafeTurnHooks, TracingObservabilityHooks,
};
pub use dprovider::{
    BackendReply, BackendResponse, BackendTransport, Credential, CredentialKind,
    CredentialSupplier, ExecutionContext, GcpServiceTokenExchange, HttpBackendTransport,
    IdentityTokenRefresher, InteractiveCredentialSupplier, ProviderError, ProviderErrorKind,
    RetryPolicy, SecretString, ServiceCredentialSupplier, ServiceTokenExchange, StreamEvent, Turn,
};

pub use runtime::{
    build_client, build_client_with, build_service_client, credentials_for, http_transport,
    service_credentials,
};
pub use util::{collect_turn, render_plain};
