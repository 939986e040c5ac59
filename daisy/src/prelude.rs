//! Common imports for most daisy applications.

pub use crate::{
    AgentInfo, ChatEvent, ChatEventStream, ClassifiedError, ClassifiedErrorKind, ClientConfig,
    ExecutionContext, InteractiveCredentialSupplier, OrchestratorClient, PacingPolicy,
    RetryPolicy, SessionId, TurnSummary, UserId, build_client, build_client_with,
    build_service_client, collect_turn, credentials_for, render_plain,
};
