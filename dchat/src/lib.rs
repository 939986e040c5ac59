//! Conversation orchestration over the daisy backend.
//!
//! [`OrchestratorClient`] owns one session, resolves a credential per turn,
//! invokes the backend, and yields [`ChatEvent`]s as they are decoded. Every
//! failure reaches the caller as a [`ClassifiedError`].

mod client;
mod error;
mod hooks;
mod pacing;
mod session;
mod types;

pub mod prelude {
    pub use crate::{
        ChatEvent, ChatEventStream, ChatPolicy, ClassifiedError, ClassifiedErrorKind,
        NoopTurnHooks, OrchestratorClient, OrchestratorClientBuilder, PacingPolicy,
        SessionStore, TurnHooks, TurnSummary,
    };
    pub use dcommon::{SessionId, UserId};
}

pub use client::{ChatPolicy, OrchestratorClient, OrchestratorClientBuilder};
pub use error::{ClassifiedError, ClassifiedErrorKind, classify};
pub use hooks::{NoopTurnHooks, TurnHooks};
pub use pacing::{PacingPolicy, split_sentences};
pub use session::{SESSION_CAPACITY, SessionStore};
pub use types::{ChatEvent, ChatEventStream, TurnSummary};
pub use dcommon::{SessionId, UserId};
