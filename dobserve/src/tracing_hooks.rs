//! Tracing-based observability hooks for backend attempts and chat turns.
//!
//! ```rust
//! use dobserve::TracingObservabilityHooks;
//! use dchat::TurnHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn TurnHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use std::time::Duration;

use dchat::{ChatEvent, ClassifiedError, TurnHooks, TurnSummary};
use dcommon::SessionId;
use dprovider::{ProviderError, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        tracing::info!(phase = "backend", event = "attempt_start", operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "backend",
            event = "retry_scheduled",
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            status = error.status,
            transient = error.is_transient(),
            error = %error
        );
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        tracing::info!(phase = "backend", event = "success", operation, attempts);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "backend",
            event = "failure",
            operation,
            attempts,
            error_kind = ?error.kind,
            status = error.status,
            code = error.code.as_deref(),
            error = %error
        );
    }
}

impl TurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, session_id: &SessionId, previous_turns: usize) {
        tracing::info!(
            phase = "turn",
            event = "start",
            session_id = %session_id,
            previous_turns
        );
    }

    fn on_event(&self, session_id: &SessionId, event: &ChatEvent) {
        match event {
            ChatEvent::Fragment(text) => tracing::trace!(
                phase = "turn",
                event = "fragment",
                session_id = %session_id,
                chars = text.chars().count()
            ),
            ChatEvent::ToolCall { name } => tracing::debug!(
                phase = "turn",
                event = "tool_call",
                session_id = %session_id,
                tool_name = name.as_str()
            ),
            ChatEvent::Specialist { name } => tracing::debug!(
                phase = "turn",
                event = "specialist",
                session_id = %session_id,
                specialist = name.as_str()
            ),
            ChatEvent::TurnComplete(_) => {}
        }
    }

    fn on_turn_complete(&self, summary: &TurnSummary, elapsed: Duration) {
        tracing::info!(
            phase = "turn",
            event = "complete",
            session_id = %summary.session_id,
            chars = summary.text.chars().count(),
            tool_calls = summary.tool_calls.len(),
            specialists = summary.specialists.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, session_id: &SessionId, error: &ClassifiedError, elapsed: Duration) {
        tracing::error!(
            phase = "turn",
            event = "failure",
            session_id = %session_id,
            error_kind = ?error.kind,
            retryable = error.retryable(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }
}
