//! Metrics-based observability hooks for backend attempts and chat turns.
//!
//! ```rust
//! use dobserve::MetricsObservabilityHooks;
//! use dprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use dchat::{ChatEvent, ClassifiedError, TurnHooks, TurnSummary};
use dcommon::SessionId;
use dprovider::{ProviderError, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, _attempt: u32) {
        metrics::counter!(
            "daisy_backend_attempt_start_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "daisy_backend_retry_scheduled_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "daisy_backend_retry_delay_seconds",
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        metrics::counter!(
            "daisy_backend_success_total",
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "daisy_backend_attempts_per_success",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &ProviderError) {
        metrics::counter!(
            "daisy_backend_failure_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "daisy_backend_attempts_per_failure",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}

impl TurnHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _session_id: &SessionId, _previous_turns: usize) {
        metrics::counter!("daisy_turn_start_total").increment(1);
    }

    fn on_event(&self, _session_id: &SessionId, event: &ChatEvent) {
        let kind = match event {
            ChatEvent::Fragment(_) => "fragment",
            ChatEvent::ToolCall { .. } => "tool_call",
            ChatEvent::Specialist { .. } => "specialist",
            ChatEvent::TurnComplete(_) => return,
        };

        metrics::counter!("daisy_turn_event_total", "kind" => kind).increment(1);
    }

    fn on_turn_complete(&self, _summary: &TurnSummary, elapsed: Duration) {
        metrics::counter!("daisy_turn_complete_total").increment(1);
        metrics::histogram!("daisy_turn_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _session_id: &SessionId, error: &ClassifiedError, elapsed: Duration) {
        metrics::counter!(
            "daisy_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("daisy_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}
