//! Turn lifecycle callbacks.

use std::time::Duration;

use dcommon::SessionId;

use crate::{ChatEvent, ClassifiedError, TurnSummary};

pub trait TurnHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId, _previous_turns: usize) {}

    fn on_event(&self, _session_id: &SessionId, _event: &ChatEvent) {}

    fn on_turn_complete(&self, _summary: &TurnSummary, _elapsed: Duration) {}

    fn on_turn_failure(&self, _session_id: &SessionId, _error: &ClassifiedError, _elapsed: Duration) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTurnHooks;

impl TurnHooks for NoopTurnHooks {}
