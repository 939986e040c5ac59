//! Orchestrator client: one conversation, one in-flight turn at a time.

use std::sync::Arc;
use std::time::Instant;

use async_stream::try_stream;
use dcommon::{SessionId, UserId};
use dprovider::{
    BackendReply, BackendTransport, CredentialSupplier, MAX_PREVIOUS_MESSAGES, NoopOperationHooks,
    OutboundRequest, ProviderOperationHooks, RetryPolicy, StreamEvent, Turn, decode_event_stream,
    open_with_retry, validate_message,
};
use futures_util::StreamExt;

use crate::{
    ChatEvent, ChatEventStream, ClassifiedError, NoopTurnHooks, PacingPolicy, SESSION_CAPACITY,
    SessionStore, TurnHooks, TurnSummary, classify,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ChatPolicy {
    pub retry: RetryPolicy,
    pub pacing: PacingPolicy,
    /// Sent as `context.userId` when the credential carries no subject.
    pub fallback_user_id: UserId,
    pub history_capacity: usize,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::disabled(),
            pacing: PacingPolicy::default(),
            fallback_user_id: UserId::anonymous(),
            history_capacity: SESSION_CAPACITY,
        }
    }
}

pub struct OrchestratorClientBuilder {
    transport: Arc<dyn BackendTransport>,
    credentials: Arc<dyn CredentialSupplier>,
    hooks: Arc<dyn TurnHooks>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    policy: ChatPolicy,
    session_id: Option<SessionId>,
}

impl OrchestratorClientBuilder {
    pub fn new(
        transport: Arc<dyn BackendTransport>,
        credentials: Arc<dyn CredentialSupplier>,
    ) -> Self {
        Self {
            transport,
            credentials,
            hooks: Arc::new(NoopTurnHooks),
            provider_hooks: Arc::new(NoopOperationHooks),
            policy: ChatPolicy::default(),
            session_id: None,
        }
    }

    pub fn hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn provider_hooks(mut self, provider_hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = provider_hooks;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.policy.retry = retry;
        self
    }

    pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
        self.policy.pacing = pacing;
        self
    }

    pub fn fallback_user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.policy.fallback_user_id = user_id.into();
        self
    }

    /// Resumes an existing conversation id instead of generating one.
    pub fn session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn build(self) -> OrchestratorClient {
        let mut session = SessionStore::with_capacity(self.policy.history_capacity);
        if let Some(session_id) = self.session_id {
            session = session.with_session_id(session_id);
        }

        OrchestratorClient {
            transport: self.transport,
            credentials: self.credentials,
            hooks: self.hooks,
            provider_hooks: self.provider_hooks,
            policy: self.policy,
            session,
        }
    }
}

pub struct OrchestratorClient {
    transport: Arc<dyn BackendTransport>,
    credentials: Arc<dyn CredentialSupplier>,
    hooks: Arc<dyn TurnHooks>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    policy: ChatPolicy,
    session: SessionStore,
}

impl std::fmt::Debug for OrchestratorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorClient")
            .field("credential_kind", &self.credentials.kind())
            .field("policy", &self.policy)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl OrchestratorClient {
    pub fn builder(
        transport: Arc<dyn BackendTransport>,
        credentials: Arc<dyn CredentialSupplier>,
    ) -> OrchestratorClientBuilder {
        OrchestratorClientBuilder::new(transport, credentials)
    }

    pub fn session_id(&self) -> &SessionId {
        self.session.session_id()
    }

    pub fn history(&self) -> Vec<Turn> {
        self.session.history().iter().cloned().collect()
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    /// Takes effect for the next `send`; in-flight streams are unaffected
    /// because they hold the exclusive borrow.
    pub fn start_new_session(&mut self) -> &SessionId {
        self.session.reset();
        tracing::debug!(session_id = %self.session.session_id(), "started new session");
        self.session.session_id()
    }

    /// Sends one user message and returns the reply as a lazy event stream.
    ///
    /// Validation, credential resolution, and the backend call complete
    /// before this returns. The assistant turn is committed to history only
    /// when the returned stream is driven to its `TurnComplete` event;
    /// dropping it early or hitting a mid-stream failure commits nothing.
    pub async fn send(
        &mut self,
        message: impl Into<String>,
    ) -> Result<ChatEventStream<'_>, ClassifiedError> {
        let message = message.into();
        validate_message(&message).map_err(|error| classify(&error))?;

        let started = Instant::now();
        let hooks = self.hooks.as_ref();
        let session_id = self.session.session_id().clone();
        hooks.on_turn_start(&session_id, self.session.len());

        let fail = |error: ClassifiedError| {
            hooks.on_turn_failure(&session_id, &error, started.elapsed());
            error
        };

        let credential = self
            .credentials
            .acquire()
            .await
            .map_err(|error| fail(classify(&error)))?;

        self.session.append(Turn::user(message.clone()));

        let user_id = credential
            .subject
            .clone()
            .unwrap_or_else(|| self.policy.fallback_user_id.to_string());
        let request = OutboundRequest::builder(message)
            .session_id(session_id.as_str())
            .user_id(user_id)
            .previous_messages(self.session.previous_turns(MAX_PREVIOUS_MESSAGES))
            .build()
            .map_err(|error| fail(classify(&error)))?;

        let transport = self.transport.as_ref();
        let reply = open_with_retry(
            &self.policy.retry,
            self.provider_hooks.as_ref(),
            |_attempt| transport.send(request.clone(), credential.clone()),
            futures_timer::Delay::new,
        )
        .await
        .map_err(|error| fail(classify(&error)))?;

        tracing::debug!(
            session_id = %session_id,
            streamed = reply.is_stream(),
            "backend accepted turn"
        );

        let session = &mut self.session;
        let pacing = self.policy.pacing;

        Ok(Box::pin(try_stream! {
            let mut summary = TurnSummary::new(session_id.clone());

            match reply {
                BackendReply::Stream(bytes) => {
                    let mut events = decode_event_stream(bytes);
                    while let Some(event) = events.next().await {
                        let event = event.map_err(|error| {
                            let classified = classify(&error);
                            hooks.on_turn_failure(&session_id, &classified, started.elapsed());
                            classified
                        })?;

                        let event = match event {
                            StreamEvent::Text(text) => {
                                summary.text.push_str(&text);
                                ChatEvent::Fragment(text)
                            }
                            StreamEvent::ToolCall { name } => {
                                summary.tool_calls.push(name.clone());
                                ChatEvent::ToolCall { name }
                            }
                            StreamEvent::Specialist { name } => {
                                summary.specialists.push(name.clone());
                                ChatEvent::Specialist { name }
                            }
                        };

                        hooks.on_event(&session_id, &event);
                        yield event;
                    }
                }
                BackendReply::Complete(response) => {
                    for (index, segment) in pacing.segments(&response.response).into_iter().enumerate() {
                        if index > 0 {
                            if let Some(delay) = pacing.pause_between_segments() {
                                futures_timer::Delay::new(delay).await;
                            }
                        }

                        summary.text.push_str(segment);
                        let event = ChatEvent::Fragment(segment.to_string());
                        hooks.on_event(&session_id, &event);
                        yield event;
                    }

                    summary.metadata = response.metadata;
                }
            }

            session.append(Turn::assistant(summary.text.clone()));
            hooks.on_turn_complete(&summary, started.elapsed());
            yield ChatEvent::TurnComplete(summary);
        }))
    }
}
