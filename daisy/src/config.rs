//! Client configuration: explicit values, environment, or both.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use daisy::ClientConfig;
//!
//! let config = ClientConfig::for_engine("music-staging", "8470637580386304")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_fallback_user_id("kiosk");
//!
//! assert!(config.endpoint_url().expect("endpoint").ends_with(":streamQuery"));
//! assert_eq!(config.agent_info().display_name, "daisy-orchestrator");
//! ```

use std::time::Duration;

use dchat::{ChatPolicy, PacingPolicy, SESSION_CAPACITY};
use dcommon::UserId;
use dprovider::{
    AgentEngineResource, DEFAULT_LOCATION, ExecutionContext, ProviderError, RetryPolicy,
};

pub const DEFAULT_DISPLAY_NAME: &str = "daisy-orchestrator";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

pub const ENV_ENDPOINT: &str = "DAISY_AGENT_ENDPOINT";
pub const ENV_PROJECT_ID: &str = "DAISY_AGENT_PROJECT_ID";
pub const ENV_LOCATION: &str = "DAISY_AGENT_LOCATION";
pub const ENV_ENGINE_ID: &str = "DAISY_AGENT_ENGINE_ID";
pub const ENV_DISPLAY_NAME: &str = "DAISY_AGENT_DISPLAY_NAME";
pub const ENV_FALLBACK_USER_ID: &str = "DAISY_FALLBACK_USER_ID";
pub const ENV_TIMEOUT_SECS: &str = "DAISY_TIMEOUT_SECS";
pub const ENV_PSEUDO_STREAM: &str = "DAISY_PSEUDO_STREAM";
pub const ENV_EXECUTION_CONTEXT: &str = "DAISY_EXECUTION_CONTEXT";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Full request URL; takes precedence over the engine coordinates.
    pub endpoint: Option<String>,
    pub project_id: Option<String>,
    pub location: String,
    pub engine_id: Option<String>,
    pub api_base: Option<String>,
    pub display_name: String,
    pub fallback_user_id: UserId,
    pub timeout: Duration,
    pub pacing: PacingPolicy,
    pub retry: RetryPolicy,
    pub context: ExecutionContext,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            engine_id: None,
            api_base: None,
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            fallback_user_id: UserId::anonymous(),
            timeout: DEFAULT_TIMEOUT,
            pacing: PacingPolicy::default(),
            retry: RetryPolicy::disabled(),
            context: ExecutionContext::default(),
        }
    }
}

impl ClientConfig {
    pub fn for_engine(project_id: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            engine_id: Some(engine_id.into()),
            ..Self::default()
        }
    }

    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Reads `DAISY_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self {
            endpoint: read(ENV_ENDPOINT),
            project_id: read(ENV_PROJECT_ID),
            engine_id: read(ENV_ENGINE_ID),
            ..Self::default()
        };

        if let Some(location) = read(ENV_LOCATION) {
            config.location = location;
        }

        if let Some(display_name) = read(ENV_DISPLAY_NAME) {
            config.display_name = display_name;
        }

        if let Some(user_id) = read(ENV_FALLBACK_USER_ID) {
            config.fallback_user_id = UserId::new(user_id);
        }

        if let Some(raw) = read(ENV_TIMEOUT_SECS) {
            let seconds = raw.parse::<u64>().map_err(|_| {
                ProviderError::invalid_request(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            config.timeout = Duration::from_secs(seconds);
        }

        if let Some(raw) = read(ENV_PSEUDO_STREAM) {
            config.pacing.enabled = parse_flag(&raw).ok_or_else(|| {
                ProviderError::invalid_request(format!(
                    "{ENV_PSEUDO_STREAM} must be a boolean flag, got '{raw}'"
                ))
            })?;
        }

        if let Some(raw) = read(ENV_EXECUTION_CONTEXT) {
            config.context = ExecutionContext::parse(&raw).ok_or_else(|| {
                ProviderError::invalid_request(format!(
                    "{ENV_EXECUTION_CONTEXT} must be 'interactive' or 'service', got '{raw}'"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_fallback_user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.fallback_user_id = user_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.timeout.is_zero() {
            return Err(ProviderError::invalid_request("timeout must be non-zero"));
        }

        self.endpoint_url().map(|_| ())
    }

    pub fn resource(&self) -> Option<AgentEngineResource> {
        match (&self.project_id, &self.engine_id) {
            (Some(project_id), Some(engine_id)) => Some(AgentEngineResource::new(
                project_id.clone(),
                self.location.clone(),
                engine_id.clone(),
            )),
            _ => None,
        }
    }

    pub fn endpoint_url(&self) -> Result<String, ProviderError> {
        if let Some(endpoint) = self.endpoint.as_deref().map(str::trim) {
            if !endpoint.is_empty() {
                return Ok(endpoint.to_string());
            }
        }

        let resource = self.resource().ok_or_else(|| {
            ProviderError::invalid_request(format!(
                "either {ENV_ENDPOINT} or both {ENV_PROJECT_ID} and {ENV_ENGINE_ID} must be set"
            ))
        })?;
        resource.validate()?;

        Ok(resource.stream_query_url(self.api_base.as_deref()))
    }

    pub fn chat_policy(&self) -> ChatPolicy {
        ChatPolicy {
            retry: self.retry.clone(),
            pacing: self.pacing,
            fallback_user_id: self.fallback_user_id.clone(),
            history_capacity: SESSION_CAPACITY,
        }
    }

    pub fn agent_info(&self) -> AgentInfo {
        AgentInfo {
            display_name: self.display_name.clone(),
            resource_name: self.resource().map(|resource| resource.resource_name()),
            endpoint: self.endpoint_url().ok(),
            context: self.context,
            streaming: true,
            pseudo_streaming: self.pacing.enabled,
        }
    }
}

/// Static, display-oriented description of the configured agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub display_name: String,
    pub resource_name: Option<String>,
    pub endpoint: Option<String>,
    pub context: ExecutionContext,
    pub streaming: bool,
    pub pseudo_streaming: bool,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dprovider::ProviderErrorKind;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn env_with_engine_coordinates_builds_regional_url() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_PROJECT_ID, "music-staging"),
            (ENV_ENGINE_ID, "42"),
            (ENV_LOCATION, "europe-west4"),
            (ENV_PSEUDO_STREAM, "false"),
            (ENV_EXECUTION_CONTEXT, "service"),
            (ENV_TIMEOUT_SECS, "15"),
        ]))
        .expect("config should load");

        assert_eq!(
            config.endpoint_url().expect("endpoint"),
            "https://europe-west4-aiplatform.googleapis.com/v1beta1/projects/music-staging/locations/europe-west4/reasoningEngines/42:streamQuery"
        );
        assert!(!config.pacing.enabled);
        assert_eq!(config.context, ExecutionContext::Service);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.fallback_user_id, UserId::anonymous());
    }

    #[test]
    fn explicit_endpoint_wins_over_coordinates() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "http://localhost:8080/query"),
            (ENV_PROJECT_ID, "ignored"),
        ]))
        .expect("config should load");

        assert_eq!(
            config.endpoint_url().expect("endpoint"),
            "http://localhost:8080/query"
        );
        assert!(config.agent_info().resource_name.is_none());
    }

    #[test]
    fn missing_engine_without_endpoint_is_rejected() {
        let error = ClientConfig::from_lookup(lookup(&[(ENV_PROJECT_ID, "music-staging")]))
            .expect_err("engine id is required");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let base = [(ENV_ENDPOINT, "http://localhost")];

        for (key, value) in [
            (ENV_TIMEOUT_SECS, "soon"),
            (ENV_PSEUDO_STREAM, "maybe"),
            (ENV_EXECUTION_CONTEXT, "browser-ish"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push((key, value));
            assert!(ClientConfig::from_lookup(lookup(&pairs)).is_err(), "{key}");
        }
    }

    #[test]
    fn agent_info_describes_configured_engine() {
        let info = ClientConfig::for_engine("music-staging", "8470637580386304")
            .with_display_name("daisy")
            .agent_info();

        assert_eq!(info.display_name, "daisy");
        assert_eq!(
            info.resource_name.as_deref(),
            Some("projects/music-staging/locations/us-central1/reasoningEngines/8470637580386304")
        );
        assert_eq!(info.context, ExecutionContext::Interactive);
        assert!(info.pseudo_streaming);
    }

    #[test]
    fn chat_policy_carries_retry_pacing_and_fallback_user() {
        let policy = ClientConfig::for_endpoint("http://localhost")
            .with_retry(RetryPolicy::new(3))
            .with_pacing(PacingPolicy::disabled())
            .with_fallback_user_id("kiosk")
            .chat_policy();

        assert_eq!(policy.retry.max_attempts, 3);
        assert!(!policy.pacing.enabled);
        assert_eq!(policy.fallback_user_id.as_str(), "kiosk");
    }
}
