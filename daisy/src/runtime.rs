//! Wiring helpers that turn a [`ClientConfig`] into a ready client.

use std::sync::Arc;

use dchat::OrchestratorClient;
use dobserve::{SafeProviderHooks, SafeTurnHooks, TracingObservabilityHooks};
use dprovider::{
    BackendTransport, CredentialSupplier, ExecutionContext, GcpServiceTokenExchange,
    HttpBackendTransport, InteractiveCredentialSupplier, ProviderError, ServiceCredentialSupplier,
};
use reqwest::Client;

use crate::ClientConfig;

/// HTTP transport with the configured endpoint and request timeout.
pub fn http_transport(config: &ClientConfig) -> Result<Arc<dyn BackendTransport>, ProviderError> {
    let endpoint = config.endpoint_url()?;
    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    Ok(Arc::new(HttpBackendTransport::new(http, endpoint)))
}

/// Service credentials from application-default identity.
pub async fn service_credentials() -> Result<Arc<dyn CredentialSupplier>, ProviderError> {
    let exchange = GcpServiceTokenExchange::from_environment().await?;
    Ok(Arc::new(ServiceCredentialSupplier::new(Arc::new(exchange))))
}

/// Picks the credential variant for `config.context` once.
///
/// Interactive callers hand in the supplier their sign-in flow populates.
pub async fn credentials_for(
    config: &ClientConfig,
    interactive: Arc<InteractiveCredentialSupplier>,
) -> Result<Arc<dyn CredentialSupplier>, ProviderError> {
    match config.context {
        ExecutionContext::Interactive => Ok(interactive),
        ExecutionContext::Service => service_credentials().await,
    }
}

/// Assembles a client from explicit parts, with tracing hooks attached.
pub fn build_client_with(
    config: &ClientConfig,
    transport: Arc<dyn BackendTransport>,
    credentials: Arc<dyn CredentialSupplier>,
) -> OrchestratorClient {
    OrchestratorClient::builder(transport, credentials)
        .policy(config.chat_policy())
        .hooks(Arc::new(SafeTurnHooks::new(TracingObservabilityHooks)))
        .provider_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)))
        .build()
}

pub fn build_client(
    config: &ClientConfig,
    credentials: Arc<dyn CredentialSupplier>,
) -> Result<OrchestratorClient, ProviderError> {
    config.validate()?;
    let transport = http_transport(config)?;

    tracing::debug!(
        display_name = config.display_name.as_str(),
        context = ?config.context,
        timeout_ms = config.timeout.as_millis() as u64,
        "built orchestrator client"
    );

    Ok(build_client_with(config, transport, credentials))
}

/// Client for a service process, authenticated with ambient identity.
pub async fn build_service_client(config: &ClientConfig) -> Result<OrchestratorClient, ProviderError> {
    let credentials = service_credentials().await?;
    build_client(config, credentials)
}

#[cfg(test)]
mod tests {
    use dprovider::{CredentialKind, ProviderErrorKind};

    use super::*;

    #[test]
    fn http_transport_requires_resolvable_endpoint() {
        let error = http_transport(&ClientConfig::default())
            .err()
            .expect("no endpoint configured");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn build_client_applies_config_policy() {
        let config = ClientConfig::for_endpoint("http://localhost:9/query")
            .with_fallback_user_id("kiosk")
            .with_pacing(dchat::PacingPolicy::disabled());
        let credentials = Arc::new(InteractiveCredentialSupplier::new());

        let client = build_client(&config, credentials).expect("client should build");

        assert_eq!(client.policy().fallback_user_id.as_str(), "kiosk");
        assert!(!client.policy().pacing.enabled);
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn interactive_context_uses_supplied_identity() {
        let config = ClientConfig::for_endpoint("http://localhost:9/query");
        let interactive = Arc::new(InteractiveCredentialSupplier::new());

        let credentials = credentials_for(&config, interactive)
            .await
            .expect("interactive supplier");
        assert_eq!(credentials.kind(), CredentialKind::IdentityToken);
    }
}
