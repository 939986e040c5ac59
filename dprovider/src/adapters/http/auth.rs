//! Application-default service identity exchange backed by `gcp_auth`.

use std::sync::Arc;

use gcp_auth::TokenProvider;

use crate::{ProviderError, ProviderFuture, ServiceToken, ServiceTokenExchange};

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Exchanges ambient credentials (metadata server, `GOOGLE_APPLICATION_CREDENTIALS`,
/// or gcloud user config) for an OAuth access token.
///
/// `gcp_auth` caches and refreshes tokens itself, so issued tokens carry no
/// lifetime and the supplier asks again on every acquire.
#[derive(Clone)]
pub struct GcpServiceTokenExchange {
    provider: Arc<dyn TokenProvider>,
    scopes: Vec<String>,
}

impl GcpServiceTokenExchange {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
        }
    }

    pub async fn from_environment() -> Result<Self, ProviderError> {
        let provider = gcp_auth::provider().await.map_err(|err| {
            ProviderError::authentication(format!("no ambient service identity: {err}"))
        })?;

        Ok(Self::new(provider))
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }
}

impl std::fmt::Debug for GcpServiceTokenExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpServiceTokenExchange")
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl ServiceTokenExchange for GcpServiceTokenExchange {
    fn exchange<'a>(&'a self) -> ProviderFuture<'a, Result<ServiceToken, ProviderError>> {
        Box::pin(async move {
            let scopes = self.scopes.iter().map(String::as_str).collect::<Vec<_>>();
            let token = self
                .provider
                .token(&scopes)
                .await
                .map_err(|err| ProviderError::authentication(err.to_string()))?;

            Ok(ServiceToken::new(token.as_str(), None))
        })
    }
}
