//! Bearer credential suppliers for interactive and service execution contexts.
//!
//! ```rust
//! use dprovider::{CredentialKind, CredentialSupplier, InteractiveCredentialSupplier};
//!
//! let supplier = InteractiveCredentialSupplier::new();
//! assert_eq!(supplier.kind(), CredentialKind::IdentityToken);
//! assert!(!supplier.is_signed_in().expect("lock"));
//!
//! supplier.sign_in("uid-7", "id-token", None).expect("sign in");
//! assert_eq!(supplier.subject().expect("lock").as_deref(), Some("uid-7"));
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use crate::{ProviderError, ProviderFuture};

/// Tokens expiring within this window are refreshed before use.
pub const DEFAULT_REFRESH_SKEW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    IdentityToken,
    ServiceAccessToken,
}

/// Where the client runs, which decides how credentials are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionContext {
    /// A signed-in end user supplies an identity token.
    #[default]
    Interactive,
    /// Ambient service identity is exchanged for an access token.
    Service,
}

impl ExecutionContext {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "interactive" | "browser" | "user" => Some(Self::Interactive),
            "service" | "server" | "service-account" => Some(Self::Service),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// A resolved bearer credential ready to attach to one request.
#[derive(Debug, Clone)]
pub struct Credential {
    pub kind: CredentialKind,
    pub token: SecretString,
    /// Stable identifier of the signed-in user, when known.
    pub subject: Option<String>,
    pub expires_at: Option<SystemTime>,
}

impl Credential {
    pub fn new(kind: CredentialKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: SecretString::new(token),
            subject: None,
            expires_at: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: SystemTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

pub trait CredentialSupplier: Send + Sync {
    fn kind(&self) -> CredentialKind;

    fn acquire<'a>(&'a self) -> ProviderFuture<'a, Result<Credential, ProviderError>>;
}

pub(crate) fn expires_within(expires_at: Option<SystemTime>, skew: Duration) -> bool {
    match expires_at {
        Some(deadline) => deadline <= SystemTime::now() + skew,
        None => false,
    }
}

pub struct IdentitySession {
    pub subject: String,
    pub token: SecretString,
    pub expires_at: Option<SystemTime>,
}

impl IdentitySession {
    pub fn new(
        subject: impl Into<String>,
        token: impl Into<String>,
        expires_at: Option<SystemTime>,
    ) -> Self {
        Self {
            subject: subject.into(),
            token: SecretString::new(token),
            expires_at,
        }
    }

    fn credential(&self) -> Credential {
        Credential {
            kind: CredentialKind::IdentityToken,
            token: self.token.clone(),
            subject: Some(self.subject.clone()),
            expires_at: self.expires_at,
        }
    }
}

impl std::fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySession")
            .field("subject", &self.subject)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Obtains a fresh identity token for an already signed-in subject.
pub trait IdentityTokenRefresher: Send + Sync {
    fn refresh<'a>(
        &'a self,
        subject: &'a str,
    ) -> ProviderFuture<'a, Result<IdentitySession, ProviderError>>;
}

/// Supplies the signed-in user's identity token, refreshing it when it expires.
#[derive(Default)]
pub struct InteractiveCredentialSupplier {
    session: Mutex<Option<IdentitySession>>,
    refresher: Option<Arc<dyn IdentityTokenRefresher>>,
    refresh_skew: Option<Duration>,
}

impl InteractiveCredentialSupplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refresher(mut self, refresher: Arc<dyn IdentityTokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn with_refresh_skew(mut self, skew: Duration) -> Self {
        self.refresh_skew = Some(skew);
        self
    }

    pub fn sign_in(
        &self,
        subject: impl Into<String>,
        token: impl Into<String>,
        expires_at: Option<SystemTime>,
    ) -> Result<(), ProviderError> {
        let session = IdentitySession::new(subject, token, expires_at);
        if session.token.is_empty() {
            return Err(ProviderError::authentication(
                "identity token must not be empty",
            ));
        }

        if session.subject.trim().is_empty() {
            return Err(ProviderError::authentication(
                "identity subject must not be empty",
            ));
        }

        *self.session_mut()? = Some(session);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<bool, ProviderError> {
        Ok(self.session_mut()?.take().is_some())
    }

    pub fn is_signed_in(&self) -> Result<bool, ProviderError> {
        Ok(self.session_mut()?.is_some())
    }

    pub fn subject(&self) -> Result<Option<String>, ProviderError> {
        Ok(self
            .session_mut()?
            .as_ref()
            .map(|session| session.subject.clone()))
    }

    fn skew(&self) -> Duration {
        self.refresh_skew.unwrap_or(DEFAULT_REFRESH_SKEW)
    }

    fn session_mut(&self) -> Result<MutexGuard<'_, Option<IdentitySession>>, ProviderError> {
        self.session
            .lock()
            .map_err(|_| ProviderError::authentication("identity session lock poisoned"))
    }

    async fn resolve(&self) -> Result<Credential, ProviderError> {
        let (credential, stale_subject) = {
            let session = self.session_mut()?;
            let Some(session) = session.as_ref() else {
                return Err(ProviderError::authentication("no signed-in identity")
                    .with_code("UNAUTHENTICATED"));
            };

            if expires_within(session.expires_at, self.skew()) {
                (None, Some(session.subject.clone()))
            } else {
                (Some(session.credential()), None)
            }
        };

        if let Some(credential) = credential {
            return Ok(credential);
        }

        let subject = stale_subject.unwrap_or_default();
        let Some(refresher) = &self.refresher else {
            return Err(ProviderError::authentication("identity token expired")
                .with_code("auth/id-token-expired"));
        };

        tracing::debug!(subject = %subject, "refreshing expired identity token");
        let refreshed = refresher.refresh(&subject).await.map_err(|error| {
            ProviderError::authentication(format!("identity token refresh failed: {error}"))
                .with_code("auth/user-token-expired")
        })?;

        if refreshed.token.is_empty() {
            return Err(ProviderError::authentication(
                "identity token refresh returned an empty token",
            ));
        }

        let credential = refreshed.credential();
        *self.session_mut()? = Some(refreshed);
        Ok(credential)
    }
}

impl CredentialSupplier for InteractiveCredentialSupplier {
    fn kind(&self) -> CredentialKind {
        CredentialKind::IdentityToken
    }

    fn acquire<'a>(&'a self) -> ProviderFuture<'a, Result<Credential, ProviderError>> {
        Box::pin(self.resolve())
    }
}

pub struct ServiceToken {
    pub token: SecretString,
    /// Lifetime reported by the issuer; `None` disables supplier-side caching.
    pub expires_in: Option<Duration>,
}

impl ServiceToken {
    pub fn new(token: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            token: SecretString::new(token),
            expires_in,
        }
    }
}

/// Exchanges the ambient service identity for a short-lived access token.
pub trait ServiceTokenExchange: Send + Sync {
    fn exchange<'a>(&'a self) -> ProviderFuture<'a, Result<ServiceToken, ProviderError>>;
}

struct CachedToken {
    token: SecretString,
    expires_at: SystemTime,
}

/// Supplies service access tokens, caching them until shortly before expiry.
pub struct ServiceCredentialSupplier {
    exchange: Arc<dyn ServiceTokenExchange>,
    cached: tokio::sync::Mutex<Option<CachedToken>>,
    refresh_skew: Duration,
}

impl ServiceCredentialSupplier {
    pub fn new(exchange: Arc<dyn ServiceTokenExchange>) -> Self {
        Self {
            exchange,
            cached: tokio::sync::Mutex::new(None),
            refresh_skew: DEFAULT_REFRESH_SKEW,
        }
    }

    pub fn with_refresh_skew(mut self, skew: Duration) -> Self {
        self.refresh_skew = skew;
        self
    }

    async fn resolve(&self) -> Result<Credential, ProviderError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref()
            && !expires_within(Some(entry.expires_at), self.refresh_skew)
        {
            return Ok(Credential {
                kind: CredentialKind::ServiceAccessToken,
                token: entry.token.clone(),
                subject: None,
                expires_at: Some(entry.expires_at),
            });
        }

        let issued = self.exchange.exchange().await.map_err(|error| {
            ProviderError::authentication(format!("service token exchange failed: {error}"))
        })?;

        if issued.token.is_empty() {
            return Err(ProviderError::authentication(
                "service token exchange returned an empty token",
            ));
        }

        let expires_at = issued
            .expires_in
            .map(|lifetime| SystemTime::now() + lifetime);

        *cached = expires_at.map(|expires_at| CachedToken {
            token: issued.token.clone(),
            expires_at,
        });

        Ok(Credential {
            kind: CredentialKind::ServiceAccessToken,
            token: issued.token,
            subject: None,
            expires_at,
        })
    }
}

impl CredentialSupplier for ServiceCredentialSupplier {
    fn kind(&self) -> CredentialKind {
        CredentialKind::ServiceAccessToken
    }

    fn acquire<'a>(&'a self) -> ProviderFuture<'a, Result<Credential, ProviderError>> {
        Box::pin(self.resolve())
    }
}
