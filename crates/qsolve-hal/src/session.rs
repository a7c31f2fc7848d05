//! Provider sessions and credential sources.
//!
//! A [`Session`] is acquired once per run from a [`TokenProvider`], passed by
//! reference to device selection and backend construction, and closed when
//! the run ends. There is no process-wide account state.
//!
//! ```ignore
//! let session = Session::acquire("ibm", &EnvTokenProvider::ibm()).await?;
//! let device = provider.select(&session, &filter).await?;
//! let backend = provider.open(&session, &device).await?;
//! // ... run ...
//! session.close();
//! ```

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{HalError, HalResult};

/// Token provider trait for dependency injection.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get a valid access token.
    async fn get_token(&self) -> HalResult<String>;

    /// Check if authentication is available.
    fn has_valid_token(&self) -> bool;
}

/// Reads a token from an environment variable.
pub struct EnvTokenProvider {
    env_var: String,
}

impl EnvTokenProvider {
    /// Create a new environment variable token provider.
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }

    /// Create provider for `IBM_QUANTUM_TOKEN`.
    pub fn ibm() -> Self {
        Self::new("IBM_QUANTUM_TOKEN")
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn get_token(&self) -> HalResult<String> {
        std::env::var(&self.env_var)
            .map_err(|_| HalError::Auth(format!("Environment variable {} not set", self.env_var)))
    }

    fn has_valid_token(&self) -> bool {
        std::env::var(&self.env_var).is_ok()
    }
}

/// A token known up front, e.g. read from a configuration file.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> HalResult<String> {
        if self.token.is_empty() {
            return Err(HalError::Auth("empty token".into()));
        }
        Ok(self.token.clone())
    }

    fn has_valid_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// An authenticated (or anonymous) session with one provider.
///
/// Not `Clone`: a run holds exactly one session and lends it out.
pub struct Session {
    provider: String,
    token: Option<String>,
    instance: Option<String>,
    endpoint: Option<String>,
    acquired_at: DateTime<Utc>,
}

impl Session {
    /// Acquire a session by fetching a token once.
    pub async fn acquire(
        provider: impl Into<String>,
        tokens: &dyn TokenProvider,
    ) -> HalResult<Self> {
        let provider = provider.into();
        let token = tokens.get_token().await?;
        info!(provider = %provider, "session acquired");
        Ok(Self {
            provider,
            token: Some(token),
            instance: None,
            endpoint: None,
            acquired_at: Utc::now(),
        })
    }

    /// A session without credentials, for local simulators and fixtures.
    pub fn anonymous(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            token: None,
            instance: None,
            endpoint: None,
            acquired_at: Utc::now(),
        }
    }

    /// Scope the session to a service instance (e.g. an IBM Cloud CRN).
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Override the provider's API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Provider this session belongs to.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The access token; an anonymous session has none.
    pub fn token(&self) -> HalResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| HalError::Auth(format!("{} session has no credentials", self.provider)))
    }

    /// Service instance, if scoped.
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Check whether the session carries credentials.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// When the session was acquired.
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Release the session. Tokens are not revoked; this only drops them.
    pub fn close(self) {
        let held = Utc::now() - self.acquired_at;
        debug!(
            provider = %self.provider,
            held_ms = held.num_milliseconds(),
            "session closed"
        );
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("instance", &self.instance)
            .field("endpoint", &self.endpoint)
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}
