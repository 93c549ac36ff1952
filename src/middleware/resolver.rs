//! Credential resolution: turns the credentials of one request into a
//! [`Principal`].
//!
//! Strategies are tried in a fixed order and the first valid result wins:
//!
//! 1. Trusted gateway header (`X-User-Data`). Yields roles but never
//!    privileges.
//! 2. Signed access token (`accessToken` cookie). Taken verbatim from its
//!    claims, no store round-trip.
//! 3. Bare user identifier (`userId` query parameter). Loaded live from the
//!    principal store in exactly one round-trip.
//!
//! Failures of strategies 1 and 2 are local and fall through. A failure of
//! strategy 3 is final. The cause of a failure only reaches logs and metrics;
//! callers see a single "no usable credential" outcome.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use aquadesk_auth::{InvalidHeader, Principal, TokenCodec, VerificationFailure, parse_trusted_header};
use aquadesk_config::AuthConfig;
use aquadesk_observability::{track_auth_resolution, track_strategy_failure};

use crate::middleware::credentials::RequestCredentials;
use crate::modules::principals::{PrincipalStore, StoreError};

/// Which strategy produced a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    TrustedHeader,
    AccessToken,
    UserIdLookup,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::TrustedHeader => "trusted_header",
            Strategy::AccessToken => "access_token",
            Strategy::UserIdLookup => "user_id_lookup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrincipal {
    pub principal: Principal,
    pub strategy: Strategy,
}

#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("no usable credential")]
    NoCredential,
    #[error("user identifier fallback is disabled")]
    FallbackDisabled,
    #[error("unknown user")]
    UnknownUser,
    #[error("principal store failed: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("principal store timed out after {0:?}")]
    StoreTimeout(Duration),
    /// Resolution aborted unexpectedly (a panic inside a strategy).
    #[error("credential resolution aborted")]
    Internal,
}

impl ResolutionFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            ResolutionFailure::NoCredential => "no_credential",
            ResolutionFailure::FallbackDisabled => "fallback_disabled",
            ResolutionFailure::UnknownUser => "unknown_user",
            ResolutionFailure::StoreUnavailable(_) => "store_unavailable",
            ResolutionFailure::StoreTimeout(_) => "store_timeout",
            ResolutionFailure::Internal => "internal",
        }
    }

    /// Whether the failure came from a fault rather than from the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ResolutionFailure::StoreUnavailable(_)
                | ResolutionFailure::StoreTimeout(_)
                | ResolutionFailure::Internal
        )
    }
}

impl From<StoreError> for ResolutionFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ResolutionFailure::UnknownUser,
            other => ResolutionFailure::StoreUnavailable(other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CredentialResolver {
    store: Arc<dyn PrincipalStore>,
    codec: Arc<TokenCodec>,
    store_timeout: Duration,
    user_id_fallback_enabled: bool,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn PrincipalStore>, codec: Arc<TokenCodec>, config: &AuthConfig) -> Self {
        Self {
            store,
            codec,
            store_timeout: config.store_timeout,
            user_id_fallback_enabled: config.user_id_fallback_enabled,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Resolves the principal of a request.
    pub async fn resolve(
        &self,
        creds: &RequestCredentials,
    ) -> Result<ResolvedPrincipal, ResolutionFailure> {
        let result = self.try_strategies(creds).await;

        match &result {
            Ok(resolved) => {
                track_auth_resolution(resolved.strategy.as_str(), "success");
                debug!(
                    strategy = resolved.strategy.as_str(),
                    user_id = %resolved.principal.user_id,
                    "Credential resolved"
                );
            }
            Err(failure) => {
                track_auth_resolution("none", failure.reason());
                if failure.is_internal() {
                    error!(reason = failure.reason(), error = %failure, "Credential resolution failed");
                } else {
                    debug!(reason = failure.reason(), "No usable credential");
                }
            }
        }

        result
    }

    async fn try_strategies(
        &self,
        creds: &RequestCredentials,
    ) -> Result<ResolvedPrincipal, ResolutionFailure> {
        if let Some(raw) = &creds.trusted_header {
            match self.via_trusted_header(raw) {
                Ok(principal) => return Ok(resolved(principal, Strategy::TrustedHeader)),
                Err(err) => {
                    track_strategy_failure(Strategy::TrustedHeader.as_str(), err.reason());
                    warn!(reason = err.reason(), "Ignoring invalid identity header");
                }
            }
        }

        if let Some(token) = &creds.access_token {
            match self.via_access_token(token) {
                Ok(principal) => return Ok(resolved(principal, Strategy::AccessToken)),
                Err(err) => {
                    track_strategy_failure(Strategy::AccessToken.as_str(), err.reason());
                    debug!(reason = err.reason(), "Ignoring unusable access token");
                }
            }
        }

        match &creds.user_id {
            Some(id) => {
                let principal = self.via_user_id(id).await.inspect_err(|failure| {
                    track_strategy_failure(Strategy::UserIdLookup.as_str(), failure.reason());
                })?;
                Ok(resolved(principal, Strategy::UserIdLookup))
            }
            None => Err(ResolutionFailure::NoCredential),
        }
    }

    pub fn via_trusted_header(&self, raw: &[u8]) -> Result<Principal, InvalidHeader> {
        parse_trusted_header(raw).map(|identity| identity.into_principal())
    }

    pub fn via_access_token(&self, token: &str) -> Result<Principal, VerificationFailure> {
        self.codec
            .verify_access(token)
            .map(|claims| claims.into_principal())
    }

    /// Loads the principal for a bare identifier.
    ///
    /// One store round-trip, bounded by the configured timeout, never retried.
    pub async fn via_user_id(&self, id: &str) -> Result<Principal, ResolutionFailure> {
        if !self.user_id_fallback_enabled {
            return Err(ResolutionFailure::FallbackDisabled);
        }

        match tokio::time::timeout(self.store_timeout, self.store.load_principal(id)).await {
            Ok(Ok(record)) => Ok(record.into_principal()),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(ResolutionFailure::StoreTimeout(self.store_timeout)),
        }
    }
}

fn resolved(principal: Principal, strategy: Strategy) -> ResolvedPrincipal {
    ResolvedPrincipal {
        principal,
        strategy,
    }
}
