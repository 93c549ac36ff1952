use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::error;

use aquadesk_auth::Principal;
use aquadesk_core::AppError;

use crate::middleware::credentials::RequestCredentials;
use crate::middleware::resolver::{ResolutionFailure, ResolvedPrincipal, Strategy};
use crate::state::AppState;

/// 401 message for failures that are not the caller's doing.
pub const GENERIC_UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// The principal bound to a request by [`require_auth`] or [`optional_auth`].
///
/// Cheap to clone; the principal itself is immutable and shared.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    principal: Arc<Principal>,
    strategy: Strategy,
}

impl AuthPrincipal {
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// How the caller was authenticated. [`Strategy::UserIdLookup`] is an
    /// unsigned identifier and carries less assurance than the other two.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn user_id(&self) -> &str {
        &self.principal.user_id
    }

    pub fn has_privilege(&self, privilege: &str) -> bool {
        self.principal.has_privilege(privilege)
    }

    pub fn has_any_privilege(&self, privileges: &[&str]) -> bool {
        self.principal.has_any_privilege(privileges)
    }

    pub fn has_all_privileges(&self, privileges: &[&str]) -> bool {
        self.principal.has_all_privileges(privileges)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.principal.has_role(role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.principal.has_any_role(roles)
    }
}

impl From<ResolvedPrincipal> for AuthPrincipal {
    fn from(resolved: ResolvedPrincipal) -> Self {
        Self {
            principal: Arc::new(resolved.principal),
            strategy: resolved.strategy,
        }
    }
}

/// Runs credential resolution, turning a panic anywhere inside it into
/// [`ResolutionFailure::Internal`].
async fn resolve_request(
    state: &AppState,
    creds: RequestCredentials,
) -> Result<AuthPrincipal, ResolutionFailure> {
    match AssertUnwindSafe(state.resolver.resolve(&creds))
        .catch_unwind()
        .await
    {
        Ok(result) => result.map(AuthPrincipal::from),
        Err(_) => {
            error!("Credential resolution panicked");
            Err(ResolutionFailure::Internal)
        }
    }
}

/// Middleware for routes that need an authenticated caller.
///
/// Binds an [`AuthPrincipal`] and continues, or answers 401 without invoking
/// the handler.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let creds = RequestCredentials::from_headers_and_uri(req.headers(), req.uri());

    match resolve_request(&state, creds).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(failure) => {
            let message = match failure {
                ResolutionFailure::Internal => GENERIC_UNAUTHORIZED_MESSAGE,
                _ => state.auth_config.unauthorized_message.as_str(),
            };
            AppError::unauthorized(message).into_response()
        }
    }
}

/// Middleware for routes that serve anonymous callers too.
///
/// Binds an [`AuthPrincipal`] when one resolves; otherwise the handler runs
/// with none. Never fails the request.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let creds = RequestCredentials::from_headers_and_uri(req.headers(), req.uri());

    match resolve_request(&state, creds).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
        }
        Err(_) => {
            req.extensions_mut().remove::<AuthPrincipal>();
        }
    }
    next.run(req).await
}

/// Extractor for handlers behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub AuthPrincipal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthPrincipal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or_else(|| AppError::unauthorized(GENERIC_UNAUTHORIZED_MESSAGE))
    }
}

/// Extractor for handlers behind [`optional_auth`]. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<AuthPrincipal>);

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(parts.extensions.get::<AuthPrincipal>().cloned()))
    }
}

/// Creates an extractor that requires the bound principal to hold a
/// privilege, rejecting with 403 otherwise.
#[macro_export]
macro_rules! require_privilege {
    ($name:ident, $privilege:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthPrincipal);

        impl<S> axum::extract::FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = $crate::aquadesk_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let $crate::middleware::auth::CurrentPrincipal(principal) =
                    <$crate::middleware::auth::CurrentPrincipal as axum::extract::FromRequestParts<
                        S,
                    >>::from_request_parts(parts, state)
                    .await?;

                if !principal.has_privilege($privilege) {
                    return Err($crate::aquadesk_core::AppError::forbidden(format!(
                        "Access denied. Missing required privilege: {}",
                        $privilege
                    )));
                }

                Ok($name(principal))
            }
        }
    };
}

// Tickets
require_privilege!(RequireViewTickets, aquadesk_core::privileges::VIEW_TICKETS);
require_privilege!(RequireAssignTickets, aquadesk_core::privileges::ASSIGN_TICKETS);
require_privilege!(RequireCloseTickets, aquadesk_core::privileges::CLOSE_TICKETS);

// Contracts and work orders
require_privilege!(RequireViewContracts, aquadesk_core::privileges::VIEW_CONTRACTS);
require_privilege!(
    RequireCreateWorkOrders,
    aquadesk_core::privileges::CREATE_WORK_ORDERS
);

// Administration
require_privilege!(RequireManageUsers, aquadesk_core::privileges::MANAGE_USERS);
