use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use aquadesk_core::{AppError, ErrorBody};

use crate::middleware::auth::{CurrentPrincipal, MaybePrincipal, RequireManageUsers};
use crate::modules::principals::StoreError;
use crate::state::AppState;

use super::model::{
    PrincipalResponse, PrivilegeCheck, PrivilegeCheckResponse, SessionData, SessionResponse,
    WhoAmIData, WhoAmIResponse,
};

/// Get the authenticated caller
#[utoipa::path(
    get,
    path = "/api/session/me",
    responses(
        (status = 200, description = "Authenticated principal", body = SessionResponse),
        (status = 401, description = "No usable credential", body = ErrorBody)
    ),
    security(
        ("trusted_header" = []),
        ("access_token" = []),
        ("user_id" = [])
    ),
    tag = "Session"
)]
#[instrument(skip(current))]
pub async fn get_session(current: CurrentPrincipal) -> Json<SessionResponse> {
    let CurrentPrincipal(auth) = current;

    Json(SessionResponse {
        success: true,
        data: SessionData {
            principal: auth.principal().clone(),
            strategy: auth.strategy(),
        },
    })
}

/// Describe the caller, authenticated or not
#[utoipa::path(
    get,
    path = "/api/session/whoami",
    responses(
        (status = 200, description = "Caller description; `principal` is null for anonymous callers", body = WhoAmIResponse)
    ),
    tag = "Session"
)]
#[instrument(skip(maybe))]
pub async fn whoami(maybe: MaybePrincipal) -> Json<WhoAmIResponse> {
    let MaybePrincipal(auth) = maybe;

    Json(WhoAmIResponse {
        success: true,
        data: WhoAmIData {
            authenticated: auth.is_some(),
            principal: auth.as_ref().map(|a| a.principal().clone()),
            strategy: auth.as_ref().map(|a| a.strategy()),
        },
    })
}

/// Check whether the caller holds a privilege
#[utoipa::path(
    get,
    path = "/api/session/privileges/{privilege}",
    params(
        ("privilege" = String, Path, description = "Privilege name, e.g. `view_tickets`")
    ),
    responses(
        (status = 200, description = "Privilege check result", body = PrivilegeCheckResponse),
        (status = 401, description = "No usable credential", body = ErrorBody)
    ),
    security(
        ("trusted_header" = []),
        ("access_token" = []),
        ("user_id" = [])
    ),
    tag = "Session"
)]
#[instrument(skip(current))]
pub async fn check_privilege(
    current: CurrentPrincipal,
    Path(privilege): Path<String>,
) -> Json<PrivilegeCheckResponse> {
    let CurrentPrincipal(auth) = current;
    let granted = auth.has_privilege(&privilege);

    Json(PrivilegeCheckResponse {
        success: true,
        data: PrivilegeCheck { privilege, granted },
    })
}

/// Load the live principal of any user (requires `manage_users`)
#[utoipa::path(
    get,
    path = "/api/session/principals/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Live principal of the user", body = PrincipalResponse),
        (status = 401, description = "No usable credential", body = ErrorBody),
        (status = 403, description = "Missing manage_users privilege", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("trusted_header" = []),
        ("access_token" = []),
        ("user_id" = [])
    ),
    tag = "Session"
)]
#[instrument(skip(state, admin))]
pub async fn get_principal(
    State(state): State<AppState>,
    admin: RequireManageUsers,
    Path(user_id): Path<String>,
) -> Result<Json<PrincipalResponse>, AppError> {
    let RequireManageUsers(admin) = admin;
    tracing::info!(admin_id = %admin.user_id(), "Loading principal for inspection");

    let record = state
        .store
        .load_principal(&user_id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => AppError::not_found(anyhow::anyhow!("User not found")),
            other => AppError::internal(other),
        })?;

    Ok(Json(PrincipalResponse {
        success: true,
        data: record.into_principal(),
    }))
}
