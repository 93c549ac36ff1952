use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{check_privilege, get_principal, get_session, whoami};

/// Routes that need an authenticated caller; mount behind `require_auth`.
pub fn init_session_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_session))
        .route("/privileges/{privilege}", get(check_privilege))
        .route("/principals/{user_id}", get(get_principal))
}

/// Routes that also serve anonymous callers; mount behind `optional_auth`.
pub fn init_public_session_router() -> Router<AppState> {
    Router::new().route("/whoami", get(whoami))
}
