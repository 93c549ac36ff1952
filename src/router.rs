use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use aquadesk_config::auth::TRUSTED_HEADER;
use aquadesk_observability::{logging_middleware, metrics_middleware};

use crate::docs::ApiDoc;
use crate::middleware::auth::{optional_auth, require_auth};
use crate::modules::session::router::{init_public_session_router, init_session_router};
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router. `metrics`, when present, is served under
/// the same CORS, metrics and logging layers as every other route.
pub fn init_router(state: AppState, metrics: Option<Router>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest(
            "/api/session",
            init_session_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
                .merge(
                    init_public_session_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth)),
                ),
        )
        .with_state(state.clone())
        .merge(metrics.unwrap_or_default())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(TRUSTED_HEADER),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
