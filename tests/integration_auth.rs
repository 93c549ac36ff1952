mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aquadesk::aquadesk_auth::Principal;
use aquadesk::aquadesk_config::AuthConfig;
use aquadesk::aquadesk_core::privileges;
use aquadesk::aquadesk_models::{Privilege, Role, RoleId, User, UserId};
use aquadesk::middleware::auth::{MaybePrincipal, optional_auth, require_auth};
use aquadesk::modules::principals::{PrincipalRecord, PrincipalStore, StoreError};
use aquadesk::state::AppState;
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::{Router, middleware, routing};
use serde_json::json;

use common::*;

const NO_CREDENTIAL_MESSAGE: &str = "No se encontraron credenciales válidas";

// ============ Strategy priority ============

#[tokio::test]
async fn test_header_wins_over_valid_token() {
    let app = test_app();
    let token = app
        .codec()
        .sign_access(&principal_from_json(&json!({
            "userId": "token-user",
            "email": "t@x.com",
            "fullName": "T",
            "isTemporaryPassword": false,
            "roles": ["admin"],
            "privileges": ["manage_users"]
        })))
        .unwrap();

    let request = axum::http::Request::builder()
        .uri("/api/session/me")
        .header("X-User-Data", identity_header("u1", "support_agent"))
        .header("Cookie", format!("accessToken={}", token.token))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["strategy"], "trusted_header");
    assert_eq!(body["data"]["principal"]["userId"], "u1");
    assert_eq!(body["data"]["principal"]["privileges"], json!([]));
}

#[tokio::test]
async fn test_malformed_header_falls_through_to_token() {
    let app = test_app();
    let live = app
        .state
        .resolver
        .via_user_id(&U1.to_string())
        .await
        .unwrap();
    let token = app.codec().sign_access(&live).unwrap();
    let lookups_before = app.store.lookups();

    let request = axum::http::Request::builder()
        .uri("/api/session/me")
        .header("X-User-Data", "{\"id\": \"u1\", broken")
        .header("Cookie", format!("accessToken={}", token.token))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["strategy"], "access_token");
    assert_eq!(app.store.lookups(), lookups_before);
}

#[tokio::test]
async fn test_expired_token_falls_through_to_lookup() {
    let app = test_app();
    let live = app
        .state
        .resolver
        .via_user_id(&U1.to_string())
        .await
        .unwrap();
    let stale = app.codec().sign_access_at(&live, 1_000).unwrap();

    let uri = format!("/api/session/me?userId={U1}");
    let (status, body) = send(&app.router, get_with_token(&uri, &stale.token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["strategy"], "user_id_lookup");
}

// ============ Concrete scenario ============

#[tokio::test]
async fn test_support_agent_scenario() {
    let app = test_app();

    // Header path: roles only
    let (status, body) = send(
        &app.router,
        get_with_header("/api/session/me", &identity_header(&U1.to_string(), "support_agent")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["principal"]["roles"], json!(["support_agent"]));
    assert!(privileges_of(&body["data"]["principal"]).is_empty());

    // Identifier path: live privileges
    let (status, body) = send(&app.router, get(&format!("/api/session/me?userId={U1}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["principal"]["email"], "a@x.com");
    assert_eq!(
        privileges_of(&body["data"]["principal"]),
        vec!["assign_tickets", "view_tickets"]
    );
}

#[tokio::test]
async fn test_token_and_lookup_agree() {
    let app = test_app();

    let (_, from_lookup) = send(&app.router, get(&format!("/api/session/me?userId={U2}"))).await;
    let live = principal_from_json(&from_lookup["data"]["principal"]);

    let token = app.codec().sign_access(&live).unwrap();
    let (_, from_token) = send(&app.router, get_with_token("/api/session/me", &token.token)).await;
    let embedded = principal_from_json(&from_token["data"]["principal"]);

    assert_eq!(from_token["data"]["strategy"], "access_token");
    assert!(embedded.same_grants(&live));
    assert!(embedded.is_temporary_password);
}

#[tokio::test]
async fn test_privilege_closure_over_two_roles() {
    let app = test_app();
    let support = app
        .store
        .role_id(privileges::roles::SUPPORT_AGENT)
        .unwrap();
    app.store.assign(U2, support);

    let (status, body) = send(&app.router, get(&format!("/api/session/me?userId={U2}"))).await;
    assert_eq!(status, StatusCode::OK);

    // supervisor ∪ support_agent; view/assign overlap counted once
    assert_eq!(
        privileges_of(&body["data"]["principal"]),
        vec![
            "assign_tickets",
            "close_tickets",
            "create_work_orders",
            "view_contracts",
            "view_tickets"
        ]
    );
}

// ============ Required mode ============

#[tokio::test]
async fn test_required_without_credentials_is_401() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/api/session/me")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "message": NO_CREDENTIAL_MESSAGE })
    );
}

#[tokio::test]
async fn test_unknown_user_is_401() {
    let app = test_app();
    let uri = format!("/api/session/me?userId={}", UserId::from_u128(0x404));
    let (status, body) = send(&app.router, get(&uri)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], NO_CREDENTIAL_MESSAGE);
}

#[tokio::test]
async fn test_store_unavailable_is_401() {
    let app = test_app();
    app.store.set_unavailable(true);

    let (status, body) = send(&app.router, get(&format!("/api/session/me?userId={U1}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], NO_CREDENTIAL_MESSAGE);
}

#[tokio::test]
async fn test_store_timeout_is_401() {
    let app = test_app_with(AuthConfig {
        store_timeout: Duration::from_millis(10),
        ..AuthConfig::default()
    });
    app.store.set_latency(Some(Duration::from_millis(500)));

    let (status, _) = send(&app.router, get(&format!("/api/session/me?userId={U1}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.lookups(), 1);
}

#[tokio::test]
async fn test_fallback_disabled_ignores_user_id() {
    let app = test_app_with(AuthConfig {
        user_id_fallback_enabled: false,
        ..AuthConfig::default()
    });

    let (status, _) = send(&app.router, get(&format!("/api/session/me?userId={U1}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.lookups(), 0);
}

#[tokio::test]
async fn test_custom_unauthorized_message() {
    let app = test_app_with(AuthConfig {
        unauthorized_message: "Credenciales requeridas".to_string(),
        ..AuthConfig::default()
    });

    let (_, body) = send(&app.router, get("/api/session/me")).await;
    assert_eq!(body["message"], "Credenciales requeridas");
}

#[tokio::test]
async fn test_at_most_one_lookup_per_request() {
    let app = test_app();

    for _ in 0..3 {
        send(&app.router, get(&format!("/api/session/me?userId={U1}"))).await;
    }
    assert_eq!(app.store.lookups(), 3);

    send(
        &app.router,
        get_with_header("/api/session/me", &identity_header("u1", "admin")),
    )
    .await;
    assert_eq!(app.store.lookups(), 3);
}

// ============ Optional mode ============

#[tokio::test]
async fn test_whoami_anonymous() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/api/session/whoami")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["authenticated"], false);
    assert!(body["data"]["principal"].is_null());
}

#[tokio::test]
async fn test_whoami_store_unavailable_is_anonymous() {
    let app = test_app();
    app.store.set_unavailable(true);

    let (status, body) =
        send(&app.router, get(&format!("/api/session/whoami?userId={U1}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["authenticated"], false);
}

#[tokio::test]
async fn test_whoami_authenticated() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        get_with_header("/api/session/whoami", &identity_header("u7", "supervisor")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["authenticated"], true);
    assert_eq!(body["data"]["strategy"], "trusted_header");
    assert_eq!(body["data"]["principal"]["userId"], "u7");
}

// ============ Handler invocation ============

fn counting_router(state: AppState, hits: Arc<AtomicUsize>, required: bool) -> Router {
    let handler = move |MaybePrincipal(principal): MaybePrincipal| {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            if principal.is_some() { "principal" } else { "anonymous" }
        }
    };

    let router = Router::new().route("/probe", routing::get(handler));
    let router = if required {
        router.route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
    } else {
        router.route_layer(middleware::from_fn_with_state(state.clone(), optional_auth))
    };
    router.with_state(state)
}

async fn probe(router: &Router, uri: &str) -> (StatusCode, String) {
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let response = router.clone().oneshot(get(uri)).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_required_does_not_invoke_handler() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = counting_router(
        state_with(seeded_store(), AuthConfig::default()),
        hits.clone(),
        true,
    );

    let (status, _) = probe(&router, "/probe").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let (status, body) = probe(&router, &format!("/probe?userId={U1}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "principal");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_optional_invokes_handler_once_without_principal() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = counting_router(
        state_with(seeded_store(), AuthConfig::default()),
        hits.clone(),
        false,
    );

    let (status, body) = probe(&router, "/probe?userId=not-a-user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "anonymous");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ============ Faulty store ============

#[derive(Debug)]
struct PanickingStore;

#[async_trait]
impl PrincipalStore for PanickingStore {
    async fn find_user_by_id(&self, _id: &str) -> Result<User, StoreError> {
        panic!("store exploded")
    }

    async fn roles_for_user(&self, _user_id: UserId) -> Result<Vec<Role>, StoreError> {
        panic!("store exploded")
    }

    async fn privileges_for_roles(
        &self,
        _role_ids: &[RoleId],
    ) -> Result<Vec<Privilege>, StoreError> {
        panic!("store exploded")
    }

    async fn load_principal(&self, _id: &str) -> Result<PrincipalRecord, StoreError> {
        panic!("store exploded")
    }
}

#[tokio::test]
async fn test_panicking_store_is_generic_401_in_required_mode() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = counting_router(
        state_with(Arc::new(PanickingStore), AuthConfig::default()),
        hits.clone(),
        true,
    );

    let (status, body) = probe(&router, "/probe?userId=u1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("\"message\":\"Unauthorized\""));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_panicking_store_is_anonymous_in_optional_mode() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = counting_router(
        state_with(Arc::new(PanickingStore), AuthConfig::default()),
        hits.clone(),
        false,
    );

    let (status, body) = probe(&router, "/probe?userId=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "anonymous");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_header_principal_never_touches_faulty_store() {
    let state = state_with(Arc::new(PanickingStore), AuthConfig::default());
    let resolved: Principal = state
        .resolver
        .via_trusted_header(identity_header("u1", "support_agent").as_bytes())
        .unwrap();
    assert!(resolved.has_role("support_agent"));
}
