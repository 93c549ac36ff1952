#![allow(dead_code)]

use std::sync::Arc;

use aquadesk::aquadesk_auth::{Principal, TokenCodec};
use aquadesk::aquadesk_config::{AuthConfig, CorsConfig, JwtConfig};
use aquadesk::aquadesk_core::privileges;
use aquadesk::aquadesk_models::{User, UserId};
use aquadesk::modules::principals::{MemoryPrincipalStore, PrincipalStore};
use aquadesk::router::init_router;
use aquadesk::state::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Well-known test users
pub const U1: UserId = UserId::from_u128(0x01);
pub const U2: UserId = UserId::from_u128(0x02);

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    }
}

pub fn cors_config() -> CorsConfig {
    CorsConfig {
        allowed_origins: vec!["http://localhost:5173".to_string()],
    }
}

pub struct TestApp {
    pub store: Arc<MemoryPrincipalStore>,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn codec(&self) -> &TokenCodec {
        &self.state.codec
    }
}

/// Memory store with the standard roles, `U1` as a support agent and `U2` as
/// a supervisor.
pub fn seeded_store() -> Arc<MemoryPrincipalStore> {
    let store = MemoryPrincipalStore::with_standard_roles();

    store.insert_user(User {
        id: U1,
        email: "a@x.com".to_string(),
        full_name: "A".to_string(),
        is_temporary_password: false,
    });
    store.assign(U1, store.role_id(privileges::roles::SUPPORT_AGENT).unwrap());

    store.insert_user(User {
        id: U2,
        email: "b@x.com".to_string(),
        full_name: "B".to_string(),
        is_temporary_password: true,
    });
    store.assign(U2, store.role_id(privileges::roles::SUPERVISOR).unwrap());

    Arc::new(store)
}

pub fn state_with(store: Arc<dyn PrincipalStore>, auth_config: AuthConfig) -> AppState {
    AppState::new(store, &jwt_config(), auth_config, cors_config())
}

pub fn test_app_with(auth_config: AuthConfig) -> TestApp {
    let store = seeded_store();
    let state = state_with(store.clone(), auth_config);
    let router = init_router(state.clone(), None);

    TestApp {
        store,
        state,
        router,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(AuthConfig::default())
}

/// `X-User-Data` payload for the given id with one role.
pub fn identity_header(id: &str, role: &str) -> String {
    format!(
        r#"{{"id":"{id}","email":"a@x.com","is_temporary_password":false,"full_name":"A","roles":[{{"name":"{role}"}}]}}"#
    )
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_header(uri: &str, header: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-User-Data", header)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Cookie", format!("accessToken={token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Privilege names of a principal JSON object, sorted.
pub fn privileges_of(principal: &Value) -> Vec<String> {
    let mut names: Vec<String> = principal["privileges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

pub fn principal_from_json(value: &Value) -> Principal {
    serde_json::from_value(value.clone()).unwrap()
}
