use std::sync::Arc;

use aquadesk_auth::TokenCodec;
use aquadesk_config::{AuthConfig, CorsConfig, DatabaseConfig, JwtConfig};
use aquadesk_db::init_db_pool;

use crate::middleware::resolver::CredentialResolver;
use crate::modules::principals::{PgPrincipalStore, PrincipalStore};

#[derive(Clone, Debug)]
pub struct AppState {
    pub resolver: CredentialResolver,
    pub store: Arc<dyn PrincipalStore>,
    pub codec: Arc<TokenCodec>,
    pub auth_config: AuthConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        jwt_config: &JwtConfig,
        auth_config: AuthConfig,
        cors_config: CorsConfig,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(jwt_config));
        let resolver = CredentialResolver::new(store.clone(), codec.clone(), &auth_config);

        Self {
            resolver,
            store,
            codec,
            auth_config,
            cors_config,
        }
    }
}

/// Builds the state from the environment, connecting to Postgres.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
    let store: Arc<dyn PrincipalStore> = Arc::new(PgPrincipalStore::new(pool));

    Ok(AppState::new(
        store,
        &JwtConfig::from_env(),
        AuthConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
