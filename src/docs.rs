use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use aquadesk_auth::Principal;
use aquadesk_core::ErrorBody;

use crate::middleware::resolver::Strategy;
use crate::modules::session::model::{
    PrincipalResponse, PrivilegeCheck, PrivilegeCheckResponse, SessionData, SessionResponse,
    WhoAmIData, WhoAmIResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::session::controller::get_session,
        crate::modules::session::controller::whoami,
        crate::modules::session::controller::check_privilege,
        crate::modules::session::controller::get_principal,
    ),
    components(
        schemas(
            Principal,
            Strategy,
            ErrorBody,
            SessionData,
            SessionResponse,
            WhoAmIData,
            WhoAmIResponse,
            PrivilegeCheck,
            PrivilegeCheckResponse,
            PrincipalResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Caller identity and privileges")
    ),
    info(
        title = "AquaDesk API",
        version = "0.1.0",
        description = "Customer-service back office for water utilities. Requests are authenticated by the gateway identity header, an access-token cookie or a user identifier.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "trusted_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Data"))),
            );
            components.add_security_scheme(
                "access_token",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("accessToken"))),
            );
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("userId"))),
            );
        }
    }
}
