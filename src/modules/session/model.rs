use serde::Serialize;
use utoipa::ToSchema;

use aquadesk_auth::Principal;

use crate::middleware::resolver::Strategy;

/// The authenticated caller and how they were authenticated.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionData {
    pub principal: Principal,
    pub strategy: Strategy,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub data: SessionData,
}

/// What the server knows about a possibly anonymous caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct WhoAmIData {
    pub authenticated: bool,
    pub principal: Option<Principal>,
    pub strategy: Option<Strategy>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WhoAmIResponse {
    pub success: bool,
    pub data: WhoAmIData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrivilegeCheck {
    pub privilege: String,
    pub granted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrivilegeCheckResponse {
    pub success: bool,
    pub data: PrivilegeCheck,
}

/// Live principal of another user, as an administrator sees it.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrincipalResponse {
    pub success: bool,
    pub data: Principal,
}
