//! Role and privilege models.
//!
//! Privileges reach users only through roles: `users ⟷ user_roles ⟷ roles ⟷
//! role_privileges ⟷ privileges`. This subsystem only reads these tables.

use crate::ids::{PrivilegeId, RoleId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Privilege {
    pub id: PrivilegeId,
    pub name: String,
}

/// Grant of a privilege to a role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RolePrivilege {
    pub role_id: RoleId,
    pub privilege_id: PrivilegeId,
}

/// Assignment of a role to a user, with who granted it and when.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserRole {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub assigned_by: Option<UserId>,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}
