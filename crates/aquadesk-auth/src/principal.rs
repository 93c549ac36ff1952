//! The resolved identity and authorization context of one request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authenticated caller of a request.
///
/// `roles` and `privileges` are sets: duplicates collapse and order carries
/// no meaning. `privileges` only ever contains privileges granted by one of
/// `roles`; a principal built from the trusted gateway header carries an empty
/// privilege set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Opaque user identifier.
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    /// Forces the password-change flow in the front-end.
    pub is_temporary_password: bool,
    #[schema(value_type = Vec<String>)]
    pub roles: BTreeSet<String>,
    #[schema(value_type = Vec<String>)]
    pub privileges: BTreeSet<String>,
}

impl Principal {
    pub fn has_privilege(&self, privilege: &str) -> bool {
        self.privileges.contains(privilege)
    }

    pub fn has_any_privilege(&self, privileges: &[&str]) -> bool {
        privileges.iter().any(|p| self.has_privilege(p))
    }

    pub fn has_all_privileges(&self, privileges: &[&str]) -> bool {
        privileges.iter().all(|p| self.has_privilege(p))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    /// Whether both principals grant the same roles and privileges.
    pub fn same_grants(&self, other: &Principal) -> bool {
        self.roles == other.roles && self.privileges == other.privileges
    }
}
