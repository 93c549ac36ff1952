//! The principal store contract and the aggregation shared by every backend.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use thiserror::Error;

use aquadesk_auth::Principal;
use aquadesk_models::{Privilege, PrivilegeId, Role, RoleId, User, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,
    /// Two distinct privileges reach the same user under one name.
    #[error("privilege name {name:?} is shared by {first} and {second}")]
    PrivilegeNameCollision {
        name: String,
        first: PrivilegeId,
        second: PrivilegeId,
    },
    #[error("principal store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

impl StoreError {
    pub fn reason(&self) -> &'static str {
        match self {
            StoreError::NotFound => "not_found",
            StoreError::PrivilegeNameCollision { .. } => "privilege_name_collision",
            StoreError::Unavailable(_) => "unavailable",
        }
    }
}

/// A user together with everything granted to them, as loaded from the store.
///
/// Roles and privileges are deduplicated by id on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub user: User,
    pub roles: Vec<Role>,
    pub privileges: Vec<Privilege>,
}

impl PrincipalRecord {
    pub fn new(
        user: User,
        roles: impl IntoIterator<Item = Role>,
        privileges: impl IntoIterator<Item = Privilege>,
    ) -> Result<Self, StoreError> {
        let roles: BTreeMap<RoleId, Role> = roles.into_iter().map(|r| (r.id, r)).collect();

        Ok(Self {
            user,
            roles: roles.into_values().collect(),
            privileges: union_privileges(privileges)?,
        })
    }

    pub fn into_principal(self) -> Principal {
        Principal {
            user_id: self.user.id.to_string(),
            email: self.user.email,
            full_name: self.user.full_name,
            is_temporary_password: self.user.is_temporary_password,
            roles: self.roles.into_iter().map(|r| r.name).collect(),
            privileges: self.privileges.into_iter().map(|p| p.name).collect(),
        }
    }
}

/// Unions privileges coming from several roles.
///
/// The same privilege reached through two roles counts once. Two different
/// privileges carrying the same name are rejected.
pub fn union_privileges(
    privileges: impl IntoIterator<Item = Privilege>,
) -> Result<Vec<Privilege>, StoreError> {
    let by_id: BTreeMap<PrivilegeId, Privilege> =
        privileges.into_iter().map(|p| (p.id, p)).collect();

    let mut names: HashMap<&str, PrivilegeId> = HashMap::with_capacity(by_id.len());
    for privilege in by_id.values() {
        if let Some(&first) = names.get(privilege.name.as_str()) {
            return Err(StoreError::PrivilegeNameCollision {
                name: privilege.name.clone(),
                first,
                second: privilege.id,
            });
        }
        names.insert(privilege.name.as_str(), privilege.id);
    }

    Ok(by_id.into_values().collect())
}

/// Read access to users and their grants.
///
/// `id` arguments are the raw identifiers received from callers. User ids are
/// UUIDs in both stores, so a value such as `u1` that does not parse as a UUID
/// resolves to [`StoreError::NotFound`] without a lookup.
#[async_trait]
pub trait PrincipalStore: Send + Sync + std::fmt::Debug {
    async fn find_user_by_id(&self, id: &str) -> Result<User, StoreError>;

    async fn roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>, StoreError>;

    async fn privileges_for_roles(&self, role_ids: &[RoleId])
    -> Result<Vec<Privilege>, StoreError>;

    /// Loads a user with all roles and the union of their privileges.
    async fn load_principal(&self, id: &str) -> Result<PrincipalRecord, StoreError> {
        load_principal_by_parts(self, id).await
    }
}

/// Builds a [`PrincipalRecord`] from the three fine-grained lookups.
pub async fn load_principal_by_parts<S>(store: &S, id: &str) -> Result<PrincipalRecord, StoreError>
where
    S: PrincipalStore + ?Sized,
{
    let user = store.find_user_by_id(id).await?;
    let roles = store.roles_for_user(user.id).await?;
    let role_ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();
    let privileges = if role_ids.is_empty() {
        Vec::new()
    } else {
        store.privileges_for_roles(&role_ids).await?
    };

    PrincipalRecord::new(user, roles, privileges)
}
