//! In-memory principal store for tests and local runs without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use aquadesk_core::privileges::roles::GRANTS;
use aquadesk_models::{
    Privilege, PrivilegeId, Role, RoleId, RolePrivilege, User, UserId, UserRole,
};

use super::store::{PrincipalRecord, PrincipalStore, StoreError, load_principal_by_parts};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    privileges: HashMap<PrivilegeId, Privilege>,
    role_privileges: Vec<RolePrivilege>,
    user_roles: Vec<UserRole>,
}

/// Principal store holding its tables in process memory.
///
/// Counts calls to [`PrincipalStore::load_principal`] and can simulate an
/// unreachable or slow backend.
#[derive(Debug, Default)]
pub struct MemoryPrincipalStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    latency: RwLock<Option<Duration>>,
    lookups: AtomicUsize,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with the standard customer-service roles.
    pub fn with_standard_roles() -> Self {
        let store = Self::new();
        for (role_name, privilege_names) in GRANTS {
            let role = store.add_role(role_name);
            for name in privilege_names.iter() {
                let privilege = store
                    .privilege_id(name)
                    .unwrap_or_else(|| store.add_privilege(name));
                store.grant(role, privilege);
            }
        }
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_user(&self, user: User) -> UserId {
        let id = user.id;
        self.write().users.insert(id, user);
        id
    }

    pub fn add_user(&self, email: &str, full_name: &str) -> UserId {
        self.insert_user(User {
            id: UserId::new(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            is_temporary_password: false,
        })
    }

    pub fn add_role(&self, name: &str) -> RoleId {
        let id = RoleId::new();
        self.write().roles.insert(
            id,
            Role {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    /// Adds a privilege. Names are not unique, matching the database schema.
    pub fn add_privilege(&self, name: &str) -> PrivilegeId {
        let id = PrivilegeId::new();
        self.write().privileges.insert(
            id,
            Privilege {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    pub fn role_id(&self, name: &str) -> Option<RoleId> {
        self.read()
            .roles
            .values()
            .find(|r| r.name == name)
            .map(|r| r.id)
    }

    pub fn privilege_id(&self, name: &str) -> Option<PrivilegeId> {
        self.read()
            .privileges
            .values()
            .find(|p| p.name == name)
            .map(|p| p.id)
    }

    pub fn grant(&self, role_id: RoleId, privilege_id: PrivilegeId) {
        let mut tables = self.write();
        let exists = tables
            .role_privileges
            .iter()
            .any(|rp| rp.role_id == role_id && rp.privilege_id == privilege_id);
        if !exists {
            tables.role_privileges.push(RolePrivilege {
                role_id,
                privilege_id,
            });
        }
    }

    pub fn assign(&self, user_id: UserId, role_id: RoleId) {
        let mut tables = self.write();
        let exists = tables
            .user_roles
            .iter()
            .any(|ur| ur.user_id == user_id && ur.role_id == role_id);
        if !exists {
            tables.user_roles.push(UserRole {
                user_id,
                role_id,
                assigned_by: None,
                assigned_at: Utc::now(),
            });
        }
    }

    pub fn revoke(&self, user_id: UserId, role_id: RoleId) {
        self.write()
            .user_roles
            .retain(|ur| !(ur.user_id == user_id && ur.role_id == role_id));
    }

    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every principal load by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().unwrap_or_else(PoisonError::into_inner) = latency;
    }

    /// Number of principal loads served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_user_by_id(&self, id: &str) -> Result<User, StoreError> {
        self.check_available()?;
        let user_id: UserId = id.parse().map_err(|_| StoreError::NotFound)?;

        self.read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>, StoreError> {
        self.check_available()?;
        let tables = self.read();

        Ok(tables
            .user_roles
            .iter()
            .filter(|ur| ur.user_id == user_id)
            .filter_map(|ur| tables.roles.get(&ur.role_id).cloned())
            .collect())
    }

    async fn privileges_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> Result<Vec<Privilege>, StoreError> {
        self.check_available()?;
        let tables = self.read();

        Ok(tables
            .role_privileges
            .iter()
            .filter(|rp| role_ids.contains(&rp.role_id))
            .filter_map(|rp| tables.privileges.get(&rp.privilege_id).cloned())
            .collect())
    }

    async fn load_principal(&self, id: &str) -> Result<PrincipalRecord, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        load_principal_by_parts(self, id).await
    }
}
