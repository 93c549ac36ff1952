use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use aquadesk_models::{Privilege, PrivilegeId, Role, RoleId, User, UserId};

use super::store::{PrincipalRecord, PrincipalStore, StoreError};

/// Principal store backed by the CRM Postgres database.
#[derive(Clone, Debug)]
pub struct PgPrincipalStore {
    db: PgPool,
}

impl PgPrincipalStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// One row of the user ⟶ role ⟶ privilege join.
#[derive(Debug, Clone, FromRow)]
struct PrincipalRow {
    user_id: UserId,
    email: String,
    full_name: String,
    is_temporary_password: bool,
    role_id: Option<RoleId>,
    role_name: Option<String>,
    privilege_id: Option<PrivilegeId>,
    privilege_name: Option<String>,
}

fn parse_user_id(id: &str) -> Result<UserId, StoreError> {
    id.parse::<UserId>().map_err(|_| StoreError::NotFound)
}

fn fold_rows(rows: Vec<PrincipalRow>) -> Result<PrincipalRecord, StoreError> {
    let first = rows.first().ok_or(StoreError::NotFound)?;
    let user = User {
        id: first.user_id,
        email: first.email.clone(),
        full_name: first.full_name.clone(),
        is_temporary_password: first.is_temporary_password,
    };

    let mut roles = Vec::new();
    let mut privileges = Vec::new();
    for row in rows {
        if let (Some(id), Some(name)) = (row.role_id, row.role_name) {
            roles.push(Role { id, name });
        }
        if let (Some(id), Some(name)) = (row.privilege_id, row.privilege_name) {
            privileges.push(Privilege { id, name });
        }
    }

    PrincipalRecord::new(user, roles, privileges)
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: &str) -> Result<User, StoreError> {
        let user_id = parse_user_id(id)?;

        sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, is_temporary_password FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self))]
    async fn roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>, StoreError> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.id, r.name
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }

    #[instrument(skip(self))]
    async fn privileges_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> Result<Vec<Privilege>, StoreError> {
        let ids: Vec<Uuid> = role_ids.iter().map(|id| id.into_inner()).collect();

        let privileges = sqlx::query_as::<_, Privilege>(
            r#"
            SELECT DISTINCT p.id, p.name
            FROM privileges p
            INNER JOIN role_privileges rp ON rp.privilege_id = p.id
            WHERE rp.role_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(privileges)
    }

    /// Single round-trip: one joined query returns the user, its roles and
    /// their privileges.
    #[instrument(skip(self))]
    async fn load_principal(&self, id: &str) -> Result<PrincipalRecord, StoreError> {
        let user_id = parse_user_id(id)?;

        let rows = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.email,
                u.full_name,
                u.is_temporary_password,
                r.id AS role_id,
                r.name AS role_name,
                p.id AS privilege_id,
                p.name AS privilege_name
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            LEFT JOIN role_privileges rp ON rp.role_id = r.id
            LEFT JOIN privileges p ON p.id = rp.privilege_id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        fold_rows(rows)
    }
}
