//! Upserts the standard customer-service roles and their privileges.

use std::collections::HashMap;
use std::time::Instant;

use anyhow::Context;
use aquadesk_core::privileges::{self, roles::GRANTS};
use aquadesk_models::{PrivilegeId, RoleId};
use sqlx::{PgPool, Postgres, Transaction};

/// Ids of everything [`seed_roles`] created or found.
#[derive(Debug, Default)]
pub struct SeededRoles {
    pub roles: HashMap<&'static str, RoleId>,
    pub privileges: HashMap<&'static str, PrivilegeId>,
}

/// Creates the standard roles and privileges and grants each role its
/// privileges. Safe to run repeatedly.
pub async fn seed_roles(db: &PgPool) -> anyhow::Result<SeededRoles> {
    let start_time = Instant::now();
    tracing::info!(
        roles = GRANTS.len(),
        privileges = privileges::ALL.len(),
        "Seeding roles and privileges"
    );

    let mut tx = db.begin().await?;
    let mut seeded = SeededRoles::default();

    for &name in privileges::ALL {
        let id = upsert_privilege(&mut tx, name).await?;
        seeded.privileges.insert(name, id);
    }

    for &(role, grants) in GRANTS {
        let role_id: RoleId = sqlx::query_scalar(
            r#"
            INSERT INTO roles (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        for privilege in grants {
            let privilege_id = seeded
                .privileges
                .get(privilege)
                .copied()
                .with_context(|| format!("Role {role} grants unknown privilege {privilege}"))?;

            sqlx::query(
                "INSERT INTO role_privileges (role_id, privilege_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(role_id)
            .bind(privilege_id)
            .execute(&mut *tx)
            .await?;
        }

        seeded.roles.insert(role, role_id);
    }

    tx.commit().await?;

    tracing::info!(
        roles = seeded.roles.len(),
        elapsed = ?start_time.elapsed(),
        "Seeded roles"
    );

    Ok(seeded)
}

/// Privilege names are not unique in the schema, so reuse the oldest row
/// with this name if there is one.
async fn upsert_privilege(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> anyhow::Result<PrivilegeId> {
    let existing: Option<PrivilegeId> = sqlx::query_scalar(
        "SELECT id FROM privileges WHERE name = $1 ORDER BY created_at LIMIT 1",
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar("INSERT INTO privileges (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

    Ok(id)
}
