//! Fake user seeding.

use std::collections::HashMap;
use std::time::Instant;

use anyhow::Context;
use aquadesk_core::privileges::roles::{ADMIN, SUPERVISOR, SUPPORT_AGENT};
use aquadesk_models::{RoleId, UserId};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rand::seq::SliceRandom;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::UserSeed;

/// Mostly agents, some supervisors, few admins.
const ROLE_POOL: &[&str] = &[
    SUPPORT_AGENT,
    SUPPORT_AGENT,
    SUPPORT_AGENT,
    SUPPORT_AGENT,
    SUPERVISOR,
    SUPERVISOR,
    ADMIN,
];

/// Generates `count` fake users with random standard roles.
pub fn generate_users(count: usize) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let role = ROLE_POOL
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(SUPPORT_AGENT);

            UserSeed {
                email: format!(
                    "{}.{}+{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    idx
                ),
                full_name: format!("{first_name} {last_name}"),
                is_temporary_password: idx % 5 == 0,
                role,
            }
        })
        .collect()
}

/// Seeds `count` fake users. Requires the standard roles to exist.
pub async fn seed_users(db: &PgPool, count: usize) -> anyhow::Result<Vec<(UserId, RoleId)>> {
    let start_time = Instant::now();
    tracing::info!(count, "Seeding users");

    let role_ids = load_role_ids(db).await?;
    let users = generate_users(count);
    let assignments = insert_users_batch(db, &users, &role_ids).await?;

    tracing::info!(
        users = assignments.len(),
        elapsed = ?start_time.elapsed(),
        "Inserted users"
    );

    Ok(assignments)
}

async fn load_role_ids(db: &PgPool) -> anyhow::Result<HashMap<String, RoleId>> {
    let rows: Vec<(RoleId, String)> =
        sqlx::query_as("SELECT id, name FROM roles WHERE name = ANY($1)")
            .bind(vec![
                SUPPORT_AGENT.to_string(),
                SUPERVISOR.to_string(),
                ADMIN.to_string(),
            ])
            .fetch_all(db)
            .await?;

    let role_ids: HashMap<String, RoleId> = rows.into_iter().map(|(id, name)| (name, id)).collect();
    for role in [SUPPORT_AGENT, SUPERVISOR, ADMIN] {
        if !role_ids.contains_key(role) {
            anyhow::bail!("Role {role} not found. Run `seed-roles` first.");
        }
    }

    Ok(role_ids)
}

/// Inserts users in batches and assigns their roles. Returns the
/// `(user_id, role_id)` pairs created.
pub async fn insert_users_batch(
    db: &PgPool,
    users: &[UserSeed],
    role_ids: &HashMap<String, RoleId>,
) -> anyhow::Result<Vec<(UserId, RoleId)>> {
    let mut tx = db.begin().await?;

    // 3 params per user
    const BATCH_SIZE: usize = 1000;

    let mut assignments = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let user_ids = insert_users_chunk(&mut tx, chunk).await?;
        for (user_id, seed) in user_ids.into_iter().zip(chunk) {
            let role_id = role_ids
                .get(seed.role)
                .copied()
                .with_context(|| format!("Unknown role {}", seed.role))?;
            assignments.push((user_id, role_id));
        }
    }

    for chunk in assignments.chunks(BATCH_SIZE) {
        assign_roles_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(assignments)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> anyhow::Result<Vec<UserId>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO users (email, full_name, is_temporary_password) VALUES ");
    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let base = i * 3;
        query.push_str(&format!("(${}, ${}, ${})", base + 1, base + 2, base + 3));
    }
    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar::<_, UserId>(&query);
    for user in users {
        q = q
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(user.is_temporary_password);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

async fn assign_roles_chunk(
    tx: &mut Transaction<'_, Postgres>,
    assignments: &[(UserId, RoleId)],
) -> anyhow::Result<()> {
    if assignments.is_empty() {
        return Ok(());
    }

    let mut query = String::from("INSERT INTO user_roles (user_id, role_id) VALUES ");
    for i in 0..assignments.len() {
        if i > 0 {
            query.push_str(", ");
        }
        query.push_str(&format!("(${}, ${})", i * 2 + 1, i * 2 + 2));
    }
    query.push_str(" ON CONFLICT DO NOTHING");

    let mut q = sqlx::query(&query);
    for (user_id, role_id) in assignments {
        q = q.bind(*user_id).bind(*role_id);
    }
    q.execute(&mut **tx).await?;

    Ok(())
}
