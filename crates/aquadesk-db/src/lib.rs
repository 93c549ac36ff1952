//! # AquaDesk DB
//!
//! PostgreSQL connection pool and embedded migrations for the AquaDesk API.
//!
//! # Example
//!
//! ```ignore
//! use aquadesk_config::DatabaseConfig;
//! use aquadesk_db::init_db_pool;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//!     Ok(())
//! }
//! ```

use anyhow::Context;
use aquadesk_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

/// Creates the PostgreSQL connection pool and, when configured, applies the
/// embedded migrations.
///
/// The returned pool is cheaply cloneable and is shared by every request; the
/// principal store only ever reads from it.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the connection cannot be
/// established, or a migration fails.
pub async fn init_db_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let url = config
        .url
        .as_deref()
        .context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Applies the migrations embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");
    Ok(())
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
