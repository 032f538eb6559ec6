//! # SchoolHub DB
//!
//! Connection pool construction, the embedded migrator and the destructive
//! reset used by `--reset-db` and the CLI.
//!
//! ```ignore
//! use schoolhub_config::DatabaseConfig;
//!
//! let pool = schoolhub_db::init_db_pool(&DatabaseConfig::from_env()).await?;
//! schoolhub_db::run_migrations(&pool).await?;
//! ```

use schoolhub_config::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

pub use sqlx::PgPool;

/// Migrations under the workspace `migrations/` directory, embedded at
/// compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Drops every table and enum type in the `public` schema, including the
/// migration bookkeeping table, then migrates from scratch.
pub async fn reset_database(pool: &PgPool) -> Result<(), MigrateError> {
    warn!("Resetting database: dropping all tables in the public schema");

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT tablename::text FROM pg_tables WHERE schemaname = 'public'")
            .fetch_all(pool)
            .await?;

    if let Some(sql) = build_drop_statement("TABLE", &tables) {
        sqlx::query(&sql).execute(pool).await?;
    }
    info!(count = tables.len(), "Dropped tables");

    let types: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT t.typname::text
        FROM pg_type t
        JOIN pg_namespace n ON n.oid = t.typnamespace
        WHERE n.nspname = 'public' AND t.typtype = 'e'
        "#,
    )
    .fetch_all(pool)
    .await?;

    if let Some(sql) = build_drop_statement("TYPE", &types) {
        sqlx::query(&sql).execute(pool).await?;
    }
    info!(count = types.len(), "Dropped enum types");

    run_migrations(pool).await
}

/// `DROP <kind> IF EXISTS "a", "b" CASCADE`, or `None` when there is
/// nothing to drop.
pub fn build_drop_statement(kind: &str, names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }

    let quoted: Vec<String> = names
        .iter()
        .map(|name| format!("\"{}\"", name.replace('"', "\"\"")))
        .collect();

    Some(format!(
        "DROP {} IF EXISTS {} CASCADE",
        kind,
        quoted.join(", ")
    ))
}
