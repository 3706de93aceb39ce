//! Database connection and schema management

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;

/// Connect to a SQLite database file, creating it if needed
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = SqlitePool::connect(&database_url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", db_path.display()))?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .context("Failed to enable WAL mode")?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await
        .context("Failed to set synchronous mode")?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    log::debug!("Connected to SQLite database: {}", db_path.display());
    Ok(pool)
}

/// Connect to an in-memory database.
///
/// Every SQLite connection to `:memory:` opens its own database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn connect_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to connect to in-memory database")?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    log::debug!("Connected to in-memory SQLite database");
    Ok(pool)
}

/// Apply pending schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    log::debug!("Running database migrations");
    crate::config::migrations::MigrationManager::new(pool)
        .migrate_up()
        .await
}

/// Get database info for debugging
pub async fn get_db_info(pool: &SqlitePool) -> Result<DatabaseInfo> {
    let sqlite_version: String = sqlx::query_scalar("SELECT sqlite_version()")
        .fetch_one(pool)
        .await
        .context("Failed to get SQLite version")?;

    let schema_version = crate::config::migrations::get_current_version(pool)
        .await?
        .unwrap_or(0);

    let option_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM options")
        .fetch_one(pool)
        .await
        .context("Failed to count options")?;

    let scope_count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT scope) FROM options")
        .fetch_one(pool)
        .await
        .context("Failed to count scopes")?;

    let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(pool)
        .await
        .context("Failed to get journal mode")?;

    Ok(DatabaseInfo {
        sqlite_version,
        schema_version,
        option_count,
        scope_count,
        journal_mode,
    })
}

#[derive(Debug)]
pub struct DatabaseInfo {
    pub sqlite_version: String,
    pub schema_version: i64,
    pub option_count: i64,
    pub scope_count: i64,
    pub journal_mode: String,
}
