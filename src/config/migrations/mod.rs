//! Embedded schema migrations for the options database

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashSet};

pub mod manager;

pub use manager::{MigrationManager, MigrationStatus};

/// A single forward-only migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
}

/// A migration row recorded in `schema_migrations`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

/// Load all migrations embedded from the `files/` directory.
///
/// Each migration lives in its own `NNN_name/` directory holding `up.sql`.
pub fn load_migrations() -> Result<BTreeMap<i64, Migration>> {
    use include_dir::{Dir, include_dir};

    static MIGRATIONS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/config/migrations/files");

    let mut migrations = BTreeMap::new();

    for entry in MIGRATIONS_DIR.dirs() {
        let dir_name = entry
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .context("Invalid migration directory name")?;

        let (version, name) = dir_name.split_once('_').with_context(|| {
            format!("Invalid migration directory format: {}. Expected format: NNN_name", dir_name)
        })?;

        let version: i64 = version
            .parse()
            .with_context(|| format!("Invalid migration version in directory: {}", dir_name))?;

        let up_path = format!("{}/up.sql", dir_name);
        let up_sql = MIGRATIONS_DIR
            .get_file(&up_path)
            .with_context(|| format!("Missing up.sql in migration {}", dir_name))?
            .contents_utf8()
            .with_context(|| format!("up.sql is not valid UTF-8 in migration {}", dir_name))?
            .to_string();

        migrations.insert(
            version,
            Migration {
                version,
                name: name.to_string(),
                up_sql,
            },
        );
    }

    if migrations.is_empty() {
        anyhow::bail!("No migrations found in files directory");
    }

    Ok(migrations)
}

/// Create the migration tracking table if needed
pub async fn init_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            checksum TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

/// List applied migrations in version order
pub async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>> {
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, applied_at, checksum FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get applied migrations")
}

/// Checksum of migration SQL.
///
/// Line endings are normalized to LF first so a checkout with CRLF files
/// produces the same value.
pub fn calculate_checksum(sql: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let normalized = sql.replace("\r\n", "\n").replace('\r', "\n");

    let mut hasher = DefaultHasher::new();
    normalized.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Check that every applied migration still matches its embedded source
pub async fn validate_migrations(pool: &SqlitePool) -> Result<()> {
    let available = load_migrations()?;
    let applied = get_applied_migrations(pool).await?;

    for applied_migration in applied {
        let Some(available_migration) = available.get(&applied_migration.version) else {
            anyhow::bail!(
                "Applied migration {} '{}' not found in available migrations",
                applied_migration.version,
                applied_migration.name
            );
        };

        let expected = calculate_checksum(&available_migration.up_sql);
        if applied_migration.checksum != expected {
            anyhow::bail!(
                "Migration {} checksum mismatch! Applied: {}, Expected: {}. \
                The migration file was modified after being applied.",
                applied_migration.version,
                applied_migration.checksum,
                expected
            );
        }
    }

    Ok(())
}

/// Migrations that are embedded but not yet applied
pub async fn get_pending_migrations(pool: &SqlitePool) -> Result<Vec<Migration>> {
    let available = load_migrations()?;
    let applied: HashSet<i64> = get_applied_migrations(pool)
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    Ok(available
        .into_values()
        .filter(|migration| !applied.contains(&migration.version))
        .collect())
}

/// Highest applied migration version, if any
pub async fn get_current_version(pool: &SqlitePool) -> Result<Option<i64>> {
    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_migrations")
        .fetch_one(pool)
        .await
        .context("Failed to get current schema version")?;

    Ok(version.filter(|v| *v != 0))
}
