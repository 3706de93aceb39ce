//! Migration manager for applying pending migrations

use anyhow::{Context, Result};
use log::{debug, info, warn};
use sqlx::SqlitePool;

use super::{
    AppliedMigration, Migration, calculate_checksum, get_applied_migrations, get_current_version,
    get_pending_migrations, init_migration_table, load_migrations, validate_migrations,
};

/// Applies embedded migrations against a pool
pub struct MigrationManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MigrationManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the migration system
    pub async fn init(&self) -> Result<()> {
        debug!("Initializing migration system");
        init_migration_table(self.pool).await
    }

    /// Run all pending migrations
    pub async fn migrate_up(&self) -> Result<()> {
        self.init().await?;
        validate_migrations(self.pool).await?;

        let pending = get_pending_migrations(self.pool).await?;
        if pending.is_empty() {
            debug!("No pending migrations");
            return Ok(());
        }

        info!("Running {} pending migrations", pending.len());
        for migration in pending {
            self.apply(&migration).await?;
        }

        info!("All migrations completed successfully");
        Ok(())
    }

    /// Apply a single migration inside a transaction
    async fn apply(&self, migration: &Migration) -> Result<()> {
        if migration.up_sql.trim().is_empty() {
            warn!("Migration {} has empty SQL, skipping", migration.version);
            return Ok(());
        }

        info!("Applying migration {} '{}'", migration.version, migration.name);
        debug!("Executing SQL:\n{}", migration.up_sql);

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start migration transaction")?;

        // SQLite runs every statement of a multi-statement string
        sqlx::query(&migration.up_sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute migration {} SQL", migration.version))?;

        sqlx::query("INSERT INTO schema_migrations (version, name, checksum) VALUES (?, ?, ?)")
            .bind(migration.version)
            .bind(&migration.name)
            .bind(calculate_checksum(&migration.up_sql))
            .execute(&mut *tx)
            .await
            .context("Failed to record migration")?;

        tx.commit()
            .await
            .context("Failed to commit migration transaction")?;

        info!("Migration {} applied", migration.version);
        Ok(())
    }

    /// Get migration status
    pub async fn status(&self) -> Result<MigrationStatus> {
        self.init().await?;

        let available = load_migrations()?;
        let applied = get_applied_migrations(self.pool).await?;
        let pending = get_pending_migrations(self.pool).await?;
        let current_version = get_current_version(self.pool).await?;

        Ok(MigrationStatus {
            current_version,
            total_available: available.len(),
            applied_migrations: applied,
            pending_migrations: pending,
        })
    }
}

/// Migration status information
#[derive(Debug)]
pub struct MigrationStatus {
    pub current_version: Option<i64>,
    pub total_available: usize,
    pub applied_migrations: Vec<AppliedMigration>,
    pub pending_migrations: Vec<Migration>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending_migrations.is_empty()
    }

    pub fn print_status(&self) {
        println!("Migration Status:");
        println!("  Current version: {:?}", self.current_version);
        println!("  Applied migrations: {}", self.applied_migrations.len());
        println!("  Pending migrations: {}", self.pending_migrations.len());
        println!("  Total available: {}", self.total_available);
        println!("  Up to date: {}", self.is_up_to_date());

        if !self.applied_migrations.is_empty() {
            println!("\nApplied migrations:");
            for migration in &self.applied_migrations {
                println!(
                    "  ✓ {} {} ({})",
                    migration.version,
                    migration.name,
                    migration.applied_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        if !self.pending_migrations.is_empty() {
            println!("\nPending migrations:");
            for migration in &self.pending_migrations {
                println!("  ○ {} {}", migration.version, migration.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db;

    #[tokio::test]
    async fn test_migrate_up_is_idempotent() {
        let pool = db::connect_memory().await.unwrap();
        let manager = MigrationManager::new(&pool);

        manager.migrate_up().await.unwrap();
        manager.migrate_up().await.unwrap();

        let status = manager.status().await.unwrap();
        assert!(status.is_up_to_date());
        assert_eq!(status.current_version, Some(1));
        assert_eq!(status.applied_migrations.len(), status.total_available);
    }

    #[tokio::test]
    async fn test_status_before_migrating() {
        let pool = db::connect_memory().await.unwrap();
        let status = MigrationManager::new(&pool).status().await.unwrap();

        assert!(!status.is_up_to_date());
        assert_eq!(status.current_version, None);
        assert!(status.applied_migrations.is_empty());
    }
}
