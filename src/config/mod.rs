//! SQLite-based configuration module for site options
//!
//! This module provides:
//! - Settings resolution (settings file, environment, command line)
//! - Database connection and embedded schema migrations
//! - The options system and a factory for per-unit-of-work managers

use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod db;
pub mod migrations;
pub mod options;
pub mod settings;

pub use settings::Settings;

use options::{OptionManager, Scope, ScopeResolver, SqliteStore};

/// Main configuration: resolved settings plus an open, migrated database
pub struct Config {
    pub(crate) pool: sqlx::SqlitePool,
    db_path: PathBuf,
    settings: Settings,
    resolver: ScopeResolver,
}

impl Config {
    /// Load settings from the settings file and environment, then open the database
    pub async fn load() -> Result<Self> {
        Self::open(Settings::load()?).await
    }

    /// Open the database named by already-resolved settings
    pub async fn open(settings: Settings) -> Result<Self> {
        let db_path = settings.database_path()?;
        log::debug!("Loading options database from: {:?}", db_path);

        let pool = db::connect(&db_path).await?;
        db::run_migrations(&pool).await?;

        Ok(Self {
            pool,
            db_path,
            resolver: ScopeResolver::new(settings.default_scope()),
            settings,
        })
    }

    /// Create a new config for testing (in-memory database)
    pub async fn new_test() -> Result<Self> {
        let pool = db::connect_memory().await?;
        db::run_migrations(&pool).await?;

        let settings = Settings::default();
        Ok(Self {
            pool,
            db_path: PathBuf::from(":memory:"),
            resolver: ScopeResolver::new(settings.default_scope()),
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    pub fn default_scope(&self) -> Scope {
        self.resolver.default_scope()
    }

    /// A fresh manager with empty caches, bound to `scope` or the default scope
    pub fn manager(&self, scope: Option<Scope>) -> OptionManager<SqliteStore> {
        OptionManager::new(SqliteStore::new(self.pool.clone()), self.resolver.resolve(scope))
    }
}
