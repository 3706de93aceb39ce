use anyhow::Result;
use colored::*;
use log::info;

use crate::config::migrations::MigrationManager;
use crate::config::{Config, db};

/// Show applied and pending schema migrations
pub async fn status_command(config: &Config) -> Result<()> {
    info!("Showing migration status");

    let status = MigrationManager::new(config.pool()).status().await?;
    status.print_status();
    Ok(())
}

/// Show database diagnostics
pub async fn info_command(config: &Config) -> Result<()> {
    info!("Showing database info");

    let info = db::get_db_info(config.pool()).await?;
    println!("{}", "Database".bold());
    println!("  Path: {}", config.db_path().display());
    println!("  SQLite version: {}", info.sqlite_version);
    println!("  Journal mode: {}", info.journal_mode);
    println!("  Schema version: {}", info.schema_version);
    println!("  Options: {}", info.option_count);
    println!("  Scopes: {}", info.scope_count);
    println!("  Default scope: {}", config.default_scope());
    Ok(())
}
