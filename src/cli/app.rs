use super::commands::{DbCommands, OptionCommands};
use crate::config::settings::{ENV_DATABASE, ENV_SCOPE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "site-options")]
#[command(about = "Manage per-site options stored in SQLite")]
#[command(version)]
pub struct Cli {
    /// Database file (overrides the settings file)
    #[arg(long, global = true, env = ENV_DATABASE)]
    pub database: Option<PathBuf>,

    /// Scope (site id) to operate on (overrides the settings file)
    #[arg(long, global = true, env = ENV_SCOPE)]
    pub scope: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List, read and write options
    Option(OptionCommands),
    /// Database diagnostics and schema status
    Db(DbCommands),
}
