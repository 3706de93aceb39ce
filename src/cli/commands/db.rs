use clap::{Args, Subcommand};

#[derive(Args)]
pub struct DbCommands {
    #[command(subcommand)]
    pub command: DbSubcommands,
}

#[derive(Subcommand)]
pub enum DbSubcommands {
    /// Show applied and pending schema migrations
    Status,
    /// Show SQLite version, schema version and row counts
    Info,
}
