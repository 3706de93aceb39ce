use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use site_options::cli::commands::{DbSubcommands, OptionSubcommands};
use site_options::cli::{Cli, Commands};
use site_options::commands::{db, option};
use site_options::config::{Config, Settings};

fn init_logging(settings: &Settings) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(path) = &settings.log_file {
        // Initialize logger to file (truncate on each run)
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(database) = cli.database {
        settings.database = Some(database);
    }
    if let Some(scope) = cli.scope {
        settings.scope = scope;
    }

    init_logging(&settings)?;
    info!("Starting site-options");

    let config = Config::open(settings).await?;

    match cli.command {
        Commands::Option(cmd) => match cmd.command {
            OptionSubcommands::List { page, per_page, order } => {
                option::list_command(&config, page, per_page, order).await
            }
            OptionSubcommands::Get { key } => option::get_command(&config, key).await,
            OptionSubcommands::Add(args) => option::add_command(&config, args).await,
            OptionSubcommands::Update(args) => option::update_command(&config, args).await,
            OptionSubcommands::Delete { key, force } => {
                option::delete_command(&config, key, force).await
            }
        },
        Commands::Db(cmd) => match cmd.command {
            DbSubcommands::Status => db::status_command(&config).await,
            DbSubcommands::Info => db::info_command(&config).await,
        },
    }
}
