use anyhow::{Result, bail};
use colored::*;
use log::info;

use super::value::read_value;
use super::{display_value, log_outcome};
use crate::cli::commands::ValueArgs;
use crate::config::Config;
use crate::config::options::WriteOutcome;
use crate::config::options::api::add_option;

/// Add a new option
///
/// # Arguments
/// * `config` - Open configuration
/// * `args` - Key, value and how to construe the value
///
/// # Returns
/// * `Ok(())` - Option added
/// * `Err(anyhow::Error)` - Option already exists, invalid value or database error
pub async fn add_command(config: &Config, args: ValueArgs) -> Result<()> {
    info!("Adding option: {}", args.key);

    let (value, action) = read_value(&args).await?;
    let shown = display_value(&value);

    let mut options = config.manager(None);
    let outcome = add_option(&mut options, &args.key, value, !args.no_autoload).await?;
    log_outcome(options.scope(), &outcome);

    match outcome {
        WriteOutcome::Applied(change) => {
            println!(
                "{} Added {}: {} {}",
                "✓".bright_green().bold(),
                change.key.bright_green().bold(),
                shown,
                action.dimmed()
            );
            Ok(())
        }
        WriteOutcome::Rejected => bail!("Cannot add '{}' option, already exists", args.key.trim()),
        WriteOutcome::Ignored => bail!("Option key cannot be empty"),
    }
}
