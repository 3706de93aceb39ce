use anyhow::{Result, bail};
use colored::*;
use log::info;

use super::value::read_value;
use super::{display_value, log_outcome};
use crate::cli::commands::ValueArgs;
use crate::config::Config;
use crate::config::options::api::update_option;
use crate::config::options::{ChangeKind, WriteOutcome};

/// Update an option, adding it when it does not exist yet
///
/// # Arguments
/// * `config` - Open configuration
/// * `args` - Key, value and how to construe the value
///
/// # Returns
/// * `Ok(())` - Option updated or added
/// * `Err(anyhow::Error)` - Value unchanged, invalid value or database error
pub async fn update_command(config: &Config, args: ValueArgs) -> Result<()> {
    info!("Updating option: {}", args.key);

    let (value, action) = read_value(&args).await?;
    let shown = display_value(&value);

    let mut options = config.manager(None);
    let outcome = update_option(&mut options, &args.key, value, !args.no_autoload).await?;
    log_outcome(options.scope(), &outcome);

    match outcome {
        WriteOutcome::Applied(change) => {
            let verb = match change.kind() {
                ChangeKind::Added => "Added",
                _ => "Updated",
            };
            println!(
                "{} {} {}: {} {}",
                "✓".bright_green().bold(),
                verb,
                change.key.bright_green().bold(),
                shown,
                action.dimmed()
            );
            Ok(())
        }
        WriteOutcome::Rejected => bail!(
            "Cannot update '{}' option with '{}' (value unchanged)",
            args.key.trim(),
            shown
        ),
        WriteOutcome::Ignored => bail!("Option key cannot be empty"),
    }
}
