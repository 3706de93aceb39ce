use anyhow::{Result, bail};
use colored::*;
use log::info;

use super::log_outcome;
use crate::config::Config;
use crate::config::options::WriteOutcome;
use crate::config::options::api::delete_option;
use crate::ui::prompts::prompt_delete_confirmation;

/// Delete an option
///
/// # Arguments
/// * `config` - Open configuration
/// * `key` - Option key
/// * `force` - Skip confirmation prompt
///
/// # Returns
/// * `Ok(())` - Option deleted or user cancelled
/// * `Err(anyhow::Error)` - Option not found or database error
pub async fn delete_command(config: &Config, key: String, force: bool) -> Result<()> {
    info!("Deleting option: {}", key);

    if !force && !prompt_delete_confirmation(key.trim())? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let mut options = config.manager(None);
    let outcome = delete_option(&mut options, &key).await?;
    log_outcome(options.scope(), &outcome);

    match outcome {
        WriteOutcome::Applied(change) => {
            println!("{} Deleted {}", "✓".bright_green().bold(), change.key.bright_green().bold());
            Ok(())
        }
        WriteOutcome::Rejected => bail!("Cannot delete '{}' option, not found", key.trim()),
        WriteOutcome::Ignored => bail!("Option key cannot be empty"),
    }
}
