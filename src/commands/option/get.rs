use anyhow::{Result, bail};
use log::info;

use crate::config::Config;
use crate::config::options::api::get_option;

/// Print the value of an option as pretty JSON
///
/// # Arguments
/// * `config` - Open configuration
/// * `key` - Option key
///
/// # Returns
/// * `Ok(())` - Value displayed successfully
/// * `Err(anyhow::Error)` - Option not found or database error
pub async fn get_command(config: &Config, key: String) -> Result<()> {
    info!("Getting option: {}", key);

    let mut options = config.manager(None);
    let Some(value) = get_option(&mut options, &key, None).await? else {
        bail!("Option '{}' not found in scope {}", key.trim(), options.scope());
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
