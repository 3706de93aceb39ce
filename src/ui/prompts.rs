use anyhow::Result;
use dialoguer::Select;
use is_terminal::IsTerminal;

/// Interactive confirmation prompt using arrow-key navigable selection
///
/// # Arguments
/// * `prompt` - The question to ask the user
/// * `default_yes` - Whether "Yes" should be the default selection (index 0)
///
/// # Returns
/// * `Ok(true)` if user selects "Yes"
/// * `Ok(false)` if user selects "No"
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

/// Ask for confirmation when stdin is a terminal. Scripts are not prompted
/// and always proceed.
pub fn confirm(prompt: &str, default_yes: bool) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        log::debug!("stdin is not a terminal, skipping prompt '{}'", prompt);
        return Ok(true);
    }
    prompt_confirmation(prompt, default_yes)
}

pub fn prompt_delete_confirmation(key: &str) -> Result<bool> {
    confirm(&format!("Delete option '{}'?", key), false)
}
