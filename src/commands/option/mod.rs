pub mod add;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;
pub mod value;

pub use add::add_command;
pub use delete::delete_command;
pub use get::get_command;
pub use list::list_command;
pub use update::update_command;

use crate::config::options::{ChangeBatch, Scope, WriteOutcome};
use serde_json::Value;

/// Compact rendering of a value for tables and confirmations
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Log the audit line for a finished write.
pub(crate) fn log_outcome(scope: Scope, outcome: &WriteOutcome) {
    let mut batch = ChangeBatch::new();
    batch.extend(outcome.change().cloned());
    log::info!("{}", batch.summary(&format!("Scope {}", scope)));
}
