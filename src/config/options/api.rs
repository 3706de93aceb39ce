//! Function-style helpers over an [`OptionManager`]

use serde_json::Value;

use super::error::{OptionError, OptionResult};
use super::manager::OptionManager;
use super::store::ValueStore;
use super::types::{WriteOutcome, value_kind};

/// Value of `key`, or `default` when the option does not exist.
pub async fn get_option<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
    default: Option<Value>,
) -> OptionResult<Option<Value>> {
    Ok(options.get(key).await?.or(default))
}

pub async fn add_option<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
    value: Value,
    autoload: bool,
) -> OptionResult<WriteOutcome> {
    options.add(key, value, autoload).await
}

pub async fn update_option<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
    value: Value,
    autoload: bool,
) -> OptionResult<WriteOutcome> {
    options.update(key, value, autoload).await
}

pub async fn delete_option<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
) -> OptionResult<WriteOutcome> {
    options.delete(key).await
}

pub fn option_cache_reset<S: ValueStore>(options: &mut OptionManager<S>) {
    options.clear();
}

/// Value of `key` for the predicate helpers, where a stored null counts as
/// no value at all.
async fn present_value<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
) -> OptionResult<Option<Value>> {
    Ok(options.get(key).await?.filter(|value| !value.is_null()))
}

/// Whether the option holds a non-null value.
pub async fn has_option<S: ValueStore>(options: &mut OptionManager<S>, key: &str) -> OptionResult<bool> {
    option_not_is(options, key, &Value::Null).await
}

/// Whether the value of the option equals `expected`. A missing option
/// compares equal to `Value::Null`.
pub async fn option_is<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
    expected: &Value,
) -> OptionResult<bool> {
    let value = present_value(options, key).await?.unwrap_or(Value::Null);
    Ok(&value == expected)
}

pub async fn option_not_is<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
    expected: &Value,
) -> OptionResult<bool> {
    Ok(!option_is(options, key, expected).await?)
}

/// Follow one level of indirection: the value of `key` names another option,
/// whose value is returned.
///
/// Returns `default` when `key` is missing or null. Fails with
/// [`OptionError::InvalidLink`] when the value of `key` is any other
/// non-string.
pub async fn symbolic_option<S: ValueStore>(
    options: &mut OptionManager<S>,
    key: &str,
    default: Option<Value>,
) -> OptionResult<Option<Value>> {
    match present_value(options, key).await? {
        None => Ok(default),
        Some(Value::String(link)) => get_option(options, &link, default).await,
        Some(other) => Err(OptionError::InvalidLink {
            key: key.trim().to_string(),
            found: value_kind(&other),
        }),
    }
}
