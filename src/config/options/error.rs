//! Error types for the option store

use super::codec::CodecError;
use super::scope::Scope;
use thiserror::Error;

/// Result type alias for option operations.
pub type OptionResult<T> = Result<T, OptionError>;

/// Failures the option layer cannot express as a plain return value.
///
/// Missing keys, duplicate adds and unchanged updates are not errors; see
/// [`WriteOutcome`](super::types::WriteOutcome).
#[derive(Debug, Error)]
pub enum OptionError {
    /// The storage layer rejected an insert on its `(scope, key)` constraint.
    #[error("option '{key}' already exists in scope {scope}")]
    Duplicate { scope: Scope, key: String },

    #[error("option store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("failed to encode option value: {0}")]
    Codec(#[from] CodecError),

    #[error("failed to decode stored value of option '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("invalid link type {found} in symbolic option '{key}', expected a string key")]
    InvalidLink { key: String, found: &'static str },
}

impl OptionError {
    pub(crate) fn decode(key: &str, source: CodecError) -> Self {
        OptionError::Decode {
            key: key.to_string(),
            source,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, OptionError::Duplicate { .. })
    }
}
