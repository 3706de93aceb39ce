//! Per-scope option store with an in-memory cache
//!
//! The options system provides:
//! - Arbitrary JSON values stored as encoded blobs, one row per `(scope, key)`
//! - An [`OptionManager`] per unit of work with autoload, decoded and miss caches
//! - Change notifications for every applied write
//! - Function-style helpers in [`api`]

pub mod api;
pub mod codec;
pub mod error;
pub mod events;
pub mod manager;
pub mod scope;
pub mod sqlite;
pub mod store;
pub mod types;

pub use codec::{Codec, CodecError, CountingCodec, JsonCodec};
pub use error::{OptionError, OptionResult};
pub use events::{Change, ChangeBatch, ChangeBus, ChangeKind};
pub use manager::OptionManager;
pub use scope::{Scope, ScopeResolver};
pub use sqlite::SqliteStore;
pub use store::{CountingStore, ValueStore};
pub use types::{
    ListQuery, OptionEntry, OptionPage, OptionRow, OrderBy, OrderField, UnknownOrderField, WriteOutcome,
};
