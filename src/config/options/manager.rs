//! Cached option manager
//!
//! An [`OptionManager`] is bound to one scope and lives for one unit of work.
//! It keeps three caches in front of the [`ValueStore`]:
//!
//! - the autoload set: raw values of every autoloaded row, fetched in one
//!   query the first time anything is read or added (falls back to a full
//!   scan of the scope when no row is flagged for autoload)
//! - the decoded cache: values already decoded in this generation
//! - the miss cache: keys known to be absent
//!
//! A key is never in the miss cache and in one of the other two at once, and
//! a stored value is decoded at most once per generation. [`OptionManager::clear`]
//! starts a new generation.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::codec::{Codec, JsonCodec};
use super::error::{OptionError, OptionResult};
use super::events::{Change, ChangeBus};
use super::scope::Scope;
use super::store::ValueStore;
use super::types::{ListQuery, OptionEntry, OptionPage, OptionRow, WriteOutcome, normalize_key};

pub struct OptionManager<S> {
    store: S,
    scope: Scope,
    codec: Arc<dyn Codec>,
    bus: ChangeBus,
    autoloaded: Option<HashMap<String, Vec<u8>>>,
    decoded: HashMap<String, Value>,
    missing: HashSet<String>,
}

impl<S: ValueStore> OptionManager<S> {
    pub fn new(store: S, scope: Scope) -> Self {
        Self {
            store,
            scope,
            codec: Arc::new(JsonCodec),
            bus: ChangeBus::new(),
            autoloaded: None,
            decoded: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Register a listener for every applied write.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.bus.subscribe(subscriber);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Drop every cache; the next read reloads the autoload set.
    pub fn clear(&mut self) {
        self.autoloaded = None;
        self.decoded.clear();
        self.missing.clear();
    }

    /// Populate the autoload set if this generation has not done so yet and
    /// return its size.
    pub async fn preload(&mut self) -> OptionResult<usize> {
        self.ensure_autoloaded().await?;
        Ok(self.autoloaded.as_ref().map_or(0, HashMap::len))
    }

    async fn ensure_autoloaded(&mut self) -> OptionResult<()> {
        if self.autoloaded.is_some() {
            return Ok(());
        }

        let mut rows = self.store.fetch_autoloaded(self.scope).await?;
        if rows.is_empty() {
            log::debug!(
                "No autoloaded options in scope {}, loading the whole scope",
                self.scope
            );
            rows = self.store.fetch_all(self.scope).await?;
        }

        let set: HashMap<String, Vec<u8>> = rows.into_iter().map(|row| (row.key, row.value)).collect();
        log::debug!("Autoloaded {} options for scope {}", set.len(), self.scope);
        self.autoloaded = Some(set);
        Ok(())
    }

    fn decode_row(&self, row: &OptionRow) -> OptionResult<Value> {
        self.codec
            .decode(&row.value)
            .map_err(|e| OptionError::decode(&row.key, e))
    }

    /// Current value of `key`, or `None` when the option does not exist.
    ///
    /// A stored JSON null is returned as `Some(Value::Null)`.
    pub async fn get(&mut self, key: &str) -> OptionResult<Option<Value>> {
        let Some(key) = normalize_key(key) else {
            return Ok(None);
        };

        if self.missing.contains(key) {
            return Ok(None);
        }

        self.ensure_autoloaded().await?;

        if let Some(value) = self.decoded.get(key) {
            return Ok(Some(value.clone()));
        }

        if let Some(raw) = self.autoloaded.as_ref().and_then(|set| set.get(key)) {
            let value = self
                .codec
                .decode(raw)
                .map_err(|e| OptionError::decode(key, e))?;
            self.decoded.insert(key.to_string(), value.clone());
            return Ok(Some(value));
        }

        match self.store.fetch(self.scope, key).await? {
            Some(row) => {
                let value = self.decode_row(&row)?;
                self.decoded.insert(row.key, value.clone());
                Ok(Some(value))
            }
            None => {
                self.missing.insert(key.to_string());
                Ok(None)
            }
        }
    }

    pub async fn get_or(&mut self, key: &str, default: Value) -> OptionResult<Value> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    /// Create an option. Rejected when the key already exists in the scope.
    pub async fn add(&mut self, key: &str, value: Value, autoload: bool) -> OptionResult<WriteOutcome> {
        let Some(key) = normalize_key(key) else {
            return Ok(WriteOutcome::Ignored);
        };

        self.ensure_autoloaded().await?;

        if self.is_autoloaded(key) {
            return Ok(WriteOutcome::Rejected);
        }
        if !self.missing.contains(key) && self.get(key).await?.is_some() {
            return Ok(WriteOutcome::Rejected);
        }

        let raw = self.codec.encode(&value)?;
        match self.store.insert(self.scope, key, &raw, autoload).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {
                log::debug!("Option '{}' was inserted concurrently: {}", key, e);
                self.missing.remove(key);
                return Ok(WriteOutcome::Rejected);
            }
            Err(e) => return Err(e),
        }

        self.missing.remove(key);
        if autoload {
            if let Some(set) = self.autoloaded.as_mut() {
                set.insert(key.to_string(), raw);
            }
        } else {
            self.decoded.insert(key.to_string(), value.clone());
        }

        let change = Change::added(key, value);
        self.bus.publish(&change);
        Ok(WriteOutcome::Applied(change))
    }

    /// Replace the value of an option, creating it when it does not exist.
    ///
    /// `autoload` only applies when the option has to be created.
    pub async fn update(&mut self, key: &str, value: Value, autoload: bool) -> OptionResult<WriteOutcome> {
        let Some(key) = normalize_key(key) else {
            return Ok(WriteOutcome::Ignored);
        };

        let old = match self.get(key).await? {
            Some(old) if old == value => return Ok(WriteOutcome::Rejected),
            Some(old) => old,
            None => return self.add(key, value, autoload).await,
        };

        let raw = self.codec.encode(&value)?;
        let affected = self.store.update_value(self.scope, key, &raw).await?;

        self.missing.remove(key);
        // The raw copy would now be stale; the decoded cache holds the new value.
        if let Some(set) = self.autoloaded.as_mut() {
            set.remove(key);
        }

        if affected != 1 {
            self.decoded.remove(key);
            log::warn!(
                "Update of option '{}' in scope {} touched {} rows",
                key,
                self.scope,
                affected
            );
            return Ok(WriteOutcome::Rejected);
        }

        self.decoded.insert(key.to_string(), value.clone());

        let change = Change::edited(key, old, value);
        self.bus.publish(&change);
        Ok(WriteOutcome::Applied(change))
    }

    /// Remove an option. Rejected when there is nothing to remove.
    pub async fn delete(&mut self, key: &str) -> OptionResult<WriteOutcome> {
        let Some(key) = normalize_key(key) else {
            return Ok(WriteOutcome::Ignored);
        };

        let Some(row) = self.store.fetch(self.scope, key).await? else {
            return Ok(WriteOutcome::Rejected);
        };

        let old = match self.decoded.get(key) {
            Some(value) => value.clone(),
            None => self.decode_row(&row)?,
        };

        if let Some(set) = self.autoloaded.as_mut() {
            set.remove(key);
        }
        self.decoded.remove(key);

        if self.store.delete(self.scope, key).await? == 0 {
            log::debug!("Option '{}' disappeared before it could be deleted", key);
            return Ok(WriteOutcome::Rejected);
        }

        let change = Change::deleted(key, old);
        self.bus.publish(&change);
        Ok(WriteOutcome::Applied(change))
    }

    /// One page of the scope's options, decoded.
    pub async fn list(&mut self, query: &ListQuery) -> OptionResult<OptionPage> {
        let total = self.store.count(self.scope).await?;
        let pages = query.page_count(total);
        let page = query.effective_page(total);
        let per_page = query.per_page.max(1);
        let offset = u64::from(page - 1) * u64::from(per_page);

        let rows = self
            .store
            .list(self.scope, &query.order, per_page, offset)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let value = match self.decoded.get(&row.key) {
                Some(value) => value.clone(),
                None => {
                    let value = self.decode_row(&row)?;
                    self.missing.remove(&row.key);
                    self.decoded.insert(row.key.clone(), value.clone());
                    value
                }
            };

            entries.push(OptionEntry {
                id: row.id,
                scope: row.scope,
                key: row.key,
                value,
                autoload: row.autoload,
                created_at: row.created_at,
                updated_at: row.updated_at,
                expires_at: row.expires_at,
            });
        }

        Ok(OptionPage {
            entries,
            page,
            pages,
            total,
        })
    }

    pub fn is_autoloaded(&self, key: &str) -> bool {
        self.autoloaded
            .as_ref()
            .is_some_and(|set| set.contains_key(key.trim()))
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.decoded.contains_key(key.trim())
    }

    pub fn is_missing(&self, key: &str) -> bool {
        self.missing.contains(key.trim())
    }

    pub fn is_preloaded(&self) -> bool {
        self.autoloaded.is_some()
    }

    /// Sorted keys of the autoload set, `None` before it is loaded.
    pub fn autoload_keys(&self) -> Option<Vec<String>> {
        self.autoloaded.as_ref().map(|set| {
            let mut keys: Vec<String> = set.keys().cloned().collect();
            keys.sort();
            keys
        })
    }
}

impl<S> std::fmt::Debug for OptionManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionManager")
            .field("scope", &self.scope)
            .field("autoloaded", &self.autoloaded.as_ref().map(HashMap::len))
            .field("decoded", &self.decoded.len())
            .field("missing", &self.missing.len())
            .field("bus", &self.bus)
            .finish()
    }
}
