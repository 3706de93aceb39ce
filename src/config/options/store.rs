//! Value store abstraction behind the option manager

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::OptionResult;
use super::scope::Scope;
use super::types::{OptionRow, OrderBy};

/// Persistent table of `(scope, key) -> encoded value` rows.
///
/// Every method is one round trip to the backing store. Implementations must
/// enforce uniqueness of `(scope, key)` and report a violation on insert as
/// [`OptionError::Duplicate`](super::error::OptionError::Duplicate).
#[async_trait]
pub trait ValueStore: Send + Sync {
    /// Point lookup of a single row
    async fn fetch(&self, scope: Scope, key: &str) -> OptionResult<Option<OptionRow>>;

    /// All rows of the scope flagged for autoload
    async fn fetch_autoloaded(&self, scope: Scope) -> OptionResult<Vec<OptionRow>>;

    /// Every row of the scope
    async fn fetch_all(&self, scope: Scope) -> OptionResult<Vec<OptionRow>>;

    async fn insert(&self, scope: Scope, key: &str, value: &[u8], autoload: bool) -> OptionResult<()>;

    /// Replace the value of an existing row; returns the affected row count.
    async fn update_value(&self, scope: Scope, key: &str, value: &[u8]) -> OptionResult<u64>;

    /// Delete a row; returns the affected row count.
    async fn delete(&self, scope: Scope, key: &str) -> OptionResult<u64>;

    /// Ordered slice of the scope's rows
    async fn list(
        &self,
        scope: Scope,
        order: &[OrderBy],
        limit: u32,
        offset: u64,
    ) -> OptionResult<Vec<OptionRow>>;

    async fn count(&self, scope: Scope) -> OptionResult<u64>;
}

/// Wraps a store and counts the round trips made through it.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    inner: S,
    queries: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.queries.store(0, Ordering::Relaxed);
    }

    fn tick(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl<S: ValueStore> ValueStore for CountingStore<S> {
    async fn fetch(&self, scope: Scope, key: &str) -> OptionResult<Option<OptionRow>> {
        self.tick();
        self.inner.fetch(scope, key).await
    }

    async fn fetch_autoloaded(&self, scope: Scope) -> OptionResult<Vec<OptionRow>> {
        self.tick();
        self.inner.fetch_autoloaded(scope).await
    }

    async fn fetch_all(&self, scope: Scope) -> OptionResult<Vec<OptionRow>> {
        self.tick();
        self.inner.fetch_all(scope).await
    }

    async fn insert(&self, scope: Scope, key: &str, value: &[u8], autoload: bool) -> OptionResult<()> {
        self.tick();
        self.inner.insert(scope, key, value, autoload).await
    }

    async fn update_value(&self, scope: Scope, key: &str, value: &[u8]) -> OptionResult<u64> {
        self.tick();
        self.inner.update_value(scope, key, value).await
    }

    async fn delete(&self, scope: Scope, key: &str) -> OptionResult<u64> {
        self.tick();
        self.inner.delete(scope, key).await
    }

    async fn list(
        &self,
        scope: Scope,
        order: &[OrderBy],
        limit: u32,
        offset: u64,
    ) -> OptionResult<Vec<OptionRow>> {
        self.tick();
        self.inner.list(scope, order, limit, offset).await
    }

    async fn count(&self, scope: Scope) -> OptionResult<u64> {
        self.tick();
        self.inner.count(scope).await
    }
}
