//! SQLite-backed value store

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::error::{OptionError, OptionResult};
use super::scope::Scope;
use super::store::ValueStore;
use super::types::{OptionRow, OrderBy};

const COLUMNS: &str = "id, scope, key, value, autoload, created_at, updated_at, expires_at";

/// Option rows in the `options` table
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn order_clause(order: &[OrderBy]) -> String {
    if order.is_empty() {
        return "id ASC".to_string();
    }

    order
        .iter()
        .map(|term| {
            let direction = if term.descending { "DESC" } else { "ASC" };
            format!("{} {}", term.field.column(), direction)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl ValueStore for SqliteStore {
    async fn fetch(&self, scope: Scope, key: &str) -> OptionResult<Option<OptionRow>> {
        let sql = format!("SELECT {} FROM options WHERE scope = ? AND key = ?", COLUMNS);
        let row = sqlx::query_as::<_, OptionRow>(&sql)
            .bind(scope)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fetch_autoloaded(&self, scope: Scope) -> OptionResult<Vec<OptionRow>> {
        let sql = format!(
            "SELECT {} FROM options WHERE scope = ? AND autoload = 1 ORDER BY id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, OptionRow>(&sql)
            .bind(scope)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_all(&self, scope: Scope) -> OptionResult<Vec<OptionRow>> {
        let sql = format!("SELECT {} FROM options WHERE scope = ? ORDER BY id", COLUMNS);
        let rows = sqlx::query_as::<_, OptionRow>(&sql)
            .bind(scope)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, scope: Scope, key: &str, value: &[u8], autoload: bool) -> OptionResult<()> {
        let result = sqlx::query("INSERT INTO options (scope, key, value, autoload) VALUES (?, ?, ?, ?)")
            .bind(scope)
            .bind(key)
            .bind(value)
            .bind(autoload)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(OptionError::Duplicate {
                scope,
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_value(&self, scope: Scope, key: &str, value: &[u8]) -> OptionResult<u64> {
        let result = sqlx::query(
            "UPDATE options SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE scope = ? AND key = ?",
        )
        .bind(value)
        .bind(scope)
        .bind(key)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, scope: Scope, key: &str) -> OptionResult<u64> {
        let result = sqlx::query("DELETE FROM options WHERE scope = ? AND key = ?")
            .bind(scope)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list(
        &self,
        scope: Scope,
        order: &[OrderBy],
        limit: u32,
        offset: u64,
    ) -> OptionResult<Vec<OptionRow>> {
        // Columns come from the OrderField whitelist, never from user text.
        let sql = format!(
            "SELECT {} FROM options WHERE scope = ? ORDER BY {} LIMIT ? OFFSET ?",
            COLUMNS,
            order_clause(order)
        );
        let rows = sqlx::query_as::<_, OptionRow>(&sql)
            .bind(scope)
            .bind(i64::from(limit))
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self, scope: Scope) -> OptionResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM options WHERE scope = ?")
            .bind(scope)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db;
    use crate::config::options::types::OrderField;

    async fn store() -> SqliteStore {
        let pool = db::connect_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let store = store().await;
        let scope = Scope::DEFAULT;

        store.insert(scope, "title", b"\"Home\"", true).await.unwrap();

        let row = store.fetch(scope, "title").await.unwrap().unwrap();
        assert_eq!(row.key, "title");
        assert_eq!(row.value, b"\"Home\"");
        assert!(row.autoload);
        assert!(row.expires_at.is_none());

        assert!(store.fetch(scope, "missing").await.unwrap().is_none());
        assert!(store.fetch(Scope::new(2), "title").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_reported() {
        let store = store().await;
        store.insert(Scope::DEFAULT, "a", b"1", false).await.unwrap();

        let err = store.insert(Scope::DEFAULT, "a", b"2", false).await.unwrap_err();
        assert!(err.is_duplicate());

        // Same key in another scope is a different option.
        store.insert(Scope::new(2), "a", b"3", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_autoload_and_full_scan() {
        let store = store().await;
        let scope = Scope::DEFAULT;
        store.insert(scope, "one", b"1", true).await.unwrap();
        store.insert(scope, "two", b"2", false).await.unwrap();
        store.insert(Scope::new(9), "three", b"3", true).await.unwrap();

        let autoloaded = store.fetch_autoloaded(scope).await.unwrap();
        assert_eq!(autoloaded.len(), 1);
        assert_eq!(autoloaded[0].key, "one");

        let all = store.fetch_all(scope).await.unwrap();
        let keys: Vec<_> = all.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_affected_rows() {
        let store = store().await;
        let scope = Scope::DEFAULT;
        store.insert(scope, "a", b"1", false).await.unwrap();

        assert_eq!(store.update_value(scope, "a", b"2").await.unwrap(), 1);
        assert_eq!(store.update_value(scope, "b", b"2").await.unwrap(), 0);
        assert_eq!(store.fetch(scope, "a").await.unwrap().unwrap().value, b"2");

        assert_eq!(store.delete(scope, "a").await.unwrap(), 1);
        assert_eq!(store.delete(scope, "a").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orders_and_pages() {
        let store = store().await;
        let scope = Scope::DEFAULT;
        for key in ["c", "a", "b"] {
            store.insert(scope, key, b"null", false).await.unwrap();
        }

        assert_eq!(store.count(scope).await.unwrap(), 3);

        let by_key = store
            .list(scope, &[OrderBy::asc(OrderField::Key)], 2, 0)
            .await
            .unwrap();
        let keys: Vec<_> = by_key.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);

        let newest_first = store
            .list(scope, &[OrderBy::desc(OrderField::Id)], 2, 2)
            .await
            .unwrap();
        assert_eq!(newest_first.len(), 1);
        assert_eq!(newest_first[0].key, "c");
    }

    #[test]
    fn test_order_clause() {
        assert_eq!(order_clause(&[]), "id ASC");
        assert_eq!(
            order_clause(&[OrderBy::desc(OrderField::UpdatedAt), OrderBy::asc(OrderField::Key)]),
            "updated_at DESC, key ASC"
        );
    }
}
