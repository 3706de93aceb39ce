//! Integration tests for the option manager caches
//!
//! Query counts are observed through `CountingStore` and decode counts
//! through `CountingCodec`, against an in-memory SQLite database.

use serde_json::{Value, json};
use site_options::config::db;
use site_options::options::{
    CountingCodec, CountingStore, JsonCodec, OptionManager, Scope, SqliteStore, WriteOutcome,
};
use std::sync::Arc;

type Manager = OptionManager<CountingStore<SqliteStore>>;

async fn manager() -> Manager {
    let pool = db::connect_memory().await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    OptionManager::new(CountingStore::new(SqliteStore::new(pool)), Scope::DEFAULT)
}

/// Remove every row from every scope and start a new generation.
async fn wipe(m: &mut Manager) {
    sqlx::query("DELETE FROM options")
        .execute(m.store().inner().pool())
        .await
        .unwrap();
    m.clear();
    m.store().reset();
}

#[tokio::test]
async fn test_adding_options() {
    let mut m = manager().await;

    assert_eq!(m.preload().await.unwrap(), 0);
    assert_eq!(m.store().queries(), 2);

    m.store().reset();
    assert_eq!(m.preload().await.unwrap(), 0);
    assert_eq!(m.store().queries(), 0);

    assert!(m.add("key", json!("value"), true).await.unwrap().is_applied());
    assert_eq!(m.store().queries(), 2);
}

#[tokio::test]
async fn test_option_cache() {
    let mut m = manager().await;

    // Nothing autoloaded, so the full scan runs as well.
    m.preload().await.unwrap();
    assert_eq!(m.store().queries(), 2);

    m.store().reset();
    m.preload().await.unwrap();
    assert_eq!(m.store().queries(), 0);

    assert!(m.add("cache", json!("on"), true).await.unwrap().is_applied());
    assert_eq!(m.store().queries(), 2);

    m.clear();
    m.store().reset();
    m.preload().await.unwrap();
    assert_eq!(m.store().queries(), 1);

    m.store().reset();
    assert!(m.get("cache").await.unwrap().is_some());
    assert_eq!(m.get("cache").await.unwrap(), Some(json!("on")));
    assert_eq!(m.update("cache", json!("on"), true).await.unwrap(), WriteOutcome::Rejected);
    assert_eq!(m.store().queries(), 0);

    wipe(&mut m).await;
    assert!(m.add("key", json!("value"), true).await.unwrap().is_applied());
    assert_eq!(m.store().queries(), 4);

    wipe(&mut m).await;
    let k = 100;
    for i in 0..k {
        assert!(m.add(&format!("key_{}", i), json!(k), true).await.unwrap().is_applied());
    }
    assert_eq!(m.store().queries(), k * 2 + 2);

    m.clear();
    m.store().reset();
    assert!(!m.is_preloaded());
    assert_eq!(m.preload().await.unwrap(), k);
    for i in 0..k {
        let key = format!("key_{}", i);
        assert!(m.is_autoloaded(&key));
        assert_eq!(m.get(&key).await.unwrap(), Some(json!(k)));
    }
    assert_eq!(m.store().queries(), 1);
    assert_eq!(m.autoload_keys().unwrap().len(), k);
}

#[tokio::test]
async fn test_value_type_consistency() {
    let mut m = manager().await;
    let values = vec![
        json!(0),
        json!(1),
        Value::Null,
        json!(false),
        json!([]),
        json!({}),
        json!([1, 2, 3]),
        json!({"a": 1, "b": 2}),
    ];

    for (i, value) in values.iter().enumerate() {
        assert!(m.add(&format!("key_{}", i), value.clone(), true).await.unwrap().is_applied());
    }
    assert_eq!(m.store().queries(), values.len() * 2 + 2);

    m.clear();
    m.store().reset();
    for (i, value) in values.iter().enumerate() {
        let found = m
            .get_or(&format!("key_{}", i), json!("##NOTFOUND##"))
            .await
            .unwrap();
        assert_eq!(&found, value);
    }
    assert_eq!(m.store().queries(), 1);
}

#[tokio::test]
async fn test_autoloading() {
    let mut m = manager().await;

    assert!(m.add("one", json!("yes"), true).await.unwrap().is_applied());
    assert!(m.add("two", json!("yes"), true).await.unwrap().is_applied());
    assert!(m.add("three", json!("yes"), false).await.unwrap().is_applied());

    assert!(m.is_autoloaded("one"));
    assert!(m.is_autoloaded("two"));
    assert!(!m.is_autoloaded("three"));
    assert!(m.is_cached("three"));

    m.clear();
    assert_eq!(m.get("one").await.unwrap(), Some(json!("yes")));
    assert_eq!(
        m.autoload_keys().unwrap(),
        vec!["one".to_string(), "two".to_string()]
    );

    m.store().reset();
    assert_eq!(m.get("three").await.unwrap(), Some(json!("yes")));
    assert_eq!(m.store().queries(), 1);
    assert!(!m.is_autoloaded("three"));
    assert!(m.is_cached("three"));
}

#[tokio::test]
async fn test_miss_cache_saves_the_existence_check() {
    let mut m = manager().await;

    assert_eq!(m.get("foo").await.unwrap(), None);
    assert!(m.is_missing("foo"));

    m.store().reset();
    assert!(m.add("foo", json!("bar"), false).await.unwrap().is_applied());
    // Only the insert: the key is known to be absent.
    assert_eq!(m.store().queries(), 1);

    assert!(!m.is_missing("foo"));
    assert!(m.is_cached("foo"));
    assert_eq!(m.get("foo").await.unwrap(), Some(json!("bar")));
    assert_eq!(m.store().queries(), 1);
}

#[tokio::test]
async fn test_update_missing_key_behaves_like_add() {
    let mut m = manager().await;

    let outcome = m.update("fresh", json!({"on": true}), false).await.unwrap();
    let change = outcome.into_change().unwrap();
    assert_eq!(change.old, None);
    assert_eq!(change.new, Some(json!({"on": true})));

    assert!(!m.is_autoloaded("fresh"));
    assert!(m.is_cached("fresh"));
    assert_eq!(m.add("fresh", json!(1), true).await.unwrap(), WriteOutcome::Rejected);
}

#[tokio::test]
async fn test_update_evicts_raw_autoload_copy() {
    let mut m = manager().await;
    m.add("theme", json!("light"), true).await.unwrap();
    assert!(m.is_autoloaded("theme"));

    assert!(m.update("theme", json!("dark"), true).await.unwrap().is_applied());
    assert!(!m.is_autoloaded("theme"));
    assert_eq!(m.get("theme").await.unwrap(), Some(json!("dark")));

    m.clear();
    assert_eq!(m.get("theme").await.unwrap(), Some(json!("dark")));
}

#[tokio::test]
async fn test_values_are_decoded_once_per_generation() {
    let codec = Arc::new(CountingCodec::new(JsonCodec));
    let mut m = manager().await.with_codec(codec.clone());

    assert!(m.add("foo", json!("ciao"), true).await.unwrap().is_applied());
    assert_eq!(codec.encodes(), 1);
    assert_eq!(codec.decodes(), 0);

    for _ in 0..3 {
        assert_eq!(m.get("foo").await.unwrap(), Some(json!("ciao")));
    }
    assert_eq!(codec.decodes(), 1);

    assert_eq!(m.add("foo", json!("ciao"), true).await.unwrap(), WriteOutcome::Rejected);
    assert_eq!(m.update("foo", json!("ciao"), true).await.unwrap(), WriteOutcome::Rejected);
    assert_eq!(m.get("foo").await.unwrap(), Some(json!("ciao")));
    assert_eq!(codec.decodes(), 1);
    assert_eq!(codec.encodes(), 1);

    assert!(m.add("bar", json!("oaic"), true).await.unwrap().is_applied());
    assert_eq!(codec.encodes(), 2);

    m.clear();
    codec.reset();
    for _ in 0..3 {
        assert_eq!(m.get("foo").await.unwrap(), Some(json!("ciao")));
    }
    for _ in 0..4 {
        assert_eq!(m.get("bar").await.unwrap(), Some(json!("oaic")));
    }
    assert_eq!(codec.decodes(), 2);
    assert_eq!(codec.encodes(), 0);
}

#[tokio::test]
async fn test_callers_cannot_mutate_stored_values() {
    let mut m = manager().await;
    let mut value = json!({"items": [1, 2]});

    m.add("list", value.clone(), false).await.unwrap();
    value["items"] = json!([]);

    let mut read = m.get("list").await.unwrap().unwrap();
    read["items"] = json!(["changed"]);

    assert_eq!(m.get("list").await.unwrap(), Some(json!({"items": [1, 2]})));
}

#[tokio::test]
async fn test_corrupt_value_surfaces_decode_error() {
    let mut m = manager().await;
    sqlx::query("INSERT INTO options (scope, key, value, autoload) VALUES (1, 'broken', x'7b7b', 0)")
        .execute(m.store().inner().pool())
        .await
        .unwrap();

    let err = m.get("broken").await.unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[tokio::test]
async fn test_duplicate_from_another_writer_clears_the_miss() {
    let mut a = manager().await;
    let pool = a.store().inner().pool().clone();
    let mut b = OptionManager::new(SqliteStore::new(pool), Scope::DEFAULT);

    assert_eq!(a.get("k").await.unwrap(), None);
    assert!(a.is_missing("k"));

    assert!(b.add("k", json!("first"), false).await.unwrap().is_applied());

    assert_eq!(a.add("k", json!("second"), false).await.unwrap(), WriteOutcome::Rejected);
    assert!(!a.is_missing("k"));
    assert_eq!(a.get("k").await.unwrap(), Some(json!("first")));

    let change = a
        .update("k", json!("second"), false)
        .await
        .unwrap()
        .into_change()
        .unwrap();
    assert_eq!(change.old, Some(json!("first")));
    assert_eq!(b.get("k").await.unwrap(), Some(json!("first")));
}
