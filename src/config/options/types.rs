//! Core types for the options system

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

use super::events::Change;
use super::scope::Scope;

/// A persisted option row. `value` is still encoded.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OptionRow {
    pub id: i64,
    pub scope: Scope,
    pub key: String,
    pub value: Vec<u8>,
    pub autoload: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stored but not consulted by any read path.
    pub expires_at: Option<DateTime<Utc>>,
}

/// An option row with its value decoded, as returned by listings
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    pub id: i64,
    pub scope: Scope,
    pub key: String,
    pub value: Value,
    pub autoload: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a write that did not fail at the infrastructure level.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The store was modified; carries the published change.
    Applied(Change),
    /// Nothing was written: the key already exists, the value is unchanged,
    /// or there was nothing to delete.
    Rejected,
    /// The key was empty after trimming; the store was not touched.
    Ignored,
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied(_))
    }

    pub fn change(&self) -> Option<&Change> {
        match self {
            WriteOutcome::Applied(change) => Some(change),
            _ => None,
        }
    }

    pub fn into_change(self) -> Option<Change> {
        match self {
            WriteOutcome::Applied(change) => Some(change),
            _ => None,
        }
    }
}

/// Trim a key, returning `None` when nothing is left.
pub fn normalize_key(key: &str) -> Option<&str> {
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

/// Short name of a value's JSON type, used in error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Column an option listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    Key,
    Autoload,
    CreatedAt,
    UpdatedAt,
}

impl OrderField {
    pub fn column(self) -> &'static str {
        match self {
            OrderField::Id => "id",
            OrderField::Key => "key",
            OrderField::Autoload => "autoload",
            OrderField::CreatedAt => "created_at",
            OrderField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order field '{0}' (expected one of: pk, id, key, autoload, created_at, updated_at)")]
pub struct UnknownOrderField(pub String);

impl FromStr for OrderField {
    type Err = UnknownOrderField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pk" | "id" => Ok(OrderField::Id),
            "key" => Ok(OrderField::Key),
            "autoload" => Ok(OrderField::Autoload),
            "created_at" => Ok(OrderField::CreatedAt),
            "updated_at" => Ok(OrderField::UpdatedAt),
            other => Err(UnknownOrderField(other.to_string())),
        }
    }
}

/// One ordering term; `-field` sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: OrderField,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: OrderField) -> Self {
        Self { field, descending: false }
    }

    pub fn desc(field: OrderField) -> Self {
        Self { field, descending: true }
    }

    /// Parse a comma-separated list such as `-updated_at,key`.
    pub fn parse_list(terms: &str) -> Result<Vec<OrderBy>, UnknownOrderField> {
        terms.split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| match term.strip_prefix('-') {
                Some(field) => field.trim().parse().map(OrderBy::desc),
                None => term.parse().map(OrderBy::asc),
            })
            .collect()
    }
}

/// Paging and ordering for option listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    pub order: Vec<OrderBy>,
}

impl ListQuery {
    pub const DEFAULT_PER_PAGE: u32 = 25;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn order(mut self, order: Vec<OrderBy>) -> Self {
        self.order = order;
        self
    }

    /// Number of pages for `total` rows; an empty listing still has one page.
    pub fn page_count(&self, total: u64) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        total.div_ceil(per_page).max(1) as u32
    }

    /// Page actually served: below 1 becomes 1, past the end becomes the last page.
    pub fn effective_page(&self, total: u64) -> u32 {
        self.page.clamp(1, self.page_count(total))
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
            order: vec![OrderBy::asc(OrderField::Id)],
        }
    }
}

/// One page of decoded options
#[derive(Debug, Clone, PartialEq)]
pub struct OptionPage {
    pub entries: Vec<OptionEntry>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  site_name\t"), Some("site_name"));
        assert_eq!(normalize_key("   "), None);
        assert_eq!(normalize_key(""), None);
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(value_kind(&json!(null)), "null");
        assert_eq!(value_kind(&json!(1)), "number");
        assert_eq!(value_kind(&json!([1])), "array");
        assert_eq!(value_kind(&json!({"a": 1})), "object");
    }

    #[test]
    fn test_parse_order_list() {
        let order = OrderBy::parse_list("-updated_at, key,pk").unwrap();
        assert_eq!(
            order,
            vec![
                OrderBy::desc(OrderField::UpdatedAt),
                OrderBy::asc(OrderField::Key),
                OrderBy::asc(OrderField::Id),
            ]
        );

        assert_eq!(
            OrderBy::parse_list("value"),
            Err(UnknownOrderField("value".to_string()))
        );
    }

    #[test]
    fn test_page_clamping() {
        let query = ListQuery::new().per_page(10).page(9999);
        assert_eq!(query.page_count(25), 3);
        assert_eq!(query.effective_page(25), 3);
        assert_eq!(query.clone().page(0).effective_page(25), 1);
        assert_eq!(query.page_count(0), 1);
        assert_eq!(query.effective_page(0), 1);
    }
}
