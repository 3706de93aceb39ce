//! Change notifications for option writes
//!
//! Every applied add, update or delete produces a [`Change`]. The manager
//! hands it synchronously to the subscribers of its [`ChangeBus`] and also
//! returns it to the caller, which can fold several of them into a
//! [`ChangeBatch`] to describe a whole unit of work.

use serde_json::Value;
use std::fmt;

/// What happened to an option
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub key: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Edited,
    Deleted,
}

impl Change {
    pub fn added(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            old: None,
            new: Some(value),
        }
    }

    pub fn edited(key: impl Into<String>, old: Value, new: Value) -> Self {
        Self {
            key: key.into(),
            old: Some(old),
            new: Some(new),
        }
    }

    pub fn deleted(key: impl Into<String>, old: Value) -> Self {
        Self {
            key: key.into(),
            old: Some(old),
            new: None,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match (&self.old, &self.new) {
            (None, _) => ChangeKind::Added,
            (_, None) => ChangeKind::Deleted,
            _ => ChangeKind::Edited,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Added => "added",
            ChangeKind::Edited => "edited",
            ChangeKind::Deleted => "deleted",
        })
    }
}

type Subscriber = Box<dyn Fn(&Change) + Send + Sync>;

/// Synchronous, in-process publisher. Subscribers run in registration order
/// during the write that produced the change.
#[derive(Default)]
pub struct ChangeBus {
    subscribers: Vec<Subscriber>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn publish(&self, change: &Change) {
        log::debug!("Option '{}' {}", change.key, change.kind());
        for subscriber in &self.subscribers {
            subscriber(change);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Keys touched by a batch of writes, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    added: Vec<String>,
    edited: Vec<String>,
    deleted: Vec<String>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, change: &Change) {
        let bucket = match change.kind() {
            ChangeKind::Added => &mut self.added,
            ChangeKind::Edited => &mut self.edited,
            ChangeKind::Deleted => &mut self.deleted,
        };
        bucket.push(change.key.clone());
    }

    pub fn added(&self) -> &[String] {
        &self.added
    }

    pub fn edited(&self) -> &[String] {
        &self.edited
    }

    pub fn deleted(&self) -> &[String] {
        &self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.edited.is_empty() && self.deleted.is_empty()
    }

    /// One-line audit message, e.g. `General: a, b and c added. d deleted.`
    pub fn summary(&self, title: &str) -> String {
        if self.is_empty() {
            return format!("{}: no option changes", title);
        }

        let sections: Vec<String> = [
            (ChangeKind::Added, &self.added),
            (ChangeKind::Edited, &self.edited),
            (ChangeKind::Deleted, &self.deleted),
        ]
        .into_iter()
        .filter(|(_, keys)| !keys.is_empty())
        .map(|(kind, keys)| format!("{} {}.", join_keys(keys), kind))
        .collect();

        format!("{}: {}", title, sections.join(" "))
    }
}

impl Extend<Change> for ChangeBatch {
    fn extend<T: IntoIterator<Item = Change>>(&mut self, iter: T) {
        for change in iter {
            self.record(&change);
        }
    }
}

fn join_keys(keys: &[String]) -> String {
    match keys {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_change_kind() {
        assert_eq!(Change::added("a", json!(1)).kind(), ChangeKind::Added);
        assert_eq!(Change::edited("a", json!(1), json!(2)).kind(), ChangeKind::Edited);
        assert_eq!(Change::deleted("a", json!(1)).kind(), ChangeKind::Deleted);
    }

    #[test]
    fn test_subscribers_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = ChangeBus::new();

        for name in ["audit", "ui"] {
            let seen = seen.clone();
            bus.subscribe(move |change| {
                seen.lock().unwrap().push(format!("{}:{}", name, change.key));
            });
        }

        bus.publish(&Change::added("title", json!("Home")));

        assert_eq!(bus.len(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["audit:title", "ui:title"]);
    }

    #[test]
    fn test_batch_summary() {
        let mut batch = ChangeBatch::new();
        batch.extend([
            Change::added("a", json!(1)),
            Change::added("b", json!(2)),
            Change::added("c", json!(3)),
            Change::edited("d", json!(1), json!(2)),
            Change::deleted("e", json!(null)),
        ]);

        assert_eq!(batch.added(), ["a", "b", "c"]);
        assert_eq!(
            batch.summary("General"),
            "General: a, b and c added. d edited. e deleted."
        );
    }

    #[test]
    fn test_empty_batch_summary() {
        assert_eq!(ChangeBatch::new().summary("Mail"), "Mail: no option changes");
    }
}
