//! Validated-draft machinery shared by every form in the client.
//!
//! A form is a [`Draft`] whose fields are named by a [`FormField`] enum.
//! [`DraftController`] owns one draft, applies edits, runs validation and
//! hands clean drafts to a [`SubmitDelegate`]. Async operations are tracked
//! through a [`TaskHandle`] so callers can see what is in flight.

pub mod controller;
pub mod task;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use controller::{
    Draft, DraftController, DraftError, Notice, NoticeLevel, Phase, SubmitDelegate, SubmitOutcome,
};
pub use task::{Busy, InFlight, TaskHandle, TaskStatus};

/// A form field with a stable wire key.
///
/// Usually implemented with `#[derive(FormField)]` from `draft-kit-derive`.
pub trait FormField: Copy + Sized + 'static {
    /// Every field, in declaration order.
    const ALL: &'static [Self];

    /// Key used in error sets and by callers that address fields by name.
    fn key(&self) -> &'static str;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }
}

/// Field key → human-readable message. Empty means submittable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSet(BTreeMap<String, String>);

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a key.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| message.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn merge(&mut self, other: ErrorSet) {
        for (key, message) in other.0 {
            self.0.insert(key, message);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ErrorSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ErrorSet::new();
        for (key, message) in iter {
            set.insert(key, message);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_wins() {
        let mut errors = ErrorSet::new();
        errors.insert("email", "Email is required");
        errors.insert("email", "Email is invalid");
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn merge_overwrites_existing_keys() {
        let mut errors: ErrorSet = [("email", "Email is required")].into_iter().collect();
        errors.merge([("email", "Email is already registered"), ("name", "x")].into_iter().collect());
        assert_eq!(errors.get("email"), Some("Email is already registered"));
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["email", "name"]);
    }

    #[test]
    fn serializes_as_plain_map() {
        let errors: ErrorSet = [("title", "Title is required")].into_iter().collect();
        let json = serde_json::to_value(&errors).expect("serialize");
        assert_eq!(json, serde_json::json!({ "title": "Title is required" }));
    }
}
