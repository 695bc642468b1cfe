use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::occurrence::OccurrenceKey;

/// Snapshot of which occurrences have been marked done.
///
/// Holds ledger keys in their stored string form (see [`OccurrenceKey`]),
/// so a snapshot loaded from storage can be used as-is, including keys this
/// code would not have produced. The recurrence engine only reads it;
/// callers hand it a fresh snapshot on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    keys: BTreeSet<String>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the occurrence of `template_id` on `date` as done.
    /// Returns `false` when it already was.
    pub fn mark_occurrence_completed(&mut self, template_id: &str, date: NaiveDate) -> bool {
        let key = OccurrenceKey::new(template_id, date).ledger_key();
        let inserted = self.keys.insert(key);
        debug!(template_id, %date, inserted, "mark occurrence completed");
        inserted
    }

    /// Clears the done mark. Returns `false` when there was none.
    pub fn unmark_occurrence_completed(&mut self, template_id: &str, date: NaiveDate) -> bool {
        let key = OccurrenceKey::new(template_id, date).ledger_key();
        let removed = self.keys.remove(&key);
        debug!(template_id, %date, removed, "unmark occurrence completed");
        removed
    }

    pub fn is_completed(&self, key: &OccurrenceKey) -> bool {
        self.keys.contains(&key.ledger_key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn insert_key(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Completed occurrences of one template, in date order. Keys that do not
    /// parse are skipped.
    pub fn keys_for_template(&self, template_id: &str) -> Vec<OccurrenceKey> {
        let mut keys: Vec<OccurrenceKey> = self
            .keys
            .iter()
            .filter_map(|k| OccurrenceKey::parse_ledger_key(k))
            .filter(|k| k.template_id == template_id)
            .collect();
        keys.sort();
        keys
    }
}

impl FromIterator<String> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mark_writes_legacy_key() {
        let mut ledger = CompletionLedger::new();
        assert!(ledger.mark_occurrence_completed("t1", ymd(2024, 1, 2)));
        assert!(ledger.contains_key("t1_occurrence_2024-01-02_2024-01-02"));
        assert!(ledger.is_completed(&OccurrenceKey::new("t1", ymd(2024, 1, 2))));
        assert!(!ledger.is_completed(&OccurrenceKey::new("t1", ymd(2024, 1, 3))));
    }

    #[test]
    fn test_mark_and_unmark_are_idempotent() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_occurrence_completed("t1", ymd(2024, 1, 2));
        assert!(!ledger.mark_occurrence_completed("t1", ymd(2024, 1, 2)));
        assert_eq!(ledger.len(), 1);

        assert!(ledger.unmark_occurrence_completed("t1", ymd(2024, 1, 2)));
        assert!(!ledger.unmark_occurrence_completed("t1", ymd(2024, 1, 2)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_keys_for_template() {
        let ledger: CompletionLedger = [
            "t1_occurrence_2024-01-05_2024-01-05",
            "t1_occurrence_2024-01-02_2024-01-02",
            "t2_occurrence_2024-01-02_2024-01-02",
            "garbage",
        ]
        .into_iter()
        .collect();
        let dates: Vec<NaiveDate> =
            ledger.keys_for_template("t1").into_iter().map(|k| k.date).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 2), ymd(2024, 1, 5)]);
    }

    #[test]
    fn test_serializes_as_plain_string_set() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_occurrence_completed("t1", ymd(2024, 1, 2));
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"["t1_occurrence_2024-01-02_2024-01-02"]"#);
        let back: CompletionLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
