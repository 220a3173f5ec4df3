//! Ordered key/value configuration record and record comparison.
//!
//! A [`Record`] is the effective configuration of one resolved source. Keys
//! keep the position of their first assignment; later assignments replace the
//! value in place. Values are the literal comma-joined right-hand side text.

use std::collections::BTreeMap;
use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Placeholder shown for a key the record does not contain
pub const ABSENT: &str = "--";

/// Keys whose presence or value differ between two records, with the value
/// on each side (`None` when absent)
pub type Diff = BTreeMap<String, (Option<String>, Option<String>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    label: String,
    created_at: SystemTime,
    entries: IndexMap<String, String>,
}

impl Record {
    #[must_use]
    pub fn new(label: impl Into<String>, created_at: SystemTime) -> Self {
        Self {
            label: label.into(),
            created_at,
            entries: IndexMap::new(),
        }
    }

    /// Human-readable source identifier, e.g. `run.tar(MOM_parameter_doc.all)`
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Modification time of the source
    #[must_use]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Insert or update a key. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Value for `key`, or [`ABSENT`]
    #[must_use]
    pub fn get_or_placeholder(&self, key: &str) -> &str {
        self.get(key).unwrap_or(ABSENT)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare against `other`.
    ///
    /// Keys equal in both records are omitted; a key missing on one side is
    /// reported with `None` on that side.
    #[must_use]
    pub fn compare(&self, other: &Record) -> Diff {
        let mut diff = Diff::new();
        let mut unmatched: IndexMap<&str, &str> = other.iter().collect();

        for (key, mine) in self.iter() {
            match unmatched.swap_remove(key) {
                None => {
                    diff.insert(key.to_string(), (Some(mine.to_string()), None));
                }
                Some(theirs) if theirs != mine => {
                    diff.insert(
                        key.to_string(),
                        (Some(mine.to_string()), Some(theirs.to_string())),
                    );
                }
                Some(_) => {}
            }
        }
        for (key, theirs) in unmatched {
            diff.insert(key.to_string(), (None, Some(theirs.to_string())));
        }

        diff
    }
}

/// Serialized as the bare key/value map
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
