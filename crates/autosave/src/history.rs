//! Bounded version history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, StoreError};

/// Store key of the history list.
pub const HISTORY_KEY: &str = "doc_history";

/// Records kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Metadata of one save. Records are never modified once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub id: String,
    pub document_id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
    pub preview: String,
}

/// FIFO of version records, most recent first.
///
/// The limit applies to the whole list, not per document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionHistory {
    records: VecDeque<VersionRecord>,
    limit: usize,
}

impl VersionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    /// Read the history list from the store.
    ///
    /// A missing list yields an empty history. So does a corrupt one, which
    /// is logged and overwritten by the next save.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, limit: usize) -> Result<Self, StoreError> {
        let mut history = Self::new(limit);
        let Some(raw) = store.get(HISTORY_KEY)? else {
            return Ok(history);
        };

        match serde_json::from_str::<Vec<VersionRecord>>(&raw) {
            Ok(records) => {
                history.records = records.into();
                history.records.truncate(limit);
            }
            Err(err) => {
                quire_logger::warn("autosave", format!("Ignoring corrupt history: {}", err));
            }
        }
        Ok(history)
    }

    /// Write the list back to the store.
    pub fn persist<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.records)?;
        store.set(HISTORY_KEY, json)
    }

    /// Insert at the head, evicting the oldest records past the limit.
    pub fn push(&mut self, record: VersionRecord) {
        self.records.push_front(record);
        self.records.truncate(self.limit);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// All records, most recent first.
    pub fn records(&self) -> impl Iterator<Item = &VersionRecord> {
        self.records.iter()
    }

    /// Records of one document, most recent first.
    pub fn for_document<'a>(
        &'a self,
        document_id: &'a str,
    ) -> impl Iterator<Item = &'a VersionRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.document_id == document_id)
    }
}

impl Default for VersionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
