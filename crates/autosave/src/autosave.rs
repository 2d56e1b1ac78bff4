//! The autosave component: scheduling, snapshot writes and document listing.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use quire_analytics::count_words;
use quire_doc_tree::DocumentTree;

use crate::history::{VersionHistory, VersionRecord, DEFAULT_HISTORY_LIMIT, HISTORY_KEY};
use crate::scheduler::{SaveScheduler, SaveTrigger, DEFAULT_DEBOUNCE, DEFAULT_INTERVAL};
use crate::snapshot::{
    derive_title, document_key, generate_document_id, preview, StoredDocument, DOCUMENT_PREFIX,
};
use crate::store::{KeyValueStore, StoreError};

/// Autosave settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveOptions {
    pub enabled: bool,
    /// Quiet window after the last edit.
    pub debounce: Duration,
    /// Periodic flush while edits keep coming.
    pub interval: Duration,
    /// Version records kept across all documents.
    pub history_limit: usize,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce: DEFAULT_DEBOUNCE,
            interval: DEFAULT_INTERVAL,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Outcome of the most recent save, for a status indicator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saved(DateTime<Utc>),
    Failed(String),
}

/// A save attempted by [`Autosave::tick`].
#[derive(Debug)]
pub struct ScheduledSave {
    pub trigger: SaveTrigger,
    pub result: Result<StoredDocument, StoreError>,
}

/// Saves one open document into a key-value store.
pub struct Autosave<S> {
    store: S,
    options: AutosaveOptions,
    scheduler: SaveScheduler,
    document_id: String,
    /// Disambiguates version ids created within the same millisecond
    sequence: u64,
    status: SaveStatus,
}

impl<S: KeyValueStore> Autosave<S> {
    /// Create an autosave for a new document.
    pub fn new(store: S, options: AutosaveOptions) -> Self {
        let mut scheduler = SaveScheduler::new(options.debounce, options.interval);
        scheduler.set_enabled(options.enabled);
        let mut autosave = Self {
            store,
            options,
            scheduler,
            document_id: String::new(),
            sequence: 0,
            status: SaveStatus::Idle,
        };
        autosave.document_id = autosave.unique_document_id();
        autosave
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn options(&self) -> &AutosaveOptions {
        &self.options
    }

    /// Apply new settings. Disabling cancels pending timers.
    pub fn set_options(&mut self, options: AutosaveOptions) {
        self.scheduler.set_timings(options.debounce, options.interval);
        self.scheduler.set_enabled(options.enabled);
        self.options = options;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
        self.scheduler.set_enabled(enabled);
    }

    /// Id the next save is written under.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Continue saving under an existing document id.
    pub fn open_document(&mut self, id: impl Into<String>) {
        self.document_id = id.into();
        self.status = SaveStatus::Idle;
        self.scheduler.complete(true);
    }

    /// Start a fresh document with a new id. Returns the id.
    pub fn new_document(&mut self) -> &str {
        let id = self.unique_document_id();
        self.open_document(id);
        &self.document_id
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// Whether edits are waiting to be saved.
    pub fn has_pending_changes(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// When the caller should tick next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Report an edit. Repeated calls within the debounce window collapse
    /// into one save.
    pub fn schedule_save(&mut self, now: Instant) {
        self.scheduler.notify_change(now);
    }

    /// Save if a timer is due. Returns the trigger that fired and the
    /// outcome of the save.
    ///
    /// After a failure the change stays pending and the next trigger retries.
    pub fn tick<T: DocumentTree + ?Sized>(
        &mut self,
        now: Instant,
        tree: &T,
    ) -> Option<ScheduledSave> {
        let trigger = self.scheduler.poll(now)?;
        quire_logger::debug("autosave", format!("Save triggered by {:?}", trigger));
        let result = self.save_now(tree);
        Some(ScheduledSave { trigger, result })
    }

    /// Write the document and append a version record immediately.
    pub fn save_now<T: DocumentTree + ?Sized>(
        &mut self,
        tree: &T,
    ) -> Result<StoredDocument, StoreError> {
        let result = self.write_snapshot(tree);
        self.scheduler.complete(result.is_ok());

        match &result {
            Ok(doc) => {
                quire_logger::info("autosave", format!("Saved {} ({:?})", doc.id, doc.title));
                self.status = SaveStatus::Saved(doc.updated_at);
            }
            Err(err) => {
                quire_logger::warn(
                    "autosave",
                    format!("Save of {} failed: {}", self.document_id, err),
                );
                self.status = SaveStatus::Failed(err.to_string());
            }
        }
        result
    }

    fn write_snapshot<T: DocumentTree + ?Sized>(
        &mut self,
        tree: &T,
    ) -> Result<StoredDocument, StoreError> {
        let now = Utc::now();
        let text = tree.plain_text();
        let doc = StoredDocument {
            id: self.document_id.clone(),
            title: derive_title(tree, &text),
            content: tree.serialized_tree(),
            text,
            updated_at: now,
        };

        let json = serde_json::to_string(&doc)?;
        self.store.set(&document_key(&doc.id), json)?;

        self.sequence += 1;
        let mut history = VersionHistory::load(&self.store, self.options.history_limit)?;
        history.push(VersionRecord {
            id: format!("v{}-{}", now.timestamp_millis(), self.sequence),
            document_id: doc.id.clone(),
            title: doc.title.clone(),
            timestamp: now,
            word_count: count_words(&doc.text),
            preview: preview(&doc.text),
        });
        history.persist(&mut self.store)?;

        Ok(doc)
    }

    /// All saved documents, most recently updated first.
    ///
    /// Entries that cannot be read or parsed are logged and skipped.
    pub fn list_documents(&self) -> Result<Vec<StoredDocument>, StoreError> {
        let mut documents = Vec::new();
        for key in self.store.keys()? {
            if !key.starts_with(DOCUMENT_PREFIX) || key == HISTORY_KEY {
                continue;
            }
            match self.read_entry(&key) {
                Ok(Some(doc)) => documents.push(doc),
                Ok(None) => {}
                Err(err) => {
                    quire_logger::warn("autosave", format!("Skipping entry {}: {}", key, err));
                }
            }
        }

        documents.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(documents)
    }

    /// Load one document. Missing and corrupt entries both yield `None`.
    pub fn load_document(&self, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let key = document_key(id);
        if key == HISTORY_KEY {
            return Ok(None);
        }
        self.read_entry(&key)
    }

    /// Read and parse one document entry. Content that cannot be read as a
    /// document is logged and treated as absent.
    fn read_entry(&self, key: &str) -> Result<Option<StoredDocument>, StoreError> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(err) if err.is_corrupt_entry() => {
                quire_logger::warn("autosave", format!("Unreadable entry {}: {}", key, err));
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(Some(doc)),
            Err(err) => {
                quire_logger::warn("autosave", format!("Corrupt entry {}: {}", key, err));
                Ok(None)
            }
        }
    }

    /// Delete a document. Its version records stay in the history.
    pub fn delete_document(&mut self, id: &str) -> Result<bool, StoreError> {
        let key = document_key(id);
        if key == HISTORY_KEY {
            return Ok(false);
        }
        let removed = self.store.remove(&key)?;
        if removed {
            quire_logger::info("autosave", format!("Deleted {}", id));
        }
        Ok(removed)
    }

    /// Version records, most recent first, optionally for one document.
    pub fn history(&self, document_id: Option<&str>) -> Result<Vec<VersionRecord>, StoreError> {
        let history = VersionHistory::load(&self.store, self.options.history_limit)?;
        let records = match document_id {
            Some(id) => history.for_document(id).cloned().collect(),
            None => history.records().cloned().collect(),
        };
        Ok(records)
    }

    fn unique_document_id(&self) -> String {
        let base = generate_document_id();
        let taken = |id: &str| {
            id == self.document_id || matches!(self.store.get(&document_key(id)), Ok(Some(_)))
        };
        if !taken(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
