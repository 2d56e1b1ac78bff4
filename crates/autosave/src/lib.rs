//! Versioned autosave for quire.
//!
//! Documents are written to a [`KeyValueStore`] as JSON snapshots under
//! `doc_<id>` keys. Every save also appends a [`VersionRecord`] to one
//! bounded history list stored under `doc_history`:
//!
//! ```text
//! doc_20240315-142530-042 → { id, title, content, text, updatedAt }
//! doc_history             → [ newest record, ..., oldest record ]
//! ```
//!
//! Saves are driven by a [`SaveScheduler`] that the caller ticks from its
//! event loop.

mod autosave;
mod history;
mod scheduler;
mod snapshot;
mod store;

pub use autosave::{Autosave, AutosaveOptions, SaveStatus, ScheduledSave};
pub use history::{VersionHistory, VersionRecord, DEFAULT_HISTORY_LIMIT, HISTORY_KEY};
pub use scheduler::{SaveScheduler, SaveTrigger, DEFAULT_DEBOUNCE, DEFAULT_INTERVAL};
pub use snapshot::{
    derive_title, document_key, generate_document_id, preview, StoredDocument, DOCUMENT_PREFIX,
    UNTITLED,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
