//! Editing session for quire.
//!
//! [`EditorSession`] owns the document tree and connects it to the rest of
//! the engine: search navigation and replacement, statistics, the heading
//! outline, and autosave. Edits made through the session re-derive the
//! search state; edits made directly on the tree must be reported with
//! [`EditorSession::notify_change`].

use std::time::{Duration, Instant};

use serde_json::Value;

use quire_analytics::{analyze_document, DocumentStats, Rates};
use quire_autosave::{
    Autosave, AutosaveOptions, KeyValueStore, SaveStatus, ScheduledSave, StoreError,
    StoredDocument, VersionRecord,
};
use quire_doc_tree::{Document, DocumentTree, Edit, EditError, Position};
use quire_flatten::{flatten, outline, Heading};
use quire_text_search::{
    replace_all, replace_next, Match, ReplaceError, SearchOptions, SearchState, SearchStatus,
};

/// Trees that can be rebuilt from their serialized form.
pub trait RestoreTree: Sized {
    fn restore(content: &Value) -> serde_json::Result<Self>;
}

impl RestoreTree for Document {
    fn restore(content: &Value) -> serde_json::Result<Self> {
        Document::from_value(content.clone())
    }
}

/// The autosave settings a user can change while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveSettings {
    pub enabled: bool,
    pub interval: Duration,
}

/// Initial session settings.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub autosave: AutosaveOptions,
    pub search: SearchOptions,
    pub rates: Rates,
}

pub struct EditorSession<T, S> {
    tree: T,
    search: SearchState,
    /// Where searches start and navigation resumes
    cursor: Position,
    rates: Rates,
    autosave: Autosave<S>,
}

impl<T: DocumentTree, S: KeyValueStore> EditorSession<T, S> {
    pub fn new(tree: T, store: S, options: SessionOptions) -> Self {
        let search = SearchState {
            options: options.search,
            ..SearchState::default()
        };
        Self {
            tree,
            search,
            cursor: 0,
            rates: options.rates,
            autosave: Autosave::new(store, options.autosave),
        }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Direct tree access. Report edits with [`EditorSession::notify_change`].
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn autosave(&self) -> &Autosave<S> {
        &self.autosave
    }

    pub fn autosave_mut(&mut self) -> &mut Autosave<S> {
        &mut self.autosave
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Apply an edit and schedule a save.
    pub fn edit(&mut self, edit: &Edit, now: Instant) -> Result<(), EditError> {
        self.tree.apply_edit(edit)?;
        self.notify_change(now);
        Ok(())
    }

    /// Report that the tree changed: matches are recomputed and a save is
    /// scheduled.
    pub fn notify_change(&mut self, now: Instant) {
        if !self.search.is_empty() {
            self.search.refresh(&flatten(&self.tree));
        }
        self.autosave.schedule_save(now);
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Start a search and select the first match at or after the cursor.
    /// An empty query closes the search.
    pub fn set_query(&mut self, query: &str) {
        if query.is_empty() {
            self.close_search();
            return;
        }
        let flat = flatten(&self.tree);
        self.search = SearchState::new(query, self.search.options, &flat, self.cursor);
        self.select_current();
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        self.search.options = options;
        if !self.search.is_empty() {
            self.search.refresh_near(&flatten(&self.tree), self.cursor);
            self.select_current();
        }
    }

    pub fn next(&mut self) -> Option<Match> {
        let m = self.search.next_match()?;
        self.select(m);
        Some(m)
    }

    pub fn previous(&mut self) -> Option<Match> {
        let m = self.search.prev_match()?;
        self.select(m);
        Some(m)
    }

    /// Replace the current match and select the next one. Returns the span
    /// of the inserted text.
    pub fn replace_next(
        &mut self,
        replacement: &str,
        now: Instant,
    ) -> Result<Option<Match>, ReplaceError> {
        let inserted = replace_next(&mut self.tree, &mut self.search, replacement)?;
        if inserted.is_some() {
            self.autosave.schedule_save(now);
            self.select_current();
        }
        Ok(inserted)
    }

    /// Replace every match and close the search.
    ///
    /// When the tree rejects an edit, the edits already applied are kept and
    /// the search is recomputed instead of closed.
    pub fn replace_all(&mut self, replacement: &str, now: Instant) -> Result<usize, ReplaceError> {
        let matches = self.search.matches.clone();
        match replace_all(&mut self.tree, &matches, replacement) {
            Ok(count) => {
                if count > 0 {
                    self.autosave.schedule_save(now);
                }
                self.close_search();
                Ok(count)
            }
            Err(err) => {
                if matches!(err, ReplaceError::Partial { applied, .. } if applied > 0) {
                    self.autosave.schedule_save(now);
                }
                self.search.refresh(&flatten(&self.tree));
                Err(err)
            }
        }
    }

    pub fn close_search(&mut self) {
        self.search.clear();
    }

    pub fn search_status(&self) -> SearchStatus {
        self.search.status()
    }

    fn select_current(&mut self) {
        if let Some(m) = self.search.current_match() {
            self.select(m);
        }
    }

    fn select(&mut self, m: Match) {
        self.tree.set_selection(m.from, m.to);
        self.cursor = m.from;
    }

    // ------------------------------------------------------------------
    // Analytics and navigation
    // ------------------------------------------------------------------

    pub fn stats(&self) -> DocumentStats {
        analyze_document(&self.tree, &self.rates)
    }

    pub fn outline(&self) -> Vec<Heading> {
        outline(&self.tree)
    }

    /// Put the cursor at the start of the `index`-th heading.
    pub fn go_to_heading(&mut self, index: usize) -> Option<Heading> {
        let heading = outline(&self.tree).into_iter().nth(index)?;
        let pos = heading.content_start();
        self.tree.set_selection(pos, pos);
        self.cursor = pos;
        Some(heading)
    }

    // ------------------------------------------------------------------
    // Autosave
    // ------------------------------------------------------------------

    /// Drive autosave timers. Returns the attempted save, if a timer was due.
    pub fn tick(&mut self, now: Instant) -> Option<ScheduledSave> {
        self.autosave.tick(now, &self.tree)
    }

    pub fn manual_save(&mut self) -> Result<StoredDocument, StoreError> {
        self.autosave.save_now(&self.tree)
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.autosave.status()
    }

    pub fn all_documents(&self) -> Result<Vec<StoredDocument>, StoreError> {
        self.autosave.list_documents()
    }

    pub fn document_history(
        &self,
        document_id: Option<&str>,
    ) -> Result<Vec<VersionRecord>, StoreError> {
        self.autosave.history(document_id)
    }

    pub fn delete_document(&mut self, id: &str) -> Result<bool, StoreError> {
        self.autosave.delete_document(id)
    }

    pub fn set_autosave(&mut self, settings: AutosaveSettings) {
        let options = AutosaveOptions {
            enabled: settings.enabled,
            interval: settings.interval,
            ..self.autosave.options().clone()
        };
        self.autosave.set_options(options);
    }

    /// Start editing a new document under a fresh id. Pending edits of the
    /// current document are saved first.
    pub fn new_document(&mut self, tree: T) -> Result<String, StoreError> {
        self.flush_pending()?;
        self.switch_tree(tree);
        Ok(self.autosave.new_document().to_string())
    }

    fn flush_pending(&mut self) -> Result<(), StoreError> {
        if self.autosave.has_pending_changes() {
            self.autosave.save_now(&self.tree)?;
        }
        Ok(())
    }

    fn switch_tree(&mut self, tree: T) {
        self.tree = tree;
        self.cursor = 0;
        self.search.clear();
    }
}

impl<T: DocumentTree + RestoreTree, S: KeyValueStore> EditorSession<T, S> {
    /// Replace the tree with a saved document.
    ///
    /// Pending edits of the current document are saved first. Returns
    /// `false` when the document is missing or its content is unreadable.
    pub fn load_document(&mut self, id: &str) -> Result<bool, StoreError> {
        self.flush_pending()?;

        let Some(stored) = self.autosave.load_document(id)? else {
            return Ok(false);
        };
        let tree = match T::restore(&stored.content) {
            Ok(tree) => tree,
            Err(err) => {
                quire_logger::warn("session", format!("Cannot restore {}: {}", id, err));
                return Ok(false);
            }
        };

        self.switch_tree(tree);
        self.autosave.open_document(stored.id);
        Ok(true)
    }
}
