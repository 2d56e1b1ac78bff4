//! Persisted document snapshots and the metadata derived from them.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quire_doc_tree::DocumentTree;
use quire_flatten::outline;

/// Prefix shared by every document key.
pub const DOCUMENT_PREFIX: &str = "doc_";

/// Title of documents with no text.
pub const UNTITLED: &str = "Untitled Document";

const TITLE_MAX_CHARS: usize = 60;
const PREVIEW_MAX_CHARS: usize = 100;

/// A saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    /// Serialized tree in rich-document JSON form.
    pub content: Value,
    /// Plain text derived from the tree.
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

/// Store key of a document.
pub fn document_key(id: &str) -> String {
    format!("{}{}", DOCUMENT_PREFIX, id)
}

/// Document title: the first non-empty heading, else the first non-empty
/// line of the text, else [`UNTITLED`].
pub fn derive_title<T: DocumentTree + ?Sized>(tree: &T, text: &str) -> String {
    let heading = outline(tree)
        .into_iter()
        .map(|heading| heading.text.trim().to_string())
        .find(|text| !text.is_empty());

    let title = heading.or_else(|| {
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    });

    match title {
        Some(title) => truncate_chars(&title, TITLE_MAX_CHARS),
        None => UNTITLED.to_string(),
    }
}

/// First characters of the text for history listings.
pub fn preview(text: &str) -> String {
    truncate_chars(text.trim(), PREVIEW_MAX_CHARS)
}

/// New document id from the local clock, e.g. `20240315-142530-042`.
pub fn generate_document_id() -> String {
    let now = Local::now();
    let millis = now.timestamp_subsec_millis();
    format!("{}-{:03}", now.format("%Y%m%d-%H%M%S"), millis)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
