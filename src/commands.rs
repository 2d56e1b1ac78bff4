//! Subcommand implementations.
//!
//! Every command writes its report to the given writer so it can be
//! checked in tests.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use quire_analytics::{analyze_document, Rates};
use quire_autosave::{AutosaveOptions, FileStore};
use quire_config::{Config, SearchSettings};
use quire_doc_tree::{Document, DocumentTree};
use quire_flatten::flatten;
use quire_session::{EditorSession, SessionOptions};
use quire_text_search::{find_all, find_matches, replace_all, SearchOptions};

pub type Session = EditorSession<Document, FileStore>;

/// Search flags shared by `find` and `replace`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Match case exactly
    #[arg(short = 'c', long)]
    pub case_sensitive: bool,

    /// Match whole words only
    #[arg(short, long)]
    pub whole_word: bool,

    /// Treat the query as a regular expression
    #[arg(short, long)]
    pub regex: bool,
}

impl SearchArgs {
    /// Flags given on the command line, on top of the configured defaults.
    pub fn options(&self, defaults: &SearchSettings) -> SearchOptions {
        SearchOptions {
            case_sensitive: self.case_sensitive || defaults.case_sensitive,
            whole_word: self.whole_word || defaults.whole_word,
            regex: self.regex || defaults.regex,
        }
    }
}

pub fn rates(config: &Config) -> Rates {
    Rates {
        reading_wpm: config.analytics.reading_wpm,
        speaking_wpm: config.analytics.speaking_wpm,
    }
}

pub fn session_options(config: &Config) -> SessionOptions {
    SessionOptions {
        autosave: AutosaveOptions {
            enabled: config.autosave.enabled,
            debounce: Duration::from_millis(config.autosave.debounce_ms),
            interval: Duration::from_millis(config.autosave.interval_ms),
            history_limit: config.autosave.history_limit,
        },
        search: SearchOptions {
            case_sensitive: config.search.case_sensitive,
            whole_word: config.search.whole_word,
            regex: config.search.regex,
        },
        rates: rates(config),
    }
}

pub fn open_session(config: &Config, store_dir: &Path, doc: Document) -> Session {
    EditorSession::new(doc, FileStore::new(store_dir), session_options(config))
}

/// Read a document: `.json` files (or content starting with `{`) as
/// rich-document JSON, anything else as plain text with one paragraph
/// per line.
pub fn read_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;

    let is_json = path.extension().is_some_and(|ext| ext == "json")
        || content.trim_start().starts_with('{');
    if is_json {
        Document::from_json(&content)
            .with_context(|| format!("Failed to parse document: {}", path.display()))
    } else {
        Ok(Document::from_plain_text(&content))
    }
}

/// Write a document in the format its extension asks for.
pub fn write_document(path: &Path, doc: &Document) -> Result<()> {
    let content = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::to_string_pretty(&doc.serialized_tree())?
    } else {
        format!("{}\n", flatten(doc).text())
    };
    fs::write(path, content)
        .with_context(|| format!("Failed to write document: {}", path.display()))
}

pub fn print_text(doc: &Document, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", flatten(doc).text())?;
    Ok(())
}

pub fn stats(doc: &Document, config: &Config, json: bool, out: &mut impl Write) -> Result<()> {
    let stats = analyze_document(doc, &rates(config));
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
        return Ok(());
    }

    let text = &stats.text;
    writeln!(out, "Words:              {}", text.words)?;
    writeln!(out, "Characters:         {}", text.characters)?;
    writeln!(out, "Characters (no sp): {}", text.characters_no_spaces)?;
    writeln!(out, "Sentences:          {}", text.sentences)?;
    writeln!(out, "Syllables:          {}", text.syllables)?;
    writeln!(out, "Reading time:       {} min", text.reading_time_minutes)?;
    writeln!(out, "Speaking time:      {} min", text.speaking_time_minutes)?;
    writeln!(
        out,
        "Reading ease:       {} ({})",
        text.flesch_reading_ease,
        text.readability.label()
    )?;
    writeln!(out, "Grade level:        {}", text.flesch_kincaid_grade)?;
    writeln!(out, "Words per sentence: {}", text.avg_words_per_sentence)?;
    writeln!(out, "Syllables per word: {}", text.avg_syllables_per_word)?;

    let blocks = &stats.blocks;
    writeln!(
        out,
        "Blocks:             {} paragraphs, {} headings, {} lists, {} tables, {} images, {} links",
        blocks.paragraphs, blocks.headings, blocks.lists, blocks.tables, blocks.images, blocks.links
    )?;
    Ok(())
}

/// Print every match with its document range. Returns the match count.
pub fn find(
    doc: &Document,
    query: &str,
    options: &SearchOptions,
    out: &mut impl Write,
) -> Result<usize> {
    let flat = flatten(doc);
    let hits = find_all(flat.text(), query, options);
    let matches = find_matches(&flat, query, options);

    for (hit, m) in hits.iter().zip(&matches) {
        let found: String = flat
            .text()
            .chars()
            .skip(hit.start)
            .take(hit.end - hit.start)
            .collect();
        writeln!(out, "{}..{}\t{}", m.from, m.to, found.escape_debug())?;
    }
    writeln!(out, "{} matches", matches.len())?;
    Ok(matches.len())
}

/// Replace every match in the document. Returns the replacement count.
pub fn replace(
    doc: &mut Document,
    query: &str,
    replacement: &str,
    options: &SearchOptions,
) -> Result<usize> {
    let matches = find_matches(&flatten(doc), query, options);
    let count = replace_all(doc, &matches, replacement)?;
    Ok(count)
}

pub fn outline(doc: &Document, out: &mut impl Write) -> Result<()> {
    for heading in quire_flatten::outline(doc) {
        let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
        writeln!(out, "{}{}", indent, heading.text)?;
    }
    Ok(())
}

pub fn save(session: &mut Session, id: Option<String>, out: &mut impl Write) -> Result<()> {
    if let Some(id) = id {
        session.autosave_mut().open_document(id);
    }
    let saved = session.manual_save().context("Failed to save document")?;
    writeln!(out, "{}\t{}", saved.id, saved.title)?;
    Ok(())
}

pub fn list(session: &Session, out: &mut impl Write) -> Result<()> {
    for doc in session.all_documents()? {
        writeln!(
            out,
            "{}\t{}\t{}",
            doc.id,
            doc.updated_at.format("%Y-%m-%d %H:%M:%S"),
            doc.title
        )?;
    }
    Ok(())
}

pub fn history(session: &Session, document: Option<&str>, out: &mut impl Write) -> Result<()> {
    for record in session.document_history(document)? {
        writeln!(
            out,
            "{}\t{}\t{}\t{} words\t{}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.document_id,
            record.id,
            record.word_count,
            record.title
        )?;
    }
    Ok(())
}

pub fn show(session: &mut Session, id: &str, json: bool, out: &mut impl Write) -> Result<()> {
    if !session.load_document(id)? {
        bail!("No saved document with id {}", id);
    }
    if json {
        let tree = serde_json::to_string_pretty(&session.tree().serialized_tree())?;
        writeln!(out, "{}", tree)?;
    } else {
        writeln!(out, "{}", session.tree().plain_text())?;
    }
    Ok(())
}

pub fn delete(session: &mut Session, id: &str, out: &mut impl Write) -> Result<()> {
    if !session.delete_document(id)? {
        bail!("No saved document with id {}", id);
    }
    writeln!(out, "Deleted {}", id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    const REPORT: &str = r#"{
        "type": "doc",
        "content": [
            {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Report"}]},
            {"type": "paragraph", "content": [{"type": "text", "text": "The cat sat. It ran fast."}]},
            {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Details"}]}
        ]
    }"#;

    #[test]
    fn test_read_document_formats() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("report.json");
        let text_path = dir.path().join("notes.txt");
        fs::write(&json_path, REPORT).unwrap();
        fs::write(&text_path, "line one\nline two\n").unwrap();

        let report = read_document(&json_path).unwrap();
        assert_eq!(report.plain_text(), "Report\n\nThe cat sat. It ran fast.\n\nDetails");

        let notes = read_document(&text_path).unwrap();
        assert_eq!(notes.plain_text(), "line one\n\nline two");

        fs::write(&json_path, "{broken").unwrap();
        assert!(read_document(&json_path).is_err());
    }

    #[test]
    fn test_stats_report() {
        let doc = Document::from_plain_text("The cat sat. It ran fast.");
        let text = output(|out| stats(&doc, &Config::default(), false, out));
        assert!(text.contains("Words:              6"));
        assert!(text.contains("Sentences:          2"));
        assert!(text.contains("Reading time:       1 min"));

        let json = output(|out| stats(&doc, &Config::default(), true, out));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["words"], 6);
        assert_eq!(value["blocks"]["paragraphs"], 1);
    }

    #[test]
    fn test_find_lists_matches() {
        let doc = Document::from_plain_text("Teh the the.");
        let opts = SearchOptions {
            whole_word: true,
            ..Default::default()
        };
        let mut buf = Vec::new();
        let count = find(&doc, "the", &opts, &mut buf).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "5..8\tthe\n9..12\tthe\n2 matches\n");
    }

    #[test]
    fn test_replace_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::from_plain_text("red fish\nblue fish");
        let count = replace(&mut doc, "fish", "bird", &SearchOptions::default()).unwrap();
        assert_eq!(count, 2);

        let text_path = dir.path().join("out.txt");
        write_document(&text_path, &doc).unwrap();
        assert_eq!(fs::read_to_string(&text_path).unwrap(), "red bird\nblue bird\n");

        let json_path = dir.path().join("out.json");
        write_document(&json_path, &doc).unwrap();
        assert_eq!(read_document(&json_path).unwrap(), doc);
    }

    #[test]
    fn test_outline_indents_levels() {
        let doc = Document::from_json(REPORT).unwrap();
        let text = output(|out| outline(&doc, out));
        assert_eq!(text, "Report\n  Details\n");
    }

    #[test]
    fn test_store_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let doc = Document::from_json(REPORT).unwrap();

        let mut session = open_session(&config, dir.path(), doc);
        let saved = output(|out| save(&mut session, Some("report".to_string()), out));
        assert_eq!(saved, "report\tReport\n");

        let mut session = open_session(&config, dir.path(), Document::default());
        let listing = output(|out| list(&session, out));
        assert!(listing.starts_with("report\t"));
        assert!(listing.trim_end().ends_with("\tReport"));

        let shown = output(|out| show(&mut session, "report", false, out));
        assert!(shown.starts_with("Report\n\nThe cat sat."));

        let versions = output(|out| history(&session, Some("report"), out));
        assert_eq!(versions.lines().count(), 1);
        assert!(versions.contains("\t8 words\t"));

        let deleted = output(|out| delete(&mut session, "report", out));
        assert_eq!(deleted, "Deleted report\n");
        assert!(delete(&mut session, "report", &mut Vec::new()).is_err());
        assert!(show(&mut session, "report", false, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_search_flags_extend_config() {
        let args = SearchArgs {
            case_sensitive: false,
            whole_word: true,
            regex: false,
        };
        let defaults = SearchSettings {
            case_sensitive: true,
            ..Default::default()
        };
        let opts = args.options(&defaults);
        assert!(opts.case_sensitive && opts.whole_word && !opts.regex);
    }

    #[test]
    fn test_session_options_from_config() {
        let mut config = Config::default();
        config.autosave.interval_ms = 5000;
        config.analytics.reading_wpm = 300;

        let opts = session_options(&config);
        assert_eq!(opts.autosave.interval, Duration::from_secs(5));
        assert_eq!(opts.autosave.debounce, Duration::from_secs(1));
        assert_eq!(opts.rates.reading_wpm, 300);
    }
}
