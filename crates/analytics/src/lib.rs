//! Document statistics and readability for quire.
//!
//! Everything here is a pure function of the flattened text (and, for block
//! counts, of the node structure). Counts are approximations: abbreviations
//! and decimal numbers get no special treatment.

mod blocks;
mod readability;

pub use blocks::{count_blocks, BlockCounts};
pub use readability::{
    count_syllables, flesch_kincaid_grade, flesch_reading_ease, ReadabilityLevel,
};

use std::sync::OnceLock;

use quire_doc_tree::DocumentTree;
use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// Default reading speed in words per minute.
pub const READING_WPM: u32 = 225;
/// Default speaking speed in words per minute.
pub const SPEAKING_WPM: u32 = 140;

/// Words-per-minute rates used for time estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rates {
    pub reading_wpm: u32,
    pub speaking_wpm: u32,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            reading_wpm: READING_WPM,
            speaking_wpm: SPEAKING_WPM,
        }
    }
}

/// Statistics computed from flattened text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub words: usize,
    /// Grapheme clusters.
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub sentences: usize,
    pub syllables: usize,
    pub reading_time_minutes: usize,
    pub speaking_time_minutes: usize,
    /// Flesch Reading Ease, 0 to 100.
    pub flesch_reading_ease: f64,
    /// Flesch-Kincaid grade level, one decimal.
    pub flesch_kincaid_grade: f64,
    pub avg_words_per_sentence: f64,
    pub avg_syllables_per_word: f64,
    pub readability: ReadabilityLevel,
}

/// Text statistics plus structural counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    #[serde(flatten)]
    pub text: TextStats,
    pub blocks: BlockCounts,
}

/// Analyze text with the default rates.
pub fn analyze(text: &str) -> TextStats {
    analyze_with(text, &Rates::default())
}

/// Analyze text.
pub fn analyze_with(text: &str, rates: &Rates) -> TextStats {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let sentences = count_sentences(text);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let characters = text.graphemes(true).count();
    let characters_no_spaces = text
        .graphemes(true)
        .filter(|g| !g.chars().all(char::is_whitespace))
        .count();

    let words_per_sentence = ratio(word_count, sentences);
    let syllables_per_word = ratio(syllables, word_count);

    let (ease, grade) = if word_count == 0 {
        (0.0, 0.0)
    } else {
        (
            flesch_reading_ease(words_per_sentence, syllables_per_word),
            flesch_kincaid_grade(words_per_sentence, syllables_per_word),
        )
    };

    TextStats {
        words: word_count,
        characters,
        characters_no_spaces,
        sentences,
        syllables,
        reading_time_minutes: minutes(word_count, rates.reading_wpm),
        speaking_time_minutes: minutes(word_count, rates.speaking_wpm),
        flesch_reading_ease: ease,
        flesch_kincaid_grade: grade,
        avg_words_per_sentence: round_to(words_per_sentence, 1),
        avg_syllables_per_word: round_to(syllables_per_word, 2),
        readability: ReadabilityLevel::from_score(ease),
    }
}

/// Flatten the document and analyze it, including block counts.
pub fn analyze_document<T: DocumentTree + ?Sized>(tree: &T, rates: &Rates) -> DocumentStats {
    let flat = quire_flatten::flatten(tree);
    DocumentStats {
        text: analyze_with(flat.text(), rates),
        blocks: count_blocks(tree),
    }
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of sentences: runs of `.`, `!` or `?` followed by whitespace or
/// the end of the text close a sentence.
pub fn count_sentences(text: &str) -> usize {
    static TERMINATOR: OnceLock<Regex> = OnceLock::new();
    let terminator = TERMINATOR
        .get_or_init(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence pattern is valid"));
    terminator
        .split(text)
        .filter(|piece| !piece.trim().is_empty())
        .count()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn minutes(words: usize, wpm: u32) -> usize {
    let wpm = wpm.max(1) as usize;
    words.div_ceil(wpm).max(1)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_doc_tree::{Document, Node};

    #[test]
    fn test_empty_text() {
        let stats = analyze("");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.sentences, 0);
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.flesch_reading_ease, 0.0);
        assert_eq!(stats.flesch_kincaid_grade, 0.0);
        assert_eq!(stats.reading_time_minutes, 1);
        assert_eq!(stats.speaking_time_minutes, 1);
    }

    #[test]
    fn test_short_sentences() {
        let stats = analyze("The cat sat. It ran fast.");
        assert_eq!(stats.words, 6);
        assert_eq!(stats.sentences, 2);
        assert_eq!(stats.syllables, 6);
        assert_eq!(stats.reading_time_minutes, 1);
        // 206.835 - 1.015 * 3 - 84.6 * 1 is above 100
        assert_eq!(stats.flesch_reading_ease, 100.0);
        // 0.39 * 3 + 11.8 * 1 - 15.59 is negative
        assert_eq!(stats.flesch_kincaid_grade, 0.0);
        assert_eq!(stats.readability, ReadabilityLevel::VeryEasy);
    }

    #[test]
    fn test_harder_text() {
        let stats = analyze("Reading is wonderful. Beautiful sentences help.");
        assert_eq!(stats.words, 6);
        assert_eq!(stats.sentences, 2);
        assert_eq!(stats.syllables, 13);
        assert_eq!(stats.flesch_reading_ease, 20.0);
        assert_eq!(stats.flesch_kincaid_grade, 11.1);
        assert_eq!(stats.avg_words_per_sentence, 3.0);
        assert_eq!(stats.avg_syllables_per_word, 2.17);
        assert_eq!(stats.readability, ReadabilityLevel::VeryDifficult);
    }

    #[test]
    fn test_sentence_splitting() {
        assert_eq!(count_sentences("Hello world"), 1);
        assert_eq!(count_sentences("Wait... what?! Really."), 3);
        assert_eq!(count_sentences("Pi is 3.14 roughly."), 1);
        assert_eq!(count_sentences("Dr. Smith arrived."), 2);
        assert_eq!(count_sentences("  ...  "), 0);
    }

    #[test]
    fn test_time_estimates() {
        let text = "word ".repeat(450);
        let stats = analyze(&text);
        assert_eq!(stats.words, 450);
        assert_eq!(stats.reading_time_minutes, 2);
        assert_eq!(stats.speaking_time_minutes, 4);

        let slow = Rates {
            reading_wpm: 100,
            speaking_wpm: 50,
        };
        let stats = analyze_with(&text, &slow);
        assert_eq!(stats.reading_time_minutes, 5);
        assert_eq!(stats.speaking_time_minutes, 9);
    }

    #[test]
    fn test_character_counts() {
        let stats = analyze("héllo wörld\n");
        assert_eq!(stats.characters, 12);
        assert_eq!(stats.characters_no_spaces, 10);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let text = "One sentence here. Another one there! And a question?";
        assert_eq!(analyze(text), analyze(text));
    }

    #[test]
    fn test_analyze_document_separates_blocks() {
        let doc = Document::new(Node::doc(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::paragraph(vec![Node::text("First line.")]),
            Node::paragraph(vec![Node::text("Second line.")]),
        ]));
        let stats = analyze_document(&doc, &Rates::default());
        assert_eq!(stats.text.words, 5);
        assert_eq!(stats.text.sentences, 2);
        assert_eq!(stats.blocks.paragraphs, 2);
        assert_eq!(stats.blocks.headings, 1);
    }
}
