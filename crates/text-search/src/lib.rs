//! Text search and replace for quire.
//!
//! Searching runs over the flattened document text; every hit is mapped back
//! to a document [`Match`] through the position map. [`SearchState`] keeps
//! the match list and the cyclic cursor, and the [`replace`] functions write
//! replacements back into the tree.

mod replace;
mod state;

pub use replace::{replace_all, replace_next, ReplaceError};
pub use state::{SearchState, SearchStatus};

use quire_doc_tree::Position;
use quire_flatten::FlatText;
use regex::Regex;

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

/// A hit in the flattened text, as character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    /// First character of the hit.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
}

/// A hit in document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub from: Position,
    pub to: Position,
}

/// Search options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Case-sensitive search.
    pub case_sensitive: bool,
    /// Use regex pattern.
    pub regex: bool,
    /// Whole word only. Applies to literal queries.
    pub whole_word: bool,
}

/// Compile the search pattern for a query.
pub fn build_regex(pattern: &str, options: &SearchOptions) -> Result<Regex, regex::Error> {
    let search_pattern = if options.regex {
        pattern.to_string()
    } else if options.whole_word {
        format!(r"\b{}\b", regex::escape(pattern))
    } else {
        regex::escape(pattern)
    };

    if options.case_sensitive {
        Regex::new(&search_pattern)
    } else {
        Regex::new(&format!("(?i){}", search_pattern))
    }
}

/// Search in text and return all matches in ascending order.
///
/// An invalid regex yields no matches. Empty hits are skipped.
pub fn find_all(text: &str, pattern: &str, options: &SearchOptions) -> Vec<TextMatch> {
    if pattern.is_empty() {
        return vec![];
    }

    let regex = match build_regex(pattern, options) {
        Ok(r) => r,
        Err(err) => {
            quire_logger::debug("search", format!("Invalid pattern {:?}: {}", pattern, err));
            return vec![];
        }
    };

    let mut matches = Vec::new();
    // Byte offsets are converted incrementally to char offsets
    let mut byte_pos = 0;
    let mut char_pos = 0;
    for mat in regex.find_iter(text) {
        if mat.start() == mat.end() {
            continue;
        }
        char_pos += text[byte_pos..mat.start()].chars().count();
        let len = mat.as_str().chars().count();

        matches.push(TextMatch {
            start: char_pos,
            end: char_pos + len,
        });

        char_pos += len;
        byte_pos = mat.end();
    }

    matches
}

/// Search the flattened document and map hits to document positions.
pub fn find_matches(flat: &FlatText, pattern: &str, options: &SearchOptions) -> Vec<Match> {
    let map = flat.map();
    find_all(flat.text(), pattern, options)
        .into_iter()
        .filter_map(|m| {
            let from = map.offset_to_position(m.start).ok()?;
            let to = map.end_position(m.end).ok()?;
            Some(Match { from, to })
        })
        .collect()
}

/// Find closest match to given position.
pub fn find_closest(
    matches: &[Match],
    pos: Position,
    direction: SearchDirection,
) -> Option<usize> {
    if matches.is_empty() {
        return None;
    }

    match direction {
        SearchDirection::Forward => {
            // Find first match at or after position
            matches
                .iter()
                .position(|m| m.from >= pos)
                .or(Some(0)) // Wrap to first match
        }
        SearchDirection::Backward => {
            // Find last match at or before position
            matches
                .iter()
                .rposition(|m| m.from <= pos)
                .or(Some(matches.len() - 1)) // Wrap to last match
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_doc_tree::Document;
    use quire_flatten::flatten;

    fn span(start: usize, end: usize) -> TextMatch {
        TextMatch { start, end }
    }

    #[test]
    fn test_find_all_simple() {
        let text = "hello world\nhello there";
        let matches = find_all(text, "hello", &SearchOptions::default());
        assert_eq!(matches, vec![span(0, 5), span(12, 17)]);
    }

    #[test]
    fn test_find_all_case_insensitive() {
        let text = "Hello HELLO hello";
        let matches = find_all(text, "hello", &SearchOptions::default());
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn test_find_all_case_sensitive() {
        let text = "Hello HELLO hello";
        let opts = SearchOptions {
            case_sensitive: true,
            ..Default::default()
        };
        let matches = find_all(text, "hello", &opts);
        assert_eq!(matches, vec![span(12, 17)]);
    }

    #[test]
    fn test_whole_word() {
        let opts = SearchOptions {
            whole_word: true,
            ..Default::default()
        };
        let matches = find_all("Teh the the.", "the", &opts);
        assert_eq!(matches, vec![span(4, 7), span(8, 11)]);

        let matches = find_all("other then the", "the", &opts);
        assert_eq!(matches, vec![span(11, 14)]);
    }

    #[test]
    fn test_literal_escapes_special_characters() {
        let matches = find_all("cost: $5.00 (approx)", "$5.00 (", &SearchOptions::default());
        assert_eq!(matches, vec![span(6, 13)]);
        assert!(find_all("a+b", "a+", &SearchOptions::default()).len() == 1);
    }

    #[test]
    fn test_regex_queries() {
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };
        let matches = find_all("cat cot cut CAT", "c[ao]t", &opts);
        assert_eq!(matches.len(), 3);

        let opts = SearchOptions {
            regex: true,
            case_sensitive: true,
            ..Default::default()
        };
        assert_eq!(find_all("cat cot cut CAT", "c[ao]t", &opts).len(), 2);
    }

    #[test]
    fn test_invalid_regex_is_soft() {
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };
        assert!(find_all("anything (", "(unclosed", &opts).is_empty());
    }

    #[test]
    fn test_empty_hits_skipped() {
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };
        let matches = find_all("baaab", "a*", &opts);
        assert_eq!(matches, vec![span(1, 4)]);
        assert!(find_all("text", "", &SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_char_offsets_for_multibyte_text() {
        let matches = find_all("naïve café naïve", "naïve", &SearchOptions::default());
        assert_eq!(matches, vec![span(0, 5), span(11, 16)]);
    }

    #[test]
    fn test_find_is_deterministic() {
        let opts = SearchOptions::default();
        let text = "one two one two one";
        assert_eq!(find_all(text, "one", &opts), find_all(text, "one", &opts));
    }

    #[test]
    fn test_find_matches_maps_positions() {
        // <p>Hello</p><p>World hello</p>
        let doc = Document::from_plain_text("Hello\nWorld hello");
        let flat = flatten(&doc);
        let matches = find_matches(&flat, "hello", &SearchOptions::default());
        assert_eq!(
            matches,
            vec![Match { from: 1, to: 6 }, Match { from: 14, to: 19 }]
        );
    }

    #[test]
    fn test_blank_paragraphs_collapse_in_regex_search() {
        let doc = Document::from_plain_text("a\n\nb");
        let flat = flatten(&doc);
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };

        assert!(find_matches(&flat, r"\n\n", &opts).is_empty());
        // The empty paragraph occupies positions 3..5 but no text
        assert_eq!(
            find_matches(&flat, r"a\nb", &opts),
            vec![Match { from: 1, to: 7 }]
        );
    }

    #[test]
    fn test_find_closest() {
        let matches = vec![
            Match { from: 5, to: 8 },
            Match { from: 20, to: 23 },
            Match { from: 40, to: 43 },
        ];

        assert_eq!(
            find_closest(&matches, 10, SearchDirection::Forward),
            Some(1)
        );
        assert_eq!(
            find_closest(&matches, 30, SearchDirection::Forward),
            Some(2)
        );
        assert_eq!(
            find_closest(&matches, 50, SearchDirection::Forward),
            Some(0)
        );
        assert_eq!(
            find_closest(&matches, 10, SearchDirection::Backward),
            Some(0)
        );
        assert_eq!(
            find_closest(&matches, 2, SearchDirection::Backward),
            Some(2)
        );
        assert_eq!(find_closest(&[], 0, SearchDirection::Forward), None);
    }
}
