//! Search session state with cyclic match navigation.

use quire_doc_tree::Position;
use quire_flatten::FlatText;

use crate::{find_closest, find_matches, Match, SearchDirection, SearchOptions};

/// Match counter shown to the user, e.g. "3 of 7".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatus {
    /// 1-based index of the current match, 0 when there is none.
    pub current: usize,
    pub total: usize,
}

/// Active search: query, options and the match list of the current document.
///
/// The match list is only valid for the document it was computed from;
/// call [`SearchState::refresh`] after every edit.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub options: SearchOptions,
    pub matches: Vec<Match>,
    /// Index into `matches`.
    pub current: Option<usize>,
}

impl SearchState {
    /// Create a search and compute its matches.
    ///
    /// The current match is the first one at or after `anchor` (usually the
    /// selection), wrapping to the first match.
    pub fn new(
        query: impl Into<String>,
        options: SearchOptions,
        flat: &FlatText,
        anchor: Position,
    ) -> Self {
        let mut state = Self {
            query: query.into(),
            options,
            matches: Vec::new(),
            current: None,
        };
        state.refresh_near(flat, anchor);
        state
    }

    /// Whether the search has no query.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Recompute matches, keeping the current index where possible.
    pub fn refresh(&mut self, flat: &FlatText) {
        self.matches = find_matches(flat, &self.query, &self.options);
        self.current = match self.current {
            _ if self.matches.is_empty() => None,
            Some(idx) => Some(idx.min(self.matches.len() - 1)),
            None => Some(0),
        };
    }

    /// Recompute matches and select the first one at or after `pos`.
    pub fn refresh_near(&mut self, flat: &FlatText, pos: Position) {
        self.matches = find_matches(flat, &self.query, &self.options);
        self.current = find_closest(&self.matches, pos, SearchDirection::Forward);
    }

    /// Drop the query and all matches.
    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.current = None;
    }

    pub fn current_match(&self) -> Option<Match> {
        self.current.and_then(|idx| self.matches.get(idx).copied())
    }

    /// Advance to the next match, wrapping after the last one.
    pub fn next_match(&mut self) -> Option<Match> {
        if self.matches.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(idx) => (idx + 1) % self.matches.len(),
            None => 0,
        };
        self.current = Some(next);
        self.current_match()
    }

    /// Go back to the previous match, wrapping before the first one.
    pub fn prev_match(&mut self) -> Option<Match> {
        if self.matches.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.matches.len() - 1,
            Some(idx) => idx - 1,
        };
        self.current = Some(prev);
        self.current_match()
    }

    /// 1-based index of the current match, 0 without matches.
    pub fn current_index(&self) -> usize {
        self.current.map_or(0, |idx| idx + 1)
    }

    pub fn total(&self) -> usize {
        self.matches.len()
    }

    pub fn status(&self) -> SearchStatus {
        SearchStatus {
            current: self.current_index(),
            total: self.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_doc_tree::Document;
    use quire_flatten::flatten;

    fn state_for(text: &str, query: &str) -> SearchState {
        let flat = flatten(&Document::from_plain_text(text));
        SearchState::new(query, SearchOptions::default(), &flat, 0)
    }

    #[test]
    fn test_new_selects_first_match() {
        let state = state_for("a b a b a", "a");
        assert_eq!(state.total(), 3);
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.status(), SearchStatus { current: 1, total: 3 });
    }

    #[test]
    fn test_new_selects_match_after_anchor() {
        let flat = flatten(&Document::from_plain_text("a b a b a"));
        // Matches at 1, 5 and 9
        let state = SearchState::new("a", SearchOptions::default(), &flat, 4);
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn test_next_cycles_back_to_start() {
        let mut state = state_for("x y x y x y x", "x");
        let n = state.total();
        let start = state.current_index();
        for _ in 0..n {
            state.next_match();
        }
        assert_eq!(state.current_index(), start);
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let mut state = state_for("a a a", "a");
        assert_eq!(state.current_index(), 1);
        state.prev_match();
        assert_eq!(state.current_index(), 3);
        state.next_match();
        assert_eq!(state.current_index(), 1);
        state.next_match();
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn test_navigation_without_matches_is_noop() {
        let mut state = state_for("nothing here", "zzz");
        assert_eq!(state.next_match(), None);
        assert_eq!(state.prev_match(), None);
        assert_eq!(state.status(), SearchStatus::default());
    }

    #[test]
    fn test_refresh_clamps_current() {
        let mut state = state_for("a a a", "a");
        state.prev_match();
        assert_eq!(state.current_index(), 3);

        let shorter = flatten(&Document::from_plain_text("a"));
        state.refresh(&shorter);
        assert_eq!(state.status(), SearchStatus { current: 1, total: 1 });

        let none = flatten(&Document::from_plain_text("b"));
        state.refresh(&none);
        assert_eq!(state.current, None);
    }

    #[test]
    fn test_clear() {
        let mut state = state_for("a a", "a");
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.total(), 0);
        assert_eq!(state.current_match(), None);
    }
}
