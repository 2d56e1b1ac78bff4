//! Writing replacements back into the document tree.

use quire_doc_tree::{DocumentTree, Edit, EditError};
use quire_flatten::flatten;

use crate::{Match, SearchState};

/// Replace failures reported by the tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplaceError {
    #[error("replacement rejected: {0}")]
    Rejected(#[from] EditError),
    #[error("replace-all stopped after {applied} of {total} edits: {source}")]
    Partial {
        applied: usize,
        total: usize,
        #[source]
        source: EditError,
    },
}

/// Replace the current match and re-derive the match list.
///
/// Returns the span of the inserted text, or `Ok(None)` when there is no
/// current match. After a successful edit the current match becomes the
/// first one after the inserted text, wrapping to the start. The match list
/// is recomputed from the tree even when the edit is rejected.
pub fn replace_next<T: DocumentTree + ?Sized>(
    tree: &mut T,
    state: &mut SearchState,
    replacement: &str,
) -> Result<Option<Match>, ReplaceError> {
    let Some(target) = state.current_match() else {
        return Ok(None);
    };

    let result = tree.apply_edit(&Edit::replace(target.from, target.to, replacement));
    let flat = flatten(&*tree);
    match result {
        Ok(()) => {
            let inserted = Match {
                from: target.from,
                to: target.from + replacement.chars().count(),
            };
            state.refresh_near(&flat, inserted.to);
            Ok(Some(inserted))
        }
        Err(err) => {
            quire_logger::warn(
                "replace",
                format!(
                    "Replace at {}..{} rejected: {}",
                    target.from, target.to, err
                ),
            );
            state.refresh(&flat);
            Err(err.into())
        }
    }
}

/// Replace every match in one pass.
///
/// Edits are applied right to left so that no edit shifts the positions of
/// matches still waiting to the left of it. The first rejected edit aborts
/// the rest; edits already applied stay in place.
pub fn replace_all<T: DocumentTree + ?Sized>(
    tree: &mut T,
    matches: &[Match],
    replacement: &str,
) -> Result<usize, ReplaceError> {
    let mut ordered = matches.to_vec();
    ordered.sort_by(|a, b| b.from.cmp(&a.from));

    let total = ordered.len();
    for (applied, m) in ordered.iter().enumerate() {
        if let Err(source) = tree.apply_edit(&Edit::replace(m.from, m.to, replacement)) {
            quire_logger::warn(
                "replace",
                format!("Replace-all stopped after {} of {} edits: {}", applied, total, source),
            );
            return Err(ReplaceError::Partial {
                applied,
                total,
                source,
            });
        }
    }

    if total > 0 {
        quire_logger::info("replace", format!("Replaced {} matches", total));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{find_matches, SearchOptions};
    use quire_doc_tree::{Document, Node, Position};
    use quire_flatten::flatten;

    fn search(doc: &Document, query: &str) -> SearchState {
        SearchState::new(query, SearchOptions::default(), &flatten(doc), 0)
    }

    #[test]
    fn test_replace_next_advances() {
        let mut doc = Document::from_plain_text("cat dog cat\ncat");
        let mut state = search(&doc, "cat");
        assert_eq!(state.total(), 3);

        assert_eq!(
            replace_next(&mut doc, &mut state, "lion").unwrap(),
            Some(Match { from: 1, to: 5 })
        );
        assert_eq!(doc.plain_text(), "lion dog cat\n\ncat");
        assert_eq!(state.total(), 2);
        assert_eq!(state.current_index(), 1);

        assert!(replace_next(&mut doc, &mut state, "lion").unwrap().is_some());
        assert!(replace_next(&mut doc, &mut state, "lion").unwrap().is_some());
        assert_eq!(doc.plain_text(), "lion dog lion\n\nlion");
        assert_eq!(state.total(), 0);
        assert_eq!(replace_next(&mut doc, &mut state, "lion").unwrap(), None);
    }

    #[test]
    fn test_replace_next_with_text_containing_query() {
        let mut doc = Document::from_plain_text("a a");
        let mut state = search(&doc, "a");

        assert_eq!(
            replace_next(&mut doc, &mut state, "aa").unwrap(),
            Some(Match { from: 1, to: 3 })
        );
        assert_eq!(doc.plain_text(), "aa a");
        // Resumes after the inserted text rather than re-hitting it
        assert_eq!(state.total(), 3);
        assert_eq!(state.current_match(), Some(Match { from: 4, to: 5 }));
    }

    #[test]
    fn test_replace_all_right_to_left() {
        let mut doc = Document::from_plain_text("one two one\nthree one");
        let state = search(&doc, "one");

        let replaced = replace_all(&mut doc, &state.matches, "1").unwrap();
        assert_eq!(replaced, 3);
        assert_eq!(doc.plain_text(), "1 two 1\n\nthree 1");

        let again = find_matches(&flatten(&doc), "one", &SearchOptions::default());
        assert!(again.is_empty());
    }

    #[test]
    fn test_replace_all_order_independent() {
        let mut doc = Document::from_plain_text("ab ab ab");
        let mut matches = search(&doc, "ab").matches;
        matches.reverse();
        matches.swap(0, 1);

        replace_all(&mut doc, &matches, "xyz").unwrap();
        assert_eq!(doc.plain_text(), "xyz xyz xyz");
    }

    #[test]
    fn test_replace_all_empty_is_noop() {
        let mut doc = Document::from_plain_text("unchanged");
        let before = doc.clone();
        assert_eq!(replace_all(&mut doc, &[], "x").unwrap(), 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_replace_all_partial_failure() {
        let mut doc = Document::from_plain_text("aa bb aa");
        let mut matches = search(&doc, "aa").matches;
        // A stale match pointing between blocks, left of the real ones
        let stale: Position = 0;
        matches.insert(0, Match { from: stale, to: stale });

        let err = replace_all(&mut doc, &matches, "c").unwrap_err();
        assert_eq!(
            err,
            ReplaceError::Partial {
                applied: 2,
                total: 3,
                source: EditError::NotInTextblock { pos: 0 },
            }
        );
        // Applied edits are kept
        assert_eq!(doc.plain_text(), "c bb c");
    }

    #[test]
    fn test_replace_next_rejected_rederives_matches() {
        let mut doc = Document::new(Node::doc(vec![Node::paragraph(vec![Node::text("x")])]));
        let mut state = search(&doc, "x");
        state.matches = vec![Match { from: 40, to: 41 }];
        state.current = Some(0);

        let err = replace_next(&mut doc, &mut state, "y").unwrap_err();
        assert!(matches!(err, ReplaceError::Rejected(EditError::OutOfRange { .. })));
        assert_eq!(state.matches, vec![Match { from: 1, to: 2 }]);
    }
}
