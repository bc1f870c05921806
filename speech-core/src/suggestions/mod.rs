//! Next-word suggestions driven by a static word-association table.

mod associations;

use std::collections::HashMap;

pub use associations::AssociationTable;

use crate::vocabulary::Word;

/// Upper bound on the suggestion row.
pub const MAX_SUGGESTIONS: usize = 6;

/// Single-step lookup: only the last word of the sentence is consulted.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    table: AssociationTable,
    max_suggestions: usize,
}

impl SuggestionEngine {
    pub fn new(table: AssociationTable) -> Self {
        Self {
            table,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }

    pub fn with_limit(mut self, max_suggestions: usize) -> Self {
        self.max_suggestions = max_suggestions;
        self
    }

    pub fn table(&self) -> &AssociationTable {
        &self.table
    }

    /// Suggested next words for `sentence`, resolved against `available`.
    ///
    /// Candidates missing from `available` are dropped, the table's order is
    /// kept, and the cap applies after filtering. Words already in the
    /// sentence are not filtered out: repeating a word is valid AAC usage.
    pub fn suggest_next<'a>(&self, sentence: &[Word], available: &'a [Word]) -> Vec<&'a Word> {
        let Some(last) = sentence.last() else {
            return Vec::new();
        };

        let candidates = self.table.followers(last.id());
        if candidates.is_empty() {
            return Vec::new();
        }

        let by_id: HashMap<&str, &'a Word> =
            available.iter().map(|word| (word.id(), word)).collect();

        candidates
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .take(self.max_suggestions)
            .collect()
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(AssociationTable::default_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{BilingualLabel, CategoryId};

    fn word(id: &str) -> Word {
        Word::new(id, BilingualLabel::new(id, id), CategoryId::Actions).unwrap()
    }

    fn engine(entries: &[(&str, &[&str])]) -> SuggestionEngine {
        SuggestionEngine::new(AssociationTable::from_entries(entries.iter().map(
            |&(key, followers)| {
                (
                    key.to_string(),
                    followers.iter().map(|f| f.to_string()).collect(),
                )
            },
        )))
    }

    #[test]
    fn empty_sentence_has_no_suggestions() {
        let engine = engine(&[("a", &["b"])]);
        let available = vec![word("a"), word("b")];
        assert!(engine.suggest_next(&[], &available).is_empty());
    }

    #[test]
    fn only_last_word_is_consulted() {
        let engine = engine(&[("a", &["x"]), ("b", &["y"])]);
        let available = vec![word("x"), word("y")];
        let sentence = vec![word("a"), word("b")];
        let ids: Vec<&str> = engine
            .suggest_next(&sentence, &available)
            .iter()
            .map(|w| w.id())
            .collect();
        assert_eq!(ids, ["y"]);
    }

    #[test]
    fn cap_applies_after_filtering() {
        let engine = engine(&[("a", &["h1", "v1", "h2", "v2", "v3", "v4", "v5", "v6", "v7"])]);
        let available: Vec<Word> = ["v1", "v2", "v3", "v4", "v5", "v6", "v7"]
            .iter()
            .map(|id| word(id))
            .collect();
        let ids: Vec<&str> = engine
            .suggest_next(&[word("a")], &available)
            .iter()
            .map(|w| w.id())
            .collect();
        assert_eq!(ids, ["v1", "v2", "v3", "v4", "v5", "v6"]);
    }

    #[test]
    fn custom_limit() {
        let engine = engine(&[("a", &["b", "c", "d"])]).with_limit(2);
        let available = vec![word("b"), word("c"), word("d")];
        assert_eq!(engine.suggest_next(&[word("a")], &available).len(), 2);
    }
}
