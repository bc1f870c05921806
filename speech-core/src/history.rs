//! In-memory word usage: recently tapped words and most-tapped favorites.

use std::collections::{HashMap, VecDeque};

use crate::vocabulary::{Vocabulary, Word};

pub const MAX_RECENTS: usize = 12;
pub const MAX_FAVORITES: usize = 12;
/// Taps needed before a word counts as a favorite.
pub const FAVORITE_MIN_TAPS: u32 = 2;

#[derive(Debug, Default, Clone)]
pub struct WordHistory {
    recent: VecDeque<String>,
    tap_counts: HashMap<String, u32>,
    // First-tap order, used to break ties between equal counts.
    first_tapped: Vec<String>,
}

impl WordHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tap(&mut self, word_id: &str) {
        self.recent.retain(|id| id != word_id);
        self.recent.push_front(word_id.to_string());
        self.recent.truncate(MAX_RECENTS);

        let count = self.tap_counts.entry(word_id.to_string()).or_insert(0);
        if *count == 0 {
            self.first_tapped.push(word_id.to_string());
        }
        *count += 1;
    }

    pub fn tap_count(&self, word_id: &str) -> u32 {
        self.tap_counts.get(word_id).copied().unwrap_or(0)
    }

    /// Most recent first, without repeats. Ids missing from `vocabulary` are skipped.
    pub fn recent<'a>(&self, vocabulary: &'a Vocabulary) -> Vec<&'a Word> {
        self.recent
            .iter()
            .filter_map(|id| vocabulary.get(id))
            .collect()
    }

    /// Words tapped at least twice, most-tapped first.
    pub fn favorites<'a>(&self, vocabulary: &'a Vocabulary) -> Vec<&'a Word> {
        let mut ranked: Vec<(&str, u32)> = self
            .first_tapped
            .iter()
            .map(|id| (id.as_str(), self.tap_count(id)))
            .filter(|&(_, count)| count >= FAVORITE_MIN_TAPS)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .take(MAX_FAVORITES)
            .filter_map(|(id, _)| vocabulary.get(id))
            .collect()
    }

    pub fn clear(&mut self) {
        self.recent.clear();
        self.tap_counts.clear();
        self.first_tapped.clear();
    }
}
