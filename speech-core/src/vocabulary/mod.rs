//! Bilingual board vocabulary: words, categories, quick phrases.

mod defaults;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{default_categories, default_quick_phrases};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Invalid word id: {0:?}")]
    InvalidWordId(String),
    #[error("Unknown language code: {0:?}")]
    UnknownLanguage(String),
    #[error("Unknown category: {0:?}")]
    UnknownCategory(String),
    #[error("Duplicate word id: {0}")]
    DuplicateWord(String),
}

impl VocabularyError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidWordId(_) => "Word ids must be lowercase words joined by underscores.",
            Self::UnknownLanguage(_) => "That language is not supported.",
            Self::UnknownCategory(_) => "That category does not exist.",
            Self::DuplicateWord(_) => "The board contains the same word twice.",
        }
    }
}

// ============================================================================
// Language
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    /// Short code used in audio asset paths and settings.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// BCP 47 tag handed to the speech synthesizer.
    pub fn speech_tag(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Fr => "fr-FR",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Self::En),
            "fr" | "fr-fr" => Ok(Self::Fr),
            _ => Err(VocabularyError::UnknownLanguage(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualLabel {
    pub en: String,
    pub fr: String,
}

impl BilingualLabel {
    pub fn new(en: impl Into<String>, fr: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            fr: fr.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Fr => &self.fr,
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Social,
    People,
    Actions,
    Feelings,
    Descriptors,
    Questions,
    Food,
    Places,
    Objects,
    Body,
    Time,
}

impl CategoryId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::People => "people",
            Self::Actions => "actions",
            Self::Feelings => "feelings",
            Self::Descriptors => "descriptors",
            Self::Questions => "questions",
            Self::Food => "food",
            Self::Places => "places",
            Self::Objects => "objects",
            Self::Body => "body",
            Self::Time => "time",
        }
    }
}

impl FromStr for CategoryId {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s {
            "social" => Self::Social,
            "people" => Self::People,
            "actions" => Self::Actions,
            "feelings" => Self::Feelings,
            "descriptors" => Self::Descriptors,
            "questions" => Self::Questions,
            "food" => Self::Food,
            "places" => Self::Places,
            "objects" => Self::Objects,
            "body" => Self::Body,
            "time" => Self::Time,
            other => return Err(VocabularyError::UnknownCategory(other.to_string())),
        };
        Ok(category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub label: BilingualLabel,
}

// ============================================================================
// Words
// ============================================================================

fn word_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+(_[a-z0-9]+)*$").expect("word id pattern is a valid regex")
    })
}

/// Returns `true` if `id` is a lowercase snake-case token.
pub fn is_valid_word_id(id: &str) -> bool {
    word_id_pattern().is_match(id)
}

/// A tappable board symbol. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    id: String,
    label: BilingualLabel,
    category: CategoryId,
    hidden_by_default: bool,
}

impl Word {
    pub fn new(
        id: impl Into<String>,
        label: BilingualLabel,
        category: CategoryId,
    ) -> Result<Self, VocabularyError> {
        let id = id.into();
        if !is_valid_word_id(&id) {
            return Err(VocabularyError::InvalidWordId(id));
        }
        Ok(Self {
            id,
            label,
            category,
            hidden_by_default: false,
        })
    }

    pub fn hidden_by_default(mut self, hidden: bool) -> Self {
        self.hidden_by_default = hidden;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self, language: Language) -> &str {
        self.label.get(language)
    }

    pub fn labels(&self) -> &BilingualLabel {
        &self.label
    }

    pub fn category(&self) -> CategoryId {
        self.category
    }

    pub fn is_hidden_by_default(&self) -> bool {
        self.hidden_by_default
    }
}

/// A whole-sentence shortcut. Always spoken by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickPhrase {
    pub id: String,
    pub label: BilingualLabel,
}

// ============================================================================
// Vocabulary
// ============================================================================

/// User overrides for word visibility: `true` shown, `false` hidden.
pub type VisibilityOverrides = HashMap<String, bool>;

#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<Word>,
    index: HashMap<String, usize>,
    categories: Vec<Category>,
}

impl Vocabulary {
    pub fn new(words: Vec<Word>, categories: Vec<Category>) -> Result<Self, VocabularyError> {
        let mut index = HashMap::with_capacity(words.len());
        for (position, word) in words.iter().enumerate() {
            if index.insert(word.id.clone(), position).is_some() {
                return Err(VocabularyError::DuplicateWord(word.id.clone()));
            }
        }
        Ok(Self {
            words,
            index,
            categories,
        })
    }

    /// The built-in bilingual board.
    pub fn default_board() -> Self {
        let words = defaults::default_words();
        let categories = default_categories();
        Self::new(words, categories).unwrap_or_else(|err| {
            log::error!("Default vocabulary is inconsistent: {err}");
            Self {
                words: Vec::new(),
                index: HashMap::new(),
                categories: Vec::new(),
            }
        })
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Word> {
        self.index.get(id).map(|&position| &self.words[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words eligible for display, in board order. An explicit override wins
    /// over the word's own `hidden_by_default`.
    pub fn visible_words(&self, overrides: &VisibilityOverrides) -> Vec<Word> {
        self.words
            .iter()
            .filter(|word| {
                overrides
                    .get(&word.id)
                    .copied()
                    .unwrap_or(!word.hidden_by_default)
            })
            .cloned()
            .collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::default_board()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_id_validation() {
        assert!(is_valid_word_id("thank_you"));
        assert!(is_valid_word_id("car_place"));
        assert!(is_valid_word_id("tv"));
        assert!(!is_valid_word_id("Thank_you"));
        assert!(!is_valid_word_id("thank you"));
        assert!(!is_valid_word_id("_more"));
        assert!(!is_valid_word_id("more_"));
        assert!(!is_valid_word_id(""));
    }

    #[test]
    fn word_new_rejects_bad_ids() {
        let err = Word::new("Hello", BilingualLabel::new("hello", "bonjour"), CategoryId::Social)
            .unwrap_err();
        assert_eq!(err, VocabularyError::InvalidWordId("Hello".to_string()));
    }

    #[test]
    fn language_parsing() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!("fr-FR".parse::<Language>().unwrap(), Language::Fr);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::Fr.speech_tag(), "fr-FR");
    }

    #[test]
    fn default_board_is_consistent() {
        let vocabulary = Vocabulary::default_board();
        assert_eq!(vocabulary.len(), 114);
        assert_eq!(vocabulary.get("please").unwrap().label(Language::Fr), "s'il te plaît");
        assert_eq!(vocabulary.get("car_place").unwrap().label(Language::En), "car");
    }

    #[test]
    fn visibility_overrides_win() {
        let vocabulary = Vocabulary::default_board();
        let mut overrides = VisibilityOverrides::new();
        overrides.insert("apple".to_string(), true);
        overrides.insert("yes".to_string(), false);

        let visible = vocabulary.visible_words(&overrides);
        assert!(visible.iter().any(|w| w.id() == "apple"));
        assert!(!visible.iter().any(|w| w.id() == "yes"));
        assert!(!visible.iter().any(|w| w.id() == "banana"));
        assert!(visible.iter().any(|w| w.id() == "no"));
    }

    #[test]
    fn vocabulary_error_user_messages() {
        assert!(!VocabularyError::InvalidWordId("x".into()).user_message().is_empty());
        assert!(!VocabularyError::UnknownLanguage("x".into()).user_message().is_empty());
        assert!(!VocabularyError::UnknownCategory("x".into()).user_message().is_empty());
        assert!(!VocabularyError::DuplicateWord("x".into()).user_message().is_empty());
    }
}
