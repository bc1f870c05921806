pub mod audio_cache;
pub mod diagnostics;
mod engine;
pub mod error;
pub mod history;
pub mod playback;
pub mod settings;
pub mod speech;
pub mod suggestions;
pub mod synthesis;
pub mod vocabulary;

pub use audio_cache::{AudioCache, PreloadBatch};
pub use engine::{synthesizer_for, AacEngine};
pub use error::AppError;
pub use history::WordHistory;
pub use speech::{SentenceOutcome, SentencePlayback, SpeechService};
pub use suggestions::SuggestionEngine;
pub use vocabulary::{Language, QuickPhrase, Vocabulary, Word};
