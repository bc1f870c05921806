//! High-level board facade: vocabulary, suggestions and speech in one place.

use std::sync::Arc;
use std::time::Instant;

use crate::audio_cache::{AudioCache, AudioFetcher, DirAudioFetcher, HttpAudioFetcher, PreloadBatch};
use crate::error::AppError;
use crate::playback::{default_output, AudioOutput};
use crate::settings::{Settings, SynthesizerChoice};
use crate::speech::{SentencePlayback, SpeechConfig, SpeechService};
use crate::suggestions::SuggestionEngine;
use crate::synthesis::{CommandSynthesizer, SilentSynthesizer, SpeechProgram, SpeechSynthesizer};
use crate::vocabulary::{default_quick_phrases, Language, QuickPhrase, Vocabulary, Word};

pub struct AacEngine {
    vocabulary: Vocabulary,
    quick_phrases: Vec<QuickPhrase>,
    suggestions: SuggestionEngine,
    speech: SpeechService,
}

impl AacEngine {
    pub fn new(vocabulary: Vocabulary, suggestions: SuggestionEngine, speech: SpeechService) -> Self {
        Self {
            vocabulary,
            quick_phrases: default_quick_phrases(),
            suggestions,
            speech,
        }
    }

    /// Default board wired to the audio source, output and synthesizer the
    /// settings ask for.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let start = Instant::now();

        let fetcher = audio_fetcher(settings)?;
        let cache = match settings.prefetch_workers {
            Some(workers) => AudioCache::with_workers(fetcher, workers),
            None => AudioCache::new(fetcher),
        };

        let speech = SpeechService::new(
            Arc::new(cache),
            default_output(),
            synthesizer_for(settings.synthesizer),
            settings.speech_config(),
        );

        let engine = Self::new(Vocabulary::default_board(), SuggestionEngine::default(), speech);
        log::info!(
            "Board ready: {} words, {} associations, synthesizer {} (in {:?})",
            engine.vocabulary.len(),
            engine.suggestions.table().len(),
            engine.speech.synthesizer().name(),
            start.elapsed()
        );
        Ok(engine)
    }

    /// Engine with injected collaborators, used by hosts that bring their own
    /// output or synthesizer.
    pub fn with_parts(
        cache: Arc<AudioCache>,
        output: Arc<dyn AudioOutput>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        config: SpeechConfig,
    ) -> Self {
        Self::new(
            Vocabulary::default_board(),
            SuggestionEngine::default(),
            SpeechService::new(cache, output, synthesizer, config),
        )
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }

    pub fn speech(&self) -> &SpeechService {
        &self.speech
    }

    pub fn quick_phrases(&self) -> &[QuickPhrase] {
        &self.quick_phrases
    }

    pub fn quick_phrase(&self, id: &str) -> Option<&QuickPhrase> {
        self.quick_phrases.iter().find(|phrase| phrase.id == id)
    }

    pub fn suggest_next<'a>(&self, sentence: &[Word], available: &'a [Word]) -> Vec<&'a Word> {
        self.suggestions.suggest_next(sentence, available)
    }

    pub fn preload_all(&self, words: &[Word], languages: &[Language]) -> PreloadBatch {
        self.speech.cache().preload_all(words, languages)
    }

    /// Prefetches every board word in `languages`.
    pub fn preload_board(&self, languages: &[Language]) -> PreloadBatch {
        self.preload_all(self.vocabulary.words(), languages)
    }

    pub fn speak_word(&self, word: &Word, language: Language) {
        self.speech.speak_word(word, language);
    }

    pub fn speak_sentence(&self, words: &[Word], language: Language) -> SentencePlayback {
        self.speech.speak_sentence(words, language)
    }

    pub fn speak_phrase(&self, phrase: &QuickPhrase, language: Language) {
        self.speech.speak_phrase(phrase, language);
    }

    pub fn stop(&self) {
        self.speech.stop();
    }
}

fn audio_fetcher(settings: &Settings) -> Result<Arc<dyn AudioFetcher>, AppError> {
    let extension = settings.audio_extension.as_str();
    if let Some(base_url) = &settings.audio_base_url {
        return Ok(Arc::new(HttpAudioFetcher::new(base_url.as_str(), extension)?));
    }
    let root = settings.audio_dir.clone().unwrap_or_else(|| ".".into());
    Ok(Arc::new(DirAudioFetcher::new(root, extension)))
}

/// Builds the synthesizer for `choice`. A missing engine degrades to silence.
pub fn synthesizer_for(choice: SynthesizerChoice) -> Arc<dyn SpeechSynthesizer> {
    match choice {
        SynthesizerChoice::Auto => match CommandSynthesizer::detect() {
            Some(synth) => Arc::new(synth),
            None => {
                log::warn!("No speech engine found; synthesized fallback will be silent");
                Arc::new(SilentSynthesizer)
            }
        },
        SynthesizerChoice::Espeak => Arc::new(CommandSynthesizer::new(SpeechProgram::EspeakNg)),
        SynthesizerChoice::Say => Arc::new(CommandSynthesizer::new(SpeechProgram::Say)),
        SynthesizerChoice::None => Arc::new(SilentSynthesizer),
    }
}
