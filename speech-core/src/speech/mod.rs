//! Speech playback coordinator.
//!
//! Speaks words and sentences with the best tier available: the cached
//! recording first, the platform synthesizer second, silence last. At most one
//! session is audible; starting a new one interrupts the old one.

mod session;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub use session::CancellationToken;
use session::SessionRegistry;

use crate::audio_cache::AudioCache;
use crate::playback::{ActivePlayback, AudioClip, AudioOutput, PlaybackEnd, PlaybackError};
use crate::synthesis::{SpeechSynthesizer, Utterance, VoiceSettings};
use crate::vocabulary::{Language, QuickPhrase, Word};

pub const DEFAULT_WORD_PAUSE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechConfig {
    /// Silence between consecutive recorded words of a sentence.
    pub word_pause: Duration,
    pub voice: VoiceSettings,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            word_pause: DEFAULT_WORD_PAUSE,
            voice: VoiceSettings::default(),
        }
    }
}

/// How a sentence playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceOutcome {
    /// Nothing to say.
    Empty,
    /// Every word played from its recording.
    Completed,
    /// Some word lacked a recording, so the whole sentence was synthesized.
    Synthesized,
    /// Recording playback failed at `from_index`; the rest was synthesized.
    FellBack { from_index: usize },
    /// Interrupted by a newer session or `stop`.
    Cancelled,
}

enum PlaybackTask {
    Done(SentenceOutcome),
    Running(JoinHandle<SentenceOutcome>),
}

/// Handle to a sentence being spoken. Dropping it leaves the sentence playing.
pub struct SentencePlayback {
    task: PlaybackTask,
}

impl SentencePlayback {
    fn done(outcome: SentenceOutcome) -> Self {
        Self {
            task: PlaybackTask::Done(outcome),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.task {
            PlaybackTask::Done(_) => true,
            PlaybackTask::Running(handle) => handle.is_finished(),
        }
    }

    /// Blocks until the sentence is over.
    pub fn join(self) -> SentenceOutcome {
        match self.task {
            PlaybackTask::Done(outcome) => outcome,
            PlaybackTask::Running(handle) => handle.join().unwrap_or_else(|_| {
                log::error!("Sentence playback thread panicked");
                SentenceOutcome::Cancelled
            }),
        }
    }
}

struct ServiceInner {
    cache: Arc<AudioCache>,
    output: Arc<dyn AudioOutput>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    config: SpeechConfig,
    sessions: SessionRegistry,
}

/// Owns the speaking session. Clones share the same session, so interrupting
/// from one clone silences speech started from another.
#[derive(Clone)]
pub struct SpeechService {
    inner: Arc<ServiceInner>,
}

impl SpeechService {
    pub fn new(
        cache: Arc<AudioCache>,
        output: Arc<dyn AudioOutput>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        config: SpeechConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                cache,
                output,
                synthesizer,
                config,
                sessions: SessionRegistry::default(),
            }),
        }
    }

    pub fn cache(&self) -> &Arc<AudioCache> {
        &self.inner.cache
    }

    pub fn synthesizer(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.inner.synthesizer
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.inner.config
    }

    /// Speaks one word, interrupting anything currently audible. Returns once
    /// the sound has started.
    pub fn speak_word(&self, word: &Word, language: Language) {
        let inner = &self.inner;
        let token = inner.begin_session();

        if let Some(clip) = inner.cache.get(word.id(), language) {
            match inner.start_clip(&token, &clip) {
                Ok(_) => return,
                Err(err) => log::warn!(
                    "Recording of {language}/{} failed to start ({err}); synthesizing",
                    word.id()
                ),
            }
        }

        inner.say(&token, word.label(language), language);
    }

    /// Speaks a sentence, interrupting anything currently audible.
    ///
    /// Recordings are used only when every word has one; otherwise the whole
    /// sentence is synthesized as one utterance. Recorded words play on a
    /// background thread, so this returns right away.
    pub fn speak_sentence(&self, words: &[Word], language: Language) -> SentencePlayback {
        if words.is_empty() {
            return SentencePlayback::done(SentenceOutcome::Empty);
        }

        let inner = &self.inner;
        let token = inner.begin_session();

        let all_recorded = words.iter().all(|word| inner.cache.has(word.id(), language));
        if !all_recorded {
            log::info!(
                "Sentence of {} words not fully recorded in {language}; synthesizing",
                words.len()
            );
            let outcome = if inner.say(&token, &join_labels(words, language), language) {
                SentenceOutcome::Synthesized
            } else {
                SentenceOutcome::Cancelled
            };
            inner.sessions.finish(&token);
            return SentencePlayback::done(outcome);
        }

        let worker = Arc::clone(inner);
        let worker_token = token.clone();
        let sentence = words.to_vec();
        let spawned = thread::Builder::new()
            .name("sentence-playback".to_string())
            .spawn(move || worker.play_sequence(&worker_token, &sentence, language));

        match spawned {
            Ok(handle) => SentencePlayback {
                task: PlaybackTask::Running(handle),
            },
            Err(e) => {
                log::error!("Failed to spawn sentence playback thread: {e}");
                let outcome = if inner.say(&token, &join_labels(words, language), language) {
                    SentenceOutcome::Synthesized
                } else {
                    SentenceOutcome::Cancelled
                };
                inner.sessions.finish(&token);
                SentencePlayback::done(outcome)
            }
        }
    }

    /// Synthesizes free text, interrupting anything currently audible.
    pub fn speak_text(&self, text: &str, language: Language) {
        let token = self.inner.begin_session();
        self.inner.say(&token, text, language);
    }

    /// Quick phrases have no recordings and always go through the synthesizer.
    pub fn speak_phrase(&self, phrase: &QuickPhrase, language: Language) {
        self.speak_text(phrase.label.get(language), language);
    }

    /// Silences the current session, if any.
    pub fn stop(&self) {
        let synthesizer = &self.inner.synthesizer;
        self.inner.sessions.end(|| synthesizer.cancel());
    }
}

impl ServiceInner {
    fn begin_session(&self) -> CancellationToken {
        let synthesizer = &self.synthesizer;
        self.sessions.begin(|| synthesizer.cancel())
    }

    fn start_clip(
        &self,
        token: &CancellationToken,
        clip: &AudioClip,
    ) -> Result<Option<Arc<dyn ActivePlayback>>, PlaybackError> {
        let playback = self.output.start(clip)?;
        if self.sessions.attach(token, Arc::clone(&playback)) {
            Ok(Some(playback))
        } else {
            Ok(None)
        }
    }

    /// Hands `text` to the synthesizer if the session is still current.
    /// Returns `false` only for a superseded session; synthesizer errors are
    /// logged and otherwise ignored.
    fn say(&self, token: &CancellationToken, text: &str, language: Language) -> bool {
        let utterance = Utterance::with_voice(text, language, self.config.voice);
        match self
            .sessions
            .run_if_current(token, || self.synthesizer.speak(&utterance))
        {
            Some(Ok(())) => true,
            Some(Err(err)) => {
                log::warn!("Speech synthesis failed for {:?}: {err}", utterance.text);
                true
            }
            None => {
                log::debug!("Dropping utterance of stale session {}", token.generation());
                false
            }
        }
    }

    fn play_sequence(
        &self,
        token: &CancellationToken,
        words: &[Word],
        language: Language,
    ) -> SentenceOutcome {
        for (index, word) in words.iter().enumerate() {
            if token.is_cancelled() {
                return SentenceOutcome::Cancelled;
            }
            // Only reached after the previous word played to the end.
            if index > 0 && token.sleep(self.config.word_pause) {
                return SentenceOutcome::Cancelled;
            }

            let failure = match self.cache.get(word.id(), language) {
                None => format!("{language}/{} is no longer cached", word.id()),
                Some(clip) => match self.play_to_end(token, &clip) {
                    Ok(PlaybackEnd::Finished) => continue,
                    Ok(PlaybackEnd::Stopped) => return SentenceOutcome::Cancelled,
                    Err(err) => err.to_string(),
                },
            };

            if token.is_cancelled() {
                return SentenceOutcome::Cancelled;
            }
            log::warn!("Sentence playback failed at word {index} ({failure}); synthesizing the rest");
            let rest = join_labels(&words[index..], language);
            if !self.say(token, &rest, language) {
                return SentenceOutcome::Cancelled;
            }
            self.sessions.finish(token);
            return SentenceOutcome::FellBack { from_index: index };
        }

        self.sessions.finish(token);
        SentenceOutcome::Completed
    }

    fn play_to_end(
        &self,
        token: &CancellationToken,
        clip: &AudioClip,
    ) -> Result<PlaybackEnd, PlaybackError> {
        match self.start_clip(token, clip)? {
            Some(playback) => playback.wait(),
            None => Ok(PlaybackEnd::Stopped),
        }
    }
}

fn join_labels(words: &[Word], language: Language) -> String {
    words
        .iter()
        .map(|word| word.label(language))
        .collect::<Vec<_>>()
        .join(" ")
}
