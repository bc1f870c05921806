use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use norah_speech_lib::audio_cache::{AudioCache, AudioFetcher, FetchError};
use norah_speech_lib::playback::{
    ActivePlayback, AudioClip, AudioOutput, PlaybackControl, PlaybackError,
};
use norah_speech_lib::speech::{SentenceOutcome, SpeechConfig, SpeechService};
use norah_speech_lib::synthesis::{SpeechSynthesizer, SynthesisError, Utterance};
use norah_speech_lib::vocabulary::{default_quick_phrases, Language, Vocabulary, Word};

// ============================================================================
// Fakes
// ============================================================================

struct RecordedFetcher {
    recorded: HashSet<(Language, String)>,
}

impl AudioFetcher for RecordedFetcher {
    fn fetch(&self, language: Language, word_id: &str) -> Result<Vec<u8>, FetchError> {
        if self.recorded.contains(&(language, word_id.to_string())) {
            Ok(vec![0u8; 8])
        } else {
            Err(FetchError::NotFound(word_id.to_string()))
        }
    }

    fn describe(&self) -> String {
        "recorded".to_string()
    }
}

struct Started {
    word_id: String,
    language: Language,
    at: Instant,
    control: Arc<PlaybackControl>,
}

/// Output whose clips last `clip_len`, or until stopped when `None`.
struct MockOutput {
    clip_len: Option<Duration>,
    failing: HashSet<String>,
    started: Mutex<Vec<Started>>,
}

impl MockOutput {
    fn new(clip_len: Option<Duration>) -> Arc<Self> {
        Self::failing(clip_len, &[])
    }

    fn failing(clip_len: Option<Duration>, failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            clip_len,
            failing: failing.iter().map(|id| id.to_string()).collect(),
            started: Mutex::new(Vec::new()),
        })
    }

    fn started_ids(&self) -> Vec<String> {
        self.started
            .lock()
            .unwrap()
            .iter()
            .map(|started| started.word_id.clone())
            .collect()
    }

    fn control(&self, index: usize) -> Arc<PlaybackControl> {
        Arc::clone(&self.started.lock().unwrap()[index].control)
    }

    fn started_count(&self) -> usize {
        self.started.lock().unwrap().len()
    }
}

impl AudioOutput for MockOutput {
    fn start(&self, clip: &AudioClip) -> Result<Arc<dyn ActivePlayback>, PlaybackError> {
        if self.failing.contains(clip.word_id()) {
            return Err(PlaybackError::Decode("corrupt clip".to_string()));
        }

        let control = PlaybackControl::new();
        if let Some(clip_len) = self.clip_len {
            let remote = Arc::clone(&control);
            thread::spawn(move || {
                thread::sleep(clip_len);
                remote.finish();
            });
        }

        self.started.lock().unwrap().push(Started {
            word_id: clip.word_id().to_string(),
            language: clip.language(),
            at: Instant::now(),
            control: Arc::clone(&control),
        });
        Ok(control)
    }
}

#[derive(Default)]
struct RecordingSynthesizer {
    spoken: Mutex<Vec<Utterance>>,
    cancels: AtomicUsize,
}

impl RecordingSynthesizer {
    fn spoken(&self) -> Vec<(String, Language)> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|utterance| (utterance.text.clone(), utterance.language))
            .collect()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, utterance: &Utterance) -> Result<(), SynthesisError> {
        self.spoken.lock().unwrap().push(utterance.clone());
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    service: SpeechService,
    output: Arc<MockOutput>,
    synthesizer: Arc<RecordingSynthesizer>,
    vocabulary: Vocabulary,
}

impl Harness {
    fn new(recorded: &[(Language, &str)], output: Arc<MockOutput>) -> Self {
        let vocabulary = Vocabulary::default_board();
        let fetcher = Arc::new(RecordedFetcher {
            recorded: recorded
                .iter()
                .map(|&(language, id)| (language, id.to_string()))
                .collect(),
        });
        let cache = Arc::new(AudioCache::with_workers(fetcher, 4));
        assert!(cache
            .preload_all(vocabulary.words(), &Language::ALL)
            .wait_timeout(Duration::from_secs(5)));

        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let service = SpeechService::new(
            cache,
            output.clone(),
            synthesizer.clone(),
            SpeechConfig::default(),
        );

        Self {
            service,
            output,
            synthesizer,
            vocabulary,
        }
    }

    fn words(&self, ids: &[&str]) -> Vec<Word> {
        ids.iter()
            .map(|id| self.vocabulary.get(*id).cloned().expect("word on default board"))
            .collect()
    }

    fn word(&self, id: &str) -> Word {
        self.words(&[id]).remove(0)
    }
}

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

// ============================================================================
// Single words
// ============================================================================

#[test]
fn second_word_stops_the_first() {
    let harness = Harness::new(
        &[(Language::En, "hi"), (Language::En, "please")],
        MockOutput::new(None),
    );

    harness.service.speak_word(&harness.word("hi"), Language::En);
    harness.service.speak_word(&harness.word("please"), Language::En);

    assert_eq!(harness.output.started_ids(), ["hi", "please"]);
    assert!(harness.output.control(0).is_stopped());
    assert!(!harness.output.control(1).is_finished());
    assert!(harness.synthesizer.spoken().is_empty());
    assert!(harness.synthesizer.cancels.load(Ordering::SeqCst) >= 2);
}

#[test]
fn unrecorded_word_is_synthesized() {
    let harness = Harness::new(&[], MockOutput::new(None));

    harness.service.speak_word(&harness.word("more"), Language::Fr);

    assert_eq!(harness.output.started_count(), 0);
    assert_eq!(
        harness.synthesizer.spoken(),
        [("encore".to_string(), Language::Fr)]
    );
}

#[test]
fn failed_start_falls_back_to_synthesis() {
    let harness = Harness::new(
        &[(Language::En, "water")],
        MockOutput::failing(None, &["water"]),
    );

    harness.service.speak_word(&harness.word("water"), Language::En);

    assert_eq!(harness.output.started_count(), 0);
    assert_eq!(
        harness.synthesizer.spoken(),
        [("water".to_string(), Language::En)]
    );
}

#[test]
fn stop_silences_the_current_word() {
    let harness = Harness::new(&[(Language::En, "yes")], MockOutput::new(None));

    harness.service.speak_word(&harness.word("yes"), Language::En);
    harness.service.stop();

    assert!(harness.output.control(0).is_stopped());
}

// ============================================================================
// Sentences
// ============================================================================

#[test]
fn recorded_sentence_plays_in_order_with_pause() {
    let harness = Harness::new(
        &[(Language::Fr, "hi"), (Language::Fr, "please")],
        MockOutput::new(Some(Duration::from_millis(30))),
    );
    let words = harness.words(&["hi", "please"]);

    let outcome = harness.service.speak_sentence(&words, Language::Fr).join();

    assert_eq!(outcome, SentenceOutcome::Completed);
    assert_eq!(harness.output.started_ids(), ["hi", "please"]);
    assert!(harness.synthesizer.spoken().is_empty());

    let started = harness.output.started.lock().unwrap();
    assert!(started.iter().all(|s| s.language == Language::Fr));
    let gap = started[1].at.duration_since(started[0].at);
    assert!(gap >= Duration::from_millis(150), "gap was {gap:?}");
}

#[test]
fn partially_recorded_sentence_is_synthesized_whole() {
    let harness = Harness::new(
        &[(Language::Fr, "hi"), (Language::En, "please")],
        MockOutput::new(Some(Duration::from_millis(10))),
    );
    let words = harness.words(&["hi", "please"]);

    let outcome = harness.service.speak_sentence(&words, Language::Fr).join();

    assert_eq!(outcome, SentenceOutcome::Synthesized);
    assert_eq!(harness.output.started_count(), 0);
    assert_eq!(
        harness.synthesizer.spoken(),
        [("salut s'il te plaît".to_string(), Language::Fr)]
    );
}

#[test]
fn empty_sentence_does_nothing() {
    let harness = Harness::new(&[(Language::En, "hi")], MockOutput::new(None));
    harness.service.speak_word(&harness.word("hi"), Language::En);

    let outcome = harness.service.speak_sentence(&[], Language::En).join();

    assert_eq!(outcome, SentenceOutcome::Empty);
    assert!(!harness.output.control(0).is_finished());
}

#[test]
fn stop_aborts_sentence_mid_playback() {
    let harness = Harness::new(
        &[(Language::En, "hi"), (Language::En, "please"), (Language::En, "more")],
        MockOutput::new(None),
    );
    let words = harness.words(&["hi", "please", "more"]);

    let playback = harness.service.speak_sentence(&words, Language::En);
    assert!(wait_until(|| harness.output.started_count() == 1));
    harness.service.stop();

    assert_eq!(playback.join(), SentenceOutcome::Cancelled);
    assert_eq!(harness.output.started_ids(), ["hi"]);
    assert!(harness.output.control(0).is_stopped());
    assert!(harness.synthesizer.spoken().is_empty());
}

#[test]
fn new_word_interrupts_sentence() {
    let harness = Harness::new(
        &[(Language::En, "hi"), (Language::En, "please"), (Language::En, "yes")],
        MockOutput::new(None),
    );
    let words = harness.words(&["hi", "please"]);

    let playback = harness.service.speak_sentence(&words, Language::En);
    assert!(wait_until(|| harness.output.started_count() == 1));
    harness.service.speak_word(&harness.word("yes"), Language::En);

    assert_eq!(playback.join(), SentenceOutcome::Cancelled);
    assert_eq!(harness.output.started_ids(), ["hi", "yes"]);
    assert!(!harness.output.control(1).is_finished());
}

#[test]
fn interrupted_pause_plays_nothing_more() {
    let output = MockOutput::new(Some(Duration::from_millis(5)));
    let harness = Harness::new(
        &[(Language::En, "hi"), (Language::En, "please")],
        output,
    );
    let words = harness.words(&["hi", "please"]);

    let playback = harness.service.speak_sentence(&words, Language::En);
    assert!(wait_until(|| {
        harness.output.started_count() == 1 && harness.output.control(0).is_finished()
    }));
    // Inside the 150 ms pause.
    harness.service.stop();

    assert_eq!(playback.join(), SentenceOutcome::Cancelled);
    assert_eq!(harness.output.started_ids(), ["hi"]);
}

#[test]
fn failure_mid_sentence_synthesizes_the_rest() {
    let harness = Harness::new(
        &[(Language::En, "hi"), (Language::En, "please"), (Language::En, "more")],
        MockOutput::failing(Some(Duration::from_millis(10)), &["please"]),
    );
    let words = harness.words(&["hi", "please", "more"]);

    let outcome = harness.service.speak_sentence(&words, Language::En).join();

    assert_eq!(outcome, SentenceOutcome::FellBack { from_index: 1 });
    assert_eq!(harness.output.started_ids(), ["hi"]);
    assert_eq!(
        harness.synthesizer.spoken(),
        [("please more".to_string(), Language::En)]
    );
}

#[test]
fn quick_phrase_is_synthesized() {
    let harness = Harness::new(&[], MockOutput::new(None));
    let phrase = default_quick_phrases()
        .into_iter()
        .find(|phrase| phrase.id == "phrase_my_turn")
        .unwrap();

    harness.service.speak_phrase(&phrase, Language::Fr);

    assert_eq!(
        harness.synthesizer.spoken(),
        [("C'est mon tour".to_string(), Language::Fr)]
    );
}
