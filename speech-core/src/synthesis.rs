//! Platform text-to-speech, the last fallback tier.

use std::io;
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vocabulary::Language;

/// Speaking rate relative to the platform default.
pub const DEFAULT_RATE: f32 = 0.9;
pub const DEFAULT_PITCH: f32 = 1.0;

// espeak-ng and `say` both default to roughly this many words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
// espeak-ng pitch is 0..=99 with 50 as the neutral voice.
const BASE_ESPEAK_PITCH: f32 = 50.0;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Speech program {program} failed to start: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Nothing to say")]
    EmptyText,
}

impl SynthesisError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "Text-to-speech is not available on this device.",
            Self::EmptyText => "There is nothing to say.",
        }
    }
}

// ============================================================================
// Utterances
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub rate: f32,
    pub pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: Language,
    pub rate: f32,
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self::with_voice(text, language, VoiceSettings::default())
    }

    pub fn with_voice(text: impl Into<String>, language: Language, voice: VoiceSettings) -> Self {
        Self {
            text: text.into(),
            language,
            rate: voice.rate,
            pitch: voice.pitch,
        }
    }

    fn words_per_minute(&self) -> u32 {
        (BASE_WORDS_PER_MINUTE * self.rate.clamp(0.1, 10.0)).round() as u32
    }

    fn espeak_pitch(&self) -> u32 {
        (BASE_ESPEAK_PITCH * self.pitch.clamp(0.0, 2.0)).round().min(99.0) as u32
    }
}

// ============================================================================
// Synthesizers
// ============================================================================

/// A platform speech engine.
///
/// `speak` hands the utterance over and returns without waiting for the audio
/// to finish; `cancel` drops everything still pending or playing.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, utterance: &Utterance) -> Result<(), SynthesisError>;

    fn cancel(&self);

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str;
}

/// Which external program [`CommandSynthesizer`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechProgram {
    EspeakNg,
    Say,
}

impl SpeechProgram {
    pub fn binary(self) -> &'static str {
        match self {
            Self::EspeakNg => "espeak-ng",
            Self::Say => "say",
        }
    }

    fn probe_args(self) -> &'static [&'static str] {
        match self {
            Self::EspeakNg => &["--version"],
            Self::Say => &["-v", "?"],
        }
    }

    fn is_installed(self) -> bool {
        Command::new(self.binary())
            .args(self.probe_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

/// Stock macOS voice for each board language, keyed by its speech tag.
fn say_voice(language: Language) -> &'static str {
    match language.speech_tag() {
        "fr-FR" => "Thomas",
        _ => "Samantha",
    }
}

/// Speaks by spawning `espeak-ng` or macOS `say` per utterance.
pub struct CommandSynthesizer {
    program: SpeechProgram,
    children: Mutex<Vec<Child>>,
}

impl CommandSynthesizer {
    pub fn new(program: SpeechProgram) -> Self {
        Self {
            program,
            children: Mutex::new(Vec::new()),
        }
    }

    /// First speech program found on this host, if any.
    pub fn detect() -> Option<Self> {
        let order: &[SpeechProgram] = if cfg!(target_os = "macos") {
            &[SpeechProgram::Say, SpeechProgram::EspeakNg]
        } else {
            &[SpeechProgram::EspeakNg]
        };

        order
            .iter()
            .copied()
            .find(|program| program.is_installed())
            .map(Self::new)
    }

    pub fn program(&self) -> SpeechProgram {
        self.program
    }

    /// Arguments passed to the speech program for `utterance`.
    pub fn command_args(&self, utterance: &Utterance) -> Vec<String> {
        let wpm = utterance.words_per_minute().to_string();
        match self.program {
            SpeechProgram::EspeakNg => vec![
                "-v".to_string(),
                utterance.language.code().to_string(),
                "-s".to_string(),
                wpm,
                "-p".to_string(),
                utterance.espeak_pitch().to_string(),
                utterance.text.clone(),
            ],
            SpeechProgram::Say => vec![
                "-v".to_string(),
                say_voice(utterance.language).to_string(),
                "-r".to_string(),
                wpm,
                utterance.text.clone(),
            ],
        }
    }

    fn lock_children(&self) -> MutexGuard<'_, Vec<Child>> {
        match self.children.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, utterance: &Utterance) -> Result<(), SynthesisError> {
        if utterance.text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let child = Command::new(self.program.binary())
            .args(self.command_args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SynthesisError::Spawn {
                program: self.program.binary().to_string(),
                source,
            })?;

        log::debug!(
            "{} speaking {:?} ({})",
            self.program.binary(),
            utterance.text,
            utterance.language.speech_tag()
        );

        let mut children = self.lock_children();
        // Reap finished children so the list only holds live speech.
        children.retain_mut(|child| matches!(child.try_wait(), Ok(None)));
        children.push(child);
        Ok(())
    }

    fn cancel(&self) {
        let mut children = self.lock_children();
        for mut child in children.drain(..) {
            if let Ok(None) = child.try_wait() {
                if let Err(e) = child.kill() {
                    log::warn!("Failed to stop {}: {e}", self.program.binary());
                }
            }
            let _ = child.wait();
        }
    }

    fn name(&self) -> &str {
        self.program.binary()
    }
}

/// Used where the host has no speech engine: every utterance is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&self, utterance: &Utterance) -> Result<(), SynthesisError> {
        log::debug!(
            "No speech engine; dropping {:?} ({})",
            utterance.text,
            utterance.language
        );
        Ok(())
    }

    fn cancel(&self) {}

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "none"
    }
}
