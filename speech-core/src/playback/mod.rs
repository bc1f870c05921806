//! Playback of pre-rendered word clips.

mod decode;
#[cfg(feature = "device-output")]
mod device;
mod feed;

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use thiserror::Error;

use crate::vocabulary::Language;

pub use decode::{decode_clip, resample_linear, DecodedAudio};
#[cfg(feature = "device-output")]
pub use device::{list_output_devices, CpalOutput};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Failed to decode clip: {0}")]
    Decode(String),
    #[error("Clip contains no audio")]
    EmptyClip,
    #[error("No audio output device available")]
    NoOutputDevice,
    #[error("Unsupported output sample format")]
    UnsupportedFormat,
    #[error("Output device error: {0}")]
    Device(String),
    #[error("Playback thread panicked or failed to start")]
    ThreadError,
}

impl PlaybackError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::EmptyClip => "A recorded word could not be played.",
            Self::NoOutputDevice => "No speaker found. Please check your audio settings.",
            Self::UnsupportedFormat => "Your speaker's audio format is not supported.",
            Self::Device(_) => "A speaker error occurred. Please check your audio settings.",
            Self::ThreadError => "Internal audio error. Please restart the app.",
        }
    }
}

// ============================================================================
// Clips
// ============================================================================

/// Encoded audio for one (language, word) pair.
///
/// Clones share the underlying bytes, so each clone can be started on its own
/// without disturbing an earlier playback of the same word.
#[derive(Clone)]
pub struct AudioClip {
    language: Language,
    word_id: Arc<str>,
    extension: Arc<str>,
    data: Arc<[u8]>,
}

impl AudioClip {
    pub fn new(
        language: Language,
        word_id: impl Into<Arc<str>>,
        extension: impl Into<Arc<str>>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            language,
            word_id: word_id.into(),
            extension: extension.into(),
            data: data.into(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn word_id(&self) -> &str {
        &self.word_id
    }

    /// File extension used as a container hint when decoding.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("language", &self.language)
            .field("word_id", &self.word_id)
            .field("extension", &self.extension)
            .field("bytes", &self.data.len())
            .finish()
    }
}

// ============================================================================
// Output Traits
// ============================================================================

/// How a playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    Finished,
    Stopped,
}

/// A clip that has started playing.
pub trait ActivePlayback: Send + Sync {
    /// Blocks until the clip finished, failed or was stopped.
    fn wait(&self) -> Result<PlaybackEnd, PlaybackError>;

    /// Silences the clip immediately. Idempotent.
    fn stop(&self);

    fn is_finished(&self) -> bool;
}

/// Sink able to start clips. `start` fails if the clip cannot begin playing.
pub trait AudioOutput: Send + Sync {
    fn start(&self, clip: &AudioClip) -> Result<Arc<dyn ActivePlayback>, PlaybackError>;
}

// ============================================================================
// Playback Control
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum PlaybackState {
    Playing,
    Finished,
    Stopped,
    Failed(PlaybackError),
}

/// Condvar-backed [`ActivePlayback`] shared between an output's audio thread
/// and the caller. The first transition out of `Playing` wins.
#[derive(Debug)]
pub struct PlaybackControl {
    state: Mutex<PlaybackState>,
    changed: Condvar,
}

impl PlaybackControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PlaybackState::Playing),
            changed: Condvar::new(),
        })
    }

    /// Marks the clip as played to the end.
    pub fn finish(&self) {
        self.settle(PlaybackState::Finished);
    }

    /// Marks the clip as failed mid-playback.
    pub fn fail(&self, err: PlaybackError) {
        self.settle(PlaybackState::Failed(err));
    }

    pub fn is_stopped(&self) -> bool {
        matches!(*self.lock_state(), PlaybackState::Stopped)
    }

    fn lock_state(&self) -> MutexGuard<'_, PlaybackState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn settle(&self, next: PlaybackState) {
        let mut state = self.lock_state();
        if *state == PlaybackState::Playing {
            *state = next;
            self.changed.notify_all();
        }
    }
}

impl ActivePlayback for PlaybackControl {
    fn wait(&self) -> Result<PlaybackEnd, PlaybackError> {
        let mut state = self.lock_state();
        while *state == PlaybackState::Playing {
            state = match self.changed.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        match &*state {
            PlaybackState::Finished => Ok(PlaybackEnd::Finished),
            PlaybackState::Failed(err) => Err(err.clone()),
            PlaybackState::Stopped | PlaybackState::Playing => Ok(PlaybackEnd::Stopped),
        }
    }

    fn stop(&self) {
        self.settle(PlaybackState::Stopped);
    }

    fn is_finished(&self) -> bool {
        *self.lock_state() != PlaybackState::Playing
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// Output for hosts without a usable speaker: every start fails, which routes
/// all speech through the synthesizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAudioOutput;

impl AudioOutput for NoAudioOutput {
    fn start(&self, clip: &AudioClip) -> Result<Arc<dyn ActivePlayback>, PlaybackError> {
        log::debug!(
            "No audio output; cannot start clip {}/{}",
            clip.language(),
            clip.word_id()
        );
        Err(PlaybackError::NoOutputDevice)
    }
}

/// The best output this build supports.
pub fn default_output() -> Arc<dyn AudioOutput> {
    #[cfg(feature = "device-output")]
    {
        Arc::new(CpalOutput::new())
    }
    #[cfg(not(feature = "device-output"))]
    {
        Arc::new(NoAudioOutput)
    }
}
