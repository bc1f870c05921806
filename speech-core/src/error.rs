use thiserror::Error;

use crate::audio_cache::FetchError;
use crate::playback::PlaybackError;
use crate::settings::SettingsError;
use crate::synthesis::SynthesisError;
use crate::vocabulary::VocabularyError;

/// Unified app errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error("Audio source: {0}")]
    Fetch(#[from] FetchError),

    #[error("Playback: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Synthesis: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Settings: {0}")]
    Settings(#[from] SettingsError),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Vocabulary(e) => e.user_message(),
            Self::Fetch(e) => e.user_message(),
            Self::Playback(e) => e.user_message(),
            Self::Synthesis(e) => e.user_message(),
            Self::Settings(e) => e.user_message(),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_display_string() {
        let err = AppError::from(PlaybackError::NoOutputDevice);
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            "\"Playback: No audio output device available\""
        );
        assert_eq!(err.user_message(), PlaybackError::NoOutputDevice.user_message());
    }
}
