//! Sources for pre-rendered word audio.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::vocabulary::{is_valid_word_id, Language};

pub const DEFAULT_AUDIO_EXTENSION: &str = "mp3";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Audio not found: {0}")]
    NotFound(String),
    #[error("{url}: unexpected status {status}")]
    Status { url: String, status: u16 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Empty audio resource: {0}")]
    Empty(String),
    #[error("Invalid word id for audio lookup: {0:?}")]
    InvalidWordId(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::Empty(_) => "No recording exists for this word.",
            Self::Status { .. } | Self::Network(_) => {
                "Recorded words could not be downloaded. Synthesized speech will be used."
            }
            Self::InvalidWordId(_) => "That word cannot have a recording.",
            Self::Io(_) => "Recorded words could not be read from disk.",
        }
    }

    /// A missing resource is an expected outcome, not a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Empty(_))
    }
}

/// Relative asset path: `audio/{language}/{word_id}.{extension}`.
pub fn asset_path(language: Language, word_id: &str, extension: &str) -> String {
    format!("audio/{}/{}.{}", language.code(), word_id, extension)
}

/// Downloads the encoded audio for one (language, word) pair.
pub trait AudioFetcher: Send + Sync {
    fn fetch(&self, language: Language, word_id: &str) -> Result<Vec<u8>, FetchError>;

    /// Container hint for the bytes this fetcher returns.
    fn extension(&self) -> &str {
        DEFAULT_AUDIO_EXTENSION
    }

    /// Human-readable origin, for diagnostics.
    fn describe(&self) -> String;
}

fn checked_word_id(word_id: &str) -> Result<&str, FetchError> {
    if is_valid_word_id(word_id) {
        Ok(word_id)
    } else {
        Err(FetchError::InvalidWordId(word_id.to_string()))
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches `{base_url}/audio/{language}/{word_id}.{ext}` over HTTP.
///
/// No request timeout is set: a hung request just never fills its entry.
pub struct HttpAudioFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
    extension: String,
}

impl HttpAudioFetcher {
    pub fn new(base_url: impl Into<String>, extension: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            extension: extension.into(),
        })
    }

    pub fn url_for(&self, language: Language, word_id: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            asset_path(language, word_id, &self.extension)
        )
    }
}

impl AudioFetcher for HttpAudioFetcher {
    fn fetch(&self, language: Language, word_id: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(language, checked_word_id(word_id)?);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(format!("{url}: request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Network(format!("{url}: read failed: {e}")))?;

        if bytes.is_empty() {
            return Err(FetchError::Empty(url));
        }

        Ok(bytes.to_vec())
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn describe(&self) -> String {
        format!("{}/audio", self.base_url)
    }
}

// ============================================================================
// Local directory
// ============================================================================

/// Reads `{root}/audio/{language}/{word_id}.{ext}` from disk.
pub struct DirAudioFetcher {
    root: PathBuf,
    extension: String,
}

impl DirAudioFetcher {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, language: Language, word_id: &str) -> PathBuf {
        self.root.join(asset_path(language, word_id, &self.extension))
    }
}

impl AudioFetcher for DirAudioFetcher {
    fn fetch(&self, language: Language, word_id: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.path_for(language, checked_word_id(word_id)?);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(FetchError::Io(e)),
        };

        if bytes.is_empty() {
            return Err(FetchError::Empty(path.display().to_string()));
        }

        Ok(bytes)
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn describe(&self) -> String {
        self.root.join("audio").display().to_string()
    }
}
