use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio_cache::DEFAULT_AUDIO_EXTENSION;
use crate::speech::{SpeechConfig, DEFAULT_WORD_PAUSE};
use crate::synthesis::VoiceSettings;
use crate::vocabulary::Language;

const APP_DIR: &str = "norah-speech";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("No configuration directory on this platform")]
    NoConfigDir,
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SettingsError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoConfigDir => "Settings cannot be stored on this device.",
            Self::Read { .. } => "Settings could not be read. Defaults will be used.",
            Self::Write { .. } | Self::Encode(_) => "Settings could not be saved.",
            Self::Parse { .. } => "The settings file is damaged. Please fix or delete it.",
        }
    }
}

/// Which speech engine backs the synthesized fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesizerChoice {
    /// First engine found on the host, silence if none.
    #[default]
    Auto,
    Espeak,
    Say,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Remote root serving `audio/{language}/{word}.{ext}`. Takes precedence
    /// over `audio_dir`.
    pub audio_base_url: Option<String>,
    /// Local root holding `audio/{language}/{word}.{ext}`.
    pub audio_dir: Option<PathBuf>,
    pub audio_extension: String,
    pub word_pause_ms: u64,
    pub voice: VoiceSettings,
    pub preload_languages: Vec<Language>,
    /// Prefetch threads; unset means sized from the CPU count.
    pub prefetch_workers: Option<usize>,
    pub synthesizer: SynthesizerChoice,
    pub language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_base_url: None,
            audio_dir: Some(PathBuf::from("public")),
            audio_extension: DEFAULT_AUDIO_EXTENSION.to_string(),
            word_pause_ms: DEFAULT_WORD_PAUSE.as_millis() as u64,
            voice: VoiceSettings::default(),
            preload_languages: Language::ALL.to_vec(),
            prefetch_workers: None,
            synthesizer: SynthesizerChoice::default(),
            language: Language::En,
        }
    }
}

impl Settings {
    pub fn speech_config(&self) -> SpeechConfig {
        SpeechConfig {
            word_pause: Duration::from_millis(self.word_pause_ms),
            voice: self.voice,
        }
    }
}

pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
        .ok_or(SettingsError::NoConfigDir)
}

/// Reads settings from `path`. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("No settings at {}; using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn get_settings() -> Result<Settings, SettingsError> {
    load_settings_from(&default_settings_path()?)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_settings(settings: &Settings) -> Result<(), SettingsError> {
    save_settings_to(&default_settings_path()?, settings)
}
