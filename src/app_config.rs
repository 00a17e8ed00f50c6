use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroU32;
use std::path::Path;

use crate::errors::ConfigError;
use crate::narration::{ExtractOptions, DEFAULT_BLOCK_TAG, DEFAULT_CAPTION_ATTRIBUTE};

/// Application configuration module
/// This module handles loading, validating and saving the settings shared by
/// the extract and plan commands.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Frame rate of the compositions
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Tag of the timing blocks
    #[serde(default = "default_block_tag")]
    pub block_tag: String,

    /// Attribute carrying narration text
    #[serde(default = "default_caption_attribute")]
    pub caption_attribute: String,

    /// Narration JSON output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Voice and timing settings for the speech stage
    #[serde(default)]
    pub voiceover: VoiceoverConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Narration JSON output settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    // @field: Appended to the composition stem
    #[serde(default = "default_narration_suffix")]
    pub narration_suffix: String,

    // @field: Pretty-print JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    // @field: Max caption chars in the preview table
    #[serde(default = "default_preview_width")]
    pub preview_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            narration_suffix: default_narration_suffix(),
            pretty: default_pretty(),
            preview_width: default_preview_width(),
        }
    }
}

/// Speech stage settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VoiceoverConfig {
    /// Voice name, e.g. "pt-BR-Neural2-C"
    #[serde(default = "default_voice_name")]
    pub voice_name: String,

    /// BCP-47 language code of the voice
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Speaking rate, 0.25–4.0
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f64,

    /// Pitch in semitones, -20.0–20.0
    #[serde(default)]
    pub pitch: f64,

    /// Volume gain in dB, -96.0–16.0
    #[serde(default)]
    pub volume_gain_db: f64,

    /// Silence inserted between consecutive steps
    #[serde(default = "default_pause_between_steps_ms")]
    pub pause_between_steps_ms: u64,

    /// Directory receiving `<composition>-voiceover.mp3`
    #[serde(default = "default_audio_output_dir")]
    pub output_dir: String,
}

impl Default for VoiceoverConfig {
    fn default() -> Self {
        Self {
            voice_name: default_voice_name(),
            language_code: default_language_code(),
            speaking_rate: default_speaking_rate(),
            pitch: 0.0,
            volume_gain_db: 0.0,
            pause_between_steps_ms: default_pause_between_steps_ms(),
            output_dir: default_audio_output_dir(),
        }
    }
}

impl VoiceoverConfig {
    /// Checks the voice settings against the ranges the speech service accepts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voice_name.trim().is_empty() {
            return Err(ConfigError::EmptyVoice);
        }
        check_range("speaking rate", self.speaking_rate, 0.25, 4.0)?;
        check_range("pitch", self.pitch, -20.0, 20.0)?;
        check_range("volume", self.volume_gain_db, -96.0, 16.0)?;
        Ok(())
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_fps() -> u32 {
    30
}

fn default_block_tag() -> String {
    DEFAULT_BLOCK_TAG.to_string()
}

fn default_caption_attribute() -> String {
    DEFAULT_CAPTION_ATTRIBUTE.to_string()
}

fn default_narration_suffix() -> String {
    ".narration.json".to_string()
}

fn default_pretty() -> bool {
    true
}

fn default_preview_width() -> usize {
    55
}

fn default_voice_name() -> String {
    "pt-BR-Neural2-C".to_string()
}

fn default_language_code() -> String {
    "pt-BR".to_string()
}

fn default_speaking_rate() -> f64 {
    1.0
}

fn default_pause_between_steps_ms() -> u64 {
    800
}

fn default_audio_output_dir() -> String {
    "assets/audio".to_string()
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let valid = value
        .split('.')
        .all(|part| {
            let mut chars = part.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        });
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

impl Config {
    /// Loads the configuration file, or writes and returns the defaults when
    /// it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json).with_context(|| {
            format!("Failed to write default config to file: {}", path.display())
        })?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidFps(self.fps));
        }
        check_identifier("block tag", &self.block_tag)?;
        check_identifier("caption attribute", &self.caption_attribute)?;
        self.voiceover.validate()
    }

    /// Extraction options derived from this configuration
    pub fn extract_options(&self) -> Result<ExtractOptions, ConfigError> {
        let fps = NonZeroU32::new(self.fps).ok_or(ConfigError::InvalidFps(self.fps))?;
        Ok(ExtractOptions {
            fps,
            block_tag: self.block_tag.clone(),
            caption_attribute: self.caption_attribute.clone(),
        })
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            fps: default_fps(),
            block_tag: default_block_tag(),
            caption_attribute: default_caption_attribute(),
            output: OutputConfig::default(),
            voiceover: VoiceoverConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
