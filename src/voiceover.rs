/*!
 * Voiceover planning.
 *
 * Turns a narration document into the ordered list of audio segments the
 * speech stage has to produce (lead silence, one speech segment per step,
 * pauses between steps) and the sync manifest the renderer reads to place
 * the resulting track. Nothing here synthesizes or touches audio.
 */

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::app_config::VoiceoverConfig;
use crate::narration::NarrationDocument;

/// One segment of the stitched voiceover track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Segment {
    /// Silence from t=0 up to the first caption
    LeadSilence {
        /// Length in seconds
        seconds: f64,
    },
    /// Synthesized narration for one step
    Speech {
        /// 1-based step number
        step: usize,
        /// Zero-padded step label, e.g. "03"
        label: String,
        /// Text to synthesize
        text: String,
    },
    /// Silence after a step
    Pause {
        /// Step the pause follows
        step: usize,
        /// Length in seconds
        seconds: f64,
    },
}

/// Step entry of the sync manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStep {
    pub step: usize,
    pub start_seconds: f64,
    pub text: String,
}

/// Tells the renderer where the voiceover track starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncManifest {
    /// File name of the audio track
    pub audio_file: String,

    /// Always 0: the lead silence carries the offset
    pub delay_in_frames: u64,

    #[serde(rename = "leadSilenceS")]
    pub lead_silence_seconds: f64,

    /// RFC 3339 timestamp
    pub generated_at: String,

    /// Voice name
    pub voice: String,

    pub steps: Vec<ManifestStep>,
}

/// Encoding of every synthesized segment
pub const AUDIO_ENCODING: &str = "MP3";

/// Voice the speech service is asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub language_code: String,
    pub name: String,
}

/// Audio settings sent with each synthesis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    pub audio_encoding: String,
    pub speaking_rate: f64,
    pub pitch: f64,
    pub volume_gain_db: f64,
}

impl From<&VoiceoverConfig> for VoiceSelection {
    fn from(settings: &VoiceoverConfig) -> Self {
        Self {
            language_code: settings.language_code.clone(),
            name: settings.voice_name.clone(),
        }
    }
}

impl From<&VoiceoverConfig> for AudioSettings {
    fn from(settings: &VoiceoverConfig) -> Self {
        Self {
            audio_encoding: AUDIO_ENCODING.to_string(),
            speaking_rate: settings.speaking_rate,
            pitch: settings.pitch,
            volume_gain_db: settings.volume_gain_db,
        }
    }
}

/// Segments plus manifest for one narration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceoverPlan {
    /// Where the stitched track is expected
    pub audio_path: PathBuf,

    /// Voice for every speech segment
    pub voice: VoiceSelection,

    /// Audio settings for every speech segment
    pub audio_config: AudioSettings,

    /// Segments in playback order
    pub segments: Vec<Segment>,

    /// Manifest describing the finished track
    pub manifest: SyncManifest,
}

impl VoiceoverPlan {
    /// Builds the plan for `document`, stamped with the current time
    pub fn from_document(
        document: &NarrationDocument,
        settings: &VoiceoverConfig,
        audio_path: &Path,
    ) -> Self {
        Self::from_document_at(document, settings, audio_path, Utc::now())
    }

    /// Builds the plan for `document` with an explicit generation time
    pub fn from_document_at(
        document: &NarrationDocument,
        settings: &VoiceoverConfig,
        audio_path: &Path,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let steps = &document.steps;
        let lead_silence = document.lead_silence_seconds();
        let pause_seconds = settings.pause_between_steps_ms as f64 / 1000.0;
        let mut segments = Vec::with_capacity(steps.len() * 2 + 1);

        if lead_silence > 0.0 {
            segments.push(Segment::LeadSilence { seconds: lead_silence });
        }

        for (i, step) in steps.iter().enumerate() {
            let label = format!("{:02}", i + 1);
            let text = step.text.trim();
            if text.is_empty() {
                warn!("[{}/{}] Skipping step with empty text.", label, steps.len());
                continue;
            }

            segments.push(Segment::Speech {
                step: i + 1,
                label,
                text: text.to_string(),
            });

            if i + 1 < steps.len() && pause_seconds > 0.0 {
                segments.push(Segment::Pause {
                    step: i + 1,
                    seconds: pause_seconds,
                });
            }
        }

        let manifest = SyncManifest {
            audio_file: audio_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            delay_in_frames: 0,
            lead_silence_seconds: lead_silence,
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            voice: settings.voice_name.clone(),
            steps: steps
                .iter()
                .enumerate()
                .map(|(i, step)| ManifestStep {
                    step: i + 1,
                    start_seconds: step.start_seconds,
                    text: step.text.clone(),
                })
                .collect(),
        };

        Self {
            audio_path: audio_path.to_path_buf(),
            voice: VoiceSelection::from(settings),
            audio_config: AudioSettings::from(settings),
            segments,
            manifest,
        }
    }

    /// Number of speech segments
    pub fn speech_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Speech { .. }))
            .count()
    }

    /// Total silence in the plan, in seconds
    pub fn silence_seconds(&self) -> f64 {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::LeadSilence { seconds } | Segment::Pause { seconds, .. } => *seconds,
                Segment::Speech { .. } => 0.0,
            })
            .sum()
    }
}
