use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::NarrationError;
use crate::file_utils::FileManager;
use crate::narration::{NarrationDocument, NarrationExtractor};
use crate::voiceover::VoiceoverPlan;

// @module: Application controller for narration extraction

/// Result of extracting one composition
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Composition that was read
    pub composition: PathBuf,

    /// Where the narration JSON goes
    pub narration_path: PathBuf,

    /// Extracted narration
    pub document: NarrationDocument,

    /// Whether the narration JSON was written
    pub written: bool,
}

/// Counts from a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for narration extraction
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Extractor built from the configuration
    extractor: NarrationExtractor,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let extractor = NarrationExtractor::new(config.extract_options()?);
        Ok(Self { config, extractor })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract narration from one composition and write its narration JSON.
    ///
    /// Zero extracted steps is an error here: the template most likely lacks
    /// caption annotations. An existing narration file is only replaced when
    /// `force_overwrite` is set; `dry_run` never writes.
    pub fn extract(
        &self,
        composition: &Path,
        force_overwrite: bool,
        dry_run: bool,
    ) -> Result<ExtractionReport> {
        if !FileManager::file_exists(composition) {
            return Err(NarrationError::CompositionNotFound(composition.to_path_buf()).into());
        }

        let file_name = composition
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!("Extracting captions from {}...", file_name);

        let source = FileManager::read_to_string(composition)?;
        let document = self.extractor.extract(&source);
        for step in &document.steps {
            debug!("{}", step);
        }

        if document.is_empty() {
            let options = self.extractor.options();
            return Err(NarrationError::NoCaptions {
                path: composition.to_path_buf(),
                tag: options.block_tag.clone(),
                attribute: options.caption_attribute.clone(),
            }
            .into());
        }

        let narration_path = FileManager::narration_path_with_suffix(
            composition,
            &self.config.output.narration_suffix,
        );
        let mut report = ExtractionReport {
            composition: composition.to_path_buf(),
            narration_path,
            document,
            written: false,
        };

        if dry_run {
            info!("Dry run: extracted {} caption(s), nothing written", report.document.steps.len());
        } else if report.narration_path.exists() && !force_overwrite {
            warn!(
                "Narration file already exists: {:?}. Use -f to force overwrite.",
                report.narration_path
            );
        } else {
            let json = report
                .document
                .to_json(self.config.output.pretty)
                .context("Failed to serialize narration")?;
            FileManager::write_to_file(&report.narration_path, &json)?;
            report.written = true;
            info!(
                "Extracted {} caption(s) → {}",
                report.document.steps.len(),
                report.narration_path.display()
            );
        }

        self.log_preview(&report.document);
        Ok(report)
    }

    /// Run extraction over every composition below a directory.
    ///
    /// Per-file failures are logged and counted; only an unreadable or empty
    /// directory fails the whole run.
    pub fn extract_folder(
        &self,
        input_dir: &Path,
        force_overwrite: bool,
        dry_run: bool,
    ) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let compositions = FileManager::find_compositions(input_dir)?;
        if compositions.is_empty() {
            return Err(anyhow::anyhow!("No composition files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(compositions.len() as u64);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                 {pos}/{len} files ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for composition in &compositions {
            let file_name = composition
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.extract(composition, force_overwrite, dry_run) {
                Ok(report) if report.written || dry_run => summary.processed += 1,
                Ok(_) => summary.skipped += 1,
                Err(e) => {
                    let no_captions = matches!(
                        e.downcast_ref::<NarrationError>(),
                        Some(NarrationError::NoCaptions { .. })
                    );
                    if no_captions {
                        warn!("Skipping {}: no captions", file_name);
                        summary.skipped += 1;
                    } else {
                        error!("Error processing file {}: {}", file_name, e);
                        summary.failed += 1;
                    }
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors in {}",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    /// Load a narration JSON and plan the voiceover for it
    pub fn plan(&self, narration_path: &Path) -> Result<VoiceoverPlan> {
        if !FileManager::file_exists(narration_path) {
            return Err(NarrationError::NarrationNotFound(narration_path.to_path_buf()).into());
        }

        let json = FileManager::read_to_string(narration_path)?;
        let document =
            NarrationDocument::from_json(&json).map_err(|e| NarrationError::InvalidNarration {
                path: narration_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if document.is_empty() {
            return Err(NarrationError::NoCaptions {
                path: narration_path.to_path_buf(),
                tag: self.config.block_tag.clone(),
                attribute: self.config.caption_attribute.clone(),
            }
            .into());
        }

        let composition_name = FileManager::composition_name_with_suffix(
            narration_path,
            &self.config.output.narration_suffix,
        );
        let audio_path =
            FileManager::voiceover_audio_path(&self.config.voiceover.output_dir, &composition_name);
        let plan = VoiceoverPlan::from_document(&document, &self.config.voiceover, &audio_path);

        info!(
            "Planned {} speech segment(s) with {}s of silence for {}",
            plan.speech_count(),
            plan.silence_seconds(),
            plan.audio_path.display()
        );

        Ok(plan)
    }

    /// Write the plan's sync manifest next to its audio path
    pub fn write_manifest(&self, plan: &VoiceoverPlan) -> Result<PathBuf> {
        let manifest_path = FileManager::sync_manifest_path_for(&plan.audio_path);
        let json = serde_json::to_string_pretty(&plan.manifest)
            .context("Failed to serialize sync manifest")?;
        FileManager::write_to_file(&manifest_path, &json)?;
        info!("Manifest: {}", manifest_path.display());
        Ok(manifest_path)
    }

    /// Log the step / start / duration / text preview table
    fn log_preview(&self, document: &NarrationDocument) {
        let width = self.config.output.preview_width;
        info!("  {:<5} {:<7} {:<9} Text", "Step", "Start", "Duration");
        info!("  {} {} {} {}", "─".repeat(5), "─".repeat(7), "─".repeat(9), "─".repeat(50));
        for (i, step) in document.steps.iter().enumerate() {
            info!(
                "  {:<5} {:<7} {:<9} {}",
                i + 1,
                format!("{}s", step.start_seconds),
                format!("{}s", step.duration_seconds),
                Self::truncate(&step.text, width)
            );
        }
    }

    /// Shorten text to `width` characters, marking the cut with an ellipsis
    pub fn truncate(text: &str, width: usize) -> String {
        if text.chars().count() > width {
            let head: String = text.chars().take(width).collect();
            format!("{}…", head)
        } else {
            text.to_string()
        }
    }

    /// Format a duration in a human-readable way
    fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
