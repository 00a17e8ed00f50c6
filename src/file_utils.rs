use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Extensions of composition sources
pub const COMPOSITION_EXTENSIONS: [&str; 4] = ["jsx", "tsx", "js", "ts"];

const NARRATION_SUFFIX: &str = ".narration.json";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Whether the path has a composition source extension
    pub fn is_composition<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| COMPOSITION_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Narration JSON path for a composition with the default suffix
    pub fn narration_path_for<P: AsRef<Path>>(composition: P) -> PathBuf {
        Self::narration_path_with_suffix(composition, NARRATION_SUFFIX)
    }

    /// Narration JSON path for a composition.
    ///
    /// `Intro.tsx` becomes `Intro<suffix>` in the same directory; other
    /// extensions are replaced the same way.
    pub fn narration_path_with_suffix<P: AsRef<Path>>(composition: P, suffix: &str) -> PathBuf {
        let composition = composition.as_ref();
        let stem = composition.file_stem().unwrap_or_default().to_string_lossy();
        let parent = composition.parent().unwrap_or_else(|| Path::new(""));
        parent.join(format!("{}{}", stem, suffix))
    }

    /// Composition name behind a narration file (`Intro.narration.json` -> `Intro`)
    pub fn composition_name<P: AsRef<Path>>(narration_path: P) -> String {
        Self::composition_name_with_suffix(narration_path, NARRATION_SUFFIX)
    }

    /// Composition name behind a narration file written with `suffix`.
    ///
    /// Falls back to the file stem when the name does not end in `suffix`.
    pub fn composition_name_with_suffix<P: AsRef<Path>>(narration_path: P, suffix: &str) -> String {
        let narration_path = narration_path.as_ref();
        let file_name = narration_path.file_name().unwrap_or_default().to_string_lossy();
        match file_name.strip_suffix(suffix) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => narration_path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
        }
    }

    /// `<output_dir>/<composition>-voiceover.mp3`
    pub fn voiceover_audio_path<P: AsRef<Path>>(output_dir: P, composition_name: &str) -> PathBuf {
        output_dir.as_ref().join(format!("{}-voiceover.mp3", composition_name))
    }

    /// Sync manifest written next to an audio file.
    ///
    /// `a.mp3` / `a.wav` become `a.sync.json`; any other name gets
    /// `.sync.json` appended.
    pub fn sync_manifest_path_for<P: AsRef<Path>>(audio_path: P) -> PathBuf {
        let audio_path = audio_path.as_ref();
        let parent = audio_path.parent().unwrap_or_else(|| Path::new(""));
        let is_audio = audio_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| ext == "mp3" || ext == "wav");
        let base = if is_audio {
            audio_path.file_stem()
        } else {
            audio_path.file_name()
        };
        parent.join(format!("{}.sync.json", base.unwrap_or_default().to_string_lossy()))
    }

    /// Find composition sources below a directory, sorted by path
    pub fn find_compositions<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_composition(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
