use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::run_log::RunLog;

// @module: File and directory utilities

// @const: Extensions treated as video input in folder mode
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @checks: File exists and has at least one byte
    pub fn is_non_empty_file<P: AsRef<Path>>(path: P) -> bool {
        fs::metadata(path.as_ref())
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    // @returns: File size in bytes, 0 when missing
    pub fn file_size<P: AsRef<Path>>(path: P) -> u64 {
        fs::metadata(path.as_ref()).map(|meta| meta.len()).unwrap_or(0)
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

    // @returns: File stem of a video, `video` when it has none
    pub fn video_stem<P: AsRef<Path>>(video: P) -> String {
        video
            .as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string())
    }

    // @generates: `{video_stem}_translated_{lang}.{ext}` inside output_dir
    pub fn translated_video_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        video: P1,
        output_dir: P2,
        language: &str,
        extension: &str,
    ) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{}_translated_{}.{}", Self::video_stem(video), language, extension))
    }

    // @generates: `{video_stem}_subtitles_{lang}.srt` inside output_dir
    pub fn subtitle_path<P1: AsRef<Path>, P2: AsRef<Path>>(video: P1, output_dir: P2, language: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{}_subtitles_{}.srt", Self::video_stem(video), language))
    }

    // @generates: `{video_stem}_translated_audio_{lang}.wav` inside output_dir
    pub fn mixed_audio_path<P1: AsRef<Path>, P2: AsRef<Path>>(video: P1, output_dir: P2, language: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{}_translated_audio_{}.wav", Self::video_stem(video), language))
    }

    /// Find video files (by extension) below a directory
    pub fn find_video_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_video_extension(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Whether the extension is one of the known video containers
    pub fn has_video_extension<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                VIDEO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Append a string to a file, creating it if needed
    pub fn append_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to append to file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

/// Temporary working directory owned by one pipeline stage.
///
/// The directory is removed by `cleanup()` or, failing that, on drop. Removal
/// is best effort: a failure is logged as a warning and never propagated.
#[derive(Debug)]
pub struct ScratchDir {
    inner: Option<TempDir>,
    path: PathBuf,
    log: RunLog,
}

impl ScratchDir {
    /// Create `<parent>/<prefix>XXXXXX`, creating `parent` if needed
    pub fn create_in<P: AsRef<Path>>(parent: P, prefix: &str, log: &RunLog) -> Result<Self> {
        let parent = parent.as_ref();
        FileManager::ensure_dir(parent)?;

        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .with_context(|| format!("Failed to create scratch directory in {}", parent.display()))?;
        let path = dir.path().to_path_buf();
        log.debug(format!("Created temporary directory: {}", path.display()));

        Ok(Self {
            inner: Some(dir),
            path,
            log: log.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the directory
    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory now
    pub fn cleanup(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(dir) = self.inner.take() {
            match dir.close() {
                Ok(()) => self.log.debug(format!("Cleaned up temporary directory: {}", self.path.display())),
                Err(e) => self.log.warn(format!(
                    "Failed to clean up temp directory {}: {}",
                    self.path.display(),
                    e
                )),
            }
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.remove();
    }
}
