use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: Timed caption store (SRT parsing and writing)

// @const: SRT timestamp line regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("static timestamp regex is valid")
});

// @struct: Single caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Caption text, may span several lines
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @creates: Validated caption
    // @validates: end is not before start
    pub fn new_validated(
        seq_num: usize,
        start_time_ms: u64,
        end_time_ms: u64,
        text: String,
    ) -> Result<Self, SubtitleError> {
        if end_time_ms < start_time_ms {
            return Err(SubtitleError::InvalidTimeRange {
                seq_num,
                start_ms: start_time_ms,
                end_ms: end_time_ms,
            });
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: text.trim().to_string(),
        })
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds
    ///
    /// The value is `hours*3600 + minutes*60 + seconds + millis/1000` seconds,
    /// computed in integer milliseconds so no rounding can occur.
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());

        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
        let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;
        let seconds: u64 = parts[2].parse().map_err(|_| invalid())?;
        let millis: u64 = parts[3].parse().map_err(|_| invalid())?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(invalid());
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Offset of the caption from the start of the track
    pub fn start_offset(&self) -> Duration {
        Duration::from_millis(self.start_time_ms)
    }

    /// How long the caption is displayed
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.end_time_ms.saturating_sub(self.start_time_ms))
    }

    /// True when there is nothing to speak
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered caption track for one language
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// File the captions were read from or will be written to
    pub source_file: PathBuf,

    /// Captions in source order
    pub entries: Vec<SubtitleEntry>,

    /// Language of the caption text
    pub language: String,
}

impl SubtitleCollection {
    /// Create a new, empty collection
    pub fn new(source_file: PathBuf, language: String) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
            language,
        }
    }

    /// Read and parse an SRT file
    pub fn from_srt_file<P: AsRef<Path>>(path: P, language: &str) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let entries = Self::parse_srt_string(&content)?;
        debug!("Loaded {} captions from {}", entries.len(), path.display());

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
            language: language.to_string(),
        })
    }

    /// Copy of this track with new caption texts, timings untouched
    pub fn with_texts(&self, texts: Vec<String>, language: &str) -> Self {
        let entries = self
            .entries
            .iter()
            .zip(texts)
            .map(|(entry, text)| SubtitleEntry { text, ..entry.clone() })
            .collect();

        SubtitleCollection {
            source_file: self.source_file.clone(),
            entries,
            language: language.to_string(),
        }
    }

    /// Captions that will produce speech
    pub fn speakable_entries(&self) -> impl Iterator<Item = &SubtitleEntry> {
        self.entries.iter().filter(|entry| !entry.is_blank())
    }

    /// Render the whole track as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write subtitles to an SRT file, creating parent directories
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, self.to_srt_string())?;
        Ok(())
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// Blocks are `index`, `start --> end`, zero or more text lines, blank line.
    /// Order and numbering are kept exactly as found. Blocks with an
    /// end before their start are skipped with a warning; blocks without
    /// text are kept so that timings survive a write/parse round trip.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let content = content.trim_start_matches('\u{feff}');
        let mut entries = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text: Vec<&str> = Vec::new();

        let mut finish = |seq_num: usize, (start_ms, end_ms): (u64, u64), lines: &mut Vec<&str>| {
            match SubtitleEntry::new_validated(seq_num, start_ms, end_ms, lines.join("\n")) {
                Ok(entry) => {
                    if entry.start_time_ms == entry.end_time_ms {
                        warn!("Caption {} has zero duration", seq_num);
                    }
                    entries.push(entry);
                }
                Err(e) => warn!("Skipping invalid subtitle entry {}: {}", seq_num, e),
            }
            lines.clear();
        };

        for (line_number, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
                    finish(seq_num, times, &mut current_text);
                    current_seq_num = None;
                    current_times = None;
                }
                continue;
            }

            match (current_seq_num, current_times) {
                (None, _) => match trimmed.parse::<usize>() {
                    Ok(num) => current_seq_num = Some(num),
                    Err(_) => warn!(
                        "Unexpected text at line {} before sequence number: {}",
                        line_number + 1,
                        trimmed
                    ),
                },
                (Some(seq_num), None) => match Self::parse_timing_line(trimmed) {
                    Some(times) => current_times = Some(times),
                    None => {
                        warn!("Invalid timestamp line for caption {} at line {}: {}", seq_num, line_number + 1, trimmed);
                        current_seq_num = None;
                    }
                },
                (Some(_), Some(_)) => current_text.push(trimmed),
            }
        }

        if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
            finish(seq_num, times, &mut current_text);
        }

        if entries.is_empty() {
            return Err(SubtitleError::Empty);
        }

        let out_of_order = entries
            .windows(2)
            .filter(|pair| pair[1].start_time_ms < pair[0].start_time_ms)
            .count();
        if out_of_order > 0 {
            warn!("Found {} captions starting before their predecessor", out_of_order);
        }

        let misnumbered = Self::non_increasing_indices(&entries);
        if !misnumbered.is_empty() {
            warn!(
                "Caption numbers must increase, found repeated or decreasing numbers: {:?}",
                misnumbered
            );
        }

        Ok(entries)
    }

    /// Sequence numbers not greater than the one before them
    pub fn non_increasing_indices(entries: &[SubtitleEntry]) -> Vec<usize> {
        entries
            .windows(2)
            .filter(|pair| pair[1].seq_num <= pair[0].seq_num)
            .map(|pair| pair[1].seq_num)
            .collect()
    }

    /// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm` into start and end milliseconds
    fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
        let caps = TIMESTAMP_REGEX.captures(line)?;
        let component = |idx: usize| -> Option<u64> { caps.get(idx)?.as_str().parse().ok() };

        let start = (component(1)? * 3600 + component(2)? * 60 + component(3)?) * 1000 + component(4)?;
        let end = (component(5)? * 3600 + component(6)? * 60 + component(7)?) * 1000 + component(8)?;
        Some((start, end))
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
