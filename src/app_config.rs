/*!
 * Application configuration.
 *
 * Loading, validating and defaulting of the `conf.json` settings.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::PathBuf;
use std::time::Duration;

use crate::language_utils;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code of the spoken audio
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language codes, processed in this order
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Root directory for final videos and per-language artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum accepted source video duration in seconds
    #[serde(default = "default_max_video_duration_secs")]
    pub max_video_duration_secs: u64,

    /// Maximum accepted source video size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Speech synthesis settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Media toolchain settings
    #[serde(default)]
    pub media: MediaConfig,

    /// Transcription service settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Caption translation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Pipeline scheduling settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Text-to-speech settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    // @field: TTS service URL
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    // @field: Attempts per caption, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    // @field: Fixed wait between attempts
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // @field: Captions longer than this are shortened before the last attempt
    #[serde(default = "default_truncate_threshold_chars")]
    pub truncate_threshold_chars: usize,

    // @field: Languages always synthesized at the reduced rate
    #[serde(default = "default_slow_languages")]
    pub slow_languages: Vec<String>,

    // @field: Language code -> voice identifier overrides
    #[serde(default)]
    pub voices: BTreeMap<String, String>,

    // @field: Captions synthesized in parallel per language
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tts_endpoint(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            truncate_threshold_chars: default_truncate_threshold_chars(),
            slow_languages: default_slow_languages(),
            voices: BTreeMap::new(),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SpeechConfig {
    /// Wait between two synthesis attempts
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Whether a language is on the reduced-rate list
    pub fn is_slow_language(&self, language: &str) -> bool {
        self.slow_languages
            .iter()
            .any(|slow| slow.eq_ignore_ascii_case(language))
    }

    /// Voice for a language: explicit override, then the built-in table, then the raw code
    pub fn voice_for(&self, language: &str) -> String {
        if let Some(voice) = self.voices.get(language) {
            return voice.clone();
        }
        language_utils::default_voice(language)
            .map(str::to_string)
            .unwrap_or_else(|| language.to_string())
    }
}

/// ffmpeg / ffprobe settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// ffprobe executable
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Sample rate of extracted, silent and mixed audio
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count of extracted and mixed audio
    #[serde(default = "default_channels")]
    pub channels: u8,

    /// PCM codec of intermediate audio
    #[serde(default = "default_pcm_codec")]
    pub pcm_codec: String,

    /// Font size of burned-in subtitles
    #[serde(default = "default_subtitle_font_size")]
    pub subtitle_font_size: u32,

    /// Video codec used when subtitles are burned in
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec of the final container
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate of the final container
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Extension of the final container
    #[serde(default = "default_container_ext")]
    pub container_ext: String,

    /// Timeout for one tool invocation in seconds
    #[serde(default = "default_media_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            pcm_codec: default_pcm_codec(),
            subtitle_font_size: default_subtitle_font_size(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            container_ext: default_container_ext(),
            timeout_secs: default_media_timeout_secs(),
        }
    }
}

impl MediaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Speech recognition service settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_transcription_endpoint")]
    pub endpoint: String,

    // @field: Interval between status polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    // @field: Give up on a transcript after this many seconds
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_transcription_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

/// Caption translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    // @field: Service URL
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    /// Attempts per caption, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translation_endpoint(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Scheduling of target languages
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Languages processed at the same time; 1 keeps the run sequential
    #[serde(default = "default_language_concurrency")]
    pub language_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language_concurrency: default_language_concurrency(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_languages() -> Vec<String> {
    vec!["es".to_string(), "fr".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_max_video_duration_secs() -> u64 {
    600 // 10 minutes
}

fn default_max_upload_bytes() -> u64 {
    500 * 1024 * 1024
}

fn default_tts_endpoint() -> String {
    "https://translate.google.com/translate_tts".to_string()
}

fn default_transcription_endpoint() -> String {
    "https://api.assemblyai.com".to_string()
}

fn default_translation_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_truncate_threshold_chars() -> usize {
    100
}

fn default_slow_languages() -> Vec<String> {
    ["hi", "ja", "zh-CN", "ar"].iter().map(|s| s.to_string()).collect()
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u8 {
    2
}

fn default_pcm_codec() -> String {
    "pcm_s16le".to_string()
}

fn default_subtitle_font_size() -> u32 {
    24
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_container_ext() -> String {
    "mp4".to_string()
}

fn default_media_timeout_secs() -> u64 {
    1800
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_transcription_timeout_secs() -> u64 {
    900
}

fn default_language_concurrency() -> usize {
    1
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::ensure_supported(&self.source_language)?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for language in &self.target_languages {
            language_utils::ensure_supported(language)?;
        }

        if self.speech.max_attempts == 0 {
            return Err(anyhow!("speech.max_attempts must be at least 1"));
        }
        if self.translation.max_attempts == 0 {
            return Err(anyhow!("translation.max_attempts must be at least 1"));
        }
        if self.speech.concurrent_requests == 0 {
            return Err(anyhow!("speech.concurrent_requests must be at least 1"));
        }
        if self.pipeline.language_concurrency == 0 {
            return Err(anyhow!("pipeline.language_concurrency must be at least 1"));
        }
        if self.media.channels == 0 || self.media.sample_rate == 0 {
            return Err(anyhow!("media.sample_rate and media.channels must be positive"));
        }
        if self.media.container_ext.trim().is_empty() {
            return Err(anyhow!("media.container_ext cannot be empty"));
        }

        Ok(())
    }

    /// Transcription needs an API key; runs that bring their own captions do not
    pub fn validate_transcription(&self) -> Result<()> {
        if self.transcription.api_key.trim().is_empty() {
            return Err(anyhow!(
                "transcription.api_key is required unless a subtitle file is supplied with --subtitles"
            ));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_languages: default_target_languages(),
            output_dir: default_output_dir(),
            max_video_duration_secs: default_max_video_duration_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            speech: SpeechConfig::default(),
            media: MediaConfig::default(),
            transcription: TranscriptionConfig::default(),
            translation: TranslationConfig::default(),
            pipeline: PipelineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
