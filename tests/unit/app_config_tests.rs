/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use dubweave::app_config::{Config, LogLevel, SpeechConfig};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_languages, vec!["es", "fr"]);
    assert_eq!(config.output_dir, PathBuf::from("outputs"));
    assert_eq!(config.max_video_duration_secs, 600);

    assert_eq!(config.speech.max_attempts, 3);
    assert_eq!(config.speech.truncate_threshold_chars, 100);
    assert_eq!(config.speech.retry_backoff(), Duration::from_secs(1));
    assert_eq!(config.speech.concurrent_requests, 1);

    assert_eq!(config.media.sample_rate, 44100);
    assert_eq!(config.media.channels, 2);
    assert_eq!(config.media.subtitle_font_size, 24);
    assert_eq!(config.media.container_ext, "mp4");
    assert_eq!(config.pipeline.language_concurrency, 1);

    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Unsupported source language
    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    // No targets
    config.target_languages.clear();
    assert!(config.validate().is_err());

    // One unsupported target poisons the list
    config.target_languages = vec!["es".to_string(), "tlh".to_string()];
    assert!(config.validate().is_err());
    config.target_languages = vec!["es".to_string()];

    config.speech.max_attempts = 0;
    assert!(config.validate().is_err());
    config.speech.max_attempts = 3;

    config.pipeline.language_concurrency = 0;
    assert!(config.validate().is_err());
    config.pipeline.language_concurrency = 2;

    assert!(config.validate().is_ok());
}

/// Test that transcription needs an API key
#[test]
fn test_validate_transcription_withMissingKey_shouldFail() {
    let mut config = Config::default();
    assert!(config.validate_transcription().is_err());

    config.transcription.api_key = "secret".to_string();
    assert!(config.validate_transcription().is_ok());
}

/// Test loading a partial JSON configuration
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "target_languages": ["de", "ja"],
        "speech": { "max_attempts": 5, "voices": { "de": "de-AT" } },
        "media": { "ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg" },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_languages, vec!["de", "ja"]);
    assert_eq!(config.speech.max_attempts, 5);
    assert_eq!(config.speech.truncate_threshold_chars, 100);
    assert_eq!(config.media.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(config.media.ffprobe_path, "ffprobe");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test the serialized form loads back unchanged
#[test]
fn test_serialize_withDefaultConfig_shouldReloadSameValues() -> Result<()> {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config)?;
    let reloaded: Config = serde_json::from_str(&json)?;

    assert_eq!(reloaded.target_languages, config.target_languages);
    assert_eq!(reloaded.speech.slow_languages, config.speech.slow_languages);
    assert_eq!(reloaded.media.audio_bitrate, config.media.audio_bitrate);
    Ok(())
}

/// Test voice selection order
#[test]
fn test_voice_for_withOverridesAndTable_shouldPreferOverride() {
    let mut speech = SpeechConfig::default();
    speech.voices.insert("es".to_string(), "es-MX".to_string());

    assert_eq!(speech.voice_for("es"), "es-MX");
    assert_eq!(speech.voice_for("fr"), "fr-FR");
    assert_eq!(speech.voice_for("sv"), "sv");
}

/// Test the reduced-rate language list
#[test]
fn test_is_slow_language_withDefaultList_shouldMatchCaseInsensitively() {
    let speech = SpeechConfig::default();

    assert!(speech.is_slow_language("ja"));
    assert!(speech.is_slow_language("zh-cn"));
    assert!(speech.is_slow_language("AR"));
    assert!(!speech.is_slow_language("es"));
}
