/*!
 * Tests for caption translation
 */

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::common;
use dubweave::app_config::TranslationConfig;
use dubweave::providers::mock::{MockTranslator, MockTranslatorBehavior};
use dubweave::run_log::RunLog;
use dubweave::subtitle_processor::SubtitleCollection;
use dubweave::subtitle_translator::SubtitleTranslator;

fn source_captions() -> Result<SubtitleCollection> {
    let mut captions = SubtitleCollection::new(PathBuf::from("talk.mp4"), "en".to_string());
    captions.entries = SubtitleCollection::parse_srt_string(common::THREE_CAPTION_SRT)?;
    Ok(captions)
}

fn fast_config() -> TranslationConfig {
    TranslationConfig {
        retry_backoff_ms: 0,
        ..TranslationConfig::default()
    }
}

/// Test texts are translated and timings untouched
#[tokio::test]
async fn test_translate_collection_withWorkingTranslator_shouldKeepTimings() -> Result<()> {
    let translator = Arc::new(MockTranslator::working());
    let captions = source_captions()?;

    let translated = SubtitleTranslator::new(translator.clone(), fast_config(), RunLog::new())
        .translate_collection(&captions, "en", "es")
        .await;

    assert_eq!(translated.language, "es");
    assert_eq!(translated.entries.len(), 3);
    assert_eq!(translated.entries[0].text, "[es] Hello");
    assert_eq!(translated.entries[1].start_time_ms, 5000);
    assert_eq!(translated.entries[1].end_time_ms, 7000);
    // the blank caption is never sent
    assert!(translated.entries[2].is_blank());
    assert_eq!(translator.request_count(), 2);
    Ok(())
}

/// Test a caption that keeps failing retains its source text
#[tokio::test]
async fn test_translate_collection_withFailingCaption_shouldKeepOriginalText() -> Result<()> {
    let translator = Arc::new(MockTranslator::new(MockTranslatorBehavior::FailWhenContains(
        "World".to_string(),
    )));
    let log = RunLog::new();

    let translated = SubtitleTranslator::new(translator.clone(), fast_config(), log.clone())
        .translate_collection(&source_captions()?, "en", "fr")
        .await;

    assert_eq!(translated.entries[0].text, "[fr] Hello");
    assert_eq!(translated.entries[1].text, "World");
    // one call for "Hello", every attempt for "World"
    assert_eq!(translator.request_count(), 4);
    assert!(log.contains("using original text"));
    assert!(log.contains("1 captions kept their original text"));
    Ok(())
}
