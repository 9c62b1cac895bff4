/*!
 * Tests for speech clip synthesis
 */

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::common;
use dubweave::app_config::SpeechConfig;
use dubweave::providers::mock::{MockSpeechBehavior, MockSpeechProvider};
use dubweave::run_log::RunLog;
use dubweave::speech::{SpeechSynthesizer, SynthesisStatus};
use dubweave::subtitle_processor::{SubtitleCollection, SubtitleEntry};

fn fast_config() -> SpeechConfig {
    SpeechConfig {
        retry_backoff_ms: 0,
        ..SpeechConfig::default()
    }
}

fn track(entries: Vec<SubtitleEntry>) -> SubtitleCollection {
    let mut collection = SubtitleCollection::new(PathBuf::from("talk.mp4"), "es".to_string());
    collection.entries = entries;
    collection
}

fn three_captions() -> Result<SubtitleCollection> {
    Ok(track(SubtitleCollection::parse_srt_string(common::THREE_CAPTION_SRT)?))
}

/// Test that blank captions produce no clip and others keep their offsets
#[tokio::test]
async fn test_synthesize_track_withEmptyCaption_shouldSkipItAndKeepOffsets() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = Arc::new(MockSpeechProvider::working());
    let synthesizer = SpeechSynthesizer::new(provider.clone(), fast_config(), RunLog::new());

    let outcome = synthesizer
        .synthesize_track(&three_captions()?, "es", temp_dir.path())
        .await;

    assert_eq!(outcome.status, SynthesisStatus::FullySynthesized);
    assert_eq!(outcome.clips.len(), 2);
    assert_eq!(outcome.clips[0].start_offset, Duration::ZERO);
    assert_eq!(outcome.clips[1].start_offset, Duration::from_secs(5));
    assert_eq!(outcome.clips[0].path, temp_dir.path().join("chunk_0000.mp3"));
    assert_eq!(outcome.clips[1].path, temp_dir.path().join("chunk_0001.mp3"));
    assert!(outcome.clips.iter().all(|clip| clip.path.is_file()));
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

/// Test that one caption failing every retry does not affect the others
#[tokio::test]
async fn test_synthesize_track_withOneCaptionAlwaysFailing_shouldDegradePartially() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = Arc::new(MockSpeechProvider::new(MockSpeechBehavior::FailWhenContains(
        "World".to_string(),
    )));
    let log = RunLog::new();
    let synthesizer = SpeechSynthesizer::new(provider.clone(), fast_config(), log.clone());

    let outcome = synthesizer
        .synthesize_track(&three_captions()?, "es", temp_dir.path())
        .await;

    assert!(matches!(outcome.status, SynthesisStatus::PartiallyDegraded(_)));
    assert_eq!(outcome.clips.len(), 1);
    assert_eq!(outcome.clips[0].caption_index, 0);
    assert_eq!(outcome.failed_captions, vec![1]);
    // one call for "Hello", three attempts for "World"
    assert_eq!(provider.request_count(), 4);
    assert!(log.contains("after 3 attempts"));
    Ok(())
}

/// Test that a provider failing everything yields a silent outcome
#[tokio::test]
async fn test_synthesize_track_withFailingProvider_shouldBeFullySilent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let synthesizer = SpeechSynthesizer::new(Arc::new(MockSpeechProvider::failing()), fast_config(), RunLog::new());

    let outcome = synthesizer
        .synthesize_track(&three_captions()?, "es", temp_dir.path())
        .await;

    assert_eq!(outcome.status, SynthesisStatus::FullySilent);
    assert!(outcome.clips.is_empty());
    assert_eq!(outcome.failed_captions, vec![0, 1]);
    Ok(())
}

/// Test that empty audio payloads count as failed attempts
#[tokio::test]
async fn test_synthesize_caption_withEmptyAudio_shouldRetryAndSkip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = Arc::new(MockSpeechProvider::new(MockSpeechBehavior::Empty));
    let synthesizer = SpeechSynthesizer::new(provider.clone(), fast_config(), RunLog::new());
    let entry = SubtitleEntry::new(1, 0, 1000, "Hola".to_string());

    let clip = synthesizer.synthesize_caption(0, &entry, "es", temp_dir.path()).await;

    assert!(clip.is_none());
    assert_eq!(provider.request_count(), 3);
    Ok(())
}

/// Test the shortened, slow final attempt for long captions
#[tokio::test]
async fn test_synthesize_caption_withLongTextFailingTwice_shouldShortenFinalAttempt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = Arc::new(MockSpeechProvider::new(MockSpeechBehavior::FailFirst { failures: 2 }));
    let synthesizer = SpeechSynthesizer::new(provider.clone(), fast_config(), RunLog::new());
    let text = "palabra ".repeat(30);
    let entry = SubtitleEntry::new(1, 4000, 9000, text.trim().to_string());

    let clip = synthesizer
        .synthesize_caption(3, &entry, "es", temp_dir.path())
        .await
        .expect("final attempt succeeds");

    assert_eq!(clip.start_offset, Duration::from_secs(4));
    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert!(!requests[0].slow && !requests[1].slow);
    assert_eq!(requests[1].text, requests[0].text);
    assert!(requests[2].slow);
    assert_eq!(requests[2].text.chars().count(), 103);
    assert!(requests[2].text.ends_with("..."));
    Ok(())
}

/// Test slow-rate languages and voice selection
#[tokio::test]
async fn test_synthesize_caption_withSlowLanguage_shouldRequestSlowRateAndMappedVoice() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = Arc::new(MockSpeechProvider::working());
    let synthesizer = SpeechSynthesizer::new(provider.clone(), fast_config(), RunLog::new());
    let entry = SubtitleEntry::new(1, 0, 1000, "こんにちは".to_string());

    synthesizer.synthesize_caption(0, &entry, "ja", temp_dir.path()).await;
    synthesizer.synthesize_caption(1, &entry, "sv", temp_dir.path()).await;

    let requests = provider.requests();
    assert!(requests[0].slow);
    assert_eq!(requests[0].voice, "ja-JP");
    assert!(!requests[1].slow);
    assert_eq!(requests[1].voice, "sv");
    Ok(())
}

/// Test bounded parallel fan-out keeps clip order
#[tokio::test]
async fn test_synthesize_track_withParallelRequests_shouldOrderClipsByCaption() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = SpeechConfig {
        concurrent_requests: 4,
        ..fast_config()
    };
    let entries = (0..10)
        .map(|i| SubtitleEntry::new(i + 1, (i as u64) * 1000, (i as u64) * 1000 + 500, format!("line {}", i)))
        .collect();
    let synthesizer = SpeechSynthesizer::new(Arc::new(MockSpeechProvider::working()), config, RunLog::new());

    let outcome = synthesizer.synthesize_track(&track(entries), "fr", temp_dir.path()).await;

    let indices: Vec<usize> = outcome.clips.iter().map(|clip| clip.caption_index).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
    Ok(())
}
