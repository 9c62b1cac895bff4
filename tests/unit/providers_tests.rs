/*!
 * Tests for service clients and their scripted counterparts
 */

use anyhow::Result;
use std::path::Path;

use crate::common;
use dubweave::app_config::{SpeechConfig, TranscriptionConfig};
use dubweave::errors::ProviderError;
use dubweave::providers::assemblyai::AssemblyAi;
use dubweave::providers::google_tts::{split_for_tts, GoogleTts, MAX_CHUNK_CHARS};
use dubweave::providers::mock::{MockSpeechBehavior, MockSpeechProvider, MockTranscriber};
use dubweave::providers::{SpeechProvider, SpeechRequest, Transcriber};

fn request(text: &str) -> SpeechRequest {
    SpeechRequest {
        text: text.to_string(),
        language: "es".to_string(),
        voice: "es-ES".to_string(),
        slow: false,
    }
}

/// Test the scripted recovery after a number of failures
#[test]
fn test_mock_speech_withFailFirst_shouldRecoverAfterFailures() {
    let provider = MockSpeechProvider::new(MockSpeechBehavior::FailFirst { failures: 2 });

    let results: Vec<Result<_, ProviderError>> = (0..3)
        .map(|_| tokio_test::block_on(provider.synthesize(&request("Hola"))))
        .collect();

    assert!(results[0].is_err());
    assert!(results[1].is_err());
    assert!(results[2].as_ref().is_ok_and(|audio| !audio.is_empty()));
    assert_eq!(provider.request_count(), 3);
    assert_eq!(provider.audio_extension(), "mp3");
}

/// Test the scripted transcriber checks its input
#[test]
fn test_mock_transcriber_withMissingAudio_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcriber = MockTranscriber::returning(common::THREE_CAPTION_SRT);

    let missing = tokio_test::block_on(transcriber.transcribe(Path::new("/no/such/audio.wav"), "en"));
    assert!(matches!(missing, Err(ProviderError::RequestFailed(_))));

    let audio = common::create_test_file(temp_dir.path(), "source_audio.wav", "RIFF")?;
    let srt = tokio_test::block_on(transcriber.transcribe(&audio, "en"))?;
    assert_eq!(srt, common::THREE_CAPTION_SRT);
    assert_eq!(transcriber.request_count(), 2);
    Ok(())
}

/// Test the real clients can be built from default settings
#[test]
fn test_http_clients_withDefaultConfig_shouldConstruct() {
    let tts = GoogleTts::new(&SpeechConfig::default());
    assert_eq!(tts.audio_extension(), "mp3");

    let _transcriber = AssemblyAi::new(&TranscriptionConfig::default());
}

/// Test long captions are split below the request limit
#[test]
fn test_split_for_tts_withLongCaption_shouldKeepEveryWord() {
    let text = "una frase bastante larga que se repite ".repeat(10);

    let chunks = split_for_tts(&text, MAX_CHUNK_CHARS);

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|chunk| chunk.chars().count() <= MAX_CHUNK_CHARS));
    assert_eq!(chunks.join(" "), text.trim());
}
