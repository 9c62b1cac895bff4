/*!
 * Mock provider implementations for testing.
 *
 * This module provides scripted services that simulate different behaviors:
 * - `MockSpeechProvider::working()` - Always returns audio bytes
 * - `MockSpeechProvider::failing()` - Always fails with an error
 * - `MockSpeechProvider::new(MockSpeechBehavior::FailFirst { .. })` - Recovers after N failures
 *
 * Every request is recorded so tests can assert on what was sent.
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{SpeechProvider, SpeechRequest, TextTranslator, Transcriber};

/// Behavior mode for the mock speech provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockSpeechBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an API error
    Failing,
    /// Succeeds with an empty body
    Empty,
    /// Fails the first `failures` calls, then succeeds
    FailFirst { failures: usize },
    /// Fails every request whose text contains the marker
    FailWhenContains(String),
}

/// Mock text-to-speech provider
#[derive(Debug)]
pub struct MockSpeechProvider {
    behavior: MockSpeechBehavior,
    request_count: AtomicUsize,
    requests: Arc<Mutex<Vec<SpeechRequest>>>,
}

impl MockSpeechProvider {
    pub fn new(behavior: MockSpeechBehavior) -> Self {
        Self {
            behavior,
            request_count: AtomicUsize::new(0),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockSpeechBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockSpeechBehavior::Failing)
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn simulated_failure(call: usize) -> ProviderError {
        ProviderError::ApiError {
            status_code: 503,
            message: format!("simulated TTS failure on call {}", call),
        }
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());

        let audio = Bytes::from(format!("ID3mock-audio:{}", request.text));
        match &self.behavior {
            MockSpeechBehavior::Working => Ok(audio),
            MockSpeechBehavior::Failing => Err(Self::simulated_failure(call)),
            MockSpeechBehavior::Empty => Ok(Bytes::new()),
            MockSpeechBehavior::FailFirst { failures } => {
                if call <= *failures {
                    Err(Self::simulated_failure(call))
                } else {
                    Ok(audio)
                }
            }
            MockSpeechBehavior::FailWhenContains(marker) => {
                if request.text.contains(marker.as_str()) {
                    Err(Self::simulated_failure(call))
                } else {
                    Ok(audio)
                }
            }
        }
    }

    fn audio_extension(&self) -> &str {
        "mp3"
    }
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockTranslatorBehavior {
    /// Returns `[target] text`
    Working,
    /// Always fails
    Failing,
    /// Fails every request whose text contains the marker
    FailWhenContains(String),
}

/// Mock text translator
#[derive(Debug)]
pub struct MockTranslator {
    behavior: MockTranslatorBehavior,
    request_count: AtomicUsize,
}

impl MockTranslator {
    pub fn new(behavior: MockTranslatorBehavior) -> Self {
        Self {
            behavior,
            request_count: AtomicUsize::new(0),
        }
    }

    pub fn working() -> Self {
        Self::new(MockTranslatorBehavior::Working)
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        let fail = match &self.behavior {
            MockTranslatorBehavior::Working => false,
            MockTranslatorBehavior::Failing => true,
            MockTranslatorBehavior::FailWhenContains(marker) => text.contains(marker.as_str()),
        };

        if fail {
            Err(ProviderError::ConnectionError("simulated translation failure".to_string()))
        } else {
            Ok(format!("[{}] {}", target_language, text))
        }
    }
}

/// Mock transcriber returning fixed SRT content
#[derive(Debug)]
pub struct MockTranscriber {
    srt: Option<String>,
    request_count: AtomicUsize,
}

impl MockTranscriber {
    /// Transcriber that always returns `srt`
    pub fn returning(srt: &str) -> Self {
        Self {
            srt: Some(srt.to_string()),
            request_count: AtomicUsize::new(0),
        }
    }

    /// Transcriber that always fails
    pub fn failing() -> Self {
        Self {
            srt: None,
            request_count: AtomicUsize::new(0),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio: &Path, _language: &str) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if !audio.is_file() {
            return Err(ProviderError::RequestFailed(format!(
                "Audio file not found: {}",
                audio.display()
            )));
        }

        self.srt
            .clone()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 500,
                message: "simulated transcription failure".to_string(),
            })
    }
}
