/*!
 * Remote service clients.
 *
 * This module contains the interfaces the pipeline uses to reach external
 * services, plus one HTTP implementation of each:
 * - Speech synthesis: Google Translate text-to-speech
 * - Transcription: AssemblyAI
 * - Text translation: Google Translate
 *
 * `mock` holds scripted implementations used by tests.
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::ProviderError;

/// One text-to-speech call
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Target language code
    pub language: String,
    /// Voice identifier sent to the service
    pub voice: String,
    /// Reduced speaking rate
    pub slow: bool,
}

/// Text-to-speech service
///
/// Implementations return the encoded audio of the whole request. An empty
/// body is treated as a failure by callers.
#[async_trait]
pub trait SpeechProvider: Send + Sync + Debug {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, ProviderError>;

    /// Container extension of the returned audio, e.g. "mp3"
    fn audio_extension(&self) -> &str;
}

/// Speech-to-text service producing SRT captions
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    /// Transcribe an audio file and return the captions as SRT text
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<String, ProviderError>;
}

/// Plain text translation service
#[async_trait]
pub trait TextTranslator: Send + Sync + Debug {
    async fn translate(&self, text: &str, source_language: &str, target_language: &str)
        -> Result<String, ProviderError>;
}

/// Map a non-success HTTP response to an API error, reading the body for context
pub(crate) async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(500).collect();

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(ProviderError::AuthenticationError(message));
    }

    Err(ProviderError::ApiError {
        status_code: status.as_u16(),
        message,
    })
}

pub mod assemblyai;
pub mod google_translate;
pub mod google_tts;
pub mod mock;
