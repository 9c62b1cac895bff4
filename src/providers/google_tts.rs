/*!
 * Google Translate text-to-speech client.
 *
 * The endpoint accepts short inputs only, so longer texts are split on word
 * boundaries and the MP3 fragments are concatenated. MP3 frames are
 * self-delimiting, which makes byte concatenation a valid stream.
 */

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::app_config::SpeechConfig;
use crate::errors::ProviderError;
use crate::providers::{SpeechProvider, SpeechRequest, error_for_status};

// @const: Longest text sent in one request
pub const MAX_CHUNK_CHARS: usize = 100;

// @const: Speaking rates understood by the endpoint
const NORMAL_SPEED: &str = "1";
const SLOW_SPEED: &str = "0.3";

/// Google Translate TTS client
#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: Client,
    endpoint: String,
}

impl GoogleTts {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
        }
    }

    fn chunk_url(&self, request: &SpeechRequest, chunk: &str, idx: usize, total: usize) -> Result<Url, ProviderError> {
        let speed = if request.slow { SLOW_SPEED } else { NORMAL_SPEED };
        let textlen = chunk.chars().count().to_string();
        let idx = idx.to_string();
        let total = total.to_string();

        Url::parse_with_params(
            &self.endpoint,
            &[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", request.voice.as_str()),
                ("q", chunk),
                ("ttsspeed", speed),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid TTS endpoint: {}", e)))
    }
}

/// Split text into pieces of at most `max_chars` characters, breaking on
/// whitespace. Words longer than the limit are cut.
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars && current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl SpeechProvider for GoogleTts {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes, ProviderError> {
        let chunks = split_for_tts(&request.text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ProviderError::EmptyResponse("No text to speak".to_string()));
        }

        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let url = self.chunk_url(request, chunk, idx, chunks.len())?;
            let response = self.client.get(url).send().await?;
            let response = error_for_status(response).await?;
            audio.extend_from_slice(&response.bytes().await?);
        }

        if audio.is_empty() {
            return Err(ProviderError::EmptyResponse(format!(
                "TTS returned no audio for {} characters",
                request.text.chars().count()
            )));
        }
        Ok(audio.freeze())
    }

    fn audio_extension(&self) -> &str {
        "mp3"
    }
}
