/*!
 * AssemblyAI transcription client.
 *
 * Flow: upload the audio file, create a transcript job with punctuation and
 * text formatting enabled, poll until it completes, then download the
 * transcript rendered as SRT.
 */

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app_config::TranscriptionConfig;
use crate::errors::ProviderError;
use crate::providers::{Transcriber, error_for_status};

/// Transcript job request
#[derive(Debug, Serialize)]
pub struct TranscriptRequest {
    pub audio_url: String,
    pub language_code: String,
    pub punctuate: bool,
    pub format_text: bool,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

/// Transcript job state as reported by the service
#[derive(Debug, Deserialize)]
pub struct TranscriptStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// AssemblyAI client
#[derive(Debug, Clone)]
pub struct AssemblyAi {
    client: Client,
    endpoint: String,
    api_key: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl AssemblyAi {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn upload(&self, audio: &Path) -> Result<String, ProviderError> {
        let data = tokio::fs::read(audio)
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read {}: {}", audio.display(), e)))?;

        let response = self
            .client
            .post(format!("{}/v2/upload", self.endpoint))
            .header("authorization", &self.api_key)
            .body(data)
            .send()
            .await?;
        let upload: UploadResponse = error_for_status(response).await?.json().await?;
        Ok(upload.upload_url)
    }

    async fn create_transcript(&self, request: &TranscriptRequest) -> Result<TranscriptStatus, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.endpoint))
            .header("authorization", &self.api_key)
            .json(request)
            .send()
            .await?;
        Ok(error_for_status(response).await?.json().await?)
    }

    async fn poll(&self, id: &str) -> Result<(), ProviderError> {
        let started = Instant::now();

        loop {
            let response = self
                .client
                .get(format!("{}/v2/transcript/{}", self.endpoint, id))
                .header("authorization", &self.api_key)
                .send()
                .await?;
            let status: TranscriptStatus = error_for_status(response).await?.json().await?;
            debug!("Transcript {} status: {}", id, status.status);

            match status.status.as_str() {
                "completed" => return Ok(()),
                "error" => {
                    return Err(ProviderError::ApiError {
                        status_code: 200,
                        message: status.error.unwrap_or_else(|| "transcription failed".to_string()),
                    });
                }
                _ => {}
            }

            if started.elapsed() >= self.timeout {
                return Err(ProviderError::Timeout(self.timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn export_srt(&self, id: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v2/transcript/{}/srt", self.endpoint, id))
            .header("authorization", &self.api_key)
            .send()
            .await?;
        let srt = error_for_status(response).await?.text().await?;

        if srt.trim().is_empty() {
            return Err(ProviderError::EmptyResponse("Transcript contains no captions".to_string()));
        }
        Ok(srt)
    }
}

#[async_trait]
impl Transcriber for AssemblyAi {
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::AuthenticationError("AssemblyAI API key is not set".to_string()));
        }

        let audio_url = self.upload(audio).await?;
        let job = self
            .create_transcript(&TranscriptRequest {
                audio_url,
                language_code: language.to_string(),
                punctuate: true,
                format_text: true,
            })
            .await?;
        debug!("Created transcript job {}", job.id);

        self.poll(&job.id).await?;
        self.export_srt(&job.id).await
    }
}
