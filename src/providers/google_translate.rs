use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::{TextTranslator, error_for_status};

// @module: Google Translate client (public web endpoint)

/// Google Translate client
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    client: Client,
    endpoint: String,
}

impl GoogleTranslate {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Join the translated segments of a `translate_a/single` response.
    ///
    /// The body is a nested array; `[0]` lists sentences whose first element
    /// is the translated text.
    pub fn extract_text(body: &Value) -> Result<String, ProviderError> {
        let sentences = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("Missing sentence list in response".to_string()))?;

        let text: String = sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
            .collect();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse("Translation was empty".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextTranslator for GoogleTranslate {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let source = if source_language.is_empty() { "auto" } else { source_language };
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid translation endpoint: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let response = error_for_status(response).await?;
        let body: Value = response.json().await?;

        Self::extract_text(&body)
    }
}
