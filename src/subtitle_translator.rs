use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::providers::TextTranslator;
use crate::run_log::RunLog;
use crate::subtitle_processor::SubtitleCollection;

// @module: Caption-by-caption translation with per-caption retry

// @const: Progress is logged every this many captions
const PROGRESS_INTERVAL: usize = 20;

/// Translates caption texts while keeping every timing untouched
#[derive(Debug, Clone)]
pub struct SubtitleTranslator {
    translator: Arc<dyn TextTranslator>,
    config: TranslationConfig,
    log: RunLog,
}

impl SubtitleTranslator {
    pub fn new(translator: Arc<dyn TextTranslator>, config: TranslationConfig, log: RunLog) -> Self {
        Self {
            translator,
            config,
            log,
        }
    }

    /// Translate a caption track into `target_language`.
    ///
    /// A caption whose translation keeps failing retains its source text, so
    /// the output always has the same number of entries with the same timings.
    pub async fn translate_collection(
        &self,
        captions: &SubtitleCollection,
        source_language: &str,
        target_language: &str,
    ) -> SubtitleCollection {
        let total = captions.entries.len();
        let mut texts = Vec::with_capacity(total);
        let mut kept_original = 0;

        self.log.info(format!("Translating {} captions to {}", total, target_language));

        for (idx, entry) in captions.entries.iter().enumerate() {
            if entry.is_blank() {
                texts.push(entry.text.clone());
                continue;
            }

            match self.translate_text(&entry.text, source_language, target_language).await {
                Some(translated) => texts.push(translated),
                None => {
                    kept_original += 1;
                    texts.push(entry.text.clone());
                }
            }

            if (idx + 1) % PROGRESS_INTERVAL == 0 {
                self.log.info(format!(
                    "Translated {}/{} captions to {}",
                    idx + 1,
                    total,
                    target_language
                ));
            }
        }

        if kept_original > 0 {
            self.log.warn(format!(
                "{} captions kept their original text in {}",
                kept_original, target_language
            ));
        }

        captions.with_texts(texts, target_language)
    }

    async fn translate_text(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.translator.translate(text, source_language, target_language).await {
                Ok(translated) if !translated.trim().is_empty() => return Some(translated.trim().to_string()),
                Ok(_) => self.log.warn(format!(
                    "Translation attempt {}/{} returned empty text",
                    attempt, max_attempts
                )),
                Err(e) => self.log.warn(format!(
                    "Translation attempt {}/{} failed: {}",
                    attempt, max_attempts, e
                )),
            }

            if attempt < max_attempts {
                tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
            }
        }

        self.log.error(format!(
            "Failed to translate after {} attempts, using original text: {}",
            max_attempts,
            text.chars().take(50).collect::<String>()
        ));
        None
    }
}
