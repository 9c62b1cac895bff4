use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;

use crate::app_config::SpeechConfig;
use crate::errors::ProviderError;
use crate::file_utils::FileManager;
use crate::providers::{SpeechProvider, SpeechRequest};
use crate::run_log::RunLog;
use crate::speech::attempt::{AttemptPolicy, AttemptState};
use crate::speech::{SpeechClip, SynthesisOutcome, SynthesisStatus};
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};

/// Turns captions into audio clips, one file per caption
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    provider: Arc<dyn SpeechProvider>,
    config: SpeechConfig,
    log: RunLog,
}

/// Why an attempt did not yield a usable clip
#[derive(Debug)]
enum AttemptFailure {
    Provider(ProviderError),
    Empty,
    Write(std::io::Error),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AttemptFailure::Provider(e) => write!(f, "{}", e),
            AttemptFailure::Empty => write!(f, "empty audio"),
            AttemptFailure::Write(e) => write!(f, "failed to write clip: {}", e),
        }
    }
}

impl SpeechSynthesizer {
    pub fn new(provider: Arc<dyn SpeechProvider>, config: SpeechConfig, log: RunLog) -> Self {
        Self { provider, config, log }
    }

    fn policy(&self) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: self.config.max_attempts.max(1),
            truncate_threshold_chars: self.config.truncate_threshold_chars,
        }
    }

    /// Synthesize every speakable caption of a track into `work_dir`.
    ///
    /// Never fails: captions that exhaust their attempts are logged and
    /// skipped, and the returned status reflects how much was voiced.
    pub async fn synthesize_track(
        &self,
        captions: &SubtitleCollection,
        language: &str,
        work_dir: &Path,
    ) -> SynthesisOutcome {
        let speakable: Vec<(usize, &SubtitleEntry)> = captions
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_blank())
            .collect();
        let total = speakable.len();

        self.log.info(format!(
            "Generating speech for {} of {} captions in {}",
            total,
            captions.entries.len(),
            language
        ));

        let results: Vec<(usize, Option<SpeechClip>)> = stream::iter(speakable)
            .map(|(index, entry)| async move {
                (index, self.synthesize_caption(index, entry, language, work_dir).await)
            })
            .buffer_unordered(self.config.concurrent_requests.max(1))
            .collect()
            .await;

        let mut clips = Vec::with_capacity(total);
        let mut failed_captions = Vec::new();
        for (index, clip) in results {
            match clip {
                Some(clip) => clips.push(clip),
                None => failed_captions.push(index),
            }
        }
        clips.sort_by_key(|clip| clip.caption_index);
        failed_captions.sort_unstable();

        let status = if clips.is_empty() {
            SynthesisStatus::FullySilent
        } else if failed_captions.is_empty() {
            SynthesisStatus::FullySynthesized
        } else {
            SynthesisStatus::PartiallyDegraded(format!(
                "{} of {} captions could not be synthesized",
                failed_captions.len(),
                total
            ))
        };

        match &status {
            SynthesisStatus::FullySilent => {
                self.log.warn(format!("No speech could be generated for {}", language))
            }
            SynthesisStatus::PartiallyDegraded(reason) => self.log.warn(reason),
            SynthesisStatus::FullySynthesized => {
                self.log.info(format!("Generated {} audio chunks for {}", clips.len(), language))
            }
        }

        SynthesisOutcome {
            clips,
            status,
            failed_captions,
        }
    }

    /// Synthesize one caption, retrying per the attempt policy
    pub async fn synthesize_caption(
        &self,
        index: usize,
        entry: &SubtitleEntry,
        language: &str,
        work_dir: &Path,
    ) -> Option<SpeechClip> {
        let text = entry.text.trim();
        if text.is_empty() {
            return None;
        }

        let policy = self.policy();
        let voice = self.config.voice_for(language);
        let path = work_dir.join(format!("chunk_{:04}.{}", index, self.provider.audio_extension()));
        let mut state = AttemptState::first(text, self.config.is_slow_language(language));

        loop {
            let request = SpeechRequest {
                text: state.text.clone(),
                language: language.to_string(),
                voice: voice.clone(),
                slow: state.slow,
            };

            match self.attempt(&request, &path).await {
                Ok(()) => {
                    return Some(SpeechClip {
                        caption_index: index,
                        start_offset: entry.start_offset(),
                        path,
                    });
                }
                Err(e) => {
                    self.log.warn(format!(
                        "TTS attempt {}/{} failed for caption {}: {}",
                        state.attempt, policy.max_attempts, entry.seq_num, e
                    ));

                    match state.after_failure(&policy) {
                        Some(next) => {
                            if next.text != state.text {
                                self.log.info(format!(
                                    "Shortening caption {} for the final attempt",
                                    entry.seq_num
                                ));
                            }
                            tokio::time::sleep(self.config.retry_backoff()).await;
                            state = next;
                        }
                        None => {
                            self.log.error(format!(
                                "Failed to generate audio for caption {} after {} attempts, skipping",
                                entry.seq_num, policy.max_attempts
                            ));
                            return None;
                        }
                    }
                }
            }
        }
    }

    async fn attempt(&self, request: &SpeechRequest, path: &Path) -> Result<(), AttemptFailure> {
        let audio = self
            .provider
            .synthesize(request)
            .await
            .map_err(AttemptFailure::Provider)?;

        if audio.is_empty() {
            return Err(AttemptFailure::Empty);
        }

        tokio::fs::write(path, &audio).await.map_err(AttemptFailure::Write)?;

        if FileManager::is_non_empty_file(path) {
            Ok(())
        } else {
            Err(AttemptFailure::Empty)
        }
    }
}
