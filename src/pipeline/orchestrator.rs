/*!
 * Per-language pipeline.
 *
 * For each target language: write the caption file, synthesize clips, mix
 * them onto the video timeline, and compose the final container. Synthesis
 * and mixing degrade in place; a language fails only when composition fails
 * or its working files cannot be produced. Languages never affect each other.
 */

use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::{FileManager, ScratchDir};
use crate::media::{
    CompositionInputs, CompositionResult, MediaComposer, MediaToolchain, MixSource, TimelineMixer,
};
use crate::pipeline::progress::ProgressReporter;
use crate::providers::SpeechProvider;
use crate::run_log::RunLog;
use crate::speech::{SpeechSynthesizer, SynthesisStatus};
use crate::subtitle_processor::SubtitleCollection;

// @const: Progress steps per language (synthesize, mix, compose)
const STEPS_PER_LANGUAGE: usize = 3;

/// Stage of one language run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageStage {
    Idle,
    SynthesizeClips,
    MixTimeline,
    Compose,
    Done,
    Failed,
}

impl fmt::Display for LanguageStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LanguageStage::Idle => "idle",
            LanguageStage::SynthesizeClips => "synthesize clips",
            LanguageStage::MixTimeline => "mix timeline",
            LanguageStage::Compose => "compose",
            LanguageStage::Done => "done",
            LanguageStage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Source video shared by every language
#[derive(Debug, Clone)]
pub struct SourceVideo {
    pub path: PathBuf,
    /// Probed container duration; every mixed track has exactly this length
    pub duration: Duration,
}

/// Work item for one target language
#[derive(Debug, Clone)]
pub struct LanguageJob {
    pub language: String,
    /// Captions already translated into `language`
    pub captions: SubtitleCollection,
}

/// Result of one language run
#[derive(Debug)]
pub struct LanguageOutcome {
    pub language: String,
    /// Final stage, `Done` or `Failed`
    pub stage: LanguageStage,
    /// Stages entered, in order
    pub history: Vec<LanguageStage>,
    pub synthesis: Option<SynthesisStatus>,
    pub mix: Option<MixSource>,
    pub subtitles_path: Option<PathBuf>,
    pub audio_path: Option<PathBuf>,
    pub result: Result<CompositionResult, PipelineError>,
}

impl LanguageOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Succeeded, but the video carries no subtitles
    pub fn missing_subtitles(&self) -> bool {
        matches!(&self.result, Ok(result) if !result.subtitles_embedded)
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.result.as_ref().ok().map(|result| result.output_path.as_path())
    }
}

/// Outcomes of every requested language, in request order
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub outcomes: Vec<LanguageOutcome>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &LanguageOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &LanguageOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|outcome| !outcome.is_success())
    }

    pub fn outcome(&self, language: &str) -> Option<&LanguageOutcome> {
        self.outcomes.iter().find(|outcome| outcome.language == language)
    }
}

/// Runs the language pipeline for every requested target language
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator {
    config: Config,
    speech: Arc<dyn SpeechProvider>,
    toolchain: Arc<dyn MediaToolchain>,
    output_dir: PathBuf,
    temp_root: PathBuf,
    log: RunLog,
}

/// Per-language progress state shared across concurrent runs
struct StepCounter<'a> {
    done: AtomicUsize,
    total: usize,
    progress: &'a dyn ProgressReporter,
}

impl StepCounter<'_> {
    fn step(&self, language: &str, stage: LanguageStage) {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        let fraction = done.min(self.total) as f32 / self.total.max(1) as f32;
        self.progress.report(fraction, &format!("{}: {}", language, stage));
    }

    /// Account for steps a failed language will never reach
    fn skip(&self, steps: usize) {
        self.done.fetch_add(steps, Ordering::SeqCst);
    }
}

impl PipelineOrchestrator {
    pub fn new(
        config: &Config,
        speech: Arc<dyn SpeechProvider>,
        toolchain: Arc<dyn MediaToolchain>,
        log: RunLog,
    ) -> Self {
        let output_dir = config.output_dir.clone();
        Self {
            config: config.clone(),
            speech,
            toolchain,
            temp_root: output_dir.join("temp"),
            output_dir,
            log,
        }
    }

    /// Process every job; results keep the order of `jobs`
    pub async fn run(
        &self,
        source: &SourceVideo,
        jobs: Vec<LanguageJob>,
        progress: &dyn ProgressReporter,
    ) -> PipelineReport {
        let counter = StepCounter {
            done: AtomicUsize::new(0),
            total: jobs.len() * STEPS_PER_LANGUAGE,
            progress,
        };
        let concurrency = self.config.pipeline.language_concurrency.max(1);

        let mut indexed: Vec<(usize, LanguageOutcome)> = stream::iter(jobs.into_iter().enumerate())
            .map(|(idx, job)| {
                let counter = &counter;
                async move { (idx, self.run_language_with_progress(source, job, counter).await) }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(idx, _)| *idx);
        PipelineReport {
            outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
        }
    }

    /// Process a single language without progress reporting
    pub async fn run_language(&self, source: &SourceVideo, job: LanguageJob) -> LanguageOutcome {
        let progress = crate::pipeline::progress::NoProgress;
        let counter = StepCounter {
            done: AtomicUsize::new(0),
            total: STEPS_PER_LANGUAGE,
            progress: &progress,
        };
        self.run_language_with_progress(source, job, &counter).await
    }

    async fn run_language_with_progress(
        &self,
        source: &SourceVideo,
        job: LanguageJob,
        counter: &StepCounter<'_>,
    ) -> LanguageOutcome {
        let language = job.language.clone();
        let log = self.log.scoped(&language);

        let mut outcome = LanguageOutcome {
            language: language.clone(),
            stage: LanguageStage::Idle,
            history: vec![LanguageStage::Idle],
            synthesis: None,
            mix: None,
            subtitles_path: None,
            audio_path: None,
            result: Err(PipelineError::Workspace {
                language: language.clone(),
                message: "not started".to_string(),
            }),
        };

        let result = self.execute(source, &job, &log, &mut outcome, counter).await;
        match &result {
            Ok(composition) => {
                Self::enter(&log, &mut outcome, LanguageStage::Done);
                if !composition.subtitles_embedded {
                    log.warn(format!(
                        "Video for {} was created without subtitles: {}",
                        language,
                        composition.output_path.display()
                    ));
                }
            }
            Err(e) => {
                // history is Idle plus every stage entered; the last one did not complete
                let completed = outcome.history.len().saturating_sub(2);
                counter.skip(STEPS_PER_LANGUAGE.saturating_sub(completed));
                Self::enter(&log, &mut outcome, LanguageStage::Failed);
                log.error(format!("Language {} failed: {}", language, e));
            }
        }

        outcome.result = result;
        outcome
    }

    fn enter(log: &RunLog, outcome: &mut LanguageOutcome, stage: LanguageStage) {
        log.debug(format!("Stage {} -> {}", outcome.stage, stage));
        outcome.stage = stage;
        outcome.history.push(stage);
    }

    async fn execute(
        &self,
        source: &SourceVideo,
        job: &LanguageJob,
        log: &RunLog,
        outcome: &mut LanguageOutcome,
        counter: &StepCounter<'_>,
    ) -> Result<CompositionResult, PipelineError> {
        let language = job.language.as_str();
        let workspace_error = |message: String| PipelineError::Workspace {
            language: language.to_string(),
            message,
        };

        FileManager::ensure_dir(&self.output_dir).map_err(|e| workspace_error(e.to_string()))?;
        let subtitles_path = FileManager::subtitle_path(&source.path, &self.output_dir, language);
        job.captions
            .write_to_srt(&subtitles_path)
            .map_err(|e| workspace_error(e.to_string()))?;
        outcome.subtitles_path = Some(subtitles_path.clone());
        log.info(format!("Saved translated subtitles to {}", subtitles_path.display()));

        let scratch = ScratchDir::create_in(&self.temp_root, &format!("audio_{}_", language), log)
            .map_err(|e| workspace_error(e.to_string()))?;

        Self::enter(log, outcome, LanguageStage::SynthesizeClips);
        let synthesizer = SpeechSynthesizer::new(Arc::clone(&self.speech), self.config.speech.clone(), log.clone());
        let synthesis = synthesizer
            .synthesize_track(&job.captions, language, scratch.path())
            .await;
        outcome.synthesis = Some(synthesis.status.clone());
        counter.step(language, LanguageStage::SynthesizeClips);

        Self::enter(log, outcome, LanguageStage::MixTimeline);
        let audio_path = FileManager::mixed_audio_path(&source.path, &self.output_dir, language);
        let mixer = TimelineMixer::new(Arc::clone(&self.toolchain), self.config.media.clone(), log.clone());
        let mixed = mixer
            .mix(&synthesis.clips, source.duration, scratch.path(), &audio_path)
            .await;
        scratch.cleanup();

        let track = mixed.map_err(|source| PipelineError::Audio {
            language: language.to_string(),
            source,
        })?;
        outcome.mix = Some(track.source.clone());
        outcome.audio_path = Some(track.path.clone());
        counter.step(language, LanguageStage::MixTimeline);

        Self::enter(log, outcome, LanguageStage::Compose);
        let composer = MediaComposer::new(
            Arc::clone(&self.toolchain),
            self.config.media.clone(),
            self.temp_root.clone(),
            log.clone(),
        );
        let inputs = CompositionInputs {
            video: source.path.clone(),
            audio: track.path,
            subtitles: subtitles_path,
            output: FileManager::translated_video_path(
                &source.path,
                &self.output_dir,
                language,
                &self.config.media.container_ext,
            ),
        };
        let composed = composer
            .compose(&inputs)
            .await
            .map_err(|source| PipelineError::Composition {
                language: language.to_string(),
                source,
            })?;
        counter.step(language, LanguageStage::Compose);

        Ok(composed)
    }
}
