use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::ValidationError;
use crate::file_utils::{FileManager, ScratchDir};
use crate::language_utils;
use crate::media::{FfmpegCli, MediaToolchain, audio};
use crate::pipeline::{
    LanguageJob, NoProgress, PipelineOrchestrator, PipelineReport, ProgressReporter, ScaledProgress, SourceVideo,
};
use crate::providers::assemblyai::AssemblyAi;
use crate::providers::google_translate::GoogleTranslate;
use crate::providers::google_tts::GoogleTts;
use crate::providers::{SpeechProvider, TextTranslator, Transcriber};
use crate::run_log::{LogEntry, RunLog};
use crate::subtitle_processor::SubtitleCollection;
use crate::subtitle_translator::SubtitleTranslator;

// @module: Application controller for end-to-end dubbing runs

// @const: Issues log written to the output root
pub const ISSUES_LOG_NAME: &str = "dubweave.issues.log";

/// External services used by a run
#[derive(Debug, Clone)]
pub struct Services {
    pub speech: Arc<dyn SpeechProvider>,
    pub translator: Arc<dyn TextTranslator>,
    pub transcriber: Arc<dyn Transcriber>,
    pub toolchain: Arc<dyn MediaToolchain>,
}

impl Services {
    /// HTTP clients and the ffmpeg executables named in the config
    pub fn from_config(config: &Config) -> Self {
        Self {
            speech: Arc::new(GoogleTts::new(&config.speech)),
            translator: Arc::new(GoogleTranslate::new(&config.translation)),
            transcriber: Arc::new(AssemblyAi::new(&config.transcription)),
            toolchain: Arc::new(FfmpegCli::new(&config.media)),
        }
    }
}

/// Per-run switches from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Existing source-language SRT; skips extraction and transcription
    pub subtitles: Option<PathBuf>,
    /// Redo languages whose output video already exists
    pub force_overwrite: bool,
}

/// Totals of a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Progress bar adapter for the pipeline's progress updates
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {prefix} {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {percent}% {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("=>-"));
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ProgressReporter for IndicatifProgress {
    fn report(&self, fraction: f32, message: &str) {
        self.bar.set_position((fraction.clamp(0.0, 1.0) * 100.0).round() as u64);
        self.bar.set_message(message.to_string());
    }
}

/// Main application controller for video dubbing
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: External services
    services: Services,

    // @field: Captured log of every run made by this controller
    log: RunLog,
}

impl Controller {
    // @method: Create a controller talking to the real services
    pub fn with_config(config: Config) -> Result<Self> {
        let services = Services::from_config(&config);
        Self::with_services(config, services)
    }

    /// Create a controller with explicit services
    pub fn with_services(config: Config, services: Services) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self {
            config,
            services,
            log: RunLog::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Process one video with a terminal progress bar
    pub async fn run(&self, video: &Path, options: &RunOptions) -> Result<PipelineReport> {
        let label = video
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let progress = IndicatifProgress::new(&label);

        let result = self.run_with_progress(video, options, &progress).await;
        match &result {
            Ok(report) => progress.finish(&format!(
                "{} of {} languages done",
                report.succeeded().count(),
                report.outcomes.len()
            )),
            Err(_) => progress.finish("failed"),
        }
        result
    }

    /// Process one video, reporting progress to `progress`
    pub async fn run_with_progress(
        &self,
        video: &Path,
        options: &RunOptions,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineReport> {
        let start_time = Instant::now();
        let mark = self.log.entries().len();

        progress.report(0.0, "Validating input");
        let duration = self.validate_input(video).await?;

        let languages = self.pending_languages(video, options.force_overwrite)?;
        if languages.is_empty() {
            self.log.warn(format!(
                "Skipping {}, all translations already exist (use -f to force overwrite)",
                video.display()
            ));
            return Ok(PipelineReport::default());
        }

        FileManager::ensure_dir(&self.config.output_dir)?;
        let scratch = ScratchDir::create_in(
            self.config.output_dir.join("temp"),
            &format!("video_processing_{}_", uuid::Uuid::new_v4().simple()),
            &self.log,
        )?;

        let result = self
            .process(video, duration, &languages, options, &scratch, progress)
            .await;
        scratch.cleanup();

        match &result {
            Ok(report) => {
                progress.report(1.0, "Done");
                self.log.info(format!(
                    "Processed {} in {}: {} succeeded, {} failed",
                    video.display(),
                    Self::format_duration(start_time.elapsed()),
                    report.succeeded().count(),
                    report.failed().count()
                ));
            }
            Err(e) => self.log.error(format!("Processing {} failed: {:#}", video.display(), e)),
        }

        let context = format!("Video: {}", video.display());
        if let Err(e) = self.write_issues_log(mark, &context) {
            log::warn!("Failed to write issues log: {}", e);
        }

        result
    }

    async fn process(
        &self,
        video: &Path,
        duration: Duration,
        languages: &[String],
        options: &RunOptions,
        scratch: &ScratchDir,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineReport> {
        let source_language = language_utils::resolve_language_code(&self.config.source_language)?;
        let captions = self
            .source_captions(video, &source_language, options, scratch, progress)
            .await?;
        self.log.info(format!("Source track has {} captions", captions.entries.len()));

        progress.report(0.2, "Translating captions");
        let translation_progress = ScaledProgress::new(progress, 0.2, 0.3);
        let translator = SubtitleTranslator::new(
            Arc::clone(&self.services.translator),
            self.config.translation.clone(),
            self.log.clone(),
        );

        let mut jobs = Vec::with_capacity(languages.len());
        for (idx, language) in languages.iter().enumerate() {
            let translated = translator
                .translate_collection(&captions, &source_language, language)
                .await;
            translation_progress.report(
                (idx + 1) as f32 / languages.len() as f32,
                &format!("Translated captions to {}", language),
            );
            jobs.push(LanguageJob {
                language: language.clone(),
                captions: translated,
            });
        }

        let orchestrator = PipelineOrchestrator::new(
            &self.config,
            Arc::clone(&self.services.speech),
            Arc::clone(&self.services.toolchain),
            self.log.clone(),
        );
        let source = SourceVideo {
            path: video.to_path_buf(),
            duration,
        };
        let pipeline_progress = ScaledProgress::new(progress, 0.3, 0.95);

        Ok(orchestrator.run(&source, jobs, &pipeline_progress).await)
    }

    /// Source-language captions, from `--subtitles` or by transcription
    async fn source_captions(
        &self,
        video: &Path,
        source_language: &str,
        options: &RunOptions,
        scratch: &ScratchDir,
        progress: &dyn ProgressReporter,
    ) -> Result<SubtitleCollection> {
        if let Some(path) = &options.subtitles {
            self.log.info(format!("Using existing subtitles: {}", path.display()));
            return SubtitleCollection::from_srt_file(path, source_language)
                .with_context(|| format!("Failed to load subtitles from {}", path.display()));
        }

        self.config.validate_transcription()?;

        progress.report(0.05, "Extracting audio");
        let audio_path = scratch.join("source_audio.wav");
        audio::extract_audio(self.services.toolchain.as_ref(), &self.config.media, video, &audio_path)
            .await
            .context("Failed to extract audio")?;

        progress.report(0.1, "Transcribing audio");
        let srt = self
            .services
            .transcriber
            .transcribe(&audio_path, source_language)
            .await
            .context("Transcription failed")?;

        let entries = SubtitleCollection::parse_srt_string(&srt).context("Transcript is not valid SRT")?;
        let mut captions = SubtitleCollection::new(self.source_subtitle_path(video), source_language.to_string());
        captions.entries = entries;
        captions.write_to_srt(&captions.source_file)?;
        self.log.info(format!("Saved source subtitles to {}", captions.source_file.display()));

        Ok(captions)
    }

    fn source_subtitle_path(&self, video: &Path) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}_subtitles.srt", FileManager::video_stem(video)))
    }

    /// Reject inputs that are missing, too large or too long; returns the duration
    pub async fn validate_input(&self, video: &Path) -> Result<Duration> {
        if !FileManager::file_exists(video) {
            return Err(anyhow!("Input file does not exist: {}", video.display()));
        }

        let size = FileManager::file_size(video);
        if size > self.config.max_upload_bytes {
            return Err(ValidationError::FileTooLarge {
                actual_bytes: size,
                max_bytes: self.config.max_upload_bytes,
            }
            .into());
        }

        let duration = self
            .services
            .toolchain
            .probe_duration(video)
            .await
            .context("Failed to get video duration")?;

        if duration.as_secs_f64() > self.config.max_video_duration_secs as f64 {
            return Err(ValidationError::VideoTooLong {
                actual_secs: duration.as_secs_f64(),
                max_secs: self.config.max_video_duration_secs,
            }
            .into());
        }

        Ok(duration)
    }

    /// Target languages still to do for this video
    fn pending_languages(&self, video: &Path, force_overwrite: bool) -> Result<Vec<String>> {
        if self.config.target_languages.is_empty() {
            return Err(ValidationError::NoTargetLanguages.into());
        }

        let mut languages: Vec<String> = Vec::new();
        for requested in &self.config.target_languages {
            let code = language_utils::resolve_language_code(requested)
                .map_err(|_| ValidationError::UnsupportedLanguage(requested.clone()))?;
            if languages.contains(&code) {
                continue;
            }

            let output = FileManager::translated_video_path(
                video,
                &self.config.output_dir,
                &code,
                &self.config.media.container_ext,
            );
            if output.exists() && !force_overwrite {
                self.log.warn(format!(
                    "Skipping {}, output already exists: {}",
                    code,
                    output.display()
                ));
                continue;
            }
            languages.push(code);
        }
        Ok(languages)
    }

    /// Process every video file below a directory
    pub async fn run_folder(&self, input_dir: &Path, options: &RunOptions) -> Result<FolderSummary> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
        }

        let video_files = FileManager::find_video_files(input_dir)?;
        if video_files.is_empty() {
            return Err(anyhow!("No video files found in directory: {}", input_dir.display()));
        }

        let options = if options.subtitles.is_some() {
            self.log.warn("--subtitles is ignored in folder mode");
            RunOptions {
                subtitles: None,
                ..options.clone()
            }
        } else {
            options.clone()
        };

        let mut summary = FolderSummary::default();
        for video in &video_files {
            match self.run_with_progress(video, &options, &NoProgress).await {
                Ok(report) if report.outcomes.is_empty() => summary.skipped += 1,
                Ok(report) if report.all_failed() => summary.failed += 1,
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    self.log.error(format!("Error processing file {}: {:#}", video.display(), e));
                    summary.failed += 1;
                }
            }
        }

        self.log.info(format!(
            "Folder processing completed: {} processed, {} skipped, {} errors",
            summary.processed, summary.skipped, summary.failed
        ));
        Ok(summary)
    }

    /// Append warnings and errors recorded since `mark` to the issues log
    fn write_issues_log(&self, mark: usize, context: &str) -> Result<()> {
        let issues: Vec<LogEntry> = self
            .log
            .entries()
            .into_iter()
            .skip(mark)
            .filter(|entry| entry.level == "WARN" || entry.level == "ERROR")
            .collect();

        if issues.is_empty() {
            return Ok(());
        }

        let mut content = String::new();
        content.push_str(&format!("Dubbing Log - {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        content.push_str(&format!("Context: {}\n\n", context));
        for entry in &issues {
            content.push_str(&format!("[{}] {}\n", entry.level, entry.message));
        }
        content.push('\n');

        let path = self.config.output_dir.join(ISSUES_LOG_NAME);
        FileManager::append_to_file(&path, &content)?;
        log::info!("Issues written to {}", path.display());
        Ok(())
    }

    /// Format a duration in a human-readable form
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
