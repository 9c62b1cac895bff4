/*!
 * Final video composition.
 *
 * Combines the source video, a mixed audio track and a subtitle file into one
 * container. Strategies are tried in a fixed order, each one less demanding
 * than the previous; the first that leaves a non-empty output wins. The last
 * strategy drops the subtitles, which callers must surface as a degraded
 * result rather than a failure.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::MediaConfig;
use crate::errors::{CompositionError, MediaError};
use crate::file_utils::{FileManager, ScratchDir};
use crate::media::toolchain::{FfmpegCommand, MediaToolchain, remove_stale_output, run_verified};
use crate::run_log::RunLog;

// @const: Command labels
pub const LABEL_SINGLE_PASS: &str = "single-pass overlay";
pub const LABEL_STAGED_REMUX: &str = "staged remux";
pub const LABEL_STAGED_BURN_IN: &str = "staged burn-in";
pub const LABEL_REMUX_ONLY: &str = "remux without subtitles";

// @const: Intermediate file of the staged strategy
const STAGED_INTERMEDIATE: &str = "video_with_audio.mp4";

/// Way of producing the final container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionStrategy {
    /// Re-encode video with subtitles burned in and the new audio, one pass
    SinglePassOverlay,
    /// Copy video with the new audio first, then burn subtitles in
    TwoPassStaged,
    /// Copy video with the new audio, no subtitles
    NoSubtitles,
}

/// Order in which strategies are attempted
pub const STRATEGY_ORDER: [CompositionStrategy; 3] = [
    CompositionStrategy::SinglePassOverlay,
    CompositionStrategy::TwoPassStaged,
    CompositionStrategy::NoSubtitles,
];

impl CompositionStrategy {
    /// 1-based position in `STRATEGY_ORDER`
    pub fn number(&self) -> usize {
        match self {
            CompositionStrategy::SinglePassOverlay => 1,
            CompositionStrategy::TwoPassStaged => 2,
            CompositionStrategy::NoSubtitles => 3,
        }
    }

    pub fn embeds_subtitles(&self) -> bool {
        !matches!(self, CompositionStrategy::NoSubtitles)
    }
}

impl fmt::Display for CompositionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CompositionStrategy::SinglePassOverlay => "single-pass overlay",
            CompositionStrategy::TwoPassStaged => "two-pass staged",
            CompositionStrategy::NoSubtitles => "no subtitles",
        };
        write!(f, "{}", name)
    }
}

// @struct: Files a composition works on
#[derive(Debug, Clone)]
pub struct CompositionInputs {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub subtitles: PathBuf,
    pub output: PathBuf,
}

// @struct: Successful composition
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionResult {
    // @field: Final container
    pub output_path: PathBuf,

    // @field: False when the subtitle-free fallback was used
    pub subtitles_embedded: bool,

    // @field: Strategy that produced the output
    pub strategy: CompositionStrategy,
}

/// Escape a path for use as a filter option value inside a filter graph.
///
/// ffmpeg unescapes filter arguments twice: once when splitting the graph and
/// once when splitting the filter's `key=value` options. The path is escaped
/// for the option level first, then the result for the graph level. Windows
/// separators are turned into forward slashes.
pub fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let option_level = escape_chars(&raw, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `subtitles=` filter burning an SRT file in at a fixed font size
pub fn subtitle_filter(subtitles: &Path, font_size: u32) -> String {
    format!(
        "subtitles={}:force_style='FontSize={}'",
        escape_filter_path(subtitles),
        font_size
    )
}

/// Builds the final video for one language
#[derive(Debug, Clone)]
pub struct MediaComposer {
    toolchain: Arc<dyn MediaToolchain>,
    config: MediaConfig,
    scratch_root: PathBuf,
    log: RunLog,
}

impl MediaComposer {
    /// `scratch_root` receives the temporary directories of staged compositions
    pub fn new(
        toolchain: Arc<dyn MediaToolchain>,
        config: MediaConfig,
        scratch_root: PathBuf,
        log: RunLog,
    ) -> Self {
        Self {
            toolchain,
            config,
            scratch_root,
            log,
        }
    }

    /// Try every strategy in order until one produces a non-empty output
    pub async fn compose(&self, inputs: &CompositionInputs) -> Result<CompositionResult, CompositionError> {
        self.check_preconditions(inputs)?;

        let mut messages = Vec::new();

        for strategy in STRATEGY_ORDER {
            self.log.info(format!(
                "Combining video using method {} ({})",
                strategy.number(),
                strategy
            ));

            match self.attempt(strategy, inputs).await {
                Ok(()) => {
                    if !strategy.embeds_subtitles() {
                        self.log.warn(format!(
                            "Video was combined without subtitles: {}",
                            inputs.output.display()
                        ));
                    }
                    self.log.info(format!(
                        "Successfully combined video using method {}: {}",
                        strategy.number(),
                        inputs.output.display()
                    ));
                    return Ok(CompositionResult {
                        output_path: inputs.output.clone(),
                        subtitles_embedded: strategy.embeds_subtitles(),
                        strategy,
                    });
                }
                Err(e) => {
                    let message = format!("Method {} failed: {}", strategy.number(), e);
                    self.log.warn(&message);
                    messages.push(message);
                }
            }
        }

        let error = CompositionError::AllStrategiesFailed { messages };
        self.log.error(error.to_string());
        Err(error)
    }

    // @validates: Inputs exist and are non-empty; never retried
    fn check_preconditions(&self, inputs: &CompositionInputs) -> Result<(), CompositionError> {
        let required = [
            ("Video file", &inputs.video),
            ("Audio file", &inputs.audio),
            ("Subtitle file", &inputs.subtitles),
        ];

        for (what, path) in required {
            if !FileManager::is_non_empty_file(path) {
                let message = format!("{} not found or empty: {}", what, path.display());
                self.log.error(&message);
                return Err(CompositionError::Precondition(message));
            }
        }

        if let Some(parent) = inputs.output.parent() {
            FileManager::ensure_dir(parent)
                .map_err(|e| CompositionError::Precondition(e.to_string()))?;
        }
        Ok(())
    }

    async fn attempt(&self, strategy: CompositionStrategy, inputs: &CompositionInputs) -> Result<(), MediaError> {
        remove_stale_output(&inputs.output)?;

        match strategy {
            CompositionStrategy::SinglePassOverlay => self.single_pass(inputs).await,
            CompositionStrategy::TwoPassStaged => self.two_pass(inputs).await,
            CompositionStrategy::NoSubtitles => {
                let command = self.remux_command(LABEL_REMUX_ONLY, &inputs.video, &inputs.audio, &inputs.output);
                run_verified(self.toolchain.as_ref(), &command).await
            }
        }
    }

    async fn single_pass(&self, inputs: &CompositionInputs) -> Result<(), MediaError> {
        let command = FfmpegCommand::new(LABEL_SINGLE_PASS)
            .input(&inputs.video)
            .input(&inputs.audio)
            .args([
                "-vf".to_string(),
                subtitle_filter(&inputs.subtitles, self.config.subtitle_font_size),
            ])
            .args(["-map", "0:v", "-map", "1:a"])
            .args(["-c:v", self.config.video_codec.as_str()])
            .args(["-c:a", self.config.audio_codec.as_str()])
            .args(["-strict", "experimental"])
            .args(["-b:a", self.config.audio_bitrate.as_str()])
            .output(&inputs.output);

        run_verified(self.toolchain.as_ref(), &command).await
    }

    async fn two_pass(&self, inputs: &CompositionInputs) -> Result<(), MediaError> {
        let scratch = ScratchDir::create_in(&self.scratch_root, "video_combine_", &self.log)
            .map_err(|e| MediaError::Io(std::io::Error::other(e.to_string())))?;
        let staged = scratch.join(STAGED_INTERMEDIATE);

        let result = async {
            let remux = self.remux_command(LABEL_STAGED_REMUX, &inputs.video, &inputs.audio, &staged);
            run_verified(self.toolchain.as_ref(), &remux).await?;

            let burn_in = FfmpegCommand::new(LABEL_STAGED_BURN_IN)
                .input(&staged)
                .args([
                    "-vf".to_string(),
                    subtitle_filter(&inputs.subtitles, self.config.subtitle_font_size),
                ])
                .args(["-c:v", self.config.video_codec.as_str()])
                .args(["-c:a", "copy"])
                .output(&inputs.output);
            run_verified(self.toolchain.as_ref(), &burn_in).await
        }
        .await;

        scratch.cleanup();
        result
    }

    // @creates: Stream copy of the video with the new audio track
    fn remux_command(&self, label: &str, video: &Path, audio: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(label)
            .input(video)
            .input(audio)
            .args(["-c:v", "copy"])
            .args(["-c:a", self.config.audio_codec.as_str()])
            .args(["-strict", "experimental"])
            .args(["-map", "0:v", "-map", "1:a"])
            .output(output)
    }
}
