/*!
 * Timeline mixer.
 *
 * Places every speech clip at its caption's start offset on top of a silent
 * base track whose length equals the source video. The result is always a
 * track of exactly that length: when there is nothing to place, or the mix
 * itself fails, the caller still gets a silent track.
 */

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::MediaConfig;
use crate::errors::MediaError;
use crate::media::audio;
use crate::media::toolchain::{FfmpegCommand, MediaToolchain, remove_stale_output, run_verified};
use crate::run_log::RunLog;
use crate::speech::SpeechClip;

// @const: Command label of the overlay step
pub const LABEL_MIX: &str = "mix";

// @const: File name of the silent base inside the work directory
pub const SILENT_BASE_NAME: &str = "silence.wav";

/// Why a track ended up silent
#[derive(Debug, Clone, PartialEq)]
pub enum SilenceReason {
    /// No clip was available to place
    NoClips,
    /// The overlay step failed; carries the failure message
    MixFailed(String),
}

/// How the final track was produced
#[derive(Debug, Clone, PartialEq)]
pub enum MixSource {
    /// Clips were overlaid on the silent base
    Mixed { clips: usize },
    /// The track is the silent base only
    Silence(SilenceReason),
}

impl MixSource {
    pub fn is_silent(&self) -> bool {
        matches!(self, MixSource::Silence(_))
    }
}

impl fmt::Display for MixSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MixSource::Mixed { clips } => write!(f, "{} clips mixed", clips),
            MixSource::Silence(SilenceReason::NoClips) => write!(f, "silent (no clips)"),
            MixSource::Silence(SilenceReason::MixFailed(message)) => {
                write!(f, "silent (mix failed: {})", message)
            }
        }
    }
}

// @struct: Audio track covering the whole video
#[derive(Debug, Clone)]
pub struct MixedTrack {
    // @field: Output file
    pub path: std::path::PathBuf,

    // @field: Track length, equal to the video duration
    pub duration: Duration,

    // @field: Mixed or silent
    pub source: MixSource,
}

/// Whole-millisecond delay for a clip offset
pub fn delay_ms(offset: Duration) -> u64 {
    offset.as_millis() as u64
}

/// Build the `-filter_complex` graph for a silent base on input 0 and one
/// clip per following input, delayed by the matching offset.
///
/// `duration=first` pins the output to the base length: clips running past
/// the end are cut, clips ending early leave the tail silent.
pub fn build_mix_filter(offsets_ms: &[u64]) -> String {
    let mut graph = String::new();
    let mut labels = String::from("[0:a]");

    for (idx, offset) in offsets_ms.iter().enumerate() {
        let input = idx + 1;
        graph.push_str(&format!("[{input}:a]adelay={offset}:all=1[d{input}];"));
        labels.push_str(&format!("[d{input}]"));
    }

    graph.push_str(&format!(
        "{}amix=inputs={}:duration=first:dropout_transition=0:normalize=0[aout]",
        labels,
        offsets_ms.len() + 1
    ));
    graph
}

/// Overlays speech clips onto a silent base track
#[derive(Debug, Clone)]
pub struct TimelineMixer {
    toolchain: Arc<dyn MediaToolchain>,
    config: MediaConfig,
    log: RunLog,
}

impl TimelineMixer {
    pub fn new(toolchain: Arc<dyn MediaToolchain>, config: MediaConfig, log: RunLog) -> Self {
        Self { toolchain, config, log }
    }

    /// Produce a track of exactly `duration` at `output`.
    ///
    /// Clip failures never fail the mix: a failed overlay degrades to the
    /// silent base. An error is returned only when not even the silent base
    /// can be produced.
    pub async fn mix(
        &self,
        clips: &[SpeechClip],
        duration: Duration,
        work_dir: &Path,
        output: &Path,
    ) -> Result<MixedTrack, MediaError> {
        let usable: Vec<&SpeechClip> = clips
            .iter()
            .filter(|clip| {
                let present = clip.path.is_file();
                if !present {
                    self.log.warn(format!(
                        "Audio chunk for caption {} is missing, skipping: {}",
                        clip.caption_index,
                        clip.path.display()
                    ));
                }
                present
            })
            .collect();

        if usable.is_empty() {
            self.log.warn("No audio chunks to mix, creating silent audio");
            return self.silence_track(duration, output, SilenceReason::NoClips).await;
        }

        let base = work_dir.join(SILENT_BASE_NAME);
        audio::create_silent_audio(self.toolchain.as_ref(), &self.config, duration, &base).await?;

        let offsets: Vec<u64> = usable.iter().map(|clip| delay_ms(clip.start_offset)).collect();
        remove_stale_output(output)?;

        let mut command = FfmpegCommand::new(LABEL_MIX).input(&base);
        for clip in &usable {
            command = command.input(&clip.path);
        }
        let command = command
            .args(["-filter_complex".to_string(), build_mix_filter(&offsets)])
            .args(["-map", "[aout]"])
            .args(["-ar".to_string(), self.config.sample_rate.to_string()])
            .args(["-ac".to_string(), self.config.channels.to_string()])
            .args(["-c:a", self.config.pcm_codec.as_str()])
            .output(output);

        match run_verified(self.toolchain.as_ref(), &command).await {
            Ok(()) => {
                self.log.info(format!(
                    "Mixed {} audio chunks into {}",
                    usable.len(),
                    output.display()
                ));
                Ok(MixedTrack {
                    path: output.to_path_buf(),
                    duration,
                    source: MixSource::Mixed { clips: usable.len() },
                })
            }
            Err(e) => {
                self.log.warn(format!("Error mixing audio, falling back to silent audio: {}", e));
                self.silence_track(duration, output, SilenceReason::MixFailed(e.to_string()))
                    .await
            }
        }
    }

    /// Write the silent base straight to `output`
    pub async fn silence_track(
        &self,
        duration: Duration,
        output: &Path,
        reason: SilenceReason,
    ) -> Result<MixedTrack, MediaError> {
        audio::create_silent_audio(self.toolchain.as_ref(), &self.config, duration, output).await?;
        Ok(MixedTrack {
            path: output.to_path_buf(),
            duration,
            source: MixSource::Silence(reason),
        })
    }
}
