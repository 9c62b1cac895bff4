use std::path::Path;
use std::time::Duration;

use crate::app_config::MediaConfig;
use crate::errors::MediaError;
use crate::media::toolchain::{FfmpegCommand, MediaToolchain, remove_stale_output, run_verified};

// @module: Audio extraction and silent track generation

// @const: Command labels
pub const LABEL_EXTRACT_AUDIO: &str = "extract audio";
pub const LABEL_SILENCE: &str = "silence";

/// lavfi channel layout for a channel count
fn channel_layout(channels: u8) -> &'static str {
    match channels {
        1 => "mono",
        _ => "stereo",
    }
}

/// Seconds with millisecond precision, as ffmpeg expects for `-t`
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}

/// Extract the audio stream of a video to uncompressed PCM
pub async fn extract_audio(
    toolchain: &dyn MediaToolchain,
    config: &MediaConfig,
    video: &Path,
    output: &Path,
) -> Result<(), MediaError> {
    if !video.is_file() {
        return Err(MediaError::MissingInput(format!(
            "Video file not found: {}",
            video.display()
        )));
    }
    remove_stale_output(output)?;

    let command = FfmpegCommand::new(LABEL_EXTRACT_AUDIO)
        .input(video)
        .args(["-vn", "-acodec", config.pcm_codec.as_str()])
        .args(["-ar".to_string(), config.sample_rate.to_string()])
        .args(["-ac".to_string(), config.channels.to_string()])
        .output(output);

    run_verified(toolchain, &command).await
}

// @creates: Silent track of exactly `duration` at the configured sample rate
pub fn silence_command(config: &MediaConfig, duration: Duration, output: &Path) -> FfmpegCommand {
    let source = format!(
        "anullsrc=r={}:cl={}",
        config.sample_rate,
        channel_layout(config.channels)
    );

    FfmpegCommand::new(LABEL_SILENCE)
        .args(["-f", "lavfi"])
        .input(source)
        .args(["-t".to_string(), format_seconds(duration)])
        .args(["-c:a", config.pcm_codec.as_str()])
        .output(output)
}

/// Generate a silent track and verify it was written
pub async fn create_silent_audio(
    toolchain: &dyn MediaToolchain,
    config: &MediaConfig,
    duration: Duration,
    output: &Path,
) -> Result<(), MediaError> {
    remove_stale_output(output)?;
    run_verified(toolchain, &silence_command(config, duration, output)).await
}
