/*!
 * Media processing on top of ffmpeg.
 *
 * - `toolchain`: command model and the `MediaToolchain` seam
 * - `audio`: audio extraction and silent tracks
 * - `mixer`: placing speech clips on the video timeline
 * - `composer`: building the final container with fallbacks
 */

pub mod audio;
pub mod composer;
pub mod mixer;
pub mod toolchain;

pub use composer::{CompositionInputs, CompositionResult, CompositionStrategy, MediaComposer, STRATEGY_ORDER};
pub use mixer::{MixSource, MixedTrack, SilenceReason, TimelineMixer};
pub use toolchain::{FfmpegCli, FfmpegCommand, MediaToolchain};
