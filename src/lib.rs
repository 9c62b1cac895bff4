/*!
 * # dubweave - video dubbing pipeline
 *
 * A Rust library that turns a spoken-language video into dubbed videos in
 * other languages.
 *
 * ## Features
 *
 * - Transcribe the source audio to timed captions (or reuse an SRT file)
 * - Translate captions while keeping their timing
 * - Synthesize speech per caption with retry and graceful degradation
 * - Place speech on the original timeline over a silent base track
 * - Mux video, dubbed audio and burned-in subtitles, with fallbacks
 * - Process several target languages independently
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and writing
 * - `subtitle_translator`: Caption-by-caption translation
 * - `speech`: Speech clip synthesis:
 *   - `speech::attempt`: Retry state machine
 *   - `speech::synthesizer`: Track synthesis with bounded fan-out
 * - `media`: ffmpeg-based processing:
 *   - `media::toolchain`: Command model and toolchain seam
 *   - `media::mixer`: Timeline mixing
 *   - `media::composer`: Final container with fallback strategies
 * - `pipeline`: Per-language orchestration and progress
 * - `providers`: Remote service clients (TTS, translation, transcription)
 * - `app_controller`: End-to-end runs for files and folders
 * - `file_utils`, `language_utils`, `run_log`, `errors`: Support code
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;
pub mod pipeline;
pub mod providers;
pub mod run_log;
pub mod speech;
pub mod subtitle_processor;
pub mod subtitle_translator;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions, Services};
pub use errors::{AppError, CompositionError, MediaError, PipelineError, ProviderError, SubtitleError, ValidationError};
pub use language_utils::{get_language_name, language_codes_match};
pub use pipeline::{LanguageOutcome, LanguageStage, PipelineOrchestrator, PipelineReport};
pub use run_log::RunLog;
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
