/*!
 * Multi-language dubbing pipeline.
 *
 * - `orchestrator`: per-language stage machine and language fan-out
 * - `progress`: progress reporting seam
 */

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{
    LanguageJob, LanguageOutcome, LanguageStage, PipelineOrchestrator, PipelineReport, SourceVideo,
};
pub use progress::{NoProgress, ProgressReporter, ScaledProgress};
