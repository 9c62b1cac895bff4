/*!
 * Speech synthesis of translated captions.
 *
 * One audio clip is produced per speakable caption. Failures degrade the
 * track instead of failing the run; the outcome type says how much of the
 * track could be voiced.
 */

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub mod attempt;
pub mod synthesizer;

pub use attempt::{AttemptPolicy, AttemptState};
pub use synthesizer::SpeechSynthesizer;

/// Synthesized audio for one caption
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechClip {
    /// Position of the caption in its collection
    pub caption_index: usize,
    /// Where the clip starts on the video timeline
    pub start_offset: Duration,
    /// Encoded audio file
    pub path: PathBuf,
}

/// How much of a caption track was voiced
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisStatus {
    /// Every speakable caption has a clip
    FullySynthesized,
    /// Some captions were skipped; carries a summary
    PartiallyDegraded(String),
    /// No clip at all; the mixer will emit silence
    FullySilent,
}

impl fmt::Display for SynthesisStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SynthesisStatus::FullySynthesized => write!(f, "fully synthesized"),
            SynthesisStatus::PartiallyDegraded(reason) => write!(f, "partially degraded ({})", reason),
            SynthesisStatus::FullySilent => write!(f, "fully silent"),
        }
    }
}

/// Result of synthesizing a whole caption track
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// Clips ordered by caption index
    pub clips: Vec<SpeechClip>,
    pub status: SynthesisStatus,
    /// Indices of captions that exhausted their attempts
    pub failed_captions: Vec<usize>,
}
