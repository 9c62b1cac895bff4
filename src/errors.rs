/*!
 * Error types for the dubweave application.
 *
 * This module contains custom error types for the different stages of a
 * dubbing run, using the thiserror crate for ergonomic error definitions.
 * Expected degradations (silent tracks, missing subtitles) are NOT errors;
 * they are reported through status types in the component modules.
 */

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to remote services
/// (speech synthesis, transcription, text translation)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The service answered successfully but with nothing usable
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// A long-running remote job did not finish in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Timestamp line could not be parsed
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// Caption ends before it starts
    #[error("Invalid time range in caption {seq_num}: end {end_ms}ms < start {start_ms}ms")]
    InvalidTimeRange {
        /// Caption index
        seq_num: usize,
        /// Start in milliseconds
        start_ms: u64,
        /// End in milliseconds
        end_ms: u64,
    },

    /// No caption block could be parsed
    #[error("No valid subtitle entries were found in the SRT content")]
    Empty,

    /// Reading or writing the subtitle file failed
    #[error("Subtitle I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the external media toolchain (ffmpeg / ffprobe)
#[derive(Error, Debug)]
pub enum MediaError {
    /// A required input artifact is missing or empty
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The tool ran and reported failure
    #[error("{label} failed: {stderr}")]
    ToolFailed {
        /// Which invocation failed
        label: String,
        /// Filtered stderr of the tool
        stderr: String,
    },

    /// The tool reported success but produced nothing usable
    #[error("{label} produced no output at {path}")]
    EmptyOutput {
        /// Which invocation produced the file
        label: String,
        /// Expected output path
        path: String,
    },

    /// The tool could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Executable name
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The tool did not finish within the configured timeout
    #[error("{label} timed out after {timeout:?}")]
    Timeout {
        /// Which invocation timed out
        label: String,
        /// Configured timeout
        timeout: Duration,
    },

    /// ffprobe output could not be interpreted
    #[error("Probe error: {0}")]
    ProbeError(String),

    /// Any file system error around a media operation
    #[error("Media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while composing the final video for one language
#[derive(Error, Debug)]
pub enum CompositionError {
    /// An input artifact is missing or empty; never retried
    #[error("Composition precondition failed: {0}")]
    Precondition(String),

    /// Every composition strategy failed; messages are kept in strategy order
    #[error("All combination methods failed: {}", .messages.join("; "))]
    AllStrategiesFailed {
        /// One message per attempted strategy
        messages: Vec<String>,
    },
}

/// Input rejected before any pipeline work starts
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Source video is longer than the configured maximum
    #[error("Video is too long ({actual_secs:.1} seconds). Maximum allowed duration is {max_secs} seconds.")]
    VideoTooLong {
        /// Probed duration
        actual_secs: f64,
        /// Configured maximum
        max_secs: u64,
    },

    /// Source video file is larger than the configured maximum
    #[error("Video file is too large ({actual_bytes} bytes). Maximum allowed size is {max_bytes} bytes.")]
    FileTooLarge {
        /// File size on disk
        actual_bytes: u64,
        /// Configured maximum
        max_bytes: u64,
    },

    /// Language code is not in the supported table
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// No target language was requested
    #[error("At least one target language is required")]
    NoTargetLanguages,
}

/// Terminal failure of one language run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The composer exhausted every strategy or hit a precondition
    #[error("Composition failed for {language}: {source}")]
    Composition {
        /// Target language code
        language: String,
        /// Composer error
        #[source]
        source: CompositionError,
    },

    /// The toolchain could not even produce a silent track
    #[error("Audio track unavailable for {language}: {source}")]
    Audio {
        /// Target language code
        language: String,
        /// Toolchain error
        #[source]
        source: MediaError,
    },

    /// Working files for the language could not be prepared
    #[error("Failed to prepare working files for {language}: {message}")]
    Workspace {
        /// Target language code
        language: String,
        /// Cause
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the media toolchain
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Input rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Language pipeline failure
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
