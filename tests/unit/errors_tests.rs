/*!
 * Tests for error types and conversions
 */

use std::time::Duration;

use dubweave::errors::{
    AppError, CompositionError, MediaError, PipelineError, ProviderError, SubtitleError, ValidationError,
};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_connectionError_shouldDisplayCorrectly() {
    let error = ProviderError::ConnectionError("Host unreachable".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Connection error"));
    assert!(display.contains("Host unreachable"));
}

#[test]
fn test_mediaError_toolFailed_shouldNameTheInvocation() {
    let error = MediaError::ToolFailed {
        label: "mix".to_string(),
        stderr: "Invalid argument".to_string(),
    };
    assert_eq!(error.to_string(), "mix failed: Invalid argument");

    let timeout = MediaError::Timeout {
        label: "single-pass overlay".to_string(),
        timeout: Duration::from_secs(5),
    };
    assert!(timeout.to_string().starts_with("single-pass overlay timed out"));
}

#[test]
fn test_compositionError_allStrategiesFailed_shouldJoinMessagesInOrder() {
    let error = CompositionError::AllStrategiesFailed {
        messages: vec![
            "Method 1 failed: a".to_string(),
            "Method 2 failed: b".to_string(),
            "Method 3 failed: c".to_string(),
        ],
    };
    assert_eq!(
        error.to_string(),
        "All combination methods failed: Method 1 failed: a; Method 2 failed: b; Method 3 failed: c"
    );
}

#[test]
fn test_validationError_videoTooLong_shouldReportBothDurations() {
    let error = ValidationError::VideoTooLong {
        actual_secs: 754.25,
        max_secs: 600,
    };
    let display = error.to_string();
    assert!(display.contains("754.2") || display.contains("754.3"));
    assert!(display.contains("600 seconds"));
}

#[test]
fn test_pipelineError_composition_shouldKeepSourceChain() {
    let error = PipelineError::Composition {
        language: "es".to_string(),
        source: CompositionError::Precondition("audio file is empty".to_string()),
    };
    assert!(error.to_string().contains("Composition failed for es"));
    let source = std::error::Error::source(&error).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("Composition precondition failed: audio file is empty"));
}

#[test]
fn test_appError_fromVariousErrors_shouldWrapCorrectly() {
    let app: AppError = SubtitleError::Empty.into();
    assert!(matches!(app, AppError::Subtitle(_)));

    let app: AppError = ValidationError::NoTargetLanguages.into();
    assert!(app.to_string().starts_with("Validation error"));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(app.to_string(), "Unknown error: boom");
}
