/*!
 * Common test utilities for the dubweave test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use dubweave::app_config::Config;
use dubweave::media::MediaToolchain;
use dubweave::providers::SpeechProvider;
use dubweave::providers::mock::{MockSpeechProvider, MockTranscriber, MockTranslator};
use dubweave::Services;


pub use fake_toolchain::FakeToolchain;

/// Three captions: two spoken, one empty and zero-length
pub const THREE_CAPTION_SRT: &str = "1
00:00:00,000 --> 00:00:02,000
Hello

2
00:00:05,000 --> 00:00:07,000
World

3
00:00:10,000 --> 00:00:10,000

";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a placeholder video file (content is irrelevant to the fake toolchain)
pub fn create_test_video(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, "not really a video")
}

/// Config writing everything below `output_dir`, with no retry waits
pub fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.output_dir = output_dir.to_path_buf();
    config.target_languages = vec!["es".to_string()];
    config.speech.retry_backoff_ms = 0;
    config.translation.retry_backoff_ms = 0;
    config
}

/// Services made of mocks plus the given toolchain
pub fn mock_services(speech: Arc<dyn SpeechProvider>, toolchain: Arc<dyn MediaToolchain>) -> Services {
    Services {
        speech,
        translator: Arc::new(MockTranslator::working()),
        transcriber: Arc::new(MockTranscriber::returning(THREE_CAPTION_SRT)),
        toolchain,
    }
}

/// Working speech provider behind the trait object
pub fn working_speech() -> Arc<MockSpeechProvider> {
    Arc::new(MockSpeechProvider::working())
}

/// A fifteen second source video, as used by the timeline scenarios
pub fn fifteen_seconds() -> Duration {
    Duration::from_secs(15)
}
