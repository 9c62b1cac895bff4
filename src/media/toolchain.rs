/*!
 * ffmpeg / ffprobe invocation.
 *
 * Every media operation in the pipeline is expressed as an `FfmpegCommand`
 * and executed through the `MediaToolchain` trait. The production
 * implementation shells out to the configured executables; tests substitute
 * a scripted toolchain that records commands and fabricates outputs.
 */

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::app_config::MediaConfig;
use crate::errors::MediaError;
use crate::file_utils::FileManager;

/// One ffmpeg invocation: a label for logs and errors, the argument list and
/// the file it is expected to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    pub label: String,
    pub args: Vec<String>,
    pub output: PathBuf,
}

impl FfmpegCommand {
    /// Start a command; `-y` is always set so reruns overwrite stale outputs
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            args: vec!["-y".to_string(), "-hide_banner".to_string()],
            output: PathBuf::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add `-i <path>`
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        let path = path.as_ref().to_string_lossy().to_string();
        self.arg("-i").arg(path)
    }

    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }

    /// Full argument vector, output path last
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push(self.output.to_string_lossy().to_string());
        argv
    }

    /// Whether any argument equals `needle`
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|arg| arg == needle)
    }

    /// Value following a flag, e.g. `value_of("-filter_complex")`
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }
}

/// The external media toolchain
#[async_trait]
pub trait MediaToolchain: Send + Sync + Debug {
    /// Run one ffmpeg command; Ok means the tool reported success
    async fn run(&self, command: &FfmpegCommand) -> Result<(), MediaError>;

    /// Container duration of a media file
    async fn probe_duration(&self, input: &Path) -> Result<Duration, MediaError>;
}

/// Check the success criterion shared by every media step: the output exists
/// and is non-empty.
pub fn verify_output(command: &FfmpegCommand) -> Result<(), MediaError> {
    if FileManager::is_non_empty_file(&command.output) {
        Ok(())
    } else {
        Err(MediaError::EmptyOutput {
            label: command.label.clone(),
            path: command.output.display().to_string(),
        })
    }
}

/// Run a command and verify its output in one step
pub async fn run_verified(toolchain: &dyn MediaToolchain, command: &FfmpegCommand) -> Result<(), MediaError> {
    toolchain.run(command).await?;
    verify_output(command)
}

/// Remove a previous output so that a failed run cannot pass verification
pub fn remove_stale_output(path: &Path) -> Result<(), MediaError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MediaError::Io(e)),
    }
}

/// Toolchain backed by the ffmpeg and ffprobe executables
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegCli {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            timeout: config.timeout(),
        }
    }

    /// Filter ffmpeg stderr to only show meaningful error lines, stripping the
    /// version banner, build configuration, and stream metadata noise.
    pub fn filter_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "ffprobe version",
            "built with",
            "configuration:",
            "lib",
            "Input #",
            "Metadata:",
            "Duration:",
            "Chapter",
            "Stream #",
            "Output #",
            "Stream mapping:",
            "Press [q]",
            "encoder",
            "major_brand",
            "minor_version",
            "compatible_brands",
            "handler_name",
            "vendor_id",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }

    async fn output_with_timeout(
        &self,
        program: &str,
        label: &str,
        args: &[String],
    ) -> Result<std::process::Output, MediaError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        tokio::select! {
            result = child => result.map_err(|source| MediaError::Spawn {
                program: program.to_string(),
                source,
            }),
            _ = tokio::time::sleep(self.timeout) => Err(MediaError::Timeout {
                label: label.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl MediaToolchain for FfmpegCli {
    async fn run(&self, command: &FfmpegCommand) -> Result<(), MediaError> {
        let argv = command.argv();
        debug!("Running command ({}): {} {}", command.label, self.ffmpeg_path, argv.join(" "));

        let output = self
            .output_with_timeout(&self.ffmpeg_path, &command.label, &argv)
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::ToolFailed {
                label: command.label.clone(),
                stderr: Self::filter_stderr(&stderr),
            });
        }

        Ok(())
    }

    async fn probe_duration(&self, input: &Path) -> Result<Duration, MediaError> {
        if !input.exists() {
            return Err(MediaError::MissingInput(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }

        let args: Vec<String> = [
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(input.to_string_lossy().to_string()))
        .collect();

        let output = self.output_with_timeout(&self.ffprobe_path, "probe", &args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() || stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::ProbeError(format!(
                "Failed to get video duration: {}",
                Self::filter_stderr(&stderr)
            )));
        }

        parse_probe_duration(&stdout)
    }
}

/// Parse the `format=duration` value printed by ffprobe
pub fn parse_probe_duration(stdout: &str) -> Result<Duration, MediaError> {
    let value = stdout.lines().next().unwrap_or_default().trim();
    let secs: f64 = value
        .parse()
        .map_err(|_| MediaError::ProbeError(format!("Unexpected duration value: '{}'", value)))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(MediaError::ProbeError(format!("Invalid duration: {}", secs)));
    }

    Ok(Duration::from_secs_f64(secs))
}
