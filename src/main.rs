// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use dubweave::app_config::{self, Config};
use dubweave::language_utils::SUPPORTED_LANGUAGES;
use dubweave::{Controller, PipelineReport, RunOptions};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dub a video (or every video in a directory) into the target languages
    Translate(TranslateArgs),

    /// List the supported languages and their default voices
    Languages,

    /// Generate shell completions for dubweave
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Source language code of the spoken audio (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language codes; repeat or separate with commas (e.g., -t es -t fr)
    #[arg(short, long, value_delimiter = ',')]
    target_language: Vec<String>,

    /// Existing SRT for the source language; skips transcription
    #[arg(long, value_name = "SRT")]
    subtitles: Option<PathBuf>,

    /// Directory for subtitles, audio tracks and videos
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output videos
    #[arg(short, long)]
    force_overwrite: bool,
}

/// dubweave - dub videos into other languages
///
/// Transcribes the spoken audio, translates the captions, synthesizes speech
/// aligned to the original timing and muxes it with burned-in subtitles.
#[derive(Parser, Debug)]
#[command(name = "dubweave")]
#[command(version)]
#[command(about = "Video dubbing pipeline")]
#[command(long_about = "dubweave transcribes a video, translates its captions and produces one dubbed video per target language.

EXAMPLES:
    dubweave translate talk.mp4 -s en -t es,fr          # Dub into Spanish and French
    dubweave translate talk.mp4 -t de --subtitles en.srt # Reuse existing English captions
    dubweave translate /videos/ -t ja -f                 # Process a directory, overwrite outputs
    dubweave languages                                   # List supported languages
    dubweave completions bash > dubweave.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Transcription needs transcription.api_key unless
    --subtitles is given.

REQUIREMENTS:
    ffmpeg and ffprobe must be installed (paths configurable under \"media\").")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("dubweave")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set after the config is read
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dubweave", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            for lang in SUPPORTED_LANGUAGES {
                println!("{:<8} {:<22} voice: {}", lang.code, lang.name, lang.voice);
            }
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

/// Load the config file, creating it with defaults when missing
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?;
        Ok(config)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();

        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if !options.target_language.is_empty() {
        config.target_languages = options.target_language.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let run_options = RunOptions {
        subtitles: options.subtitles.clone(),
        force_overwrite: options.force_overwrite,
    };

    if options.input_path.is_file() {
        let report = controller.run(&options.input_path, &run_options).await?;
        print_report(&report);
        if report.all_failed() {
            return Err(anyhow!("No language could be processed"));
        }
    } else if options.input_path.is_dir() {
        let summary = controller.run_folder(&options.input_path, &run_options).await?;
        if summary.processed == 0 && summary.failed > 0 {
            return Err(anyhow!("No video could be processed"));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

fn print_report(report: &PipelineReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(result) if result.subtitles_embedded => {
                info!("{}: {}", outcome.language, result.output_path.display())
            }
            Ok(result) => warn!(
                "{}: {} (created without subtitles)",
                outcome.language,
                result.output_path.display()
            ),
            Err(e) => error!("{}: {}", outcome.language, e),
        }
    }
}
