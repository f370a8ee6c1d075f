// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use storyvox::app_config::{self, Config, ProviderKind};
use storyvox::assembly::ProgressCallback;
use storyvox::errors::AppError;
use storyvox::file_utils::FileManager;
use storyvox::normalization::normalize;
use storyvox::providers;
use storyvox::{NarrationMode, NarrationPipeline, NarrationRequest};

/// CLI Wrapper for NarrationMode to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Single,
    Dialogue,
    Multi,
}

impl From<CliMode> for NarrationMode {
    fn from(cli_mode: CliMode) -> Self {
        match cli_mode {
            CliMode::Single => NarrationMode::Single,
            CliMode::Dialogue => NarrationMode::Dialogue,
            CliMode::Multi => NarrationMode::MultiCharacter,
        }
    }
}

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    Http,
    Mock,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Http => ProviderKind::Http,
            CliProvider::Mock => ProviderKind::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Narrate a script into a WAV file with SRT captions
    Generate(GenerateArgs),

    /// Print the speakable form of a text or text file
    Normalize {
        /// Text to normalize, or a path to a text file
        #[arg(value_name = "TEXT_OR_FILE")]
        input: String,
    },

    /// Generate shell completions for storyvox
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Script file to narrate
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// How the script is read
    #[arg(short, long, value_enum, default_value = "single")]
    mode: CliMode,

    /// Speech provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Number of times the whole script is read
    #[arg(short, long)]
    repeat: Option<u32>,

    /// Parent directory for the output folder
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write the effective settings back to the config file
    #[arg(long)]
    save_settings: bool,
}

/// storyvox - Scripted narration with captions
///
/// Turns a written script into narrated audio with synchronized captions.
#[derive(Parser, Debug)]
#[command(name = "storyvox")]
#[command(version)]
#[command(about = "Script-to-speech narration with SRT captions")]
#[command(long_about = "storyvox reads a script, normalizes it for speech, synthesizes every line and writes a WAV file with matching SRT captions.

EXAMPLES:
    storyvox generate story.txt                        # Single narrator
    storyvox generate -m dialogue interview.txt        # Q: / A: script
    storyvox generate -m multi -r 2 play.txt           # Characters, read twice
    storyvox generate -p mock story.txt                # Dry run with the tone generator
    storyvox normalize \"It costs $20.50 at 3:05 PM\"    # Show the speakable text
    storyvox completions bash > storyvox.bash          # Generate bash completions

CONFIGURATION:
    Settings are stored in conf.json by default. You can specify a different
    file with --config. If the file doesn't exist, a default one is created.
    Command line overrides are only written back with --save-settings.

SCRIPT FORMATS:
    single    - Every non-blank line is read by the narrator
    dialogue  - Lines start with Q: or A:
    multi     - Lines start with CHAR1:, CHAR2:, CHAR3: or NARRATOR:")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();
    if let Some(level) = cli.log_level {
        let level: app_config::LogLevel = level.into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "storyvox", &mut std::io::stdout());
            Ok(())
        }
        Commands::Normalize { input } => run_normalize(&input),
        Commands::Generate(args) => run_generate(args, &cli.config, cli.log_level).await,
    }
}

fn run_normalize(input: &str) -> Result<()> {
    let text = if FileManager::file_exists(input) {
        FileManager::read_to_string(input)?
    } else {
        input.to_string()
    };

    for line in text.lines() {
        println!("{}", normalize(line));
    }
    Ok(())
}

async fn run_generate(args: GenerateArgs, config_path: &str, log_level: Option<CliLogLevel>) -> Result<()> {
    let mut config = Config::load_or_create(config_path)?;

    // Command line overrides apply to this run only
    if let Some(provider) = args.provider {
        config.synthesis.provider = provider.into();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output.directory = output_dir.to_string_lossy().to_string();
    }
    if let Some(level) = log_level {
        config.log_level = level.into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;

    if args.save_settings {
        config.save(config_path)?;
        info!("Settings saved to {}", config_path);
    }

    let script = read_script(&args.script)?;
    let mode: NarrationMode = args.mode.into();
    let mut request = NarrationRequest::new(mode, script);
    if let Some(repeat) = args.repeat {
        request = request.with_repeat(repeat);
    }

    let provider = providers::from_config(&config.synthesis);
    if let Err(e) = provider.test_connection().await {
        warn!("{} provider is not reachable: {}", config.synthesis.provider.display_name(), e);
    }

    info!("storyvox: {} mode with the {} provider", mode, config.synthesis.provider.display_name());

    let progress_bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar.set_message("Synthesizing");

    let bar = progress_bar.clone();
    let progress: ProgressCallback = Arc::new(move |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    });

    let pipeline = NarrationPipeline::new(provider);
    let outcome = pipeline.generate_with_progress(&request, &config, Some(progress)).await;
    progress_bar.finish_and_clear();

    if let (Some(artifact), Some(captions)) = (&outcome.artifact, &outcome.captions) {
        info!("Audio: {:?}", artifact);
        info!("Captions: {:?}", captions);
        return Ok(());
    }

    let error = match outcome.status.into_error() {
        Some(error) => AppError::from(error),
        None => AppError::Unknown("Narration finished without an artifact".to_string()),
    };
    Err(error.into())
}

fn read_script(path: &Path) -> Result<String, AppError> {
    if !FileManager::file_exists(path) {
        return Err(AppError::File(format!("Script file does not exist: {:?}", path)));
    }
    FileManager::read_to_string(path).map_err(|e| AppError::File(format!("{:#}", e)))
}
