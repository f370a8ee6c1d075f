use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::audio::effects::CompressorSettings;

/// Application configuration module
/// This module handles the settings store: loading, validating and saving
/// the narration settings. Every narration request receives the config
/// explicitly; nothing reads it from global state.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Synthesis provider and throttling
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Segment processing
    #[serde(default)]
    pub audio: AudioConfig,

    /// Pause table of the punctuation policy
    #[serde(default)]
    pub pauses: PauseConfig,

    /// Caption generation
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Request-level limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Where artifacts go
    #[serde(default)]
    pub output: OutputConfig,

    /// Per-mode voices and pauses
    #[serde(default)]
    pub modes: ModesConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: JSON-over-HTTP synthesis service
    #[default]
    Http,
    // @provider: Built-in tone generator
    Mock,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Http => "HTTP",
            Self::Mock => "Mock",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Synthesis provider configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SynthesisConfig {
    // @field: Provider type identifier
    #[serde(default)]
    pub provider: ProviderKind,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Longest text sent in one call, 0 disables splitting
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Timeout seconds per call
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between consecutive requests (in milliseconds)
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Upper bound of the random extra delay (in milliseconds)
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            endpoint: default_endpoint(),
            api_key: String::new(),
            concurrent_requests: default_concurrent_requests(),
            max_chars_per_request: default_max_chars_per_request(),
            timeout_secs: default_request_timeout_secs(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            jitter_ms: default_jitter_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Segment processing configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AudioConfig {
    /// Sample rate of the exported artifact
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Headroom left by peak normalization
    #[serde(default = "default_headroom_db")]
    pub headroom_db: f32,

    /// Fade in/out length per segment
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,

    /// Compressor threshold in dBFS
    #[serde(default = "default_threshold_db")]
    pub compressor_threshold_db: f32,

    /// Compressor ratio
    #[serde(default = "default_ratio")]
    pub compressor_ratio: f32,

    /// Compressor attack
    #[serde(default = "default_attack_ms")]
    pub compressor_attack_ms: f32,

    /// Compressor release
    #[serde(default = "default_release_ms")]
    pub compressor_release_ms: f32,
}

impl AudioConfig {
    pub fn compressor(&self) -> CompressorSettings {
        CompressorSettings {
            threshold_db: self.compressor_threshold_db,
            ratio: self.compressor_ratio,
            attack_ms: self.compressor_attack_ms,
            release_ms: self.compressor_release_ms,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            headroom_db: default_headroom_db(),
            fade_ms: default_fade_ms(),
            compressor_threshold_db: default_threshold_db(),
            compressor_ratio: default_ratio(),
            compressor_attack_ms: default_attack_ms(),
            compressor_release_ms: default_release_ms(),
        }
    }
}

/// Pause table used after each segment
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PauseConfig {
    /// After `. ! ?`
    #[serde(default = "default_long_pause_ms")]
    pub long_ms: u64,

    /// After `, ; :`
    #[serde(default = "default_short_pause_ms")]
    pub short_ms: u64,

    /// After a trailing time of day
    #[serde(default = "default_minimal_pause_ms")]
    pub minimal_ms: u64,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            long_ms: default_long_pause_ms(),
            short_ms: default_short_pause_ms(),
            minimal_ms: default_minimal_pause_ms(),
        }
    }
}

/// Configuration for caption generation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CaptionConfig {
    /// Longest cue text before splitting
    #[serde(default = "default_max_caption_chars")]
    pub max_chars: usize,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_caption_chars(),
        }
    }
}

/// Request-level limits
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Whole-request timeout
    #[serde(default = "default_pipeline_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_pipeline_timeout_secs(),
        }
    }
}

/// Output location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Parent directory of the per-request output scopes
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// Voice parameters for one speaker
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VoiceSettings {
    // @field: Provider voice identifier
    pub voice_id: String,

    // @field: Rate change in percent
    #[serde(default)]
    pub rate_pct: i32,

    // @field: Pitch change in Hz
    #[serde(default)]
    pub pitch_hz: i32,

    // @field: Volume in percent, 100 is unchanged
    #[serde(default = "default_volume_pct")]
    pub volume_pct: u32,
}

impl VoiceSettings {
    pub fn new(voice_id: impl Into<String>, rate_pct: i32) -> Self {
        Self {
            voice_id: voice_id.into(),
            rate_pct,
            pitch_hz: 0,
            volume_pct: default_volume_pct(),
        }
    }
}

/// Single narrator settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SingleModeConfig {
    #[serde(default = "default_primary_voice")]
    pub voice: VoiceSettings,

    /// Pause when a line ends without punctuation
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl Default for SingleModeConfig {
    fn default() -> Self {
        Self {
            voice: default_primary_voice(),
            pause_ms: default_pause_ms(),
            repeat: default_repeat(),
        }
    }
}

/// Question and answer settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DialogueModeConfig {
    #[serde(default = "default_question_voice")]
    pub question: VoiceSettings,

    #[serde(default = "default_answer_voice")]
    pub answer: VoiceSettings,

    /// Pause after a question
    #[serde(default = "default_question_pause_ms")]
    pub question_pause_ms: u64,

    /// Pause after an answer
    #[serde(default = "default_pause_ms")]
    pub answer_pause_ms: u64,

    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl Default for DialogueModeConfig {
    fn default() -> Self {
        Self {
            question: default_question_voice(),
            answer: default_answer_voice(),
            question_pause_ms: default_question_pause_ms(),
            answer_pause_ms: default_pause_ms(),
            repeat: default_repeat(),
        }
    }
}

/// Multi-character settings. The narrator reads with the first character's
/// voice.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MultiModeConfig {
    #[serde(default = "default_characters")]
    pub characters: Vec<VoiceSettings>,

    /// Default pause between lines
    #[serde(default = "default_pause_ms")]
    pub pause_between_ms: u64,

    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl Default for MultiModeConfig {
    fn default() -> Self {
        Self {
            characters: default_characters(),
            pause_between_ms: default_pause_ms(),
            repeat: default_repeat(),
        }
    }
}

/// Settings for every narration mode
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ModesConfig {
    #[serde(default)]
    pub single: SingleModeConfig,

    #[serde(default)]
    pub dialogue: DialogueModeConfig,

    #[serde(default)]
    pub multi: MultiModeConfig,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:5002".to_string()
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_max_chars_per_request() -> usize {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_rate_limit_delay_ms() -> u64 {
    100
}

fn default_jitter_ms() -> u64 {
    200
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500 // doubled on each retry
}

fn default_sample_rate() -> u32 {
    24_000
}

fn default_headroom_db() -> f32 {
    0.1
}

fn default_fade_ms() -> u64 {
    50
}

fn default_threshold_db() -> f32 {
    -20.0
}

fn default_ratio() -> f32 {
    4.0
}

fn default_attack_ms() -> f32 {
    5.0
}

fn default_release_ms() -> f32 {
    50.0
}

fn default_long_pause_ms() -> u64 {
    700
}

fn default_short_pause_ms() -> u64 {
    350
}

fn default_minimal_pause_ms() -> u64 {
    150
}

fn default_max_caption_chars() -> usize {
    120
}

fn default_pipeline_timeout_secs() -> u64 {
    600
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_volume_pct() -> u32 {
    100
}

fn default_pause_ms() -> u64 {
    500
}

fn default_question_pause_ms() -> u64 {
    300
}

fn default_repeat() -> u32 {
    1
}

fn default_primary_voice() -> VoiceSettings {
    VoiceSettings::new("vi-VN-HoaiMyNeural", 0)
}

fn default_question_voice() -> VoiceSettings {
    VoiceSettings::new("vi-VN-HoaiMyNeural", -10)
}

fn default_answer_voice() -> VoiceSettings {
    VoiceSettings::new("vi-VN-NamMinhNeural", -15)
}

fn default_characters() -> Vec<VoiceSettings> {
    vec![
        VoiceSettings::new("vi-VN-HoaiMyNeural", -10),
        VoiceSettings::new("vi-VN-NamMinhNeural", -15),
        VoiceSettings::new("vi-VN-HoaiMyNeural", -15),
    ]
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.synthesis.concurrent_requests == 0 {
            return Err(anyhow!("synthesis.concurrent_requests must be at least 1"));
        }

        if self.synthesis.provider == ProviderKind::Http && self.synthesis.endpoint.trim().is_empty() {
            return Err(anyhow!("synthesis.endpoint is required for the http provider"));
        }

        if self.audio.sample_rate < 8_000 || self.audio.sample_rate > 192_000 {
            return Err(anyhow!(
                "audio.sample_rate must be between 8000 and 192000, got {}",
                self.audio.sample_rate
            ));
        }

        if self.audio.compressor_ratio < 1.0 {
            return Err(anyhow!("audio.compressor_ratio must be at least 1.0"));
        }

        if self.captions.max_chars < 10 {
            return Err(anyhow!("captions.max_chars must be at least 10"));
        }

        if self.pipeline.timeout_secs == 0 {
            return Err(anyhow!("pipeline.timeout_secs must be positive"));
        }

        if self.modes.multi.characters.is_empty() {
            return Err(anyhow!("modes.multi.characters needs at least one voice"));
        }

        let voices = std::iter::once(&self.modes.single.voice)
            .chain([&self.modes.dialogue.question, &self.modes.dialogue.answer])
            .chain(self.modes.multi.characters.iter());
        for voice in voices {
            if voice.voice_id.trim().is_empty() {
                return Err(anyhow!("Voice identifiers must not be empty"));
            }
            if voice.volume_pct > 200 {
                return Err(anyhow!(
                    "Volume of voice {} must be at most 200%, got {}",
                    voice.voice_id, voice.volume_pct
                ));
            }
        }

        Ok(())
    }

    /// Load the settings store, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Load the settings store
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the settings store as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            synthesis: SynthesisConfig::default(),
            audio: AudioConfig::default(),
            pauses: PauseConfig::default(),
            captions: CaptionConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
            modes: ModesConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
