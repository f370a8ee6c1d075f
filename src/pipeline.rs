/*!
 * Narration pipeline.
 *
 * Drives one request from script text to a WAV artifact with SRT captions:
 * parse, normalize, assemble, caption, export. The mode decides which
 * speaker tags are recognized, which voices are used and how pauses are
 * chosen. The pipeline never returns an error; every failure becomes a
 * `PipelineStatus`.
 */

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::assembly::pause::{PausePolicy, PunctuationPolicy, SpeakerTurnPolicy};
use crate::assembly::timeline::Timeline;
use crate::assembly::{AssemblySettings, ProgressCallback, SegmentAssembler, VoiceProfiles};
use crate::captions::{CaptionGenerator, to_srt};
use crate::errors::NarrationError;
use crate::file_utils::OutputScope;
use crate::normalization::normalize_utterances;
use crate::providers::SpeechProvider;
use crate::script_parser::{ScriptParser, split_long_utterances};
use crate::synthesis::SynthesisAdapter;

/// Speaker tags of dialogue scripts
pub const DIALOGUE_PREFIXES: [&str; 2] = ["Q", "A"];

/// Speaker tags of multi-character scripts
pub const MULTI_PREFIXES: [&str; 4] = ["CHAR1", "CHAR2", "CHAR3", "NARRATOR"];

/// Implicit speaker of single-narrator scripts
pub const NARRATOR: &str = "NARRATOR";

/// How a script is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationMode {
    Single,
    Dialogue,
    MultiCharacter,
}

impl NarrationMode {
    /// File stem of the artifacts
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Single => "story",
            Self::Dialogue => "dialogue",
            Self::MultiCharacter => "multi_character",
        }
    }

    /// Speaker tags recognized in this mode
    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Single => &[],
            Self::Dialogue => &DIALOGUE_PREFIXES,
            Self::MultiCharacter => &MULTI_PREFIXES,
        }
    }
}

impl fmt::Display for NarrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Dialogue => write!(f, "dialogue"),
            Self::MultiCharacter => write!(f, "multi"),
        }
    }
}

/// One narration request
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationRequest {
    pub mode: NarrationMode,
    pub script: String,
    /// Overrides the mode's configured repeat count
    pub repeat_count: Option<u32>,
}

impl NarrationRequest {
    pub fn new(mode: NarrationMode, script: impl Into<String>) -> Self {
        Self {
            mode,
            script: script.into(),
            repeat_count: None,
        }
    }

    pub fn with_repeat(mut self, repeat_count: u32) -> Self {
        self.repeat_count = Some(repeat_count);
        self
    }
}

/// Result category of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    Success,
    InputError(String),
    AssemblyError(String),
    ExportError(String),
    Cancelled(String),
}

impl PipelineStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure behind a non-success status
    pub fn into_error(self) -> Option<NarrationError> {
        match self {
            Self::Success => None,
            Self::InputError(msg) => Some(NarrationError::Input(msg)),
            Self::AssemblyError(msg) => Some(NarrationError::Assembly(msg)),
            Self::ExportError(msg) => Some(NarrationError::Export(msg)),
            Self::Cancelled(msg) => Some(NarrationError::Cancelled(msg)),
        }
    }
}

impl From<NarrationError> for PipelineStatus {
    fn from(error: NarrationError) -> Self {
        match error {
            NarrationError::Input(msg) => Self::InputError(msg),
            NarrationError::Assembly(msg) => Self::AssemblyError(msg),
            NarrationError::Export(msg) => Self::ExportError(msg),
            NarrationError::Cancelled(msg) => Self::Cancelled(msg),
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Narration generated successfully"),
            Self::InputError(msg) => write!(f, "The script could not be used: {}", msg),
            Self::AssemblyError(msg) => write!(f, "No audio could be produced: {}", msg),
            Self::ExportError(msg) => write!(f, "The output files could not be written: {}", msg),
            Self::Cancelled(msg) => write!(f, "Narration was cancelled: {}", msg),
        }
    }
}

/// What a request produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub artifact: Option<PathBuf>,
    pub captions: Option<PathBuf>,
    pub status: PipelineStatus,
}

impl PipelineOutcome {
    fn failed(status: PipelineStatus) -> Self {
        Self {
            artifact: None,
            captions: None,
            status,
        }
    }
}

/// Parser, voices and pause policy for one mode
struct ModePlan {
    parser: ScriptParser,
    voices: VoiceProfiles,
    pause_policy: Box<dyn PausePolicy>,
    repeat: u32,
}

impl ModePlan {
    fn for_mode(mode: NarrationMode, config: &Config) -> Self {
        let modes = &config.modes;
        match mode {
            NarrationMode::Single => Self {
                parser: ScriptParser::untagged(NARRATOR),
                voices: VoiceProfiles::new(modes.single.voice.clone()),
                pause_policy: Box::new(PunctuationPolicy::new(&config.pauses, modes.single.pause_ms)),
                repeat: modes.single.repeat,
            },
            NarrationMode::Dialogue => {
                let dialogue = &modes.dialogue;
                let punctuation = PunctuationPolicy::new(&config.pauses, dialogue.answer_pause_ms);
                Self {
                    parser: ScriptParser::tagged(mode.prefixes()),
                    voices: VoiceProfiles::new(dialogue.answer.clone())
                        .with_voice("Q", dialogue.question.clone())
                        .with_voice("A", dialogue.answer.clone()),
                    pause_policy: Box::new(
                        SpeakerTurnPolicy::new(punctuation)
                            .with_turn("Q", dialogue.question_pause_ms)
                            .with_turn("A", dialogue.answer_pause_ms),
                    ),
                    repeat: dialogue.repeat,
                }
            }
            NarrationMode::MultiCharacter => {
                let multi = &modes.multi;
                let mut characters = multi.characters.iter();
                // The narrator and missing characters read with the first voice
                let first = characters.next().cloned().unwrap_or_else(|| modes.single.voice.clone());
                let mut voices = VoiceProfiles::new(first.clone()).with_voice("CHAR1", first);
                for (tag, voice) in ["CHAR2", "CHAR3"].into_iter().zip(characters) {
                    voices = voices.with_voice(tag, voice.clone());
                }
                Self {
                    parser: ScriptParser::tagged(mode.prefixes()),
                    voices,
                    pause_policy: Box::new(PunctuationPolicy::new(&config.pauses, multi.pause_between_ms)),
                    repeat: multi.repeat,
                }
            }
        }
    }
}

/// Request orchestrator
#[derive(Debug, Clone)]
pub struct NarrationPipeline {
    provider: Arc<dyn SpeechProvider>,
}

impl NarrationPipeline {
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self { provider }
    }

    /// Generate narration and captions for `request` with `config`
    pub async fn generate(&self, request: &NarrationRequest, config: &Config) -> PipelineOutcome {
        self.generate_with_progress(request, config, None).await
    }

    /// Like `generate`, reporting synthesis progress as (done, total)
    pub async fn generate_with_progress(
        &self,
        request: &NarrationRequest,
        config: &Config,
        progress: Option<ProgressCallback>,
    ) -> PipelineOutcome {
        let outcome = match self.run(request, config, progress).await {
            Ok((artifact, captions)) => PipelineOutcome {
                artifact: Some(artifact),
                captions: Some(captions),
                status: PipelineStatus::Success,
            },
            Err(e) => PipelineOutcome::failed(e.into()),
        };

        if outcome.status.is_success() {
            info!("{}", outcome.status);
        } else {
            error!("{}", outcome.status);
        }
        outcome
    }

    async fn run(
        &self,
        request: &NarrationRequest,
        config: &Config,
        progress: Option<ProgressCallback>,
    ) -> Result<(PathBuf, PathBuf), NarrationError> {
        config
            .validate()
            .map_err(|e| NarrationError::Input(format!("Invalid settings: {}", e)))?;

        let plan = ModePlan::for_mode(request.mode, config);
        let utterances = plan.parser.parse(&request.script);
        if utterances.is_empty() {
            let prefixes = plan.parser.prefixes();
            let hint = if prefixes.is_empty() {
                String::new()
            } else {
                format!(", lines must start with one of {}:", prefixes.join(":, "))
            };
            return Err(NarrationError::Input(format!(
                "No utterances found for {} mode{}",
                request.mode, hint
            )));
        }

        let mut utterances = split_long_utterances(utterances, config.synthesis.max_chars_per_request);
        normalize_utterances(&mut utterances);
        let repeat = request.repeat_count.unwrap_or(plan.repeat).max(1);
        info!(
            "Narrating {} utterance(s) in {} mode, {} pass(es)",
            utterances.len(),
            request.mode,
            repeat
        );

        let scope = OutputScope::create(&config.output.directory)
            .map_err(|e| NarrationError::Export(format!("{:#}", e)))?;

        let assembler = SegmentAssembler::new(
            SynthesisAdapter::from_config(self.provider.clone(), &config.synthesis),
            AssemblySettings::from_config(config),
        );
        let assembly = assembler.assemble(&utterances, &plan.voices, plan.pause_policy.as_ref(), repeat, progress);

        let timeout_secs = config.pipeline.timeout_secs;
        let timeline = tokio::select! {
            result = assembly => result,
            _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
                warn!("Narration timed out after {} s, abandoning in-flight synthesis", timeout_secs);
                Err(NarrationError::Cancelled(format!("timed out after {} s", timeout_secs)))
            }
        };

        let exported = timeline.and_then(|timeline| {
            let generator = CaptionGenerator::new(config.captions.max_chars)
                .with_tag_parser(plan.parser.clone());
            export(&scope, request.mode.file_stem(), &timeline, &generator)
        });

        if exported.is_err() {
            scope.discard();
        }
        exported
    }
}

/// Render the timeline and write `<stem>.wav` and `<stem>.srt` into the scope
fn export(
    scope: &OutputScope,
    stem: &str,
    timeline: &Timeline,
    generator: &CaptionGenerator,
) -> Result<(PathBuf, PathBuf), NarrationError> {
    let cues = generator.generate(timeline);
    let audio = timeline.render().to_wav_bytes()?;

    let artifact = scope
        .write(&format!("{}.wav", stem), &audio)
        .map_err(|e| NarrationError::Export(format!("{:#}", e)))?;
    let captions = scope
        .write(&format!("{}.srt", stem), to_srt(&cues).as_bytes())
        .map_err(|e| NarrationError::Export(format!("{:#}", e)))?;

    info!(
        "Wrote {} ms of audio and {} caption(s) to {:?}",
        timeline.duration_ms(),
        cues.len(),
        scope.dir()
    );
    Ok((artifact, captions))
}
