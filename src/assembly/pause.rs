/*!
 * Pause policies.
 *
 * A pause policy decides how much silence follows an utterance. The
 * punctuation policy reads the end of the normalized text; the speaker-turn
 * policy used for Q&A gives each speaker a fixed pause and falls back to
 * punctuation for everybody else.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::app_config::PauseConfig;
use crate::script_parser::Utterance;

/// Abbreviations that end with a period without ending a sentence
const ABBREVIATIONS: [&str; 9] = ["mr.", "mrs.", "ms.", "dr.", "st.", "etc.", "e.g.", "i.e.", "vs."];

// @const: Time of day at the very end of a line
static TRAILING_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d:])\d{1,2}:\d{2}(?::\d{2})?(?:\s?[AaPp]\.?[Mm]\.?)?$").unwrap()
});

/// Why a pause has its length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// `. ! ?`
    SentenceEnd,
    /// `, ; :`
    ClauseEnd,
    /// No terminal punctuation
    Default,
    /// Abbreviation, not a real boundary
    Abbreviation,
    /// Line ends with a time of day
    TimeOfDay,
    /// Configured pause for the speaker's turn
    SpeakerTurn,
}

/// Silence after a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseSpec {
    pub duration_ms: u64,
    pub reason: PauseReason,
}

impl PauseSpec {
    pub fn new(duration_ms: u64, reason: PauseReason) -> Self {
        Self { duration_ms, reason }
    }
}

/// Strategy mapping an utterance to the pause that follows it
pub trait PausePolicy: Send + Sync + Debug {
    fn pause_after(&self, utterance: &Utterance) -> PauseSpec;
}

/// Whether the text ends with a known abbreviation
pub fn ends_with_abbreviation(text: &str) -> bool {
    text.split_whitespace()
        .next_back()
        .map(|word| {
            let word = word.trim_start_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            ABBREVIATIONS.contains(&word.as_str())
        })
        .unwrap_or(false)
}

/// Whether the text ends with a time of day and no punctuation after it
pub fn ends_with_time_of_day(text: &str) -> bool {
    TRAILING_TIME_REGEX.is_match(text.trim_end())
}

/// Pause chosen from the last character of the normalized text
#[derive(Debug, Clone, PartialEq)]
pub struct PunctuationPolicy {
    pub long_ms: u64,
    pub short_ms: u64,
    pub default_ms: u64,
    pub minimal_ms: u64,
}

impl PunctuationPolicy {
    pub fn new(pauses: &PauseConfig, default_ms: u64) -> Self {
        Self {
            long_ms: pauses.long_ms,
            short_ms: pauses.short_ms,
            default_ms,
            minimal_ms: pauses.minimal_ms,
        }
    }
}

impl PausePolicy for PunctuationPolicy {
    fn pause_after(&self, utterance: &Utterance) -> PauseSpec {
        if ends_with_abbreviation(&utterance.normalized_text) {
            return PauseSpec::new(0, PauseReason::Abbreviation);
        }
        if ends_with_time_of_day(&utterance.raw_text) {
            return PauseSpec::new(self.minimal_ms, PauseReason::TimeOfDay);
        }

        match utterance.normalized_text.trim_end().chars().next_back() {
            Some('.' | '!' | '?') => PauseSpec::new(self.long_ms, PauseReason::SentenceEnd),
            Some(',' | ';' | ':') => PauseSpec::new(self.short_ms, PauseReason::ClauseEnd),
            _ => PauseSpec::new(self.default_ms, PauseReason::Default),
        }
    }
}

/// Fixed pause per speaker, punctuation for the rest
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerTurnPolicy {
    turns: HashMap<String, u64>,
    fallback: PunctuationPolicy,
}

impl SpeakerTurnPolicy {
    pub fn new(fallback: PunctuationPolicy) -> Self {
        Self {
            turns: HashMap::new(),
            fallback,
        }
    }

    /// Set the pause after `speaker`'s turns
    pub fn with_turn(mut self, speaker: impl Into<String>, pause_ms: u64) -> Self {
        self.turns.insert(speaker.into(), pause_ms);
        self
    }
}

impl PausePolicy for SpeakerTurnPolicy {
    fn pause_after(&self, utterance: &Utterance) -> PauseSpec {
        if ends_with_abbreviation(&utterance.normalized_text) {
            return PauseSpec::new(0, PauseReason::Abbreviation);
        }
        match self.turns.get(&utterance.speaker) {
            Some(pause_ms) => PauseSpec::new(*pause_ms, PauseReason::SpeakerTurn),
            None => self.fallback.pause_after(utterance),
        }
    }
}
