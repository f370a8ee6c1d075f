/*!
 * Script parsing.
 *
 * Splits raw script text into ordered, speaker-attributed utterances.
 * Tagged scripts use `PREFIX: text` lines, untagged scripts turn each
 * non-blank line into an utterance for one implicit speaker.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

// @const: Sentence end followed by whitespace
static SENTENCE_END_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").unwrap());

// @struct: One attributed unit of text to synthesize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    // @field: 1-based position in the script
    pub ordinal: usize,

    // @field: Canonical speaker tag
    pub speaker: String,

    // @field: Text as written, without the speaker tag
    pub raw_text: String,

    // @field: Speakable text, filled by normalization
    pub normalized_text: String,
}

impl Utterance {
    pub fn new(ordinal: usize, speaker: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Utterance {
            ordinal,
            speaker: speaker.into(),
            raw_text: raw_text.into(),
            normalized_text: String::new(),
        }
    }
}

/// How speakers are recognized in a script
#[derive(Debug, Clone)]
enum ParseMode {
    /// Every line belongs to one implicit speaker
    Untagged { speaker: String },

    /// Lines start with one of the recognized prefixes
    Tagged { prefixes: Vec<String>, tag_regex: Option<Regex> },
}

/// Line-oriented script parser
#[derive(Debug, Clone)]
pub struct ScriptParser {
    mode: ParseMode,
}

impl ScriptParser {
    /// Parser for scripts with `PREFIX:` lines. Matching is case-insensitive,
    /// the returned speaker uses the spelling given here.
    pub fn tagged<S: AsRef<str>>(prefixes: &[S]) -> Self {
        let prefixes: Vec<String> = prefixes.iter().map(|p| p.as_ref().to_string()).collect();

        let alternatives = prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        // An empty prefix set recognizes nothing
        let tag_regex = if alternatives.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)^({}):\s*(.*)$", alternatives)).ok()
        };

        ScriptParser {
            mode: ParseMode::Tagged { prefixes, tag_regex },
        }
    }

    /// Parser for plain text read by one speaker
    pub fn untagged(speaker: impl Into<String>) -> Self {
        ScriptParser {
            mode: ParseMode::Untagged { speaker: speaker.into() },
        }
    }

    /// Prefixes this parser recognizes (empty for untagged scripts)
    pub fn prefixes(&self) -> &[String] {
        match &self.mode {
            ParseMode::Tagged { prefixes, .. } => prefixes,
            ParseMode::Untagged { .. } => &[],
        }
    }

    /// Split a script into utterances. Never fails; an unusable script gives
    /// an empty list.
    pub fn parse(&self, raw_text: &str) -> Vec<Utterance> {
        let turns = match &self.mode {
            ParseMode::Untagged { speaker } => raw_text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| (speaker.clone(), line.to_string()))
                .collect::<Vec<_>>(),
            ParseMode::Tagged { prefixes, tag_regex } => {
                Self::parse_tagged(raw_text, prefixes, tag_regex.as_ref())
            }
        };

        turns
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .enumerate()
            .map(|(index, (speaker, text))| Utterance::new(index + 1, speaker, text))
            .collect()
    }

    fn parse_tagged(
        raw_text: &str,
        prefixes: &[String],
        tag_regex: Option<&Regex>,
    ) -> Vec<(String, String)> {
        let mut turns: Vec<(String, Vec<String>)> = Vec::new();
        let mut discarded = 0usize;

        for line in raw_text.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = tag_regex.and_then(|re| re.captures(line)) {
                let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let speaker = prefixes
                    .iter()
                    .find(|p| p.eq_ignore_ascii_case(tag))
                    .cloned()
                    .unwrap_or_else(|| tag.to_string());
                let content = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

                let mut parts = Vec::new();
                if !content.is_empty() {
                    parts.push(content.to_string());
                }
                turns.push((speaker, parts));
            } else if let Some((_, parts)) = turns.last_mut() {
                parts.push(line.to_string());
            } else {
                discarded += 1;
            }
        }

        if discarded > 0 {
            debug!("Discarded {} line(s) before the first speaker tag", discarded);
        }

        turns
            .into_iter()
            .map(|(speaker, parts)| (speaker, parts.join(" ")))
            .collect()
    }

    /// Remove a leading recognized speaker tag from a line of text
    pub fn strip_speaker_tag<'a>(&self, text: &'a str) -> &'a str {
        match &self.mode {
            ParseMode::Tagged { tag_regex: Some(tag_regex), .. } => match tag_regex.captures(text.trim()) {
                Some(caps) => caps.get(2).map(|m| m.as_str()).unwrap_or(text),
                None => text,
            },
            _ => text,
        }
    }
}

/// Split utterances whose text exceeds `max_chars` into several utterances of
/// the same speaker, cutting at sentence ends and then at words. Ordinals are
/// renumbered afterwards. A `max_chars` of zero disables splitting.
pub fn split_long_utterances(utterances: Vec<Utterance>, max_chars: usize) -> Vec<Utterance> {
    if max_chars == 0 {
        return utterances;
    }

    let mut split = Vec::with_capacity(utterances.len());
    for utterance in utterances {
        if utterance.raw_text.chars().count() <= max_chars {
            split.push(utterance);
            continue;
        }

        let chunks = chunk_text(&utterance.raw_text, max_chars);
        debug!(
            "Utterance {} split into {} chunks of at most {} chars",
            utterance.ordinal,
            chunks.len(),
            max_chars
        );
        split.extend(
            chunks
                .into_iter()
                .map(|chunk| Utterance::new(0, utterance.speaker.clone(), chunk)),
        );
    }

    for (index, utterance) in split.iter_mut().enumerate() {
        utterance.ordinal = index + 1;
    }
    split
}

fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for boundary in SENTENCE_END_REGEX.find_iter(text) {
        sentences.push(text[last..boundary.end()].trim());
        last = boundary.end();
    }
    sentences.push(text[last..].trim());

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let pieces = sentences.into_iter().filter(|s| !s.is_empty()).flat_map(|sentence| {
        if sentence.chars().count() <= max_chars {
            vec![sentence.to_string()]
        } else {
            sentence.split_whitespace().map(str::to_string).collect()
        }
    });

    for piece in pieces {
        if current.is_empty() {
            current = piece;
        } else if current.chars().count() + 1 + piece.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&piece);
        } else {
            chunks.push(std::mem::replace(&mut current, piece));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
