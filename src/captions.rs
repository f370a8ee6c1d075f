use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::assembly::timeline::Timeline;
use crate::audio::samples_to_ms;
use crate::script_parser::ScriptParser;

// @module: Caption cues derived from a timeline, SRT wire format

// @const: SRT timestamp line
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}:\d{2}:\d{2},\d{3}) --> (\d{2,}:\d{2}:\d{2},\d{3})$").unwrap()
});

// @const: Clause boundary: punctuation followed by whitespace
static CLAUSE_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?;:,]\s+").unwrap());

// @struct: Single caption cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionCue {
    // @field: 1-based sequence number
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Displayed text
    pub text: String,
}

impl CaptionCue {
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        CaptionCue {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an SRT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split([':', ',']).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 || parts[3].len() != 3 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }
}

impl fmt::Display for CaptionCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Render cues as an SRT document
pub fn to_srt(cues: &[CaptionCue]) -> String {
    cues.iter().map(|cue| cue.to_string()).collect()
}

/// Parse an SRT document back into cues
pub fn parse_srt(content: &str) -> Result<Vec<CaptionCue>> {
    let mut cues = Vec::new();

    for (block_number, block) in content
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .enumerate()
    {
        let mut lines = block.lines();
        let index: usize = lines
            .next()
            .unwrap_or_default()
            .trim()
            .parse()
            .with_context(|| format!("Invalid sequence number in block {}", block_number + 1))?;

        let timing = lines.next().unwrap_or_default().trim();
        let caps = TIMESTAMP_REGEX
            .captures(timing)
            .ok_or_else(|| anyhow!("Invalid timing line in block {}: {}", block_number + 1, timing))?;
        let start_ms = CaptionCue::parse_timestamp(&caps[1])?;
        let end_ms = CaptionCue::parse_timestamp(&caps[2])?;

        let text = lines.collect::<Vec<_>>().join("\n");
        if text.trim().is_empty() {
            warn!("Skipping empty caption block {}", index);
            continue;
        }
        cues.push(CaptionCue::new(index, start_ms, end_ms, text));
    }

    Ok(cues)
}

/// Split caption text into chunks of at most `max_chars` characters.
///
/// Splits prefer clause boundaries (punctuation followed by whitespace) and
/// fall back to word boundaries for over-long clauses.
pub fn split_caption_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    let max_chars = max_chars.max(1);
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut clauses = Vec::new();
    let mut last = 0;
    for boundary in CLAUSE_BOUNDARY_REGEX.find_iter(text) {
        // Keep the punctuation mark with its clause
        let mark_end = boundary.start() + 1;
        clauses.push(text[last..mark_end].trim());
        last = boundary.end();
    }
    clauses.push(text[last..].trim());

    let mut pieces = Vec::new();
    for clause in clauses.into_iter().filter(|c| !c.is_empty()) {
        if clause.chars().count() <= max_chars {
            pieces.push(clause.to_string());
        } else {
            pieces.extend(split_at_words(clause, max_chars));
        }
    }

    pack(pieces, max_chars)
}

fn split_at_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    for word in text.split_whitespace() {
        if word.chars().count() <= max_chars {
            pieces.push(word.to_string());
        } else {
            let chars: Vec<char> = word.chars().collect();
            pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
        }
    }
    pack(pieces, max_chars)
}

/// Greedily join pieces with spaces while they fit
fn pack(pieces: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

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

/// Builds caption cues from a timeline
#[derive(Debug, Clone)]
pub struct CaptionGenerator {
    max_chars: usize,
    tag_parser: Option<ScriptParser>,
}

impl CaptionGenerator {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            tag_parser: None,
        }
    }

    /// Strip the speaker tags `parser` recognizes from the start of cue text
    pub fn with_tag_parser(mut self, parser: ScriptParser) -> Self {
        self.tag_parser = Some(parser);
        self
    }

    fn display_text(&self, text: &str) -> String {
        let text = text.trim();
        match &self.tag_parser {
            Some(parser) => parser.strip_speaker_tag(text).trim().to_string(),
            None => text.to_string(),
        }
    }

    /// Walk the timeline and emit cues with exact segment timing
    pub fn generate(&self, timeline: &Timeline) -> Vec<CaptionCue> {
        let sample_rate = timeline.sample_rate();
        let mut cues = Vec::new();

        for (entry, segment_start) in timeline.entries().iter().zip(timeline.start_offsets()) {
            let segment_end = segment_start + entry.segment.len();

            let start_ms = samples_to_ms(segment_start, sample_rate);
            let end_ms = samples_to_ms(segment_end, sample_rate);
            let duration_ms = end_ms.saturating_sub(start_ms);
            if duration_ms == 0 {
                debug!("No caption for zero-length segment {}", entry.ordinal);
                continue;
            }

            let mut chunks = split_caption_text(&self.display_text(&entry.caption_text), self.max_chars);
            if chunks.is_empty() {
                continue;
            }

            // Every chunk needs at least 1 ms
            let allowed = usize::try_from(duration_ms).unwrap_or(usize::MAX);
            if chunks.len() > allowed {
                let tail = chunks.split_off(allowed - 1).join(" ");
                chunks.push(tail);
            }

            let count = chunks.len() as u64;
            let share = duration_ms / count;
            for (i, chunk) in chunks.into_iter().enumerate() {
                let i = i as u64;
                let chunk_start = start_ms + i * share;
                let chunk_end = if i + 1 == count {
                    end_ms
                } else {
                    chunk_start + share
                };
                cues.push(CaptionCue::new(cues.len() + 1, chunk_start, chunk_end, chunk));
            }
        }

        cues
    }
}
