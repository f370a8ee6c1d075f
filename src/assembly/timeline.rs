use crate::audio::{AudioSegment, ms_to_samples, samples_to_ms};
use crate::errors::SynthesisError;

use super::pause::PauseSpec;

// @struct: One placed segment
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    // @field: Processed audio at the timeline rate
    pub segment: AudioSegment,

    // @field: Silence after the segment, none after the last one
    pub pause: Option<PauseSpec>,

    // @field: Text shown in captions
    pub caption_text: String,

    // @field: Speaker tag
    pub speaker: String,

    // @field: Utterance ordinal
    pub ordinal: usize,

    // @field: Repetition pass, 1-based
    pub pass: u32,
}

impl TimelineEntry {
    /// Samples of silence after this entry
    pub fn pause_samples(&self, sample_rate: u32) -> usize {
        self.pause
            .map(|p| ms_to_samples(p.duration_ms, sample_rate))
            .unwrap_or(0)
    }
}

/// Ordered segments with the pauses between them.
///
/// Positions are tracked in samples so that caption timing and the rendered
/// artifact agree exactly.
#[derive(Debug, Clone)]
pub struct Timeline {
    sample_rate: u32,
    entries: Vec<TimelineEntry>,
    total_samples: usize,
}

impl Timeline {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            entries: Vec::new(),
            total_samples: 0,
        }
    }

    /// Append an entry, resampling its audio to the timeline rate
    pub fn push(&mut self, mut entry: TimelineEntry) -> Result<(), SynthesisError> {
        if entry.segment.sample_rate != self.sample_rate {
            entry.segment = entry.segment.resampled(self.sample_rate)?;
        }
        self.total_samples += entry.segment.len() + entry.pause_samples(self.sample_rate);
        self.entries.push(entry);
        Ok(())
    }

    /// Drop the pause after the final entry
    pub fn close(&mut self) {
        let sample_rate = self.sample_rate;
        if let Some(last) = self.entries.last_mut() {
            self.total_samples -= last.pause_samples(sample_rate);
            last.pause = None;
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    pub fn duration_ms(&self) -> u64 {
        samples_to_ms(self.total_samples, self.sample_rate)
    }

    /// Sample offset at which each entry starts
    pub fn start_offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        self.entries
            .iter()
            .map(|entry| {
                let start = offset;
                offset += entry.segment.len() + entry.pause_samples(self.sample_rate);
                start
            })
            .collect()
    }

    /// Concatenate segments and silences into one buffer
    pub fn render(&self) -> AudioSegment {
        let mut samples = Vec::with_capacity(self.total_samples);
        for entry in &self.entries {
            samples.extend_from_slice(&entry.segment.samples);
            samples.resize(samples.len() + entry.pause_samples(self.sample_rate), 0.0);
        }
        AudioSegment::new(samples, self.sample_rate)
    }
}
