/*!
 * Segment assembly.
 *
 * This module turns an utterance list into a `Timeline`:
 * - synthesis is dispatched as an ordinal-tagged, bounded task queue
 * - every segment is loudness-normalized, compressed, volume-adjusted and faded
 * - results are re-sorted by (pass, ordinal) and interleaved with pauses
 *
 * A failed synthesis is logged and skipped. Only an empty result is fatal.
 */

pub mod pause;
pub mod timeline;

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::app_config::{Config, VoiceSettings};
use crate::audio::AudioSegment;
use crate::audio::effects::{self, CompressorSettings};
use crate::errors::{NarrationError, SynthesisError};
use crate::normalization::clean_text;
use crate::script_parser::Utterance;
use crate::synthesis::SynthesisAdapter;

use pause::PausePolicy;
use timeline::{Timeline, TimelineEntry};

/// Progress reporting callback: (completed, total)
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Voice parameters per speaker with a fallback for unknown speakers
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfiles {
    profiles: HashMap<String, VoiceSettings>,
    fallback: VoiceSettings,
}

impl VoiceProfiles {
    pub fn new(fallback: VoiceSettings) -> Self {
        Self {
            profiles: HashMap::new(),
            fallback,
        }
    }

    pub fn with_voice(mut self, speaker: impl Into<String>, voice: VoiceSettings) -> Self {
        self.profiles.insert(speaker.into(), voice);
        self
    }

    /// Voice for `speaker`, or the fallback
    pub fn resolve(&self, speaker: &str) -> &VoiceSettings {
        self.profiles.get(speaker).unwrap_or(&self.fallback)
    }
}

/// Processing and throttling parameters of one assembly run
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblySettings {
    pub sample_rate: u32,
    pub headroom_db: f32,
    pub compressor: CompressorSettings,
    pub fade_ms: u64,
    pub concurrency: usize,
    pub rate_limit_delay_ms: u64,
    pub jitter_ms: u64,
}

impl AssemblySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            headroom_db: config.audio.headroom_db,
            compressor: config.audio.compressor(),
            fade_ms: config.audio.fade_ms,
            concurrency: config.synthesis.concurrent_requests.max(1),
            rate_limit_delay_ms: config.synthesis.rate_limit_delay_ms,
            jitter_ms: config.synthesis.jitter_ms,
        }
    }
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Loudness and envelope chain applied to every synthesized segment
pub fn process_segment(
    mut segment: AudioSegment,
    voice: &VoiceSettings,
    settings: &AssemblySettings,
) -> Result<AudioSegment, SynthesisError> {
    effects::normalize_peak(&mut segment, settings.headroom_db);
    effects::compress(&mut segment, &settings.compressor);
    effects::apply_gain_db(&mut segment, voice.volume_pct as f32 - 100.0);
    effects::fade_in(&mut segment, settings.fade_ms);
    effects::fade_out(&mut segment, settings.fade_ms);

    if segment.sample_rate == settings.sample_rate {
        Ok(segment)
    } else {
        segment.resampled(settings.sample_rate)
    }
}

/// Builds timelines from utterances
#[derive(Debug, Clone)]
pub struct SegmentAssembler {
    adapter: SynthesisAdapter,
    settings: AssemblySettings,
}

impl SegmentAssembler {
    pub fn new(adapter: SynthesisAdapter, settings: AssemblySettings) -> Self {
        Self { adapter, settings }
    }

    /// Synthesize every utterance `repeat_count` times and lay the results out
    /// in order.
    pub async fn assemble(
        &self,
        utterances: &[Utterance],
        voices: &VoiceProfiles,
        pause_policy: &dyn PausePolicy,
        repeat_count: u32,
        progress: Option<ProgressCallback>,
    ) -> Result<Timeline, NarrationError> {
        if utterances.is_empty() {
            return Err(NarrationError::Input("No utterances to synthesize".to_string()));
        }

        let passes = repeat_count.max(1);
        let jobs: Vec<(u32, &Utterance)> = (1..=passes)
            .flat_map(|pass| utterances.iter().map(move |u| (pass, u)))
            .collect();
        let total = jobs.len();
        let completed = Arc::new(AtomicUsize::new(0));

        let results = stream::iter(jobs.into_iter().enumerate())
            .map(|(index, (pass, utterance))| {
                let adapter = self.adapter.clone();
                let settings = self.settings.clone();
                let voice = voices.resolve(&utterance.speaker).clone();
                let completed = completed.clone();
                let progress = progress.clone();

                // Spread calls out; the first one goes immediately
                let delay_ms = if index == 0 {
                    0
                } else {
                    settings.rate_limit_delay_ms + jitter(settings.jitter_ms)
                };

                async move {
                    if delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }

                    let result = adapter
                        .synthesize(utterance, &voice)
                        .await
                        .and_then(|segment| process_segment(segment, &voice, &settings));

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = &progress {
                        callback(done, total);
                    }

                    (index, pass, utterance, result)
                }
            })
            .buffer_unordered(self.settings.concurrency)
            .collect::<Vec<_>>()
            .await;

        // Sort results by job index to restore (pass, ordinal) order
        let mut sorted_results = results;
        sorted_results.sort_by_key(|(index, ..)| *index);

        let mut timeline = Timeline::new(self.settings.sample_rate);
        let mut skipped = 0usize;
        for (_, pass, utterance, result) in sorted_results {
            let placed = result.and_then(|segment| {
                let pause = pause_policy.pause_after(utterance);
                debug!(
                    "Placing utterance {} (pass {}): {} ms + {} ms pause ({:?})",
                    utterance.ordinal,
                    pass,
                    segment.duration_ms(),
                    pause.duration_ms,
                    pause.reason
                );
                timeline.push(TimelineEntry {
                    segment,
                    pause: Some(pause),
                    caption_text: clean_text(&utterance.raw_text),
                    speaker: utterance.speaker.clone(),
                    ordinal: utterance.ordinal,
                    pass,
                })
            });
            if let Err(e) = placed {
                skipped += 1;
                log_skipped(utterance, pass, &e);
            }
        }
        timeline.close();

        if timeline.is_empty() {
            return Err(NarrationError::Assembly(format!(
                "No audio segments were synthesized ({} attempted)",
                total
            )));
        }
        if skipped > 0 {
            warn!("{} of {} segments were skipped", skipped, total);
        }

        Ok(timeline)
    }
}

fn jitter(max_ms: u64) -> u64 {
    if max_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..=max_ms)
    }
}

fn log_skipped(utterance: &Utterance, pass: u32, error: &SynthesisError) {
    warn!(
        "Skipping utterance {} ({}, pass {}): {}",
        utterance.ordinal, utterance.speaker, pass, error
    );
}
