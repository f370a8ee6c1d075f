/*!
 * In-place DSP passes applied to every synthesized segment.
 */

use super::{AudioSegment, ms_to_samples};

/// Linear amplitude for a dB change
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// dB relative to full scale for a linear amplitude
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * gain.log10()
    }
}

/// Largest absolute sample value
pub fn peak(segment: &AudioSegment) -> f32 {
    segment.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Scale so that the peak sits `headroom_db` below full scale.
/// Silent segments are left alone.
pub fn normalize_peak(segment: &mut AudioSegment, headroom_db: f32) {
    let peak = peak(segment);
    if peak <= f32::EPSILON {
        return;
    }
    let target = db_to_gain(-headroom_db.max(0.0));
    let gain = target / peak;
    for sample in segment.samples.iter_mut() {
        *sample *= gain;
    }
}

/// Apply a fixed gain in dB, clamping to full scale
pub fn apply_gain_db(segment: &mut AudioSegment, db: f32) {
    if db == 0.0 {
        return;
    }
    let gain = db_to_gain(db);
    for sample in segment.samples.iter_mut() {
        *sample = (*sample * gain).clamp(-1.0, 1.0);
    }
}

/// Dynamic range compression parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        CompressorSettings {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 5.0,
            release_ms: 50.0,
        }
    }
}

/// Feed-forward compressor with a peak envelope follower
pub fn compress(segment: &mut AudioSegment, settings: &CompressorSettings) {
    if segment.is_empty() || settings.ratio <= 1.0 {
        return;
    }

    let rate = segment.sample_rate as f32;
    let coefficient = |ms: f32| {
        if ms <= 0.0 {
            0.0
        } else {
            (-1.0 / (ms * rate / 1000.0)).exp()
        }
    };
    let attack = coefficient(settings.attack_ms);
    let release = coefficient(settings.release_ms);
    let slope = 1.0 - 1.0 / settings.ratio;

    let mut envelope = 0.0f32;
    for sample in segment.samples.iter_mut() {
        let level = sample.abs();
        let coeff = if level > envelope { attack } else { release };
        envelope = coeff * envelope + (1.0 - coeff) * level;

        let over = gain_to_db(envelope) - settings.threshold_db;
        if over > 0.0 {
            *sample *= db_to_gain(-over * slope);
        }
    }
}

/// Linear fade from silence over the first `duration_ms`
pub fn fade_in(segment: &mut AudioSegment, duration_ms: u64) {
    let len = ms_to_samples(duration_ms, segment.sample_rate).min(segment.len());
    if len == 0 {
        return;
    }
    for (i, sample) in segment.samples[..len].iter_mut().enumerate() {
        *sample *= i as f32 / len as f32;
    }
}

/// Linear fade to silence over the last `duration_ms`
pub fn fade_out(segment: &mut AudioSegment, duration_ms: u64) {
    let len = ms_to_samples(duration_ms, segment.sample_rate).min(segment.len());
    if len == 0 {
        return;
    }
    let start = segment.len() - len;
    for (i, sample) in segment.samples[start..].iter_mut().enumerate() {
        *sample *= (len - 1 - i) as f32 / len as f32;
    }
}
