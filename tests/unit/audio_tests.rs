/*!
 * Tests for audio buffers, WAV IO and effects
 */

use anyhow::Result;
use std::fs::File;

use storyvox::audio::effects::{self, CompressorSettings};
use storyvox::audio::{AudioSegment, ms_to_samples, samples_to_ms};
use crate::common;

#[test]
fn test_msSampleConversions_shouldRoundTripWholeMilliseconds() {
    for rate in [8_000, 16_000, 22_050, 24_000, 44_100] {
        for ms in [0, 1, 50, 999, 12_345] {
            assert_eq!(samples_to_ms(ms_to_samples(ms, rate), rate), ms);
        }
    }
}

#[test]
fn test_writeWav_shouldProduceMono16BitFile() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("tone.wav");
    let segment = AudioSegment::new(vec![0.25; 24_000], 24_000);

    segment.write_wav(File::create(&path)?)?;

    let reader = hound::WavReader::open(&path)?;
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, 24_000);
    assert_eq!(reader.duration(), 24_000);
    Ok(())
}

#[test]
fn test_effectsChain_shouldKeepLengthAndHeadroom() {
    let samples = (0..16_000).map(|i| if i % 2 == 0 { 0.9 } else { -0.9 }).collect();
    let mut segment = AudioSegment::new(samples, 16_000);

    effects::normalize_peak(&mut segment, 0.1);
    effects::compress(&mut segment, &CompressorSettings::default());
    effects::fade_in(&mut segment, 50);
    effects::fade_out(&mut segment, 50);

    assert_eq!(segment.len(), 16_000);
    assert!(effects::peak(&segment) <= effects::db_to_gain(-0.1) + 1e-6);
    assert_eq!(segment.samples[0], 0.0);
}

#[test]
fn test_resampled_shouldKeepDurationAtNewRate() -> Result<()> {
    let segment = AudioSegment::new(vec![0.1; 800], 8_000);

    let resampled = segment.resampled(24_000)?;

    assert_eq!(resampled.sample_rate, 24_000);
    assert_eq!(resampled.len(), 2_400);
    assert_eq!(resampled.duration_ms(), segment.duration_ms());
    Ok(())
}
