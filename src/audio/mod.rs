/*!
 * Audio buffers and WAV IO.
 *
 * Everything downstream of synthesis works on `AudioSegment`: mono `f32`
 * samples in [-1.0, 1.0] plus a sample rate. Provider output of any bit depth
 * or channel count is decoded into it, and the final timeline is encoded back
 * as 16-bit PCM WAV.
 */

pub mod effects;

use std::io::{Cursor, Seek, Write};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::errors::SynthesisError;

// @struct: Mono PCM audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    // @field: Samples in [-1.0, 1.0]
    pub samples: Vec<f32>,

    // @field: Samples per second
    pub sample_rate: u32,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        AudioSegment { samples, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in whole milliseconds, rounded to nearest
    pub fn duration_ms(&self) -> u64 {
        samples_to_ms(self.samples.len(), self.sample_rate)
    }

    /// Decode WAV bytes of any PCM or float layout into mono
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, SynthesisError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| SynthesisError::InvalidAudio(format!("Failed to parse WAV data: {}", e)))?;

        let spec = reader.spec();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(SynthesisError::InvalidAudio(format!(
                "Unsupported WAV layout: {} channel(s) at {} Hz",
                spec.channels, spec.sample_rate
            )));
        }

        let interleaved = read_samples(reader, spec)?;
        let channels = spec.channels as usize;
        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(AudioSegment::new(samples, spec.sample_rate))
    }

    /// Encode as 16-bit PCM mono WAV into any seekable writer
    pub fn write_wav<W: Write + Seek>(&self, writer: W) -> Result<(), hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut wav = WavWriter::new(writer, spec)?;
        for sample in &self.samples {
            wav.write_sample(to_i16(*sample))?;
        }
        wav.finalize()
    }

    /// Encode as in-memory WAV bytes
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_wav(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Convert to another sample rate
    pub fn resampled(&self, to_rate: u32) -> Result<Self, SynthesisError> {
        Ok(AudioSegment::new(resample(&self.samples, self.sample_rate, to_rate)?, to_rate))
    }
}

fn read_samples<R: std::io::Read>(
    mut reader: WavReader<R>,
    spec: WavSpec,
) -> Result<Vec<f32>, SynthesisError> {
    let invalid = |e: hound::Error| SynthesisError::InvalidAudio(format!("Failed to read WAV samples: {}", e));

    match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid),
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            if bits == 0 || bits > 32 {
                return Err(SynthesisError::InvalidAudio(format!(
                    "Unsupported bit depth: {}",
                    bits
                )));
            }
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)
        }
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Number of samples covering `duration_ms`, rounded to nearest
pub fn ms_to_samples(duration_ms: u64, sample_rate: u32) -> usize {
    ((duration_ms as u128 * sample_rate as u128 + 500) / 1000) as usize
}

/// Duration of `samples` in milliseconds, rounded to nearest
pub fn samples_to_ms(samples: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    let rate = sample_rate as u128;
    ((samples as u128 * 1000 + rate / 2) / rate) as u64
}

/// Band-limited sinc resampling.
///
/// The output is aligned with the input (the filter delay is removed) and has
/// exactly `len * to_rate / from_rate` samples, rounded to nearest, so that
/// durations survive the conversion.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, SynthesisError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(SynthesisError::Resampling(format!(
            "Cannot resample from {} Hz to {} Hz",
            from_rate, to_rate
        )));
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(to_rate) / f64::from(from_rate),
        2.0,
        params,
        samples.len(),
        1,
    )
    .map_err(|e| SynthesisError::Resampling(format!("Failed to create resampler: {}", e)))?;

    let delay = resampler.output_delay();
    let waves_in = vec![samples.to_vec()];
    let mut output = resampler
        .process(&waves_in, None)
        .map_err(|e| SynthesisError::Resampling(format!("Resampling failed: {}", e)))?
        .remove(0);

    // Flush the samples still held back by the filter
    let tail = resampler
        .process_partial(None::<&[Vec<f32>]>, None)
        .map_err(|e| SynthesisError::Resampling(format!("Resampling failed: {}", e)))?
        .remove(0);
    output.extend(tail);

    let expected =
        ((samples.len() as u128 * to_rate as u128 + from_rate as u128 / 2) / from_rate as u128) as usize;
    let mut aligned: Vec<f32> = output.into_iter().skip(delay).take(expected).collect();
    aligned.resize(expected, 0.0);
    Ok(aligned)
}
