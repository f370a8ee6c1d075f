/*!
 * Synthesis adapter.
 *
 * Wraps a `SpeechProvider` for the assembler: picks the voice parameters,
 * retries transient provider errors with exponential backoff and decodes the
 * returned WAV into an `AudioSegment`.
 */

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{SynthesisConfig, VoiceSettings};
use crate::audio::AudioSegment;
use crate::errors::{ProviderError, SynthesisError};
use crate::providers::{SpeechProvider, SynthesisRequest};
use crate::script_parser::Utterance;

/// Provider calls with retry and decoding
#[derive(Debug, Clone)]
pub struct SynthesisAdapter {
    provider: Arc<dyn SpeechProvider>,
    retry_count: u32,
    retry_backoff_ms: u64,
}

impl SynthesisAdapter {
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self {
            provider,
            retry_count: 0,
            retry_backoff_ms: 0,
        }
    }

    /// Adapter using the retry settings of `config`
    pub fn from_config(provider: Arc<dyn SpeechProvider>, config: &SynthesisConfig) -> Self {
        Self::new(provider).with_retries(config.retry_count, config.retry_backoff_ms)
    }

    pub fn with_retries(mut self, retry_count: u32, retry_backoff_ms: u64) -> Self {
        self.retry_count = retry_count;
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    /// Synthesize one utterance with the given voice
    pub async fn synthesize(
        &self,
        utterance: &Utterance,
        voice: &VoiceSettings,
    ) -> Result<AudioSegment, SynthesisError> {
        let text = utterance.normalized_text.trim();
        if text.is_empty() {
            return Err(SynthesisError::EmptyText(utterance.ordinal));
        }

        let request = SynthesisRequest::new(text, voice.voice_id.as_str())
            .rate(voice.rate_pct)
            .pitch(voice.pitch_hz);

        let bytes = self.call_with_retry(request, utterance.ordinal).await?;
        let segment = AudioSegment::from_wav_bytes(&bytes)?;
        if segment.is_empty() {
            return Err(SynthesisError::InvalidAudio(format!(
                "Provider returned no samples for utterance {}",
                utterance.ordinal
            )));
        }

        debug!(
            "Utterance {} ({}) synthesized: {} ms at {} Hz",
            utterance.ordinal,
            utterance.speaker,
            segment.duration_ms(),
            segment.sample_rate
        );
        Ok(segment)
    }

    async fn call_with_retry(
        &self,
        request: SynthesisRequest,
        ordinal: usize,
    ) -> Result<Vec<u8>, ProviderError> {
        let mut attempt = 0u32;
        loop {
            match self.provider.synthesize(request.clone()).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.is_transient() && attempt < self.retry_count => {
                    let backoff = self.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        "Synthesis of utterance {} failed ({}), retrying in {} ms",
                        ordinal, e, backoff
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
