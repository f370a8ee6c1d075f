/*!
 * Mock speech provider for tests and dry runs.
 *
 * This module provides a provider that renders a sine tone whose length
 * follows the text length, and that can simulate failures:
 * - `MockSpeechProvider::working()` - Always succeeds
 * - `MockSpeechProvider::intermittent(n)` - Every Nth request fails
 * - `MockSpeechProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::f32::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::audio::AudioSegment;
use crate::errors::ProviderError;
use crate::providers::{SpeechProvider, SynthesisRequest};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a tone
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Fails for any request whose text contains the marker
    FailWhenContains(String),
    /// Returns bytes that are not audio
    InvalidAudio,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider producing deterministic WAV tones
#[derive(Debug)]
pub struct MockSpeechProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Output sample rate
    sample_rate: u32,
    /// Audio length per character of text
    ms_per_char: u64,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every request received, in arrival order
    requests: Arc<Mutex<Vec<SynthesisRequest>>>,
}

impl MockSpeechProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            sample_rate: 16_000,
            ms_per_char: 20,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails on texts containing `marker`
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailWhenContains(marker.into()))
    }

    /// Create a mock that answers slowly
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set the output sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the generated length per character
    pub fn with_ms_per_char(mut self, ms_per_char: u64) -> Self {
        self.ms_per_char = ms_per_char;
        self
    }

    /// Number of synthesize calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of all requests received so far
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().clone()
    }

    /// Length of the tone rendered for `text`
    pub fn expected_duration_ms(&self, text: &str) -> u64 {
        text.chars().count() as u64 * self.ms_per_char
    }

    /// Render a tone as WAV bytes. The pitch depends on the voice so that
    /// speakers are audibly different in dry runs.
    pub fn render_tone(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let duration_ms = self.expected_duration_ms(&request.text);
        let len = crate::audio::ms_to_samples(duration_ms, self.sample_rate);

        let voice_offset = request.voice_id.bytes().map(u32::from).sum::<u32>() % 200;
        let frequency = 220.0 + voice_offset as f32 + request.pitch_hz as f32;
        let rate = self.sample_rate as f32;

        let samples = (0..len)
            .map(|i| 0.3 * (2.0 * PI * frequency * i as f32 / rate).sin())
            .collect();

        AudioSegment::new(samples, self.sample_rate)
            .to_wav_bytes()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to encode tone: {}", e)))
    }
}

impl Clone for MockSpeechProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            sample_rate: self.sample_rate,
            ms_per_char: self.ms_per_char,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Working => self.render_tone(&request),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    self.render_tone(&request)
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailWhenContains(marker) => {
                if request.text.contains(marker.as_str()) {
                    Err(ProviderError::RequestFailed(format!(
                        "Simulated failure for text containing {:?}",
                        marker
                    )))
                } else {
                    self.render_tone(&request)
                }
            }

            MockBehavior::InvalidAudio => Ok(b"not a wav file".to_vec()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                self.render_tone(&request)
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
