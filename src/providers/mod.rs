/*!
 * Speech synthesis providers.
 *
 * This module contains client implementations for speech services:
 * - Http: JSON-over-HTTP synthesis endpoint
 * - Mock: Deterministic tone generator for tests and dry runs
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{ProviderKind, SynthesisConfig};
use crate::errors::ProviderError;

/// A single synthesis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Speakable text
    pub text: String,
    /// Provider voice identifier
    pub voice_id: String,
    /// Speaking rate change in percent
    pub rate_pct: i32,
    /// Pitch change in Hz
    pub pitch_hz: i32,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            rate_pct: 0,
            pitch_hz: 0,
        }
    }

    /// Set the rate change
    pub fn rate(mut self, rate_pct: i32) -> Self {
        self.rate_pct = rate_pct;
        self
    }

    /// Set the pitch change
    pub fn pitch(mut self, pitch_hz: i32) -> Self {
        self.pitch_hz = pitch_hz;
        self
    }

    /// Rate in the "+10%" form speech services expect
    pub fn rate_string(&self) -> String {
        format!("{:+}%", self.rate_pct)
    }

    /// Pitch in the "+5Hz" form speech services expect
    pub fn pitch_string(&self) -> String {
        format!("{:+}Hz", self.pitch_hz)
    }
}

/// Common trait for all speech providers
///
/// Implementations return complete WAV files. They must be shareable across
/// the concurrent synthesis tasks of one request.
#[async_trait]
pub trait SpeechProvider: Send + Sync + Debug {
    /// Synthesize one utterance into WAV bytes
    ///
    /// # Arguments
    /// * `request` - Text and voice parameters
    ///
    /// # Returns
    /// * `Result<Vec<u8>, ProviderError>` - The encoded audio or an error
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod http;
pub mod mock;

/// Build the provider selected in the synthesis settings
pub fn from_config(config: &SynthesisConfig) -> Arc<dyn SpeechProvider> {
    match config.provider {
        ProviderKind::Http => Arc::new(http::HttpSpeechProvider::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.timeout_secs,
        )),
        ProviderKind::Mock => Arc::new(mock::MockSpeechProvider::working()),
    }
}
