use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::errors::ProviderError;
use crate::providers::{SpeechProvider, SynthesisRequest};

/// Client for a JSON synthesis endpoint that answers with WAV audio
#[derive(Debug)]
pub struct HttpSpeechProvider {
    /// HTTP client for API requests
    client: Client,
    /// Synthesis endpoint URL
    endpoint: String,
    /// Bearer token, empty for unauthenticated endpoints
    api_key: String,
    /// Per-request timeout
    timeout_secs: u64,
}

/// Request body sent to the endpoint
#[derive(Debug, Serialize)]
struct HttpSynthesisBody<'a> {
    text: &'a str,
    voice: &'a str,
    rate: String,
    pitch: String,
    format: &'static str,
}

impl HttpSpeechProvider {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs.max(1)))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout_secs,
        }
    }

    fn synthesis_url(&self) -> String {
        format!("{}/synthesize", self.endpoint.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.endpoint.trim_end_matches('/'))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.api_key)
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ProviderError::ConnectionError(e.to_string())
        } else {
            ProviderError::RequestFailed(e.to_string())
        }
    }
}

/// Map a non-success HTTP status onto the provider error taxonomy
pub fn status_to_error(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl SpeechProvider for HttpSpeechProvider {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let body = HttpSynthesisBody {
            text: &request.text,
            voice: &request.voice_id,
            rate: request.rate_string(),
            pitch: request.pitch_string(),
            format: "wav",
        };

        debug!("Synthesizing {} chars with voice {}", request.text.len(), request.voice_id);

        let response = self
            .authorize(self.client.post(self.synthesis_url()))
            .header("Accept", "audio/wav")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Synthesis API error ({}): {}", status, error_text);
            return Err(status_to_error(status, error_text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read audio body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self
            .authorize(self.client.get(self.health_url()))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(status_to_error(status, error_text))
        }
    }
}
