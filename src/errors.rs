/*!
 * Error types for the storyvox application.
 *
 * This module contains custom error types for the different stages of the
 * narration pipeline, using the thiserror crate for ergonomic error definitions.
 *
 * Normalization and script parsing never fail, so they have no error type here.
 */

use thiserror::Error;

/// Errors that can occur when talking to a speech synthesis provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider did not answer in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Whether retrying the same request could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::RequestFailed(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors for a single utterance's synthesis.
///
/// These are recoverable: the assembler logs them and skips the utterance.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider returned bytes that are not decodable audio
    #[error("Invalid audio returned by provider: {0}")]
    InvalidAudio(String),

    /// The audio could not be converted to the output sample rate
    #[error("Resampling failed: {0}")]
    Resampling(String),

    /// Nothing to synthesize after normalization
    #[error("Utterance {0} has no speakable text")]
    EmptyText(usize),
}

/// Fatal errors of one narration request
#[derive(Error, Debug)]
pub enum NarrationError {
    /// Empty or unparseable script, no utterances produced
    #[error("Input error: {0}")]
    Input(String),

    /// No usable segments were synthesized
    #[error("Assembly error: {0}")]
    Assembly(String),

    /// The final artifact could not be written
    #[error("Export error: {0}")]
    Export(String),

    /// The request was abandoned before completion
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl From<std::io::Error> for NarrationError {
    fn from(error: std::io::Error) -> Self {
        Self::Export(error.to_string())
    }
}

impl From<hound::Error> for NarrationError {
    fn from(error: hound::Error) -> Self {
        Self::Export(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a narration request
    #[error("Narration error: {0}")]
    Narration(#[from] NarrationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
