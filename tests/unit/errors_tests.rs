/*!
 * Tests for error types and conversions
 */

use storyvox::errors::{AppError, NarrationError, ProviderError, SynthesisError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Service unavailable".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("Service unavailable"));
}

#[test]
fn test_providerError_isTransient_shouldOnlyFlagRetryableErrors() {
    assert!(ProviderError::Timeout(30).is_transient());
    assert!(ProviderError::ConnectionError("reset".to_string()).is_transient());
    assert!(ProviderError::RateLimitExceeded("slow down".to_string()).is_transient());
    assert!(ProviderError::ApiError { status_code: 502, message: String::new() }.is_transient());
    assert!(!ProviderError::ApiError { status_code: 400, message: String::new() }.is_transient());
    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_transient());
}

#[test]
fn test_synthesisError_fromProviderError_shouldWrap() {
    let error: SynthesisError = ProviderError::RequestFailed("boom".to_string()).into();
    assert!(matches!(error, SynthesisError::Provider(_)));
    assert!(error.to_string().contains("boom"));
}

#[test]
fn test_narrationError_fromIoError_shouldBeExportError() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error: NarrationError = io.into();
    assert!(matches!(error, NarrationError::Export(_)));
}

#[test]
fn test_appError_fromNarrationError_shouldDisplayCategory() {
    let error: AppError = NarrationError::Input("empty script".to_string()).into();
    let display = error.to_string();
    assert!(display.contains("Narration error"));
    assert!(display.contains("empty script"));
}
