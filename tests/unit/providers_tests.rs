/*!
 * Tests for speech provider implementations
 */

use storyvox::app_config::{ProviderKind, SynthesisConfig};
use storyvox::audio::AudioSegment;
use storyvox::errors::ProviderError;
use storyvox::providers::mock::MockSpeechProvider;
use storyvox::providers::{self, SpeechProvider, SynthesisRequest};

#[tokio::test]
async fn test_mockProvider_working_shouldReturnToneOfExpectedLength() {
    let provider = MockSpeechProvider::working().with_sample_rate(8_000).with_ms_per_char(10);

    let bytes = provider
        .synthesize(SynthesisRequest::new("hello", "voice-a"))
        .await
        .unwrap();
    let segment = AudioSegment::from_wav_bytes(&bytes).unwrap();

    assert_eq!(segment.sample_rate, 8_000);
    assert_eq!(segment.duration_ms(), 50);
    assert_eq!(provider.expected_duration_ms("hello"), 50);
}

#[tokio::test]
async fn test_mockProvider_intermittent_shouldFailEveryNthRequest() {
    let provider = MockSpeechProvider::intermittent(3);
    let mut failures = 0;

    for i in 0..6 {
        let result = provider
            .synthesize(SynthesisRequest::new(format!("line {}", i), "v"))
            .await;
        if let Err(ProviderError::ApiError { status_code, .. }) = result {
            assert_eq!(status_code, 503);
            failures += 1;
        }
    }

    assert_eq!(failures, 2);
    assert_eq!(provider.request_count(), 6);
}

#[tokio::test]
async fn test_mockProvider_failingOn_shouldOnlyFailMarkedText() {
    let provider = MockSpeechProvider::failing_on("poison");

    assert!(provider.synthesize(SynthesisRequest::new("fine", "v")).await.is_ok());
    assert!(provider.synthesize(SynthesisRequest::new("poison pill", "v")).await.is_err());
}

#[tokio::test]
async fn test_mockProvider_clone_shouldShareRequestLog() {
    let provider = MockSpeechProvider::working();
    let clone = provider.clone();

    clone
        .synthesize(SynthesisRequest::new("hi", "v").rate(-15).pitch(3))
        .await
        .unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].rate_string(), "-15%");
    assert_eq!(requests[0].pitch_string(), "+3Hz");
}

#[tokio::test]
async fn test_mockProvider_testConnection_shouldReflectBehavior() {
    assert!(MockSpeechProvider::working().test_connection().await.is_ok());
    assert!(MockSpeechProvider::failing().test_connection().await.is_err());
}

#[tokio::test]
async fn test_fromConfig_withMockKind_shouldBuildWorkingProvider() {
    let config = SynthesisConfig {
        provider: ProviderKind::Mock,
        ..SynthesisConfig::default()
    };

    let provider = providers::from_config(&config);
    let bytes = provider.synthesize(SynthesisRequest::new("abc", "v")).await.unwrap();
    assert!(AudioSegment::from_wav_bytes(&bytes).is_ok());
}

#[tokio::test]
async fn test_fromConfig_withUnreachableEndpoint_shouldFailConnection() {
    let config = SynthesisConfig {
        provider: ProviderKind::Http,
        endpoint: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
        ..SynthesisConfig::default()
    };

    let provider = providers::from_config(&config);
    let error = provider.test_connection().await.unwrap_err();
    assert!(matches!(
        error,
        ProviderError::ConnectionError(_) | ProviderError::Timeout(_) | ProviderError::RequestFailed(_)
    ));
}
