/*!
 * End-to-end narration tests with the mock provider
 */

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use storyvox::assembly::ProgressCallback;
use storyvox::captions::parse_srt;
use storyvox::file_utils::FileManager;
use storyvox::providers::mock::MockSpeechProvider;
use storyvox::{NarrationMode, NarrationPipeline, NarrationRequest, PipelineStatus};
use crate::common;

fn wav_duration_ms(path: &Path) -> Result<u64> {
    let reader = hound::WavReader::open(path)?;
    let rate = reader.spec().sample_rate as u64;
    Ok((reader.duration() as u64 * 1000 + rate / 2) / rate)
}

#[tokio::test]
async fn test_generate_singleMode_shouldWriteMatchingWavAndSrt() -> Result<()> {
    common::init_test_logging();
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let mock = Arc::new(MockSpeechProvider::working());
    let pipeline = NarrationPipeline::new(mock.clone());

    let outcome = pipeline
        .generate(&NarrationRequest::new(NarrationMode::Single, common::STORY_SCRIPT), &config)
        .await;

    assert_eq!(outcome.status, PipelineStatus::Success);
    let artifact = outcome.artifact.expect("artifact path");
    let captions = outcome.captions.expect("captions path");
    assert_eq!(artifact.file_name().and_then(|n| n.to_str()), Some("story.wav"));
    assert_eq!(captions.file_name().and_then(|n| n.to_str()), Some("story.srt"));
    assert_eq!(artifact.parent(), captions.parent());

    let scope_name = artifact.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()).unwrap_or_default();
    assert!(scope_name.starts_with("output_"));

    let cues = parse_srt(&FileManager::read_to_string(&captions)?)?;
    assert_eq!(cues.len(), 3);
    assert_eq!(cues[1].text, "It cost $20.50 at 3:05 PM.");
    for pair in cues.windows(2) {
        assert!(pair[1].start_ms >= pair[0].end_ms);
    }

    let audio_ms = wav_duration_ms(&artifact)?;
    let last_end = cues.last().map(|c| c.end_ms).unwrap_or_default();
    assert!(audio_ms.abs_diff(last_end) <= 1, "audio {} ms, captions end {} ms", audio_ms, last_end);

    // The provider received the speakable form
    let texts: Vec<String> = mock.requests().into_iter().map(|r| r.text).collect();
    assert!(texts.iter().any(|t| t.contains("twenty dollars and fifty cents")));
    Ok(())
}

#[tokio::test]
async fn test_generate_dialogueMode_shouldUseTurnVoicesAndStripTags() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let mock = Arc::new(MockSpeechProvider::working());
    let pipeline = NarrationPipeline::new(mock.clone());

    let outcome = pipeline
        .generate(&NarrationRequest::new(NarrationMode::Dialogue, common::DIALOGUE_SCRIPT), &config)
        .await;

    assert!(outcome.status.is_success());
    let captions = outcome.captions.expect("captions path");
    assert_eq!(captions.file_name().and_then(|n| n.to_str()), Some("dialogue.srt"));

    let cues = parse_srt(&FileManager::read_to_string(&captions)?)?;
    assert_eq!(cues[0].text, "What time is it?");
    assert!(cues.iter().all(|c| !c.text.starts_with("Q:") && !c.text.starts_with("A:")));

    let mut requests = mock.requests();
    requests.sort_by(|a, b| a.text.cmp(&b.text));
    let question = requests.iter().find(|r| r.text == "What time is it?").expect("question request");
    let answer = requests.iter().find(|r| r.text == "You are welcome.").expect("answer request");
    assert_eq!(question.voice_id, config.modes.dialogue.question.voice_id);
    assert_eq!(question.rate_pct, -10);
    assert_eq!(answer.voice_id, config.modes.dialogue.answer.voice_id);
    assert_eq!(answer.rate_pct, -15);
    Ok(())
}

#[tokio::test]
async fn test_generate_multiMode_withRepeat_shouldReadScriptTwice() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let mock = Arc::new(MockSpeechProvider::working());
    let pipeline = NarrationPipeline::new(mock.clone());
    let request = NarrationRequest::new(NarrationMode::MultiCharacter, common::MULTI_SCRIPT).with_repeat(2);

    let outcome = pipeline.generate(&request, &config).await;

    assert!(outcome.status.is_success());
    assert_eq!(mock.request_count(), 10);
    let captions = outcome.captions.expect("captions path");
    assert_eq!(captions.file_name().and_then(|n| n.to_str()), Some("multi_character.srt"));

    let cues = parse_srt(&FileManager::read_to_string(&captions)?)?;
    assert_eq!(cues.len(), 10);
    assert_eq!(cues[0].text, "The forest was quiet.");
    assert_eq!(cues[5].text, "The forest was quiet.");
    Ok(())
}

#[tokio::test]
async fn test_generate_withOneFailingUtterance_shouldSkipIt() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let pipeline = NarrationPipeline::new(Arc::new(MockSpeechProvider::failing_on("Two")));
    let script = "One.\nTwo.\nThree.\nFour.\nFive.";

    let outcome = pipeline
        .generate(&NarrationRequest::new(NarrationMode::Single, script), &config)
        .await;

    assert!(outcome.status.is_success());
    let cues = parse_srt(&FileManager::read_to_string(outcome.captions.expect("captions path"))?)?;
    let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["One.", "Three.", "Four.", "Five."]);
    Ok(())
}

#[tokio::test]
async fn test_generate_withFailingProvider_shouldReportAssemblyErrorAndCleanUp() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let pipeline = NarrationPipeline::new(Arc::new(MockSpeechProvider::failing()));

    let outcome = pipeline
        .generate(&NarrationRequest::new(NarrationMode::Single, "Hello."), &config)
        .await;

    assert!(matches!(outcome.status, PipelineStatus::AssemblyError(_)));
    assert!(outcome.artifact.is_none());
    assert!(outcome.captions.is_none());
    assert_eq!(common::count_entries(dir.path()), 0);
    Ok(())
}

#[tokio::test]
async fn test_generate_withSlowProvider_shouldCancelAndLeaveNoFiles() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut config = common::test_config(dir.path());
    config.pipeline.timeout_secs = 1;
    let pipeline = NarrationPipeline::new(Arc::new(MockSpeechProvider::slow(5_000)));

    let outcome = pipeline
        .generate(&NarrationRequest::new(NarrationMode::Single, "Too slow."), &config)
        .await;

    assert!(matches!(outcome.status, PipelineStatus::Cancelled(_)));
    assert!(outcome.artifact.is_none());
    assert_eq!(common::count_entries(dir.path()), 0);
    Ok(())
}

#[tokio::test]
async fn test_generate_withBlankScript_shouldReportInputError() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let pipeline = NarrationPipeline::new(Arc::new(MockSpeechProvider::working()));

    let outcome = pipeline
        .generate(&NarrationRequest::new(NarrationMode::Single, "  \n\n "), &config)
        .await;

    assert!(matches!(outcome.status, PipelineStatus::InputError(_)));
    assert!(outcome.status.to_string().contains("script"));
    Ok(())
}

#[tokio::test]
async fn test_generate_dialogueWithoutTags_shouldNameExpectedPrefixes() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let pipeline = NarrationPipeline::new(Arc::new(MockSpeechProvider::working()));

    let outcome = pipeline
        .generate(&NarrationRequest::new(NarrationMode::Dialogue, "Just a plain line."), &config)
        .await;

    match outcome.status {
        PipelineStatus::InputError(message) => assert!(message.contains("Q:, A:"), "{}", message),
        other => panic!("expected an input error, got {:?}", other),
    }
    assert_eq!(common::count_entries(dir.path()), 0);
    Ok(())
}

#[tokio::test]
async fn test_generateWithProgress_shouldReportEverySegment() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let pipeline = NarrationPipeline::new(Arc::new(MockSpeechProvider::working()));
    let calls = Arc::new(AtomicUsize::new(0));
    let last_total = Arc::new(AtomicUsize::new(0));
    let (seen_calls, seen_total) = (calls.clone(), last_total.clone());
    let progress: ProgressCallback = Arc::new(move |_, total| {
        seen_calls.fetch_add(1, Ordering::SeqCst);
        seen_total.store(total, Ordering::SeqCst);
    });

    let outcome = pipeline
        .generate_with_progress(
            &NarrationRequest::new(NarrationMode::Dialogue, common::DIALOGUE_SCRIPT),
            &config,
            Some(progress),
        )
        .await;

    assert!(outcome.status.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(last_total.load(Ordering::SeqCst), 4);
    Ok(())
}
