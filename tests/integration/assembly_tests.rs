/*!
 * Integration tests for timeline assembly
 */

use std::sync::Arc;

use storyvox::app_config::{Config, PauseConfig, VoiceSettings};
use storyvox::assembly::pause::{PauseReason, PunctuationPolicy, SpeakerTurnPolicy};
use storyvox::assembly::{AssemblySettings, SegmentAssembler, VoiceProfiles};
use storyvox::normalization::normalize_utterances;
use storyvox::providers::mock::MockSpeechProvider;
use storyvox::script_parser::ScriptParser;
use storyvox::synthesis::SynthesisAdapter;
use crate::common;

fn settings() -> AssemblySettings {
    let dir = std::env::temp_dir();
    AssemblySettings::from_config(&common::test_config(&dir))
}

#[tokio::test]
async fn test_assemble_withMixedRates_shouldProduceTimelineAtConfiguredRate() {
    let mock = Arc::new(MockSpeechProvider::working().with_sample_rate(22_050));
    let assembler = SegmentAssembler::new(SynthesisAdapter::new(mock), settings());
    let mut utterances = ScriptParser::untagged("NARRATOR").parse("Hello there.\nHow are you,\nfriend");
    normalize_utterances(&mut utterances);
    let policy = PunctuationPolicy::new(&PauseConfig::default(), 500);

    let timeline = assembler
        .assemble(&utterances, &VoiceProfiles::new(VoiceSettings::new("v", 0)), &policy, 1, None)
        .await
        .unwrap();

    assert_eq!(timeline.sample_rate(), 24_000);
    assert!(timeline.entries().iter().all(|e| e.segment.sample_rate == 24_000));

    let reasons: Vec<Option<PauseReason>> = timeline.entries().iter().map(|e| e.pause.map(|p| p.reason)).collect();
    assert_eq!(reasons, vec![Some(PauseReason::SentenceEnd), Some(PauseReason::ClauseEnd), None]);
    assert_eq!(timeline.render().len(), timeline.total_samples());
}

#[tokio::test]
async fn test_assemble_withIntermittentProvider_shouldKeepSurvivorsInOrder() {
    // Request #2 and #4 fail; no retries
    let mock = Arc::new(MockSpeechProvider::intermittent(2));
    let mut settings = settings();
    settings.concurrency = 1;
    let assembler = SegmentAssembler::new(SynthesisAdapter::new(mock), settings);
    let mut utterances = ScriptParser::untagged("NARRATOR").parse("a.\nb.\nc.\nd.\ne.");
    normalize_utterances(&mut utterances);
    let policy = PunctuationPolicy::new(&PauseConfig::default(), 500);

    let timeline = assembler
        .assemble(&utterances, &VoiceProfiles::new(VoiceSettings::new("v", 0)), &policy, 1, None)
        .await
        .unwrap();

    let ordinals: Vec<usize> = timeline.entries().iter().map(|e| e.ordinal).collect();
    assert_eq!(ordinals, vec![1, 3, 5]);
}

#[tokio::test]
async fn test_assemble_withSpeakerTurns_shouldApplyPerSpeakerPauses() {
    let config = Config::default();
    let mock = Arc::new(MockSpeechProvider::working());
    let assembler = SegmentAssembler::new(SynthesisAdapter::new(mock), settings());
    let mut utterances = ScriptParser::tagged(&["Q", "A"]).parse("Q: Ready?\nA: Yes.\nQ: Go");
    normalize_utterances(&mut utterances);
    let policy = SpeakerTurnPolicy::new(PunctuationPolicy::new(&config.pauses, 500))
        .with_turn("Q", config.modes.dialogue.question_pause_ms)
        .with_turn("A", config.modes.dialogue.answer_pause_ms);

    let timeline = assembler
        .assemble(&utterances, &VoiceProfiles::new(VoiceSettings::new("v", 0)), &policy, 1, None)
        .await
        .unwrap();

    let pauses: Vec<Option<u64>> = timeline.entries().iter().map(|e| e.pause.map(|p| p.duration_ms)).collect();
    assert_eq!(pauses, vec![Some(300), Some(500), None]);
}
