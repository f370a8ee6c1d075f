/*!
 * Tests for caption cues and the SRT format
 */

use anyhow::Result;

use storyvox::assembly::pause::{PauseReason, PauseSpec};
use storyvox::assembly::timeline::{Timeline, TimelineEntry};
use storyvox::audio::AudioSegment;
use storyvox::captions::{CaptionCue, CaptionGenerator, parse_srt, split_caption_text, to_srt};

fn timeline_of(entries: &[(u64, u64, &str)], sample_rate: u32) -> Timeline {
    let mut timeline = Timeline::new(sample_rate);
    for (i, (ms, pause_ms, text)) in entries.iter().enumerate() {
        let len = storyvox::audio::ms_to_samples(*ms, sample_rate);
        timeline.push(TimelineEntry {
            segment: AudioSegment::new(vec![0.2; len], sample_rate),
            pause: Some(PauseSpec::new(*pause_ms, PauseReason::SentenceEnd)),
            caption_text: text.to_string(),
            speaker: "NARRATOR".to_string(),
            ordinal: i + 1,
            pass: 1,
        });
    }
    timeline.close();
    timeline
}

#[test]
fn test_captionCue_display_shouldMatchSrtBlock() {
    let cue = CaptionCue::new(3, 61_001, 3_600_000, "Hello.");
    assert_eq!(cue.to_string(), "3\n00:01:01,001 --> 01:00:00,000\nHello.\n\n");
}

#[test]
fn test_parseTimestamp_withFormattedValue_shouldReturnMilliseconds() -> Result<()> {
    for ms in [0, 999, 59_999, 3_723_456] {
        assert_eq!(CaptionCue::parse_timestamp(&CaptionCue::format_timestamp(ms))?, ms);
    }
    Ok(())
}

#[test]
fn test_parseTimestamp_withBadInput_shouldFail() {
    assert!(CaptionCue::parse_timestamp("00:00:61,000").is_err());
    assert!(CaptionCue::parse_timestamp("00:00:01.000.5").is_err());
    assert!(CaptionCue::parse_timestamp("").is_err());
}

#[test]
fn test_generate_withPauses_shouldProduceMonotonicCues() {
    let timeline = timeline_of(
        &[(1200, 700, "First line."), (800, 350, "Second, with a comma,"), (500, 0, "Last.")],
        24_000,
    );

    let cues = CaptionGenerator::new(120).generate(&timeline);

    assert_eq!(cues.len(), 3);
    assert_eq!((cues[0].start_ms, cues[0].end_ms), (0, 1200));
    assert_eq!((cues[1].start_ms, cues[1].end_ms), (1900, 2700));
    assert_eq!((cues[2].start_ms, cues[2].end_ms), (3050, 3550));
    for pair in cues.windows(2) {
        assert!(pair[1].start_ms >= pair[0].end_ms);
        assert!(pair[1].end_ms >= pair[0].end_ms);
    }
    assert_eq!(cues.last().map(|c| c.end_ms), Some(timeline.duration_ms()));
}

#[test]
fn test_generate_withLongText_shouldSplitWithinSegment() {
    let text = "It was a dark and stormy night; the rain fell in torrents, except at occasional intervals, when it was checked by a violent gust of wind.";
    let timeline = timeline_of(&[(9000, 0, text)], 16_000);

    let cues = CaptionGenerator::new(40).generate(&timeline);

    assert!(cues.len() > 1);
    assert!(cues.iter().all(|c| c.text.chars().count() <= 40));
    assert_eq!(cues.first().map(|c| c.start_ms), Some(0));
    assert_eq!(cues.last().map(|c| c.end_ms), Some(9000));
    assert_eq!(
        cues.iter().map(|c| c.index).collect::<Vec<_>>(),
        (1..=cues.len()).collect::<Vec<_>>()
    );
}

#[test]
fn test_splitCaptionText_shouldPreferClauseBoundaries() {
    let chunks = split_caption_text("First part, second part. Third part!", 15);
    assert_eq!(chunks, vec!["First part,", "second part.", "Third part!"]);
}

#[test]
fn test_srtDocument_shouldParseBack() -> Result<()> {
    let timeline = timeline_of(&[(1000, 500, "One."), (1000, 0, "Two.")], 8_000);
    let cues = CaptionGenerator::new(120).generate(&timeline);

    let parsed = parse_srt(&to_srt(&cues))?;
    assert_eq!(parsed, cues);
    Ok(())
}

#[test]
fn test_parseSrt_withBrokenTiming_shouldFail() {
    assert!(parse_srt("1\nnot a timing line\nText\n").is_err());
}
