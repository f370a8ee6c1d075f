/*!
 * Tests for text normalization
 */

use storyvox::normalization::words::{integer_to_words, year_to_words};
use storyvox::normalization::{clean_text, expand_special_tokens, normalize, normalize_utterances};
use storyvox::script_parser::Utterance;

#[test]
fn test_integerToWords_withBoundaryValues_shouldSpellCardinals() {
    assert_eq!(integer_to_words(0), "zero");
    assert_eq!(integer_to_words(19), "nineteen");
    assert_eq!(integer_to_words(100), "one hundred");
    assert_eq!(integer_to_words(1001), "one thousand one");
}

#[test]
fn test_yearToWords_withCenturies_shouldReadAsYears() {
    assert_eq!(year_to_words(1905), "nineteen oh five");
    assert_eq!(year_to_words(2024), "twenty twenty-four");
}

#[test]
fn test_expandSpecialTokens_withCurrency_shouldSpellAmounts() {
    assert_eq!(expand_special_tokens("$20"), "twenty dollars");
    assert_eq!(expand_special_tokens("$20.50"), "twenty dollars and fifty cents");
    assert_eq!(expand_special_tokens("Only $20."), "Only twenty dollars.");
}

#[test]
fn test_expandSpecialTokens_withTimes_shouldReadClockStyle() {
    assert_eq!(expand_special_tokens("3:00"), "three o'clock");
    assert_eq!(expand_special_tokens("Meet at 3:05 PM"), "Meet at three oh five PM");
}

#[test]
fn test_expandSpecialTokens_withEmail_shouldSpellSeparators() {
    assert_eq!(
        expand_special_tokens("Write to john.doe@example.com today"),
        "Write to john dot doe at example dot com today"
    );
}

#[test]
fn test_cleanText_withTypography_shouldUseAsciiForms() {
    assert_eq!(clean_text("“Wait…”  she said ,"), "\"Wait...\" she said,");
}

#[test]
fn test_normalize_appliedTwice_shouldBeStable() {
    let samples = [
        "Call (555) 123-4567 before 10:30 AM.",
        "It weighs 5 kg and costs £2.5, about 50% less.",
        "Pages 5-10 cover 2 + 2 = 4 & more.",
        "Visit https://example.com/docs or mail a@b.org in 2005.",
    ];
    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "normalize is not idempotent for {:?}", sample);
    }
}

#[test]
fn test_normalizeUtterances_shouldFillNormalizedTextAndKeepRaw() {
    let mut utterances = vec![
        Utterance::new(1, "Q", "Is it $20?"),
        Utterance::new(2, "A", "Yes, at 3:00."),
    ];

    normalize_utterances(&mut utterances);

    assert_eq!(utterances[0].raw_text, "Is it $20?");
    assert_eq!(utterances[0].normalized_text, "Is it twenty dollars?");
    assert_eq!(utterances[1].normalized_text, "Yes, at three o'clock.");
}

#[test]
fn test_normalize_withHashYear_shouldLeaveNoDigitsBehind() {
    for sample in ["#2024!", "Track #1999 wins"] {
        let once = normalize(sample);
        assert!(!once.chars().any(|c| c.is_ascii_digit()), "digits left in {:?}", once);
        assert_eq!(normalize(&once), once);
    }
    assert_eq!(normalize("Track #1999 wins"), "Track number one thousand nine hundred ninety-nine wins");
}

#[test]
fn test_normalize_withUnitOnBothEndsOfRange_shouldReadAsRange() {
    assert_eq!(normalize("50%-60%"), "fifty to sixty percent");
    assert_eq!(normalize("100°-200°"), "one hundred to two hundred degrees");
}

#[test]
fn test_normalize_withRateUnits_shouldSayPer() {
    assert_eq!(normalize("5 GB/s"), "five gigabytes per second");
    assert_eq!(normalize("Wait 5 min."), "Wait 5 min.");
}
