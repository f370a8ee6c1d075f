/*!
 * Text normalization.
 *
 * Turns written text into something a speech engine reads correctly:
 * - `clean_text` fixes typography and whitespace
 * - `expand_special_tokens` spells out emails, currency, times and friends
 * - `normalize` runs both
 *
 * All functions are pure and never fail. Running them on their own output is
 * a no-op.
 */

pub mod expanders;
pub mod words;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::script_parser::Utterance;

// @const: Whitespace runs
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// @const: Whitespace before punctuation
static SPACE_BEFORE_PUNCT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());

/// Normalize typography: quotes, ellipsis, dashes and whitespace
pub fn clean_text(text: &str) -> String {
    let mut mapped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2019}' | '\u{2018}' | '\u{00B4}' | '`' => mapped.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{FF02}' => mapped.push('"'),
            '\u{2026}' => mapped.push_str("..."),
            '\u{2013}' | '\u{2014}' => mapped.push('-'),
            '\u{FF5E}' => mapped.push('~'),
            _ => mapped.push(c),
        }
    }
    tidy(&mapped)
}

/// Collapse whitespace, drop spaces before punctuation and trim
fn tidy(text: &str) -> String {
    let collapsed = WHITESPACE_REGEX.replace_all(text, " ");
    let attached = SPACE_BEFORE_PUNCT_REGEX.replace_all(&collapsed, "$1");
    attached.trim().to_string()
}

/// Expand every special token class into words.
///
/// The order matters: earlier expanders consume tokens that later, broader
/// patterns would misread (a phone number is also a numeric range).
pub fn expand_special_tokens(text: &str) -> String {
    let passes: [fn(&str) -> String; 11] = [
        expanders::expand_emails,
        expanders::expand_urls,
        expanders::expand_phone_numbers,
        expanders::expand_temperatures,
        expanders::expand_measurements,
        expanders::expand_currency,
        expanders::expand_percentages,
        expanders::expand_math,
        expanders::expand_times,
        expanders::expand_years,
        expanders::expand_symbols,
    ];

    let expanded = passes
        .iter()
        .fold(text.to_string(), |current, pass| pass(&current));
    tidy(&expanded)
}

/// Clean then expand
pub fn normalize(text: &str) -> String {
    expand_special_tokens(&clean_text(text))
}

/// Fill `normalized_text` for each utterance from its raw text
pub fn normalize_utterances(utterances: &mut [Utterance]) {
    for utterance in utterances.iter_mut() {
        utterance.normalized_text = normalize(&utterance.raw_text);
    }
}
