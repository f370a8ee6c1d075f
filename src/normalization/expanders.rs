/*!
 * Token-class expanders.
 *
 * Each expander rewrites one class of written token (emails, currency,
 * times...) into words. They are applied by `expand_special_tokens` in a fixed
 * order because their patterns overlap: a phone number looks like a range and
 * a temperature looks like a measurement.
 *
 * The `regex` crate has no look-around, so context checks (what precedes or
 * follows a match) are done in `replace_in_context`.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::words::{
    below_hundred, digit_word, digits_to_words, integer_to_words, number_to_words, pluralize,
    with_unit, year_to_words,
};

/// A number with optional thousands separators and decimals
const NUM: &str = r"(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#).unwrap()
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(\+?1)[\s.-]?)?(?:\((\d{3})\)\s?|(\d{3})[\s.-])?(\d{3})[\s.-](\d{4})").unwrap()
});

static TEMPERATURE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?P<neg>-)?(?P<from>{NUM})(?:(?:\s?°(?:\s?[CFK]\b)?)?\s?-\s?(?P<to>-?{NUM}))?\s?°(?:\s?(?P<scale>Celsius|Fahrenheit|Kelvin|C|F|K)\b)?"
    ))
    .unwrap()
});

static MEASUREMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?P<neg>-)?(?P<from>{NUM})(?:\s?-\s?(?P<to>{NUM}))?(?P<space>\s?)(?P<unit>[A-Za-z]+)(?P<per>/[A-Za-z]+)?"
    ))
    .unwrap()
});

static CURRENCY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<sym>[$€£¥])\s?(?P<int>\d{1,3}(?:,\d{3})+|\d+)(?:\.(?P<frac>\d{1,2}))?(?:\s?(?P<mag>thousand|million|billion|trillion)\b|(?P<abbr>bn|BN|[kKmMbB])\b)?",
    )
    .unwrap()
});

static PERCENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?P<neg>-)?(?P<from>{NUM})(?:\s?%?\s?-\s?(?P<to>{NUM}))?\s?%"
    ))
    .unwrap()
});

static MATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?P<first>{NUM})(?P<rest>(?:\s?[-+*×÷=^]\s?{NUM}|\s/\s{NUM})+)"
    ))
    .unwrap()
});

static MATH_STEP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\s*(?P<op>[-+*×÷=^/])\s*(?P<num>{NUM})")).unwrap()
});

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<h>\d{1,2}):(?P<m>\d{2})(?::(?P<s>\d{2}))?(?:\s?(?P<ampm>[AaPp]\.?[Mm]))?",
    )
    .unwrap()
});

static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<year>1[1-9]\d{2}|20\d{2})\b").unwrap()
});

static HASH_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"#\s?(?P<num>{NUM})")).unwrap());

/// Measurement units: written form, singular spoken form, needs to be attached
/// to the number ("5m" but not "5 m").
const UNITS: &[(&str, &str, bool)] = &[
    ("km", "kilometer", false),
    ("m", "meter", true),
    ("cm", "centimeter", false),
    ("mm", "millimeter", false),
    ("mi", "mile", false),
    ("ft", "foot", false),
    ("in", "inch", true),
    ("yd", "yard", false),
    ("kg", "kilogram", false),
    ("g", "gram", true),
    ("mg", "milligram", false),
    ("lb", "pound", false),
    ("lbs", "pound", false),
    ("oz", "ounce", false),
    ("l", "liter", true),
    ("L", "liter", false),
    ("ml", "milliliter", false),
    ("mL", "milliliter", false),
    ("gal", "gallon", false),
    ("mph", "mile per hour", false),
    ("kph", "kilometer per hour", false),
    ("km/h", "kilometer per hour", false),
    ("m/s", "meter per second", false),
    ("KB", "kilobyte", false),
    ("MB", "megabyte", false),
    ("GB", "gigabyte", false),
    ("TB", "terabyte", false),
    ("kb", "kilobyte", false),
    ("mb", "megabyte", false),
    ("gb", "gigabyte", false),
    ("tb", "terabyte", false),
    ("Hz", "hertz", false),
    ("kHz", "kilohertz", false),
    ("MHz", "megahertz", false),
    ("GHz", "gigahertz", false),
    ("ms", "millisecond", false),
    ("sec", "second", false),
    ("secs", "second", false),
    ("min", "minute", true),
    ("mins", "minute", true),
    ("h", "hour", true),
    ("hr", "hour", false),
    ("hrs", "hour", false),
    ("W", "watt", false),
    ("kW", "kilowatt", false),
    ("kWh", "kilowatt hour", false),
];

/// Replace every match of `re`, letting `render` inspect the text before and
/// after the match. Returning `None` keeps the match unchanged.
fn replace_in_context<F>(re: &Regex, text: &str, mut render: F) -> String
where
    F: FnMut(&Captures, &str, &str) -> Option<String>,
{
    let mut output = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        output.push_str(&text[last..whole.start()]);

        let before = &text[..whole.start()];
        let after = &text[whole.end()..];
        match render(&caps, before, after) {
            Some(replacement) => output.push_str(&replacement),
            None => output.push_str(whole.as_str()),
        }
        last = whole.end();
    }

    output.push_str(&text[last..]);
    output
}

fn prev_char(before: &str) -> Option<char> {
    before.chars().next_back()
}

fn next_char(after: &str) -> Option<char> {
    after.chars().next()
}

/// A number may start here: not glued to a word, a decimal point or a time
fn detached_before(before: &str) -> bool {
    match prev_char(before) {
        None => true,
        Some(c) => !(c.is_alphanumeric() || matches!(c, '.' | ',' | ':' | '_' | '/')),
    }
}

/// A number may end here: not continued by a word or by more digits after a
/// separator ("1.5", "1,000", "10:30")
fn detached_after(after: &str) -> bool {
    let mut chars = after.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_alphanumeric() => false,
        Some('.' | ',' | ':' | '/') => !chars.next().is_some_and(|c| c.is_ascii_digit()),
        Some(_) => true,
    }
}

/// Render "minus five", "ten to twenty", "-five" (dash glued to a word).
/// The bool tells whether the unit takes its singular form.
fn quantity_words(caps: &Captures, before: &str) -> Option<(String, bool)> {
    let from = caps.name("from")?.as_str();
    let mut words = number_to_words(from)?;
    let negative = caps.name("neg").is_some();

    if negative {
        if prev_char(before).is_some_and(|c| c.is_alphanumeric()) {
            // "x-5%" reads the dash as a hyphen, not a sign
            words.insert(0, '-');
        } else {
            words.insert_str(0, "minus ");
        }
    }

    match caps.name("to") {
        Some(to) => {
            let to_words = number_to_words(to.as_str())?;
            Some((format!("{} to {}", words, to_words), false))
        }
        None => Some((words, !negative && from == "1")),
    }
}

/// Speak an address character by character class
fn spell_address(address: &str) -> String {
    let mut spoken = String::with_capacity(address.len() * 2);
    for c in address.chars() {
        match c {
            '.' => spoken.push_str(" dot "),
            '@' => spoken.push_str(" at "),
            '_' => spoken.push_str(" underscore "),
            '-' => spoken.push_str(" dash "),
            '+' => spoken.push_str(" plus "),
            '/' => spoken.push_str(" slash "),
            '%' => spoken.push_str(" percent "),
            ':' => spoken.push_str(" colon "),
            '?' => spoken.push_str(" query "),
            '#' => spoken.push_str(" hash "),
            '=' => spoken.push_str(" equals "),
            '&' => spoken.push_str(" and "),
            '~' => spoken.push_str(" tilde "),
            _ => spoken.push(c),
        }
    }
    spoken.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 1. `john.doe@example.com` -> "john dot doe at example dot com"
pub fn expand_emails(text: &str) -> String {
    EMAIL_REGEX
        .replace_all(text, |caps: &Captures| spell_address(&caps[0]))
        .into_owned()
}

/// 2. `https://www.example.com/docs.` -> "w w w dot example dot com slash docs."
pub fn expand_urls(text: &str) -> String {
    URL_REGEX
        .replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            let body = matched.trim_end_matches(|c: char| ".,;:!?)]}'\"".contains(c));
            let tail = &matched[body.len()..];

            let lower = body.to_ascii_lowercase();
            let mut address = if lower.starts_with("https://") {
                &body["https://".len()..]
            } else if lower.starts_with("http://") {
                &body["http://".len()..]
            } else {
                body
            };
            address = address.trim_end_matches('/');

            let spoken = match address.get(..4) {
                Some(prefix) if prefix.eq_ignore_ascii_case("www.") => {
                    format!("w w w dot {}", spell_address(&address[4..]))
                }
                _ => spell_address(address),
            };
            format!("{}{}", spoken, tail)
        })
        .into_owned()
}

/// 3. `(555) 123-4567` -> "five five five, one two three, four five six seven"
pub fn expand_phone_numbers(text: &str) -> String {
    replace_in_context(&PHONE_REGEX, text, |caps, before, after| {
        if prev_char(before).is_some_and(|c| c.is_alphanumeric())
            || next_char(after).is_some_and(|c| c.is_alphanumeric())
        {
            return None;
        }

        let area = caps.get(2).or_else(|| caps.get(3));
        // Local numbers use a dash and must not sit inside arithmetic
        if area.is_none() {
            let local = &caps[0];
            if caps.get(1).is_some() || !local.contains('-') {
                return None;
            }
            if prev_char(before.trim_end()).is_some_and(|c| "+-*/=×÷^".contains(c))
                || next_char(after.trim_start()).is_some_and(|c| "+-*/=×÷^%°".contains(c))
            {
                return None;
            }
        }

        let mut groups = Vec::with_capacity(4);
        if let Some(country) = caps.get(1) {
            groups.push(digits_to_words(country.as_str()));
        }
        if let Some(area) = area {
            groups.push(digits_to_words(area.as_str()));
        }
        groups.push(digits_to_words(&caps[4]));
        groups.push(digits_to_words(&caps[5]));
        Some(groups.join(", "))
    })
}

/// 4. `25°C` -> "twenty-five degrees Celsius", `30°` -> "thirty degrees"
pub fn expand_temperatures(text: &str) -> String {
    replace_in_context(&TEMPERATURE_REGEX, text, |caps, before, _after| {
        if !sign_aware_detached_before(caps, before) {
            return None;
        }
        let (amount, singular) = quantity_words(caps, before)?;
        let degrees = if singular { "degree" } else { "degrees" };

        let scale = caps.name("scale").map(|s| match s.as_str() {
            "C" | "Celsius" => "Celsius",
            "F" | "Fahrenheit" => "Fahrenheit",
            _ => "Kelvin",
        });
        Some(match scale {
            Some(scale) => format!("{} {} {}", amount, degrees, scale),
            None => format!("{} {}", amount, degrees),
        })
    })
}

/// 5. `5 km` -> "five kilometers", `5-10kg` -> "five to ten kilograms"
pub fn expand_measurements(text: &str) -> String {
    replace_in_context(&MEASUREMENT_REGEX, text, |caps, before, after| {
        if !sign_aware_detached_before(caps, before) || !detached_after(after) {
            return None;
        }

        let unit_text = caps.name("unit")?.as_str();
        let per = caps.name("per").map(|p| p.as_str()).unwrap_or("");
        let attached = caps.name("space").is_some_and(|s| s.as_str().is_empty());

        // Prefer the full "km/h" form, then "<unit> per <unit>"
        let (spoken_unit, per_unit) = match lookup_unit(&format!("{}{}", unit_text, per), attached) {
            Some(unit) => (unit, None),
            None if per.is_empty() => (lookup_unit(unit_text, attached)?, None),
            None => (lookup_unit(unit_text, attached)?, Some(per_unit_word(&per[1..])?)),
        };

        let (amount, singular) = quantity_words(caps, before)?;
        let unit = if singular {
            spoken_unit.to_string()
        } else {
            pluralize(spoken_unit)
        };
        Some(match per_unit {
            Some(per_unit) => format!("{} {} per {}", amount, unit, per_unit),
            None => format!("{} {}", amount, unit),
        })
    })
}

fn lookup_unit(written: &str, attached: bool) -> Option<&'static str> {
    UNITS
        .iter()
        .find(|(w, _, _)| *w == written)
        .filter(|(_, _, needs_attached)| attached || !needs_attached)
        .map(|(_, spoken, _)| *spoken)
}

/// Denominator of a rate ("GB/s"); the slash makes short units unambiguous
fn per_unit_word(written: &str) -> Option<&'static str> {
    match written {
        "s" => Some("second"),
        _ => lookup_unit(written, true),
    }
}

/// The dash of a negative number must itself be detached from the left
fn sign_aware_detached_before(caps: &Captures, before: &str) -> bool {
    if caps.name("neg").is_some() {
        // "x-5" is handled by quantity_words as a hyphen
        !prev_char(before).is_some_and(|c| c.is_ascii_digit() || c == '.')
    } else {
        detached_before(before)
    }
}

/// 6. `$20.50` -> "twenty dollars and fifty cents", `$5m` -> "five million dollars"
pub fn expand_currency(text: &str) -> String {
    replace_in_context(&CURRENCY_REGEX, text, |caps, before, after| {
        if prev_char(before).is_some_and(|c| c.is_alphanumeric()) || !detached_after(after) {
            return None;
        }

        let (unit, sub_unit) = match &caps["sym"] {
            "$" => ("dollar", Some("cent")),
            "€" => ("euro", Some("cent")),
            "£" => ("pound", Some("penny")),
            _ => ("yen", None),
        };
        let int_literal = &caps["int"];
        let frac = caps.name("frac").map(|f| f.as_str());

        let magnitude = caps.name("mag").map(|m| m.as_str()).or_else(|| {
            caps.name("abbr").map(|a| match a.as_str() {
                "k" | "K" => "thousand",
                "m" | "M" => "million",
                _ => "billion",
            })
        });

        if let Some(magnitude) = magnitude {
            let literal = match frac {
                Some(frac) => format!("{}.{}", int_literal, frac),
                None => int_literal.to_string(),
            };
            let amount = number_to_words(&literal)?;
            return Some(format!("{} {} {}", amount, magnitude, pluralize(unit)));
        }

        let whole_digits: String = int_literal.chars().filter(|c| *c != ',').collect();
        let whole: u64 = whole_digits.parse().ok()?;

        let Some(sub_unit) = sub_unit else {
            // No minor unit: read decimals as "point"
            let literal = match frac {
                Some(frac) => format!("{}.{}", int_literal, frac),
                None => int_literal.to_string(),
            };
            return with_unit(&literal, unit);
        };

        let minor = match frac {
            Some(f) if f.len() == 1 => f.parse::<u64>().ok()? * 10,
            Some(f) => f.parse::<u64>().ok()?,
            None => 0,
        };

        let major_words = |n: u64| {
            let name = if n == 1 { unit.to_string() } else { pluralize(unit) };
            format!("{} {}", integer_to_words(n), name)
        };
        let minor_words = |n: u64| {
            let name = if n == 1 { sub_unit.to_string() } else { pluralize(sub_unit) };
            format!("{} {}", integer_to_words(n), name)
        };

        Some(match (whole, minor) {
            (0, m) if m > 0 => minor_words(m),
            (w, 0) => major_words(w),
            (w, m) => format!("{} and {}", major_words(w), minor_words(m)),
        })
    })
}

/// 7. `50%` -> "fifty percent", `10-20%` -> "ten to twenty percent"
pub fn expand_percentages(text: &str) -> String {
    replace_in_context(&PERCENT_REGEX, text, |caps, before, _after| {
        if !sign_aware_detached_before(caps, before) {
            return None;
        }
        let (amount, _) = quantity_words(caps, before)?;
        Some(format!("{} percent", amount))
    })
}

fn operator_words(op: &str) -> &'static str {
    match op {
        "+" => "plus",
        "-" => "minus",
        "*" | "×" => "times",
        "/" | "÷" => "divided by",
        "=" => "equals",
        _ => "to the power of",
    }
}

fn starts_with_operator(text: &str) -> bool {
    text.trim_start()
        .starts_with(['-', '+', '*', '×', '÷', '=', '^', '/'])
}

/// 8. `5-10` -> "five to ten", `5-3=2` -> "five minus three equals two"
pub fn expand_math(text: &str) -> String {
    replace_in_context(&MATH_REGEX, text, |caps, before, after| {
        if !detached_before(before) || prev_char(before) == Some('-') {
            return None;
        }
        // "10:30" or "1.5" continuing past the expression
        if matches!(next_char(after), Some(':')) && !detached_after(after) {
            return None;
        }
        if next_char(after).is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }

        let first = caps.name("first")?.as_str();
        let rest = caps.name("rest")?.as_str();
        let steps: Vec<(&str, &str)> = MATH_STEP_REGEX
            .captures_iter(rest)
            .filter_map(|step| {
                Some((step.name("op")?.as_str(), step.name("num")?.as_str()))
            })
            .collect();

        // Dates and serials ("2024-01-15") are not arithmetic
        if steps.len() > 1 && steps.iter().all(|(op, _)| *op == "-") {
            return None;
        }

        let mut words = number_to_words(first)?;
        if let [("-", to)] = steps.as_slice() {
            if !starts_with_operator(after) {
                let to_words = number_to_words(to)?;
                return Some(format!("{} to {}", words, to_words));
            }
        }

        for (op, num) in steps {
            words.push(' ');
            words.push_str(operator_words(op));
            words.push(' ');
            words.push_str(&number_to_words(num)?);
        }
        Some(words)
    })
}

/// 9. `3:00` -> "three o'clock", `15:05` -> "three oh five PM"
pub fn expand_times(text: &str) -> String {
    replace_in_context(&TIME_REGEX, text, |caps, before, after| {
        if prev_char(before).is_some_and(|c| c.is_ascii_digit() || matches!(c, ':' | '.')) {
            return None;
        }

        let hour: u32 = caps["h"].parse().ok()?;
        let minute: u32 = caps["m"].parse().ok()?;
        let second: Option<u32> = match caps.name("s") {
            Some(s) => Some(s.as_str().parse().ok()?),
            None => None,
        };
        if hour > 23 || minute > 59 || second.is_some_and(|s| s > 59) {
            return None;
        }

        // A suffix glued to a following word ("3:00 Amsterdam") is not AM/PM
        let ampm = caps.name("ampm");
        let suffix_is_word = ampm.is_some() && next_char(after).is_some_and(|c| c.is_alphanumeric());
        if ampm.is_none() && !detached_after(after) {
            return None;
        }

        let explicit_suffix = match ampm {
            Some(m) if !suffix_is_word => Some(
                m.as_str()
                    .chars()
                    .filter(|c| c.is_ascii_alphabetic())
                    .collect::<String>()
                    .to_ascii_uppercase(),
            ),
            _ => None,
        };

        let hour12 = match hour {
            0 => 12,
            1..=12 => hour,
            _ => hour - 12,
        };
        let suffix = explicit_suffix.or(match hour {
            0 => Some("AM".to_string()),
            13..=23 => Some("PM".to_string()),
            _ => None,
        });

        let minutes = match minute {
            0 => "o'clock".to_string(),
            1..=9 => format!("oh {}", digit_word(minute)),
            _ => below_hundred(minute as u64),
        };

        let mut spoken = format!("{} {}", integer_to_words(hour12 as u64), minutes);
        if let Some(second) = second.filter(|s| *s > 0) {
            let unit = if second == 1 { "second" } else { "seconds" };
            spoken.push_str(&format!(" and {} {}", integer_to_words(second as u64), unit));
        }
        if let Some(suffix) = suffix {
            spoken.push(' ');
            spoken.push_str(&suffix);
        }
        if suffix_is_word {
            // Put the swallowed word prefix back ("Am" of "Amsterdam")
            if let Some(m) = ampm {
                spoken.push(' ');
                spoken.push_str(m.as_str());
            }
        }
        Some(spoken)
    })
}

/// 10. `1999` -> "nineteen ninety-nine", `2024` -> "twenty twenty-four"
pub fn expand_years(text: &str) -> String {
    replace_in_context(&YEAR_REGEX, text, |caps, before, after| {
        if !detached_before(before) || !detached_after(after) {
            return None;
        }
        // Part of a dash-joined run of digits ("2024-01-15", "555-2024")
        let mut back = before.chars().rev();
        if back.next() == Some('-') && back.next().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        let mut forward = after.chars();
        if forward.next() == Some('-') && forward.next().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        if matches!(prev_char(before), Some('$' | '€' | '£' | '¥' | '#')) {
            return None;
        }

        let year: u64 = caps["year"].parse().ok()?;
        Some(year_to_words(year))
    })
}

/// 11. Leftover symbols that a speech engine would skip or misread
pub fn expand_symbols(text: &str) -> String {
    // Spell the whole number so no digits are left for the year pass
    let text = replace_in_context(&HASH_NUMBER_REGEX, text, |caps, _before, after| {
        let num = caps.name("num")?.as_str();
        if !detached_after(after) {
            return Some(format!("number {}", num));
        }
        Some(format!("number {}", number_to_words(num)?))
    });

    let mut spoken = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => spoken.push_str(" and "),
            '@' => spoken.push_str(" at "),
            '+' => spoken.push_str(" plus "),
            '=' => spoken.push_str(" equals "),
            '%' => spoken.push_str(" percent "),
            '°' => spoken.push_str(" degrees "),
            '×' => spoken.push_str(" times "),
            '÷' => spoken.push_str(" divided by "),
            _ => spoken.push(c),
        }
    }
    spoken
}
