/*!
 * Shared number-to-words converter.
 *
 * Every token expander renders its numeric values through these functions so
 * that "1,001", "$1001" and "1001 km" all read the same way.
 */

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen",
    "seventeen", "eighteen", "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 6] = [
    (1_000_000_000_000_000_000, "quintillion"),
    (1_000_000_000_000_000, "quadrillion"),
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

/// Units that read the same in singular and plural
const PLURAL_EXEMPT: [&str; 7] = [
    "hertz", "kilohertz", "megahertz", "gigahertz", "percent", "yen", "pence",
];

/// Spell out a non-negative integer ("one thousand one", "twenty-one")
pub fn integer_to_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts = Vec::new();
    let mut rest = n;
    for (scale, name) in SCALES {
        if rest >= scale {
            parts.push(format!("{} {}", below_thousand(rest / scale), name));
            rest %= scale;
        }
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }

    parts.join(" ")
}

/// Spell out 0..100
pub fn below_hundred(n: u64) -> String {
    debug_assert!(n < 100);
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    let tens = TENS[(n / 10) as usize];
    match n % 10 {
        0 => tens.to_string(),
        units => format!("{}-{}", tens, ONES[units as usize]),
    }
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;

    let mut parts = Vec::with_capacity(2);
    if hundreds > 0 {
        parts.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if rest > 0 {
        parts.push(below_hundred(rest));
    }
    parts.join(" ")
}

/// Read every digit individually ("042" -> "zero four two").
/// Non-digit characters are ignored.
pub fn digits_to_words(digits: &str) -> String {
    digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| ONES[d as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word for a single digit
pub fn digit_word(d: u32) -> &'static str {
    ONES[(d % 10) as usize]
}

/// Spell out a numeric literal such as "42", "1,234" or "3.14".
///
/// Thousands separators are dropped, a leading '-' reads as "minus" and the
/// fractional part is read digit by digit after "point". Returns `None` when
/// the literal is not a number or does not fit the converter.
pub fn number_to_words(literal: &str) -> Option<String> {
    let (negative, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let int_digits: String = int_part.chars().filter(|c| *c != ',').collect();
    if int_digits.is_empty() || !int_digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u64 = int_digits.parse().ok()?;

    let mut words = integer_to_words(value);
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        words.push_str(" point ");
        words.push_str(&digits_to_words(frac));
    }

    if negative {
        words.insert_str(0, "minus ");
    }
    Some(words)
}

/// Whether a numeric literal takes the singular form of a unit
pub fn is_singular(literal: &str) -> bool {
    literal == "1"
}

/// Plural form of a unit name.
///
/// Compound units pluralize their head ("mile per hour" -> "miles per hour").
pub fn pluralize(unit: &str) -> String {
    if let Some((head, tail)) = unit.split_once(" per ") {
        return format!("{} per {}", pluralize(head), tail);
    }
    if let Some((head, tail)) = unit.split_once(' ') {
        // "kilowatt hour" style units pluralize their last word
        return format!("{} {}", head, pluralize(tail));
    }
    if PLURAL_EXEMPT.contains(&unit) {
        return unit.to_string();
    }
    match unit {
        "foot" => "feet".to_string(),
        "penny" => "pence".to_string(),
        _ if unit.ends_with("ch")
            || unit.ends_with("sh")
            || unit.ends_with('s')
            || unit.ends_with('x') =>
        {
            format!("{}es", unit)
        }
        _ => format!("{}s", unit),
    }
}

/// Render a numeric literal followed by its unit in the right number
pub fn with_unit(literal: &str, singular_unit: &str) -> Option<String> {
    let words = number_to_words(literal)?;
    let unit = if is_singular(literal) {
        singular_unit.to_string()
    } else {
        pluralize(singular_unit)
    };
    Some(format!("{} {}", words, unit))
}

/// Year-style reading of a four digit number.
///
/// 1999 -> "nineteen ninety-nine", 1905 -> "nineteen oh five",
/// 1900 -> "nineteen hundred", 2000..=2009 -> "two thousand [n]".
pub fn year_to_words(year: u64) -> String {
    if !(1000..=9999).contains(&year) {
        return integer_to_words(year);
    }
    if (2000..=2009).contains(&year) {
        return integer_to_words(year);
    }

    let century = below_hundred(year / 100);
    match year % 100 {
        0 => format!("{} hundred", century),
        rest if rest < 10 => format!("{} oh {}", century, ONES[rest as usize]),
        rest => format!("{} {}", century, below_hundred(rest)),
    }
}
