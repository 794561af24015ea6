//! Stateless regex extractors
//!
//! Each function returns the first match in document order, or `None`.
//! The expressions are fixed; external fixtures depend on their exact
//! character classes and quantifiers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Email address
pub const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// Phone number with optional country code, separators, and area-code parens
pub const PHONE_PATTERN: &str = r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}";

/// ISO calendar date (used when no recognizer is loaded)
pub const ISO_DATE_PATTERN: &str = r"\d{4}-\d{2}-\d{2}";

/// Run of Unicode decimal digits
pub const INTEGER_PATTERN: &str = r"\d+";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("valid email regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(PHONE_PATTERN).expect("valid phone regex"));
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(ISO_DATE_PATTERN).expect("valid date regex"));
static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(INTEGER_PATTERN).expect("valid integer regex"));
static DECIMAL_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A\d\z").expect("valid digit regex"));

fn first_match<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex.find(text).map(|m| m.as_str())
}

pub fn find_email(text: &str) -> Option<&str> {
    first_match(&EMAIL_RE, text)
}

pub fn find_phone(text: &str) -> Option<&str> {
    first_match(&PHONE_RE, text)
}

pub fn find_iso_date(text: &str) -> Option<&str> {
    first_match(&ISO_DATE_RE, text)
}

/// First run of digits, as written
pub fn find_digits(text: &str) -> Option<&str> {
    first_match(&INTEGER_RE, text)
}

/// First run of digits parsed as an integer.
///
/// Digits from any Unicode script are decoded (`"٣"` is 3). A run that
/// does not fit in `i64` yields `None`; later runs are not consulted.
pub fn find_integer(text: &str) -> Option<i64> {
    find_digits(text)?.chars().try_fold(0i64, |acc, c| {
        acc.checked_mul(10)?.checked_add(i64::from(digit_value(c)?))
    })
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

/// Value of a Unicode decimal digit.
///
/// Decimal digits are assigned in contiguous blocks running 0 to 9, so
/// the value is the distance back to the block start, modulo 10.
fn digit_value(c: char) -> Option<u32> {
    if let Some(value) = c.to_digit(10) {
        return Some(value);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut preceding = 0u32;
    let mut code = c as u32;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        preceding += 1;
        code -= 1;
    }
    Some(preceding % 10)
}

/// Whitespace for word splitting and trimming.
///
/// Also covers the ASCII information separators U+001C..U+001F, which
/// `char::is_whitespace` excludes.
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Text with leading and trailing separators removed
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(is_separator)
}

/// Non-empty words between separators
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_separator).filter(|w| !w.is_empty())
}
