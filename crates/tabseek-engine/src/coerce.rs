//! Numeric coercion rules.
//!
//! Cells arrive as text or numbers interchangeably, so every comparison first
//! decides how to read a value as a number. Three readings are used:
//!
//! - [`parse_float`]: read the longest numeric *prefix* (`"12px"` is 12).
//!   Aggregates and the relational operators use this.
//! - [`try_parse`]: parse-or-keep. Only text that is *entirely* a number
//!   becomes a number; anything else is kept as it was. Filter literals and
//!   sort keys use this.
//! - [`string_to_number`]: the conversion applied to the text side of a loose
//!   `=` / `!=` between a number and a string.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::Value;

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("float prefix pattern is valid")
});

static FLOAT_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)$")
        .expect("float literal pattern is valid")
});

/// Reads the leading numeric prefix of a value.
///
/// Leading whitespace is skipped. Returns `None` for `Null`, for text with no
/// numeric prefix, and for `NaN`.
///
/// ```
/// use tabseek_engine::{parse_float, Value};
///
/// assert_eq!(parse_float(&Value::from("42.5kg")), Some(42.5));
/// assert_eq!(parse_float(&Value::from("  -3")), Some(-3.0));
/// assert_eq!(parse_float(&Value::from("n/a")), None);
/// assert_eq!(parse_float(&Value::Null), None);
/// ```
pub fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_nan() => None,
        Value::Number(n) => Some(*n),
        Value::String(s) => {
            let text = s.trim_start();
            FLOAT_PREFIX
                .find(text)
                .and_then(|m| literal_to_f64(m.as_str()))
        }
        Value::Null => None,
    }
}

/// Parse-or-keep coercion.
///
/// Text whose trimmed form is entirely a decimal literal becomes a
/// [`Value::Number`]; every other value is returned unchanged.
///
/// ```
/// use tabseek_engine::{try_parse, Value};
///
/// assert_eq!(try_parse(&Value::from(" 10 ")), Value::Number(10.0));
/// assert_eq!(try_parse(&Value::from("10 apples")), Value::from("10 apples"));
/// ```
pub fn try_parse(value: &Value) -> Value {
    match value {
        Value::String(s) => match parse_literal(s) {
            Some(n) => Value::Number(n),
            None => value.clone(),
        },
        other => other.clone(),
    }
}

/// Converts text to a number the way loose equality does.
///
/// Whitespace is trimmed, empty text is `0`, and hexadecimal (`0x`), octal
/// (`0o`), and binary (`0b`) literals are accepted alongside decimals.
/// Anything else is `NaN`.
pub fn string_to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let radix_literal = text.get(..2).and_then(|prefix| {
        let radix = match prefix {
            "0x" | "0X" => 16,
            "0o" | "0O" => 8,
            "0b" | "0B" => 2,
            _ => return None,
        };
        Some(digits_to_f64(&text[2..], radix))
    });

    match radix_literal {
        Some(n) => n,
        None => parse_literal(text).unwrap_or(f64::NAN),
    }
}

/// Parses text that is entirely a decimal literal, ignoring surrounding whitespace.
fn parse_literal(text: &str) -> Option<f64> {
    let text = text.trim();
    if FLOAT_LITERAL.is_match(text) {
        literal_to_f64(text)
    } else {
        None
    }
}

fn literal_to_f64(literal: &str) -> Option<f64> {
    match literal {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => literal.parse::<f64>().ok(),
    }
}

fn digits_to_f64(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn parse_float_reads_prefix() {
        assert_eq!(parse_float(&text("12abc")), Some(12.0));
        assert_eq!(parse_float(&text("3.5.1")), Some(3.5));
        assert_eq!(parse_float(&text("1e3x")), Some(1000.0));
        assert_eq!(parse_float(&text("1e")), Some(1.0));
        assert_eq!(parse_float(&text(".5")), Some(0.5));
        assert_eq!(parse_float(&text("-.5")), Some(-0.5));
        assert_eq!(parse_float(&text("7.")), Some(7.0));
    }

    #[test]
    fn parse_float_skips_leading_whitespace() {
        assert_eq!(parse_float(&text("   8")), Some(8.0));
        assert_eq!(parse_float(&text("\t-2.25 ")), Some(-2.25));
    }

    #[test]
    fn parse_float_rejects_non_numeric() {
        assert_eq!(parse_float(&text("")), None);
        assert_eq!(parse_float(&text("abc")), None);
        assert_eq!(parse_float(&text("-")), None);
        assert_eq!(parse_float(&text(".")), None);
        assert_eq!(parse_float(&text("NaN")), None);
        assert_eq!(parse_float(&text("inf")), None);
        assert_eq!(parse_float(&Value::Null), None);
        assert_eq!(parse_float(&Value::Number(f64::NAN)), None);
    }

    #[test]
    fn parse_float_infinity() {
        assert_eq!(parse_float(&text("Infinity")), Some(f64::INFINITY));
        assert_eq!(parse_float(&text("-Infinityish")), Some(f64::NEG_INFINITY));
        assert_eq!(parse_float(&text("infinity")), None);
    }

    #[test]
    fn parse_float_passes_numbers_through() {
        assert_eq!(parse_float(&Value::Number(4.0)), Some(4.0));
        assert_eq!(parse_float(&Value::Number(-0.25)), Some(-0.25));
    }

    #[test]
    fn try_parse_requires_whole_literal() {
        assert_eq!(try_parse(&text("42")), Value::Number(42.0));
        assert_eq!(try_parse(&text(" 4.5 ")), Value::Number(4.5));
        assert_eq!(try_parse(&text("1e2")), Value::Number(100.0));
        assert_eq!(try_parse(&text("42abc")), text("42abc"));
        assert_eq!(try_parse(&text("")), text(""));
        assert_eq!(try_parse(&text("NaN")), text("NaN"));
        assert_eq!(try_parse(&Value::Null), Value::Null);
        assert_eq!(try_parse(&Value::Number(3.0)), Value::Number(3.0));
    }

    #[test]
    fn string_to_number_rules() {
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("   "), 0.0);
        assert_eq!(string_to_number(" 5 "), 5.0);
        assert_eq!(string_to_number("0x1A"), 26.0);
        assert_eq!(string_to_number("0o17"), 15.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("5px").is_nan());
        assert!(string_to_number("0x").is_nan());
        assert!(string_to_number("0xZZ").is_nan());
    }
}
