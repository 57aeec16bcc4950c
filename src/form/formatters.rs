//! Ready-made field formatters, usable with [`FieldOptions::formatter`].
//!
//! [`FieldOptions::formatter`]: super::FieldOptions::formatter

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Number;

use super::value::FieldValue;

const MAX_FRACTION_DIGITS: u64 = 8;

/// Keeps numeric input numeric.
///
/// `after_dot`, when it is a non-negative integer, caps the number of digits
/// kept after the decimal separator. Text is stripped down to digits, a
/// leading `-` and a single separator (`,` is read as `.`) and cut rather than
/// rounded, so in-progress input such as `"12."` survives. Numbers are
/// truncated the same way. Other values pass through.
pub fn decimal(value: FieldValue, after_dot: Option<&FieldValue>) -> FieldValue {
    let fraction_digits = after_dot
        .and_then(FieldValue::as_u64)
        .map(|digits| digits.min(MAX_FRACTION_DIGITS) as usize);
    match value {
        FieldValue::String(text) => {
            FieldValue::String(sanitize_decimal_text(&text, fraction_digits))
        }
        FieldValue::Number(number) => match truncate_number(&number, fraction_digits) {
            Some(truncated) => truncated,
            None => FieldValue::Number(number),
        },
        other => other,
    }
}

/// Trims surrounding whitespace from text values.
pub fn trimmed(value: FieldValue, _after_dot: Option<&FieldValue>) -> FieldValue {
    match value {
        FieldValue::String(text) => FieldValue::String(text.trim().to_string()),
        other => other,
    }
}

fn sanitize_decimal_text(text: &str, fraction_digits: Option<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut seen_separator = false;
    let mut fraction = 0usize;

    for (index, ch) in text.trim().chars().enumerate() {
        match ch {
            '-' if index == 0 => out.push('-'),
            '0'..='9' => {
                if seen_separator {
                    if fraction_digits.is_some_and(|limit| fraction >= limit) {
                        continue;
                    }
                    fraction += 1;
                }
                out.push(ch);
            }
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                if fraction_digits != Some(0) {
                    out.push('.');
                }
            }
            _ => {}
        }
    }
    out
}

fn truncate_number(number: &Number, fraction_digits: Option<usize>) -> Option<FieldValue> {
    let digits = fraction_digits?;
    if number.is_i64() || number.is_u64() {
        return None;
    }

    let text = number.to_string();
    let parsed = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()?;
    let truncated = parsed
        .round_dp_with_strategy(digits as u32, RoundingStrategy::ToZero)
        .normalize();
    if truncated.scale() == 0
        && let Some(integer) = truncated.to_i64()
    {
        return Some(FieldValue::from(integer));
    }
    let float = truncated.to_string().parse::<f64>().ok()?;
    Number::from_f64(float).map(FieldValue::Number)
}
