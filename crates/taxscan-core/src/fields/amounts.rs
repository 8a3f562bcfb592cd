//! Currency amount parsing for U.S. tax forms.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::models::record::FieldValue;

/// Parse a U.S.-formatted currency amount (e.g., "56,123.45", "$ 245.18").
///
/// Thousands separators, a leading dollar sign and stray spaces are dropped.
/// Anything else that is not a digit or a single decimal point rejects the
/// whole value. The result is rounded to cents and carries scale 2.
pub fn parse_currency_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);

    let mut cleaned = String::with_capacity(trimmed.len());
    let mut seen_point = false;

    for c in trimmed.chars() {
        match c {
            '0'..='9' => cleaned.push(c),
            '.' if !seen_point => {
                seen_point = true;
                cleaned.push(c);
            }
            ',' | ' ' | '\t' | '\u{00a0}' => {}
            _ => return None,
        }
    }

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    let mut amount = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    Some(amount)
}

/// Value parser for amount fields.
pub fn parse_amount_value(s: &str) -> Option<FieldValue> {
    parse_currency_amount(s).map(FieldValue::Amount)
}

/// Format amount in U.S. style (56,123.45).
pub fn format_currency_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = digits.split_once('.') else {
        return s;
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}.{}", sign, formatted, decimal_part)
}
