//! Text and identifier value parsers.

use crate::models::record::FieldValue;

use super::patterns::FORM_LABEL_START;

/// Value parser for free-text fields: the trimmed literal span.
pub fn parse_text_value(s: &str) -> Option<FieldValue> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(FieldValue::Text(trimmed.to_string()))
    }
}

/// Value parser for party names.
///
/// Rejects spans that start with form label text, which is what a name
/// pattern captures when the name box itself is blank.
pub fn parse_name_value(s: &str) -> Option<FieldValue> {
    if FORM_LABEL_START.is_match(s.trim()) {
        return None;
    }
    parse_text_value(s)
}

/// Parse a federal Employer Identification Number into `NN-NNNNNNN` form.
///
/// Accepts the nine digits with an optional hyphen and spaces.
pub fn parse_ein(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || c == '-' || c == ' ')
    {
        return None;
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 9 {
        return None;
    }

    Some(format!("{}-{}", &digits[0..2], &digits[2..]))
}

/// Value parser for EIN/TIN fields.
pub fn parse_ein_value(s: &str) -> Option<FieldValue> {
    parse_ein(s).map(FieldValue::Text)
}
