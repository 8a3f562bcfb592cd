//! Field pattern library for U.S. tax forms.
//!
//! A [`DocumentTypeSpec`] is an ordered list of [`FieldRule`]s. The
//! extraction engine runs any spec the same way, so supporting a new form
//! means adding a spec here, never touching the engine.

pub mod amounts;
pub mod form1099_int;
pub mod identifiers;
pub mod patterns;
pub mod w2;

pub use amounts::{format_currency_amount, parse_amount_value, parse_currency_amount};
pub use identifiers::{parse_ein, parse_ein_value, parse_name_value, parse_text_value};

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::record::FieldValue;

/// Parses the value span following a label.
pub type ValueParser = fn(&str) -> Option<FieldValue>;

/// One label-anchored field of a document.
#[derive(Clone)]
pub struct FieldRule {
    /// Record key the value is stored under.
    pub name: &'static str,
    /// Label pattern; the value span is its `value` group.
    pub label: &'static Regex,
    /// Value parser for the span.
    pub parser: ValueParser,
    /// Whether extraction fails when this field is absent.
    pub required: bool,
}

impl FieldRule {
    pub fn required(name: &'static str, label: &'static Regex, parser: ValueParser) -> Self {
        Self {
            name,
            label,
            parser,
            required: true,
        }
    }

    pub fn optional(name: &'static str, label: &'static Regex, parser: ValueParser) -> Self {
        Self {
            name,
            label,
            parser,
            required: false,
        }
    }

    /// Find the first label occurrence, in document order, whose value parses.
    pub fn apply(&self, text: &str) -> Option<FieldValue> {
        self.label
            .captures_iter(text)
            .filter_map(|caps| caps.name("value"))
            .find_map(|m| (self.parser)(m.as_str()))
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("label", &self.label.as_str())
            .field("required", &self.required)
            .finish()
    }
}

/// Ordered field rules for one document type.
#[derive(Debug, Clone)]
pub struct DocumentTypeSpec {
    /// User-facing document name, e.g. "W-2".
    pub name: &'static str,
    /// Rules in declaration order.
    pub rules: Vec<FieldRule>,
}

impl DocumentTypeSpec {
    pub fn new(name: &'static str, rules: Vec<FieldRule>) -> Self {
        Self { name, rules }
    }

    /// Names of the required fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().filter(|r| r.required).map(|r| r.name)
    }

    /// Names of all fields, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }
}

/// Built-in document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// Form W-2, Wage and Tax Statement.
    #[serde(rename = "w2")]
    W2,
    /// Form 1099-INT, Interest Income.
    #[serde(rename = "1099-int")]
    Form1099Int,
}

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [DocumentType::W2, DocumentType::Form1099Int];

    /// Field rules for this document type.
    pub fn spec(&self) -> &'static DocumentTypeSpec {
        match self {
            DocumentType::W2 => &*w2::W2_SPEC,
            DocumentType::Form1099Int => &*form1099_int::FORM_1099_INT_SPEC,
        }
    }

    /// User-facing name, as printed on the form.
    pub fn display_name(&self) -> &'static str {
        self.spec().name
    }

    /// Identify the form from its printed title.
    pub fn detect(text: &str) -> Option<Self> {
        if patterns::F1099_INT_TITLE.is_match(text) {
            Some(DocumentType::Form1099Int)
        } else if patterns::W2_TITLE.is_match(text) {
            Some(DocumentType::W2)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w2" | "w-2" => Ok(DocumentType::W2),
            "1099-int" | "1099int" | "1099_int" => Ok(DocumentType::Form1099Int),
            other => Err(format!("unknown document type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_from_str() {
        assert_eq!("W-2".parse::<DocumentType>(), Ok(DocumentType::W2));
        assert_eq!("1099-INT".parse::<DocumentType>(), Ok(DocumentType::Form1099Int));
        assert!("1040".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            DocumentType::detect("Form W-2 Wage and Tax Statement"),
            Some(DocumentType::W2)
        );
        assert_eq!(
            DocumentType::detect("Form 1099-INT\nInterest Income"),
            Some(DocumentType::Form1099Int)
        );
        assert_eq!(DocumentType::detect("grocery receipt"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(DocumentType::W2.to_string(), "W-2");
        assert_eq!(DocumentType::Form1099Int.to_string(), "1099-INT");
    }

    #[test]
    fn test_rule_uses_first_well_formed_occurrence() {
        let rule = FieldRule::required("wages", &patterns::W2_WAGES, parse_amount_value);
        let text = "Wages, tips, other compensation 1.2.34\nWages, tips, other compensation 500.00";
        // No well-formed amount follows the first label.
        assert_eq!(
            rule.apply(text).and_then(|v| v.as_amount()).map(|d| d.to_string()),
            Some("500.00".to_string())
        );
    }
}
