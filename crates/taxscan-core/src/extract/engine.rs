//! Rule application over recognized text.

use tracing::{debug, trace, warn};

use crate::error::ClassifiedError;
use crate::fields::DocumentTypeSpec;
use crate::models::record::ExtractedRecord;

use super::layout::pair_stacked_labels;

/// Run every rule of `spec` over `text` and enforce required fields.
///
/// Stacked box labels are first paired with their values. Rules then run in
/// declaration order; each keeps the first occurrence of its label whose
/// value parses. Fails with `FieldsNotFound`, naming the
/// document type and the missing fields, when any required field is absent.
pub fn extract_fields(
    spec: &DocumentTypeSpec,
    text: &str,
) -> Result<ExtractedRecord, ClassifiedError> {
    let text = pair_stacked_labels(text);
    let mut record = ExtractedRecord::new();

    for rule in &spec.rules {
        match rule.apply(&text) {
            Some(value) => {
                trace!("{}: {} = {}", spec.name, rule.name, value);
                record.insert(rule.name, value);
            }
            None => {
                debug!("{}: field {} not found", spec.name, rule.name);
            }
        }
    }

    let missing: Vec<&str> = spec
        .required_fields()
        .filter(|name| !record.contains(name))
        .collect();

    if !missing.is_empty() {
        warn!(
            "{}: missing required fields {}",
            spec.name,
            missing.join(", ")
        );
        return Err(ClassifiedError::fields_not_found(spec.name, &missing));
    }

    Ok(record)
}

/// Optional fields of `spec` absent from `record`.
pub fn missing_optional_fields<'s>(
    spec: &'s DocumentTypeSpec,
    record: &ExtractedRecord,
) -> Vec<&'s str> {
    spec.rules
        .iter()
        .filter(|r| !r.required && !record.contains(r.name))
        .map(|r| r.name)
        .collect()
}
