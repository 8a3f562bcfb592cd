//! Classification of OCR backend failures.
//!
//! Backends report failures as free text, so asset problems are recognized
//! by message. Keep every heuristic in [`BACKEND_FAILURE_TABLE`]; rows are
//! checked in order and unmatched messages fall back to
//! [`ErrorKind::BackendFailed`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{BackendError, ClassifiedError, ErrorKind};

lazy_static! {
    pub static ref BACKEND_FAILURE_TABLE: Vec<(Regex, ErrorKind)> = vec![
        // "failed to fetch recognition model data", "could not load model: ..."
        // The asset noun must directly follow the verb.
        (
            Regex::new(
                r"(?i)\b(?:fail(?:ed|ure)?|unable|could\s+not|cannot|can't|error)\b[^\n]*?\b(?:fetch|load|retriev|download|read|open|find)\w*\s+(?:(?:the|recognition|detection|language|ocr|onnx)\s+)*(?:traineddata|lang(?:uage)?\s+data|recognition\s+(?:data|model)|models?|dictionary|weights)\b"
            ).unwrap(),
            ErrorKind::BackendAssetLoadFailed,
        ),
        // Tesseract language files
        (
            Regex::new(r"(?i)\.traineddata\b").unwrap(),
            ErrorKind::BackendAssetLoadFailed,
        ),
        // Missing ONNX model files
        (
            Regex::new(r"(?i)\.onnx\b[^\n]*\b(?:not\s+found|missing|no\s+such\s+file)").unwrap(),
            ErrorKind::BackendAssetLoadFailed,
        ),
    ];
}

/// Classify a backend failure message.
pub fn classify_message(message: &str) -> ErrorKind {
    BACKEND_FAILURE_TABLE
        .iter()
        .find(|(pattern, _)| pattern.is_match(message))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::BackendFailed)
}

/// Map a backend error onto the extraction error taxonomy.
pub fn classify_backend_error(error: &BackendError) -> ClassifiedError {
    let kind = match error {
        BackendError::Cancelled | BackendError::TimedOut => ErrorKind::BackendFailed,
        BackendError::Failed(message) => classify_message(message),
    };

    let message = match kind {
        ErrorKind::BackendAssetLoadFailed => {
            format!("OCR backend could not load recognition assets: {}", error)
        }
        _ => format!("OCR backend failed: {}", error),
    };

    ClassifiedError::new(kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_failures() {
        for message in [
            "Failed to fetch recognition model data",
            "failed to load model: pure-onnx-ocr: invalid protobuf",
            "Error: Failed to retrieve language data for eng",
            "Network error while fetching https://cdn.example.com/eng.traineddata.gz",
            "models/det.onnx: No such file or directory",
        ] {
            assert_eq!(
                classify_message(message),
                ErrorKind::BackendAssetLoadFailed,
                "{}",
                message
            );
        }
    }

    #[test]
    fn test_other_failures() {
        for message in [
            "failed to decode image: invalid PNG signature",
            "text recognition failed: tensor shape mismatch",
            "text recognition failed: could not read output of model",
            "error: failed to load image, model input expects 3 channels",
            "out of memory",
        ] {
            assert_eq!(classify_message(message), ErrorKind::BackendFailed, "{}", message);
        }
    }

    #[test]
    fn test_cancellation_is_backend_failure() {
        let err = classify_backend_error(&BackendError::Cancelled);
        assert_eq!(err.kind, ErrorKind::BackendFailed);
        assert_eq!(err.message, "OCR backend failed: recognition cancelled");

        let err = classify_backend_error(&BackendError::TimedOut);
        assert_eq!(err.kind, ErrorKind::BackendFailed);
    }

    #[test]
    fn test_asset_failure_message() {
        let err = classify_backend_error(&BackendError::Failed(
            "failed to fetch recognition model data: det.onnx not found".to_string(),
        ));
        assert_eq!(err.kind, ErrorKind::BackendAssetLoadFailed);
        assert!(err.message.starts_with("OCR backend could not load recognition assets"));
    }
}
