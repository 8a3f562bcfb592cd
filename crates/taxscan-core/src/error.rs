//! Error types for the taxscan-core library.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable classification of an extraction failure.
///
/// Callers match on the kind, not on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Declared media type is neither PDF nor a supported raster image.
    UnsupportedFileType,
    /// Input was a PDF document.
    PdfNotSupported,
    /// The OCR backend could not load its recognition assets.
    BackendAssetLoadFailed,
    /// Any other OCR backend failure, including cancellation and timeout.
    BackendFailed,
    /// Text was acquired but required fields could not be located.
    FieldsNotFound,
}

impl ErrorKind {
    /// Stable identifier, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFileType => "unsupported_file_type",
            ErrorKind::PdfNotSupported => "pdf_not_supported",
            ErrorKind::BackendAssetLoadFailed => "backend_asset_load_failed",
            ErrorKind::BackendFailed => "backend_failed",
            ErrorKind::FieldsNotFound => "fields_not_found",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal, classified extraction failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ClassifiedError {
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported_file_type(media_type: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedFileType,
            format!("unsupported file type: {}", media_type),
        )
    }

    pub fn pdf_not_supported() -> Self {
        Self::new(
            ErrorKind::PdfNotSupported,
            "PDF files are not supported, upload an image of the document instead",
        )
    }

    /// Required fields of `document` could not be located.
    pub fn fields_not_found(document: &str, missing: &[&str]) -> Self {
        let mut message = format!("could not find {} fields", document);
        if !missing.is_empty() {
            message.push_str(": ");
            message.push_str(&missing.join(", "));
        }
        Self::new(ErrorKind::FieldsNotFound, message)
    }
}

/// Failure reported by an OCR backend before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The recognition task was cancelled before completing.
    #[error("recognition cancelled")]
    Cancelled,

    /// The backend gave up waiting for recognition.
    #[error("recognition timed out")]
    TimedOut,

    /// Any other backend failure, described by its message.
    #[error("{0}")]
    Failed(String),
}

/// Main error type for configuration and I/O paths of the library.
#[derive(Error, Debug)]
pub enum TaxscanError {
    /// Classified extraction failure.
    #[error(transparent)]
    Classified(#[from] ClassifiedError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the taxscan library.
pub type Result<T> = std::result::Result<T, TaxscanError>;
