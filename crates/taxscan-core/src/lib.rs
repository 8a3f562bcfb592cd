//! Core library for U.S. tax document OCR.
//!
//! This crate provides:
//! - Text acquisition in front of a pluggable OCR backend, with classified
//!   failures (unsupported input, PDF input, missing recognition assets)
//! - A pure Rust OCR backend using PaddleOCR models (`native` feature)
//! - Field pattern libraries for Form W-2 and Form 1099-INT
//! - A generic extraction engine enforcing each form's required fields

pub mod error;
pub mod extract;
pub mod fields;
pub mod models;
pub mod ocr;

pub use error::{BackendError, ClassifiedError, ErrorKind, Result, TaxscanError};
pub use extract::{extract_fields, DocumentExtractor};
pub use fields::{DocumentType, DocumentTypeSpec, FieldRule};
pub use models::config::TaxscanConfig;
pub use models::record::{ExtractedRecord, ExtractionResult, FieldValue};
pub use ocr::{AcquiredText, DocumentFile, MediaType, OcrBackend, TextAcquirer};

#[cfg(feature = "native")]
pub use ocr::PureOcrBackend;
