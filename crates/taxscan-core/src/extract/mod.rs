//! Document field extraction: text acquisition followed by rule application.

mod engine;
mod layout;

pub use engine::{extract_fields, missing_optional_fields};
pub use layout::pair_stacked_labels;

use std::time::Instant;

use tracing::{info, warn};

use crate::error::ClassifiedError;
use crate::fields::{DocumentType, DocumentTypeSpec};
use crate::models::config::ExtractionConfig;
use crate::models::record::ExtractionResult;
use crate::ocr::{AcquiredText, DocumentFile, OcrBackend, TextAcquirer};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ClassifiedError>;

/// Extracts typed records from scanned tax documents.
///
/// Holds no per-call state; one extractor can serve concurrent calls.
pub struct DocumentExtractor<B> {
    acquirer: TextAcquirer<B>,
    config: ExtractionConfig,
}

impl<B: OcrBackend> DocumentExtractor<B> {
    /// Create an extractor over the given OCR backend.
    pub fn new(backend: B) -> Self {
        Self {
            acquirer: TextAcquirer::new(backend),
            config: ExtractionConfig::default(),
        }
    }

    /// Set extraction configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn acquirer(&self) -> &TextAcquirer<B> {
        &self.acquirer
    }

    /// Acquire text from `file` and extract the fields of `spec`.
    pub async fn extract(&self, spec: &DocumentTypeSpec, file: &DocumentFile) -> Result<ExtractionResult> {
        let start = Instant::now();
        let acquired = self.acquirer.acquire_text(file).await?;
        self.finish(spec, acquired, start)
    }

    /// Extract a built-in document type.
    pub async fn extract_document(
        &self,
        document_type: DocumentType,
        file: &DocumentFile,
    ) -> Result<ExtractionResult> {
        self.extract(document_type.spec(), file).await
    }

    /// Extract W-2 fields.
    pub async fn extract_w2_data(&self, file: &DocumentFile) -> Result<ExtractionResult> {
        self.extract_document(DocumentType::W2, file).await
    }

    /// Extract 1099-INT fields.
    pub async fn extract_1099_int_data(&self, file: &DocumentFile) -> Result<ExtractionResult> {
        self.extract_document(DocumentType::Form1099Int, file).await
    }

    /// Acquire text, identify the form by its title, then extract it.
    pub async fn extract_auto(&self, file: &DocumentFile) -> Result<ExtractionResult> {
        let start = Instant::now();
        let acquired = self.acquirer.acquire_text(file).await?;
        self.finish_detected(acquired, start)
    }

    /// Extract fields from already-recognized text, skipping OCR.
    pub fn extract_from_text(
        &self,
        spec: &DocumentTypeSpec,
        acquired: AcquiredText,
    ) -> Result<ExtractionResult> {
        self.finish(spec, acquired, Instant::now())
    }

    /// Identify the form in already-recognized text and extract it.
    pub fn extract_auto_from_text(&self, acquired: AcquiredText) -> Result<ExtractionResult> {
        self.finish_detected(acquired, Instant::now())
    }

    fn finish_detected(&self, acquired: AcquiredText, start: Instant) -> Result<ExtractionResult> {
        let Some(document_type) = DocumentType::detect(&acquired.text) else {
            warn!("Could not identify document type from recognized text");
            return Err(ClassifiedError::fields_not_found("tax document", &[]));
        };

        info!("Detected {} document", document_type);
        self.finish(document_type.spec(), acquired, start)
    }

    fn finish(
        &self,
        spec: &DocumentTypeSpec,
        acquired: AcquiredText,
        start: Instant,
    ) -> Result<ExtractionResult> {
        info!(
            "Extracting {} fields from {} characters of text",
            spec.name,
            acquired.text.len()
        );

        let record = extract_fields(spec, &acquired.text)?;

        let mut warnings: Vec<String> = missing_optional_fields(spec, &record)
            .into_iter()
            .map(|name| format!("optional field not found: {}", name))
            .collect();

        if acquired.confidence < self.config.low_confidence_threshold {
            warnings.push(format!(
                "low OCR confidence ({:.1}), verify extracted values",
                acquired.confidence
            ));
        }

        info!(
            "Extracted {} {} fields with {} warnings",
            record.len(),
            spec.name,
            warnings.len()
        );

        Ok(ExtractionResult {
            document_type: spec.name.to_string(),
            record,
            confidence: acquired.confidence,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
            raw_text: self.config.keep_raw_text.then_some(acquired.text),
        })
    }
}
