//! End-to-end extraction through a scripted OCR backend.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use taxscan_core::models::config::ExtractionConfig;
use taxscan_core::{
    AcquiredText, BackendError, DocumentExtractor, DocumentFile, ErrorKind, OcrBackend,
};

const W2_TEXT: &str = "Form W-2 Wage and Tax Statement 2024\n\
    Employer's name ACME CORPORATION Employer identification number 12-3456789\n\
    1 Wages, tips, other compensation 56,123.45\n\
    2 Federal income tax withheld 6,789.10\n\
    3 Social security wages 58,000.00\n\
    5 Medicare wages and tips 58,000.00";

const INT_TEXT: &str = "Form 1099-INT Interest Income\n\
    PAYER'S name FIRST NATIONAL BANK\n\
    1 Interest income 245.18";

/// Replays a fixed outcome and counts invocations.
struct ScriptedBackend {
    outcome: Result<AcquiredText, BackendError>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn text(text: &str, confidence: f32) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(AcquiredText::new(text, confidence)),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(error: BackendError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn recognize(&self, _image: &[u8]) -> Result<AcquiredText, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn png() -> DocumentFile {
    DocumentFile::new(vec![0x89, b'P', b'N', b'G'], "image/png")
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn pdf_is_rejected_without_calling_backend() {
    let backend = ScriptedBackend::text(W2_TEXT, 95.0);
    let extractor = DocumentExtractor::new(backend.clone());

    let pdf = DocumentFile::new(b"%PDF-1.7".to_vec(), "application/pdf");
    let err = extractor.acquirer().acquire_text(&pdf).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PdfNotSupported);

    let err = extractor.extract_w2_data(&pdf).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PdfNotSupported);

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn unsupported_media_type_is_rejected() {
    let backend = ScriptedBackend::text(W2_TEXT, 95.0);
    let extractor = DocumentExtractor::new(backend.clone());

    for media_type in ["text/plain", "application/msword", "image/svg+xml", ""] {
        let file = DocumentFile::new(b"data".to_vec(), media_type);
        let err = extractor.acquirer().acquire_text(&file).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFileType, "{}", media_type);
    }

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn asset_failure_is_classified() {
    let backend = ScriptedBackend::failing(BackendError::Failed(
        "Failed to fetch eng.traineddata: network error".to_string(),
    ));
    let extractor = DocumentExtractor::new(backend.clone());

    let err = extractor.extract_w2_data(&png()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendAssetLoadFailed);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn other_backend_failures_are_not_swallowed() {
    let extractor = DocumentExtractor::new(ScriptedBackend::failing(BackendError::Failed(
        "failed to decode image: truncated file".to_string(),
    )));
    let err = extractor.extract_w2_data(&png()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendFailed);

    let extractor = DocumentExtractor::new(ScriptedBackend::failing(BackendError::Cancelled));
    let err = extractor.extract_1099_int_data(&png()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendFailed);
}

#[tokio::test]
async fn acquired_text_is_returned_unchanged() {
    let extractor = DocumentExtractor::new(ScriptedBackend::text("  raw\nOCR  text ", 12.5));
    let acquired = extractor.acquirer().acquire_text(&png()).await.unwrap();
    assert_eq!(acquired, AcquiredText::new("  raw\nOCR  text ", 12.5));
}

#[tokio::test]
async fn w2_scenario() {
    let extractor = DocumentExtractor::new(ScriptedBackend::text(W2_TEXT, 91.0));
    let result = extractor.extract_w2_data(&png()).await.unwrap();

    let record = &result.record;
    assert!(record.text("employer").unwrap().contains("ACME CORPORATION"));
    assert_eq!(record.text("ein"), Some("12-3456789"));
    assert_eq!(record.amount("wages"), Some(dec("56123.45")));
    assert_eq!(record.amount("federalTaxWithheld"), Some(dec("6789.10")));
    assert_eq!(record.amount("socialSecurityWages"), Some(dec("58000.00")));
    assert_eq!(record.amount("medicareWages"), Some(dec("58000.00")));
    assert!(!record.contains("socialSecurityTips"));

    assert_eq!(result.document_type, "W-2");
    assert_eq!(result.confidence, 91.0);
    assert!(result.raw_text.is_none());
    assert!(result
        .warnings
        .contains(&"optional field not found: socialSecurityTips".to_string()));
}

#[tokio::test]
async fn w2_scenario_on_a_single_line() {
    let text = "Employer's name ACME CORPORATION Employer identification number 12-3456789 \
                1 Wages, tips, other compensation 56,123.45 2 Federal income tax withheld 6,789.10";
    let extractor = DocumentExtractor::new(ScriptedBackend::text(text, 80.0));
    let result = extractor.extract_w2_data(&png()).await.unwrap();

    assert_eq!(result.record.text("employer"), Some("ACME CORPORATION"));
    assert_eq!(result.record.amount("wages"), Some(dec("56123.45")));
    assert_eq!(result.record.amount("federalTaxWithheld"), Some(dec("6789.10")));
}

#[tokio::test]
async fn w2_boxes_read_side_by_side() {
    let text = "Form W-2 Wage and Tax Statement 2024\n\
                Employer's name ACME CORPORATION Employer identification number 12-3456789\n\
                1 Wages, tips, other compensation\n\
                2 Federal income tax withheld\n\
                56,123.45\n\
                6,789.10";
    let extractor = DocumentExtractor::new(ScriptedBackend::text(text, 90.0));
    let result = extractor.extract_w2_data(&png()).await.unwrap();

    assert_eq!(result.record.amount("wages"), Some(dec("56123.45")));
    assert_eq!(result.record.amount("federalTaxWithheld"), Some(dec("6789.10")));
}

#[tokio::test]
async fn w2_in_whole_dollars() {
    let text = "Employer's name ACME CORPORATION Employer identification number 12-3456789\n\
                1 Wages, tips, other compensation 56,123\n\
                2 Federal income tax withheld 6,789";
    let extractor = DocumentExtractor::new(ScriptedBackend::text(text, 90.0));
    let result = extractor.extract_w2_data(&png()).await.unwrap();

    assert_eq!(result.record.amount("wages"), Some(dec("56123.00")));
    assert_eq!(result.record.amount("federalTaxWithheld"), Some(dec("6789.00")));
}

#[tokio::test]
async fn blank_employer_name_is_missing() {
    let text = "Form W-2 Wage and Tax Statement 2024\n\
                Employer's name\n\
                Employer identification number 12-3456789\n\
                1 Wages, tips, other compensation 56,123.45\n\
                2 Federal income tax withheld 6,789.10";
    let extractor = DocumentExtractor::new(ScriptedBackend::text(text, 90.0));
    let err = extractor.extract_w2_data(&png()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::FieldsNotFound);
    assert_eq!(err.message, "could not find W-2 fields: employer");
}

#[tokio::test]
async fn blank_payer_name_is_missing() {
    let text = "Form 1099-INT\n\
                PAYER'S name\n\
                RECIPIENT'S name JANE DOE\n\
                1 Interest income 245.18";
    let extractor = DocumentExtractor::new(ScriptedBackend::text(text, 90.0));
    let err = extractor.extract_1099_int_data(&png()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::FieldsNotFound);
    assert_eq!(err.message, "could not find 1099-INT fields: payer");
}

#[tokio::test]
async fn w2_failure_names_the_document() {
    let extractor = DocumentExtractor::new(ScriptedBackend::text(
        "Lorem ipsum dolor sit amet, grocery list: milk 3.49",
        88.0,
    ));
    let err = extractor.extract_w2_data(&png()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::FieldsNotFound);
    assert!(err.message.starts_with("could not find W-2 fields"));
}

#[tokio::test]
async fn form_1099_int_scenario() {
    let extractor = DocumentExtractor::new(ScriptedBackend::text(INT_TEXT, 97.0));
    let result = extractor.extract_1099_int_data(&png()).await.unwrap();

    assert!(result.record.text("payer").unwrap().contains("FIRST NATIONAL BANK"));
    assert_eq!(result.record.amount("amount"), Some(dec("245.18")));
    assert_eq!(result.document_type, "1099-INT");
}

#[tokio::test]
async fn form_1099_int_failure_names_the_document() {
    let extractor = DocumentExtractor::new(ScriptedBackend::text("PAYER'S name FIRST NATIONAL BANK", 97.0));
    let err = extractor.extract_1099_int_data(&png()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::FieldsNotFound);
    assert_eq!(err.message, "could not find 1099-INT fields: amount");
}

#[tokio::test]
async fn extraction_is_idempotent() {
    let extractor = DocumentExtractor::new(ScriptedBackend::text(W2_TEXT, 91.0));
    let first = extractor.extract_w2_data(&png()).await.unwrap();
    let second = extractor.extract_w2_data(&png()).await.unwrap();
    assert_eq!(first.record, second.record);
    assert_eq!(first.warnings, second.warnings);

    let extractor = DocumentExtractor::new(ScriptedBackend::text("nothing here", 91.0));
    let first = extractor.extract_w2_data(&png()).await.unwrap_err();
    let second = extractor.extract_w2_data(&png()).await.unwrap_err();
    assert_eq!(first, second);
}

#[tokio::test]
async fn auto_detects_document_type() {
    let extractor = DocumentExtractor::new(ScriptedBackend::text(INT_TEXT, 97.0));
    let result = extractor.extract_auto(&png()).await.unwrap();
    assert_eq!(result.document_type, "1099-INT");

    let extractor = DocumentExtractor::new(ScriptedBackend::text("unrelated text", 97.0));
    let err = extractor.extract_auto(&png()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::FieldsNotFound);
}

#[tokio::test]
async fn low_confidence_is_advisory() {
    let config = ExtractionConfig {
        low_confidence_threshold: 50.0,
        keep_raw_text: true,
    };
    let extractor = DocumentExtractor::new(ScriptedBackend::text(INT_TEXT, 21.0)).with_config(config);
    let result = extractor.extract_1099_int_data(&png()).await.unwrap();

    assert_eq!(result.confidence, 21.0);
    assert_eq!(result.raw_text.as_deref(), Some(INT_TEXT));
    assert!(result.warnings.iter().any(|w| w.starts_with("low OCR confidence")));
}

#[tokio::test]
async fn concurrent_extractions_are_independent() {
    let extractor = Arc::new(DocumentExtractor::new(ScriptedBackend::text(W2_TEXT, 91.0)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let extractor = extractor.clone();
            tokio::spawn(async move { extractor.extract_w2_data(&png()).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.record.amount("wages"), Some(dec("56123.45")));
    }
}
