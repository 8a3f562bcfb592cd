//! Text acquisition: media type checks in front of an injected OCR backend.

pub mod classify;
mod media;
#[cfg(feature = "native")]
mod pure_engine;

pub use classify::{classify_backend_error, classify_message};
pub use media::MediaType;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrBackend;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BackendError, ClassifiedError};

/// Recognized text with the backend's confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquiredText {
    /// Full recognized text.
    pub text: String,

    /// Recognition confidence (0 - 100).
    pub confidence: f32,
}

impl AcquiredText {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// An uploaded document: raw bytes plus the declared media type.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl DocumentFile {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    /// Read a file, declaring its media type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(bytes, MediaType::for_path(path)))
    }
}

/// An OCR engine: image bytes in, recognized text and confidence out.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Short backend identifier for logs.
    fn name(&self) -> &str;

    /// Recognize text in an encoded raster image.
    async fn recognize(&self, image: &[u8]) -> Result<AcquiredText, BackendError>;
}

#[async_trait]
impl<T: OcrBackend + ?Sized> OcrBackend for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn recognize(&self, image: &[u8]) -> Result<AcquiredText, BackendError> {
        (**self).recognize(image).await
    }
}

#[async_trait]
impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn recognize(&self, image: &[u8]) -> Result<AcquiredText, BackendError> {
        (**self).recognize(image).await
    }
}

/// Validates input and runs the OCR backend once per call.
pub struct TextAcquirer<B> {
    backend: B,
}

impl<B: OcrBackend> TextAcquirer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Acquire text from a document.
    ///
    /// PDFs and non-raster media types are rejected before the backend is
    /// called. Backend failures are classified; low confidence is not an
    /// error.
    pub async fn acquire_text(&self, file: &DocumentFile) -> Result<AcquiredText, ClassifiedError> {
        let media_type = MediaType::parse(&file.media_type);

        if media_type == MediaType::Pdf {
            debug!("Rejecting PDF upload before OCR");
            return Err(ClassifiedError::pdf_not_supported());
        }

        if !media_type.is_raster_image() {
            debug!("Rejecting unsupported media type {}", file.media_type);
            return Err(ClassifiedError::unsupported_file_type(&file.media_type));
        }

        info!(
            "Running {} OCR on {} bytes of {:?}",
            self.backend.name(),
            file.bytes.len(),
            media_type
        );

        match self.backend.recognize(&file.bytes).await {
            Ok(acquired) => {
                debug!(
                    "OCR returned {} characters at confidence {:.1}",
                    acquired.text.len(),
                    acquired.confidence
                );
                Ok(acquired)
            }
            Err(e) => {
                let classified = classify_backend_error(&e);
                warn!("OCR backend failed ({}): {}", classified.kind, e);
                Err(classified)
            }
        }
    }
}
