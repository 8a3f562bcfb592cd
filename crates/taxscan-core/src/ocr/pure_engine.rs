//! OCR backend using `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use async_trait::async_trait;
use image::GenericImageView;
use pure_onnx_ocr::engine::{OcrEngine, OcrEngineBuilder};
use tracing::{debug, info};

use crate::error::BackendError;
use crate::models::config::{ModelConfig, OcrConfig, TaxscanConfig};

use super::{AcquiredText, OcrBackend};

/// PaddleOCR models run through `pure-onnx-ocr`.
///
/// The engine is loaded on the first successful call and then shared,
/// read-only, by every later call and every clone. A failed load is not
/// remembered, so the next call tries again.
#[derive(Clone)]
pub struct PureOcrBackend {
    det_path: PathBuf,
    rec_path: PathBuf,
    dict_path: PathBuf,
    config: OcrConfig,
    engine: Arc<OnceLock<OcrEngine>>,
}

impl fmt::Debug for PureOcrBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PureOcrBackend")
            .field("det_path", &self.det_path)
            .field("rec_path", &self.rec_path)
            .field("dict_path", &self.dict_path)
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl PureOcrBackend {
    /// Create a backend reading model files from a directory.
    pub fn from_dir(model_dir: &Path, models: &ModelConfig, config: OcrConfig) -> Self {
        let [det_path, rec_path, dict_path] = models.files_in(model_dir);
        Self {
            det_path,
            rec_path,
            dict_path,
            config,
            engine: Arc::new(OnceLock::new()),
        }
    }

    /// Create a backend from the pipeline configuration.
    pub fn from_config(config: &TaxscanConfig) -> Self {
        Self::from_dir(&config.models.model_dir, &config.models, config.ocr.clone())
    }

    /// Model files that do not exist on disk.
    pub fn missing_files(&self) -> Vec<&Path> {
        [&self.det_path, &self.rec_path, &self.dict_path]
            .into_iter()
            .filter(|p| !p.exists())
            .map(PathBuf::as_path)
            .collect()
    }

    /// Whether the models have been loaded.
    pub fn is_loaded(&self) -> bool {
        self.engine.get().is_some()
    }

    /// The shared engine, loading the models if no call has yet.
    fn engine(&self) -> Result<&OcrEngine, BackendError> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine);
        }

        if let Some(missing) = self.missing_files().first() {
            return Err(BackendError::Failed(format!(
                "failed to fetch recognition model data: {} not found",
                missing.display()
            )));
        }

        let engine = OcrEngineBuilder::new()
            .det_model_path(&self.det_path)
            .rec_model_path(&self.rec_path)
            .dictionary_path(&self.dict_path)
            .build()
            .map_err(|e| BackendError::Failed(format!("failed to load model: pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", self.det_path.display());

        // Concurrent first calls may both load; the first stored engine wins.
        Ok(self.engine.get_or_init(|| engine))
    }
}

#[async_trait]
impl OcrBackend for PureOcrBackend {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    async fn recognize(&self, image: &[u8]) -> Result<AcquiredText, BackendError> {
        let backend = self.clone();
        let bytes = image.to_vec();

        tokio::task::spawn_blocking(move || backend.recognize_blocking(&bytes))
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    BackendError::Cancelled
                } else {
                    BackendError::Failed(format!("recognition worker panicked: {}", e))
                }
            })?
    }
}

impl PureOcrBackend {
    fn recognize_blocking(&self, bytes: &[u8]) -> Result<AcquiredText, BackendError> {
        let engine = self.engine()?;

        let image = image::load_from_memory(bytes)
            .map_err(|e| BackendError::Failed(format!("failed to decode image: {}", e)))?;

        let start = Instant::now();
        let (width, height) = image.dimensions();
        info!("Processing image: {}x{}", width, height);

        let results = engine
            .run_from_image(&image)
            .map_err(|e| BackendError::Failed(format!("text recognition failed: pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut regions: Vec<Region> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Region {
                    origin: polygon_origin(&r.bounding_box),
                    text,
                    confidence: r.confidence,
                }
            })
            .collect();

        sort_by_reading_order(&mut regions);

        let text = regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let confidence = if regions.is_empty() {
            0.0
        } else {
            let mean = regions.iter().map(|r| r.confidence).sum::<f32>() / regions.len() as f32;
            (mean * 100.0).clamp(0.0, 100.0)
        };

        info!(
            "OCR complete: {} text regions in {}ms",
            regions.len(),
            start.elapsed().as_millis()
        );

        Ok(AcquiredText { text, confidence })
    }
}

/// A recognized text region.
#[derive(Debug, Clone)]
struct Region {
    /// Top-left corner (x, y) of the region's bounding rectangle.
    origin: (f32, f32),
    text: String,
    confidence: f32,
}

/// Sort regions top-to-bottom, then left-to-right within a 20px row band.
fn sort_by_reading_order(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        let row_a = (a.origin.1 / 20.0) as i32;
        let row_b = (b.origin.1 / 20.0) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            a.origin
                .0
                .partial_cmp(&b.origin.0)
                .unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Top-left corner of the first four exterior points of a polygon.
fn polygon_origin(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f32::INFINITY, f32::INFINITY), |(min_x, min_y), c| {
            (min_x.min(c.x as f32), min_y.min(c.y as f32))
        })
}
