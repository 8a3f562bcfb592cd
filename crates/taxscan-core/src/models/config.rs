//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration for the taxscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxscanConfig {
    /// OCR backend configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// OCR backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` markers for unrecognized glyphs instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self { keep_unk: false }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// OCR confidence (0 - 100) below which a warning is attached to results.
    pub low_confidence_threshold: f32,

    /// Include the recognized text in extraction results.
    pub keep_raw_text: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: 60.0,
            keep_raw_text: false,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Paths of the detection model, recognition model and dictionary in `dir`.
    pub fn files_in(&self, dir: &Path) -> [PathBuf; 3] {
        [
            dir.join(&self.detection_model),
            dir.join(&self.recognition_model),
            dir.join(&self.dictionary),
        ]
    }
}

impl TaxscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TaxscanConfig =
            serde_json::from_str(r#"{"extraction": {"keep_raw_text": true}}"#).unwrap();
        assert!(config.extraction.keep_raw_text);
        assert_eq!(config.extraction.low_confidence_threshold, 60.0);
        assert_eq!(config.models.detection_model, "det.onnx");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TaxscanConfig::default();
        config.models.model_dir = PathBuf::from("/opt/taxscan/models");
        config.save(&path).unwrap();

        let loaded = TaxscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.models.model_dir, PathBuf::from("/opt/taxscan/models"));
        assert_eq!(
            loaded.model_path("det.onnx"),
            PathBuf::from("/opt/taxscan/models/det.onnx")
        );
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(TaxscanConfig::from_file(&path).is_err());
    }
}
