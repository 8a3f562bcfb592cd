//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod models;
pub mod process;

use std::path::{Path, PathBuf};

use console::style;
use taxscan_core::{ClassifiedError, DocumentType, ErrorKind, TaxscanConfig};

/// Document type selection on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentArg {
    /// Form W-2
    W2,
    /// Form 1099-INT
    #[value(name = "1099-int")]
    Int1099,
    /// Identify the form from its title
    Auto,
}

impl DocumentArg {
    /// The fixed document type, or `None` for detection.
    pub fn document_type(self) -> Option<DocumentType> {
        match self {
            DocumentArg::W2 => Some(DocumentType::W2),
            DocumentArg::Int1099 => Some(DocumentType::Form1099Int),
            DocumentArg::Auto => None,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taxscan")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TaxscanConfig> {
    if let Some(path) = config_path {
        return Ok(TaxscanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(TaxscanConfig::from_file(&default_path)?)
    } else {
        Ok(TaxscanConfig::default())
    }
}

/// Model directory: command line, then the configured directory if it
/// exists, then the download location.
pub fn resolve_model_dir(arg: Option<&Path>, config: &TaxscanConfig) -> PathBuf {
    if let Some(dir) = arg {
        return dir.to_path_buf();
    }
    if config.models.model_dir.is_dir() {
        return config.models.model_dir.clone();
    }
    models::default_model_dir()
}

/// What the user can do about a classified failure.
pub fn hint_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::PdfNotSupported => {
            "Upload an image of the document instead (PNG, JPEG, WebP, TIFF or BMP)."
        }
        ErrorKind::UnsupportedFileType => "Supported formats: PNG, JPEG, WebP, TIFF and BMP.",
        ErrorKind::BackendAssetLoadFailed => {
            "Run 'taxscan models download' or pass --model-dir, then retry."
        }
        ErrorKind::FieldsNotFound => {
            "Try a clearer scan, check the document type (-t), or enter the values manually."
        }
        ErrorKind::BackendFailed => "Re-run with -vv for details.",
    }
}

/// Print a hint on stderr when `err` is a classified extraction failure.
pub fn print_hint(err: &anyhow::Error) {
    if let Some(classified) = err.downcast_ref::<ClassifiedError>() {
        eprintln!(
            "{} [{}] {}",
            style("hint").yellow().bold(),
            classified.kind,
            hint_for(classified.kind)
        );
    }
}
