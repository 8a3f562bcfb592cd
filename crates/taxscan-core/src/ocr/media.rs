//! Declared media types of uploaded documents.

use std::path::Path;

/// Media type classification relevant to OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Png,
    Jpeg,
    Webp,
    Tiff,
    Bmp,
    Pdf,
    /// Anything else, carrying the normalized declared type.
    Other(String),
}

impl MediaType {
    /// Classify a declared media type such as `image/png; charset=binary`.
    ///
    /// Parameters are ignored and comparison is case-insensitive.
    pub fn parse(declared: &str) -> Self {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/png" => MediaType::Png,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => MediaType::Jpeg,
            "image/webp" => MediaType::Webp,
            "image/tiff" => MediaType::Tiff,
            "image/bmp" | "image/x-ms-bmp" => MediaType::Bmp,
            "application/pdf" | "application/x-pdf" => MediaType::Pdf,
            _ => MediaType::Other(essence),
        }
    }

    /// Whether the OCR backend accepts this type.
    pub fn is_raster_image(&self) -> bool {
        !matches!(self, MediaType::Pdf | MediaType::Other(_))
    }

    /// Media type to declare for a file extension.
    pub fn for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "tif" | "tiff" => "image/tiff",
            "bmp" => "image/bmp",
            "pdf" => "application/pdf",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    /// Media type to declare for a path, by extension.
    pub fn for_path(path: &Path) -> &'static str {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::for_extension)
            .unwrap_or("application/octet-stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case_and_parameters() {
        assert_eq!(MediaType::parse("IMAGE/PNG; charset=binary"), MediaType::Png);
        assert_eq!(MediaType::parse(" image/jpg "), MediaType::Jpeg);
        assert_eq!(MediaType::parse("application/pdf"), MediaType::Pdf);
        assert_eq!(
            MediaType::parse("text/plain"),
            MediaType::Other("text/plain".to_string())
        );
    }

    #[test]
    fn test_raster_images() {
        assert!(MediaType::Png.is_raster_image());
        assert!(MediaType::Tiff.is_raster_image());
        assert!(!MediaType::Pdf.is_raster_image());
        assert!(!MediaType::parse("image/svg+xml").is_raster_image());
    }

    #[test]
    fn test_for_path() {
        assert_eq!(MediaType::for_path(Path::new("scan.JPG")), "image/jpeg");
        assert_eq!(MediaType::for_path(Path::new("w2.pdf")), "application/pdf");
        assert_eq!(MediaType::for_path(Path::new("noext")), "application/octet-stream");
    }
}
