//! Document kinds

use serde::Serialize;

/// Extensions accepted by the service, as reported to clients
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".pdf", ".png", ".jpg", ".jpeg"];

/// Raster image formats routed to OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
}

/// Declared document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Text-layer extraction through the PDF reader
    Pdf,
    /// Single-page raster image, read by OCR
    Image(ImageKind),
}

impl DocumentKind {
    /// Resolve a client-declared extension
    ///
    /// The leading dot is optional. Image extensions are matched
    /// case-insensitively; `pdf` must be lowercase.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim();
        let ext = ext.strip_prefix('.').unwrap_or(ext);

        if ext == "pdf" {
            return Some(Self::Pdf);
        }

        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Image(ImageKind::Png)),
            "jpg" | "jpeg" => Some(Self::Image(ImageKind::Jpeg)),
            _ => None,
        }
    }

    /// File suffix used for the staged temporary file
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Image(ImageKind::Png) => ".png",
            Self::Image(ImageKind::Jpeg) => ".jpg",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}
