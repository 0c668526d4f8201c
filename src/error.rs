//! Crate-wide error type

use thiserror::Error;

use crate::capture::CaptureError;
use crate::clipboard::ClipboardError;
use crate::config::ConfigError;
use crate::explain::ExplainError;
use crate::export::ExportError;
use crate::ocr::OcrError;

#[derive(Error, Debug)]
pub enum SnipError {
    #[error("Screen capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Selection area is too small: {width:.0}x{height:.0} (minimum {min:.0}x{min:.0})")]
    SelectionTooSmall { width: f32, height: f32, min: f32 },

    #[error("No selection")]
    NoSelection,

    #[error("Capture session already finished")]
    SessionClosed,

    #[error("Crop source missing: {0}")]
    CropSourceMissing(String),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Explanation failed: {0}")]
    Explain(#[from] ExplainError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SnipError>;
