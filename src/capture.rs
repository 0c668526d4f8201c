//! Image sources for a capture session

use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::config::CaptureConfig;

/// Error type for capture operations
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no capturable surface")]
    NoSurface,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("capture backend unavailable: {0}")]
    Unavailable(String),

    #[error("could not load image: {0}")]
    Decode(String),
}

/// Anything that can produce a raster image of the visible surface
pub trait CaptureSource {
    fn capture_visible_surface(&self) -> Result<RgbaImage, CaptureError>;
}

/// Capture all outputs using the wlr-screencopy protocol via libwayshot
#[cfg(feature = "gui")]
pub struct WayshotSource;

#[cfg(feature = "gui")]
impl CaptureSource for WayshotSource {
    fn capture_visible_surface(&self) -> Result<RgbaImage, CaptureError> {
        use libwayshot::WayshotConnection;

        let wayshot =
            WayshotConnection::new().map_err(|e| CaptureError::Unavailable(e.to_string()))?;

        // No cursor overlay
        let image = wayshot
            .screenshot_all(false)
            .map_err(|e| CaptureError::Unavailable(e.to_string()))?;

        let rgba = image.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        if width == 0 || height == 0 {
            return Err(CaptureError::NoSurface);
        }

        RgbaImage::from_raw(width, height, rgba.into_raw())
            .ok_or_else(|| CaptureError::Decode("screencopy buffer size mismatch".into()))
    }
}

/// Load the "screenshot" from an image file on disk
pub struct ImageFileSource {
    pub path: PathBuf,
}

impl CaptureSource for ImageFileSource {
    fn capture_visible_surface(&self) -> Result<RgbaImage, CaptureError> {
        let image = image::open(&self.path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                CaptureError::PermissionDenied(self.path.display().to_string())
            }
            other => CaptureError::Decode(format!("{}: {}", self.path.display(), other)),
        })?;
        Ok(image.to_rgba8())
    }
}

/// Use the image currently held by the clipboard
pub struct ClipboardImageSource<C: Clipboard> {
    pub clipboard: C,
}

impl<C: Clipboard> CaptureSource for ClipboardImageSource<C> {
    fn capture_visible_surface(&self) -> Result<RgbaImage, CaptureError> {
        let png = self
            .clipboard
            .read_image()
            .map_err(|e| CaptureError::Unavailable(e.to_string()))?;
        let image = image::load_from_memory(&png).map_err(|e| CaptureError::Decode(e.to_string()))?;
        Ok(image.to_rgba8())
    }
}

const GRADIENT_START: [u8; 3] = [0x66, 0x7e, 0xea];
const GRADIENT_END: [u8; 3] = [0x76, 0x4b, 0xa2];

/// Placeholder screenshot: a diagonal gradient from top-left to bottom-right
pub fn synthetic_placeholder(width: u32, height: u32) -> RgbaImage {
    let span = (width + height).saturating_sub(2).max(1) as f32;
    RgbaImage::from_fn(width, height, |x, y| {
        let t = (x + y) as f32 / span;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba([
            mix(GRADIENT_START[0], GRADIENT_END[0]),
            mix(GRADIENT_START[1], GRADIENT_END[1]),
            mix(GRADIENT_START[2], GRADIENT_END[2]),
            255,
        ])
    })
}

/// Run `source`, substituting the synthetic placeholder on failure when the
/// configuration allows it.
pub fn acquire(source: &dyn CaptureSource, config: &CaptureConfig) -> Result<RgbaImage, CaptureError> {
    match source.capture_visible_surface() {
        Ok(image) => {
            info!(
                width = image.width(),
                height = image.height(),
                "captured image"
            );
            Ok(image)
        }
        Err(e) if config.allow_synthetic_fallback => {
            warn!(
                error = %e,
                "capture failed, using synthetic {}x{} placeholder",
                config.placeholder_width,
                config.placeholder_height
            );
            Ok(synthetic_placeholder(
                config.placeholder_width,
                config.placeholder_height,
            ))
        }
        Err(e) => Err(e),
    }
}
