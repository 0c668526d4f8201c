//! Mapping display-space selections onto the captured image

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SnipError};
use crate::selection::{SelectionRect, MIN_SIZE};

/// A captured image together with the size it is rendered at.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: RgbaImage,
    display_width: f32,
    display_height: f32,
}

impl SourceImage {
    /// Wrap a capture that is displayed at its natural size.
    pub fn new(pixels: RgbaImage) -> Self {
        let (w, h) = pixels.dimensions();
        Self::with_display_size(pixels, w as f32, h as f32)
    }

    pub fn with_display_size(pixels: RgbaImage, display_width: f32, display_height: f32) -> Self {
        Self {
            pixels,
            display_width,
            display_height,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn display_size(&self) -> (f32, f32) {
        (self.display_width, self.display_height)
    }

    pub fn set_display_size(&mut self, width: f32, height: f32) {
        self.display_width = width;
        self.display_height = height;
    }

    /// Natural pixels per display pixel, horizontally and vertically.
    pub fn scale(&self) -> (f32, f32) {
        let (nw, nh) = self.natural_size();
        (
            nw as f32 / self.display_width,
            nh as f32 / self.display_height,
        )
    }
}

/// Pixel-space rectangle inside a natural image buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Output resolution of a crop.
///
/// `Display` resamples the extracted region to the selection's on-screen
/// size; OCR results have been tuned against this. `Natural` keeps every
/// captured pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropResolution {
    #[default]
    Display,
    Natural,
}

impl std::fmt::Display for CropResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropResolution::Display => write!(f, "Display"),
            CropResolution::Natural => write!(f, "Natural"),
        }
    }
}

/// The extracted sub-image handed to the text pipeline.
#[derive(Clone, Debug)]
pub struct CroppedImage {
    pub image: RgbaImage,
    /// Region of the source buffer the pixels were taken from
    pub source_region: PixelRect,
}

impl CroppedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Encode as PNG bytes
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Cropper {
    pub resolution: CropResolution,
}

impl Cropper {
    pub fn new(resolution: CropResolution) -> Self {
        Self { resolution }
    }

    /// Map a display-space selection onto the natural buffer.
    pub fn source_region(&self, source: &SourceImage, rect: &SelectionRect) -> Result<PixelRect> {
        let (nw, nh) = source.natural_size();
        let (dw, dh) = source.display_size();
        if nw == 0 || nh == 0 || dw <= 0.0 || dh <= 0.0 {
            return Err(SnipError::CropSourceMissing(format!(
                "source image is {nw}x{nh}, displayed at {dw}x{dh}"
            )));
        }

        let (sx, sy) = source.scale();
        let x = ((rect.left * sx).round().max(0.0) as u32).min(nw - 1);
        let y = ((rect.top * sy).round().max(0.0) as u32).min(nh - 1);
        let width = ((rect.width * sx).round() as u32).clamp(1, nw - x);
        let height = ((rect.height * sy).round() as u32).clamp(1, nh - y);

        Ok(PixelRect {
            x,
            y,
            width,
            height,
        })
    }

    /// Extract `rect` from `source`.
    pub fn crop(&self, source: &SourceImage, rect: &SelectionRect) -> Result<CroppedImage> {
        if !rect.is_at_least(MIN_SIZE) {
            return Err(SnipError::SelectionTooSmall {
                width: rect.width,
                height: rect.height,
                min: MIN_SIZE,
            });
        }

        let region = self.source_region(source, rect)?;
        let extracted = imageops::crop_imm(
            source.pixels(),
            region.x,
            region.y,
            region.width,
            region.height,
        )
        .to_image();

        let (out_w, out_h) = match self.resolution {
            CropResolution::Display => (
                rect.width.round().max(1.0) as u32,
                rect.height.round().max(1.0) as u32,
            ),
            CropResolution::Natural => (region.width, region.height),
        };

        let image = if (out_w, out_h) == extracted.dimensions() {
            extracted
        } else {
            imageops::resize(&extracted, out_w, out_h, FilterType::Triangle)
        };

        debug!(
            ?region,
            out_w,
            out_h,
            resolution = %self.resolution,
            "cropped selection"
        );

        Ok(CroppedImage {
            image,
            source_region: region,
        })
    }
}
