#[allow(dead_code)]
mod common;

use std::io::Cursor;

use common::{FailingSource, FakeClipboard};
use image::ImageFormat;
use tempfile::TempDir;
use textsnip::capture::{
    acquire, synthetic_placeholder, CaptureError, CaptureSource, ClipboardImageSource,
    ImageFileSource,
};
use textsnip::config::CaptureConfig;

fn png_bytes(img: &image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

// ---------------------------------------------------------------------------
// Synthetic fallback
// ---------------------------------------------------------------------------

#[test]
fn test_failure_is_reported_without_fallback() {
    let config = CaptureConfig::default();
    assert!(!config.allow_synthetic_fallback);
    let err = acquire(&FailingSource, &config).unwrap_err();
    assert!(matches!(err, CaptureError::PermissionDenied(_)));
}

#[test]
fn test_fallback_produces_placeholder() {
    let config = CaptureConfig {
        allow_synthetic_fallback: true,
        placeholder_width: 320,
        placeholder_height: 200,
    };
    let img = acquire(&FailingSource, &config).unwrap();
    assert_eq!(img.dimensions(), (320, 200));
}

#[test]
fn test_placeholder_gradient_corners() {
    let img = synthetic_placeholder(64, 48);
    assert_eq!(img.get_pixel(0, 0).0, [0x66, 0x7e, 0xea, 255]);
    assert_eq!(img.get_pixel(63, 47).0, [0x76, 0x4b, 0xa2, 255]);
}

#[test]
fn test_placeholder_single_pixel() {
    let img = synthetic_placeholder(1, 1);
    assert_eq!(img.get_pixel(0, 0).0, [0x66, 0x7e, 0xea, 255]);
}

// ---------------------------------------------------------------------------
// Image file source
// ---------------------------------------------------------------------------

#[test]
fn test_image_file_source_loads_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shot.png");
    common::coordinate_image(40, 30).save(&path).unwrap();

    let img = ImageFileSource { path }.capture_visible_surface().unwrap();
    assert_eq!(img.dimensions(), (40, 30));
    assert_eq!(img.get_pixel(7, 9).0, [7, 9, 0, 255]);
}

#[test]
fn test_image_file_source_missing_file() {
    let dir = TempDir::new().unwrap();
    let source = ImageFileSource {
        path: dir.path().join("does-not-exist.png"),
    };
    assert!(matches!(
        source.capture_visible_surface(),
        Err(CaptureError::Decode(_))
    ));
}

#[test]
fn test_real_source_wins_over_fallback() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shot.png");
    common::solid_image(12, 8, [1, 2, 3, 255]).save(&path).unwrap();

    let config = CaptureConfig {
        allow_synthetic_fallback: true,
        ..CaptureConfig::default()
    };
    let img = acquire(&ImageFileSource { path }, &config).unwrap();
    assert_eq!(img.dimensions(), (12, 8));
}

// ---------------------------------------------------------------------------
// Clipboard source
// ---------------------------------------------------------------------------

#[test]
fn test_clipboard_source_decodes_png() {
    let clipboard = FakeClipboard {
        stored_image: Some(png_bytes(&common::solid_image(5, 6, [9, 8, 7, 255]))),
        ..FakeClipboard::default()
    };
    let img = ClipboardImageSource { clipboard }
        .capture_visible_surface()
        .unwrap();
    assert_eq!(img.dimensions(), (5, 6));
    assert_eq!(img.get_pixel(0, 0).0, [9, 8, 7, 255]);
}

#[test]
fn test_clipboard_source_without_image() {
    let source = ClipboardImageSource {
        clipboard: FakeClipboard::default(),
    };
    assert!(matches!(
        source.capture_visible_surface(),
        Err(CaptureError::Unavailable(_))
    ));
}

#[test]
fn test_clipboard_source_with_garbage() {
    let clipboard = FakeClipboard {
        stored_image: Some(b"not a png".to_vec()),
        ..FakeClipboard::default()
    };
    assert!(matches!(
        ClipboardImageSource { clipboard }.capture_visible_surface(),
        Err(CaptureError::Decode(_))
    ));
}
