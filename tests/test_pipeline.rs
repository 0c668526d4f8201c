#[allow(dead_code)]
mod common;

use common::{FailingRecognizer, FakeClipboard, FixedRecognizer};
use tempfile::TempDir;
use textsnip::config::{Config, OutputConfig};
use textsnip::error::SnipError;
use textsnip::explain::{HeuristicExplainer, Model};
use textsnip::ocr::{Language, MockRecognizer, MOCK_TEXT};
use textsnip::pipeline::TextPipeline;
use textsnip::status::StatusLine;

fn pipeline_with(clipboard: &FakeClipboard) -> TextPipeline {
    TextPipeline::new(
        Box::new(MockRecognizer::default()),
        Box::new(clipboard.clone()),
        Language::English,
    )
}

#[test]
fn test_text_is_copied_by_default() {
    let clipboard = FakeClipboard::default();
    let mut status = StatusLine::default();

    let extraction = pipeline_with(&clipboard)
        .process(&common::cropped(50, 20), &mut status)
        .unwrap();

    assert_eq!(extraction.text, MOCK_TEXT);
    assert!(extraction.copied);
    assert!(extraction.warnings.is_empty());
    assert_eq!(clipboard.texts.borrow().as_slice(), [MOCK_TEXT]);
    assert_eq!(status.last(), Some("Text copied to clipboard"));
}

#[test]
fn test_recognizer_gets_configured_language() {
    let recognizer = FixedRecognizer::new("hola");
    let seen = recognizer.seen.clone();
    let pipeline = TextPipeline::new(
        Box::new(recognizer),
        Box::new(FakeClipboard::default()),
        Language::Spanish,
    );

    pipeline
        .process(&common::cropped(50, 20), &mut StatusLine::default())
        .unwrap();
    assert_eq!(seen.borrow().as_slice(), [Language::Spanish]);
}

#[test]
fn test_ocr_failure_is_fatal() {
    let clipboard = FakeClipboard::default();
    let mut status = StatusLine::default();
    let pipeline = pipeline_with(&clipboard).with_recognizer(Box::new(FailingRecognizer));

    let err = pipeline
        .process(&common::cropped(50, 20), &mut status)
        .unwrap_err();
    assert!(matches!(err, SnipError::Ocr(_)));
    assert_eq!(status.last(), Some("Error: OCR processing failed"));
    assert!(clipboard.texts.borrow().is_empty());
}

#[test]
fn test_clipboard_failure_is_a_warning() {
    let clipboard = FakeClipboard {
        fail: true,
        ..FakeClipboard::default()
    };
    let mut status = StatusLine::default();

    let extraction = pipeline_with(&clipboard)
        .process(&common::cropped(50, 20), &mut status)
        .unwrap();

    assert_eq!(extraction.text, MOCK_TEXT);
    assert!(!extraction.copied);
    assert_eq!(extraction.warnings.len(), 1);
    assert!(extraction.warnings[0].starts_with("Error: Could not copy text"));
    assert_eq!(status.last(), Some("Error: Could not copy text"));
}

#[test]
fn test_empty_text_skips_outputs() {
    let clipboard = FakeClipboard::default();
    let mut status = StatusLine::default();
    let pipeline = pipeline_with(&clipboard)
        .with_recognizer(Box::new(FixedRecognizer::new("")))
        .with_explainer(Box::new(HeuristicExplainer), Model::Local);

    let extraction = pipeline
        .process(&common::cropped(50, 20), &mut status)
        .unwrap();

    assert!(extraction.text.is_empty());
    assert!(!extraction.copied);
    assert!(extraction.explanation.is_none());
    assert!(clipboard.texts.borrow().is_empty());
    assert_eq!(status.last(), Some("OCR completed. Found 0 characters."));
}

#[test]
fn test_saves_text_and_image() {
    let text_dir = TempDir::new().unwrap();
    let image_dir = TempDir::new().unwrap();
    let output = OutputConfig {
        copy_text: false,
        copy_image: false,
        copy_explanation: false,
        save_text: true,
        save_image: true,
        text_dir: Some(text_dir.path().to_path_buf()),
        image_dir: Some(image_dir.path().to_path_buf()),
    };
    let clipboard = FakeClipboard::default();
    let pipeline = pipeline_with(&clipboard).with_output(output);

    let extraction = pipeline
        .process(&common::cropped(50, 20), &mut StatusLine::default())
        .unwrap();

    let text_file = extraction.text_file.expect("text file");
    assert_eq!(std::fs::read_to_string(text_file).unwrap(), MOCK_TEXT);

    let image_file = extraction.image_file.expect("image file");
    let saved = image::open(image_file).unwrap();
    assert_eq!((saved.width(), saved.height()), (50, 20));

    assert!(clipboard.texts.borrow().is_empty());
}

#[test]
fn test_copy_image_puts_png_on_clipboard() {
    let clipboard = FakeClipboard::default();
    let output = OutputConfig {
        copy_text: false,
        copy_image: true,
        ..OutputConfig::default()
    };
    let extraction = pipeline_with(&clipboard)
        .with_output(output)
        .process(&common::cropped(8, 8), &mut StatusLine::default())
        .unwrap();

    assert!(extraction.image_copied);
    let images = clipboard.images.borrow();
    assert_eq!(images.len(), 1);
    assert_eq!(&images[0][..4], b"\x89PNG");
}

#[test]
fn test_explanation_is_generated() {
    let clipboard = FakeClipboard::default();
    let mut status = StatusLine::default();
    let pipeline = pipeline_with(&clipboard)
        .with_recognizer(Box::new(FixedRecognizer::new("Contact: ops@example.com")))
        .with_explainer(Box::new(HeuristicExplainer), Model::Anthropic);

    let extraction = pipeline
        .process(&common::cropped(50, 20), &mut status)
        .unwrap();

    let explanation = extraction.explanation.unwrap();
    assert!(explanation.contains("email or contact information"));
    assert!(explanation.contains("anthropic model analysis"));
    assert_eq!(status.last(), Some("Explanation generated"));
}

#[test]
fn test_explanation_is_copied_after_text() {
    let clipboard = FakeClipboard::default();
    let mut status = StatusLine::default();
    let output = OutputConfig {
        copy_explanation: true,
        ..OutputConfig::default()
    };
    let pipeline = pipeline_with(&clipboard)
        .with_recognizer(Box::new(FixedRecognizer::new("Meeting on 2024-03-01")))
        .with_explainer(Box::new(HeuristicExplainer), Model::Local)
        .with_output(output);

    let extraction = pipeline
        .process(&common::cropped(50, 20), &mut status)
        .unwrap();

    assert!(extraction.copied);
    assert!(extraction.explanation_copied);
    let texts = clipboard.texts.borrow();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], "Meeting on 2024-03-01");
    assert_eq!(Some(&texts[1]), extraction.explanation.as_ref());
    assert_eq!(status.last(), Some("Explanation copied to clipboard"));
}

#[test]
fn test_explanation_copy_failure_is_a_warning() {
    let clipboard = FakeClipboard {
        fail: true,
        ..FakeClipboard::default()
    };
    let output = OutputConfig {
        copy_text: false,
        copy_explanation: true,
        ..OutputConfig::default()
    };
    let mut status = StatusLine::default();
    let extraction = pipeline_with(&clipboard)
        .with_explainer(Box::new(HeuristicExplainer), Model::OpenAi)
        .with_output(output)
        .process(&common::cropped(50, 20), &mut status)
        .unwrap();

    assert!(extraction.explanation.is_some());
    assert!(!extraction.explanation_copied);
    assert_eq!(extraction.warnings.len(), 1);
    assert_eq!(status.last(), Some("Error: Could not copy explanation"));
}

#[test]
fn test_explanation_not_copied_by_default() {
    let clipboard = FakeClipboard::default();
    let extraction = pipeline_with(&clipboard)
        .with_explainer(Box::new(HeuristicExplainer), Model::Local)
        .process(&common::cropped(50, 20), &mut StatusLine::default())
        .unwrap();

    assert!(!extraction.explanation_copied);
    assert_eq!(clipboard.texts.borrow().as_slice(), [MOCK_TEXT]);
}

#[test]
fn test_from_config_reads_language() {
    let mut config = Config::default();
    config.ocr.language = Language::Japanese;
    assert_eq!(TextPipeline::from_config(&config).language(), Language::Japanese);
}

#[cfg(not(feature = "ocr"))]
#[test]
fn test_from_config_without_ocr_support() {
    let mut status = StatusLine::default();
    let err = TextPipeline::from_config(&Config::default())
        .process(&common::cropped(50, 20), &mut status)
        .unwrap_err();
    assert!(matches!(
        err,
        SnipError::Ocr(textsnip::ocr::OcrError::Unsupported)
    ));
    assert_eq!(status.last(), Some("Error: OCR processing failed"));
}
