//! What happens to a committed crop: OCR, clipboard, export, explanation

use std::path::PathBuf;

use tracing::{info, warn};

use crate::clipboard::{Clipboard, WlClipboard};
use crate::config::{Config, OutputConfig};
use crate::crop::CroppedImage;
use crate::error::{Result, SnipError};
use crate::explain::{Explainer, HeuristicExplainer, Model};
use crate::export::{self, ExportError};
use crate::ocr::{Language, TesseractEngine, TextRecognizer};
use crate::status::StatusLine;

/// Outcome of processing one crop
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub text: String,
    pub explanation: Option<String>,
    pub copied: bool,
    pub image_copied: bool,
    pub explanation_copied: bool,
    pub text_file: Option<PathBuf>,
    pub image_file: Option<PathBuf>,
    /// Non-fatal failures, already shown on the status line
    pub warnings: Vec<String>,
}

pub struct TextPipeline {
    recognizer: Box<dyn TextRecognizer>,
    clipboard: Box<dyn Clipboard>,
    explainer: Option<(Box<dyn Explainer>, Model)>,
    language: Language,
    output: OutputConfig,
}

impl TextPipeline {
    pub fn new(
        recognizer: Box<dyn TextRecognizer>,
        clipboard: Box<dyn Clipboard>,
        language: Language,
    ) -> Self {
        Self {
            recognizer,
            clipboard,
            explainer: None,
            language,
            output: OutputConfig::default(),
        }
    }

    /// Production backends as selected by `config`
    pub fn from_config(config: &Config) -> Self {
        let recognizer = TesseractEngine {
            tessdata: config.ocr.tessdata.clone(),
        };
        let mut pipeline = Self::new(
            Box::new(recognizer),
            Box::new(WlClipboard),
            config.ocr.language,
        )
        .with_output(config.output.clone());
        if config.explain.enabled {
            pipeline = pipeline.with_explainer(Box::new(HeuristicExplainer), config.explain.model);
        }
        pipeline
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn with_explainer(mut self, explainer: Box<dyn Explainer>, model: Model) -> Self {
        self.explainer = Some((explainer, model));
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn export_dir(
        configured: &Option<PathBuf>,
        fallback: fn() -> Option<PathBuf>,
    ) -> std::result::Result<PathBuf, ExportError> {
        configured
            .clone()
            .or_else(fallback)
            .ok_or(ExportError::NoDirectory)
    }

    fn note(status: &mut StatusLine, warnings: &mut Vec<String>, message: String, cause: &SnipError) {
        warn!(error = %cause, "{}", message);
        status.set(message.clone());
        warnings.push(format!("{}: {}", message, cause));
    }

    /// Recognize text in `cropped` and hand it to the configured outputs.
    ///
    /// Only an OCR failure is returned as an error; clipboard, export and
    /// explanation failures are reported and collected in
    /// [`Extraction::warnings`].
    pub fn process(&self, cropped: &CroppedImage, status: &mut StatusLine) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        if self.output.save_image {
            let saved = cropped.to_png().and_then(|png| {
                let dir = Self::export_dir(&self.output.image_dir, export::default_image_dir)?;
                Ok(export::export_image(&dir, &png)?)
            });
            match saved {
                Ok(path) => extraction.image_file = Some(path),
                Err(e) => Self::note(
                    status,
                    &mut extraction.warnings,
                    "Error: Could not save image".into(),
                    &e,
                ),
            }
        }

        if self.output.copy_image {
            let copied = cropped
                .to_png()
                .and_then(|png| Ok(self.clipboard.copy_image(&png)?));
            match copied {
                Ok(()) => extraction.image_copied = true,
                Err(e) => Self::note(
                    status,
                    &mut extraction.warnings,
                    "Error: Could not copy image".into(),
                    &e,
                ),
            }
        }

        status.set("Running OCR...");
        let text = match self.recognizer.recognize(cropped, self.language) {
            Ok(text) => text,
            Err(e) => {
                status.set("Error: OCR processing failed");
                return Err(e.into());
            }
        };
        status.set(format!(
            "OCR completed. Found {} characters.",
            text.chars().count()
        ));
        info!(language = self.language.code(), chars = text.len(), "text extracted");
        extraction.text = text;

        if extraction.text.is_empty() {
            return Ok(extraction);
        }

        if self.output.copy_text {
            match self.clipboard.copy_text(&extraction.text) {
                Ok(()) => {
                    extraction.copied = true;
                    status.set("Text copied to clipboard");
                }
                Err(e) => Self::note(
                    status,
                    &mut extraction.warnings,
                    "Error: Could not copy text".into(),
                    &SnipError::from(e),
                ),
            }
        }

        if self.output.save_text {
            let saved = Self::export_dir(&self.output.text_dir, export::default_text_dir)
                .and_then(|dir| export::export_text(&dir, &extraction.text));
            match saved {
                Ok(path) => {
                    extraction.text_file = Some(path);
                    status.set("Text file saved");
                }
                Err(e) => Self::note(
                    status,
                    &mut extraction.warnings,
                    "Error: Could not save text".into(),
                    &SnipError::from(e),
                ),
            }
        }

        if let Some((explainer, model)) = &self.explainer {
            status.set("Getting explanation...");
            match explainer.explain(&extraction.text, *model) {
                Ok(explanation) => {
                    extraction.explanation = Some(explanation);
                    status.set("Explanation generated");
                }
                Err(e) => Self::note(
                    status,
                    &mut extraction.warnings,
                    "Error: Could not generate explanation".into(),
                    &SnipError::from(e),
                ),
            }
        }

        let explanation = extraction
            .explanation
            .clone()
            .filter(|_| self.output.copy_explanation);
        if let Some(explanation) = explanation {
            match self.clipboard.copy_text(&explanation) {
                Ok(()) => {
                    extraction.explanation_copied = true;
                    status.set("Explanation copied to clipboard");
                }
                Err(e) => Self::note(
                    status,
                    &mut extraction.warnings,
                    "Error: Could not copy explanation".into(),
                    &SnipError::from(e),
                ),
            }
        }

        Ok(extraction)
    }
}
