//! Text recognition over cropped images

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crop::CroppedImage;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("{0} not found. Please install tesseract.")]
    EngineNotFound(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("built without OCR support, rebuild with `--features ocr` or pass --mock-ocr")]
    Unsupported,
}

/// OCR languages offered to the user, by Tesseract code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "spa")]
    Spanish,
    #[serde(rename = "fra")]
    French,
    #[serde(rename = "deu")]
    German,
    #[serde(rename = "chi_sim")]
    ChineseSimplified,
    #[serde(rename = "jpn")]
    Japanese,
    #[serde(rename = "kor")]
    Korean,
    #[serde(rename = "ara")]
    Arabic,
    #[serde(rename = "rus")]
    Russian,
    #[serde(rename = "por")]
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::ChineseSimplified,
        Language::Japanese,
        Language::Korean,
        Language::Arabic,
        Language::Russian,
        Language::Portuguese,
    ];

    /// Tesseract traineddata code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::Spanish => "spa",
            Language::French => "fra",
            Language::German => "deu",
            Language::ChineseSimplified => "chi_sim",
            Language::Japanese => "jpn",
            Language::Korean => "kor",
            Language::Arabic => "ara",
            Language::Russian => "rus",
            Language::Portuguese => "por",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Spanish => write!(f, "Spanish"),
            Language::French => write!(f, "French"),
            Language::German => write!(f, "German"),
            Language::ChineseSimplified => write!(f, "Chinese (Simplified)"),
            Language::Japanese => write!(f, "Japanese"),
            Language::Korean => write!(f, "Korean"),
            Language::Arabic => write!(f, "Arabic"),
            Language::Russian => write!(f, "Russian"),
            Language::Portuguese => write!(f, "Portuguese"),
        }
    }
}

impl FromStr for Language {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| OcrError::UnknownLanguage(s.to_string()))
    }
}

pub trait TextRecognizer {
    fn recognize(&self, image: &CroppedImage, language: Language) -> Result<String, OcrError>;
}

/// Tesseract through libtesseract, fed the crop as PNG.
///
/// `tessdata` overrides where trained data is looked up; `None` leaves it
/// to `TESSDATA_PREFIX` and the library's built-in search paths.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    pub tessdata: Option<PathBuf>,
}

#[cfg(feature = "ocr")]
impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &CroppedImage, language: Language) -> Result<String, OcrError> {
        let png = image.to_png().map_err(|e| OcrError::Encode(e.to_string()))?;

        let datapath = match &self.tessdata {
            Some(path) => Some(path.to_str().ok_or_else(|| {
                OcrError::EngineNotFound(format!("tessdata at {}", path.display()))
            })?),
            None => None,
        };

        let text = tesseract::Tesseract::new(datapath, Some(language.code()))
            .map_err(|e| {
                OcrError::EngineNotFound(format!("tesseract data for '{}' ({})", language.code(), e))
            })?
            .set_image_from_mem(&png)
            .map_err(|e| OcrError::Recognition(e.to_string()))?
            .get_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        let text = text.trim_end().to_string();
        tracing::debug!(language = language.code(), chars = text.len(), "tesseract finished");
        Ok(text)
    }
}

#[cfg(not(feature = "ocr"))]
impl TextRecognizer for TesseractEngine {
    fn recognize(&self, _image: &CroppedImage, _language: Language) -> Result<String, OcrError> {
        Err(OcrError::Unsupported)
    }
}

pub const MOCK_TEXT: &str = "This is sample extracted text from the OCR process. \
The cropped image functionality allows users to select specific portions of their \
screen for more accurate text extraction.";

/// Returns fixed text without looking at the image
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    pub text: String,
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self {
            text: MOCK_TEXT.to_string(),
        }
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize(&self, _image: &CroppedImage, _language: Language) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}
