//! TOML configuration with per-section defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::crop::CropResolution;
use crate::explain::Model;
use crate::ocr::Language;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub ocr: OcrConfig,
    pub crop: CropConfig,
    pub output: OutputConfig,
    pub explain: ExplainConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Substitute a generated placeholder when capture fails.
    pub allow_synthetic_fallback: bool,
    pub placeholder_width: u32,
    pub placeholder_height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            allow_synthetic_fallback: false,
            placeholder_width: 1280,
            placeholder_height: 720,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: Language,
    /// Trained data directory; unset falls back to `TESSDATA_PREFIX`
    pub tessdata: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            tessdata: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub resolution: CropResolution,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub copy_text: bool,
    /// Also put the cropped PNG on the clipboard
    pub copy_image: bool,
    /// Put a generated explanation on the clipboard after the text
    pub copy_explanation: bool,
    pub save_text: bool,
    pub save_image: bool,
    pub text_dir: Option<PathBuf>,
    pub image_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            copy_text: true,
            copy_image: false,
            copy_explanation: false,
            save_text: false,
            save_image: false,
            text_dir: None,
            image_dir: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub enabled: bool,
    pub model: Model,
}

impl Config {
    /// `<config_dir>/textsnip/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("textsnip").join("config.toml"))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading config");
        Self::from_toml_str(&text)
    }

    /// Load the file at [`Config::default_path`] if present, else defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}
