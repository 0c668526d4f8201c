//! Writing extracted text and crops to disk

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not determine an output directory")]
    NoDirectory,

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no free file name for {0}")]
    NameExhausted(String),
}

/// Default directory for text exports: Downloads, else home
pub fn default_text_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(dirs::home_dir)
}

/// Default directory for image exports: Pictures, else home
pub fn default_image_dir() -> Option<PathBuf> {
    dirs::picture_dir().or_else(dirs::home_dir)
}

/// Pick `<base>.<ext>` in `dir`, or `<base>-N.<ext>` if it exists
fn unique_path(dir: &Path, base: &str, ext: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{}.{}", base, ext));
    if !path.exists() {
        return Ok(path);
    }

    for i in 1..1000 {
        let path = dir.join(format!("{}-{}.{}", base, i, ext));
        if !path.exists() {
            return Ok(path);
        }
    }

    Err(ExportError::NameExhausted(base.to_string()))
}

fn write_new(dir: &Path, base: &str, ext: &str, data: &[u8]) -> Result<PathBuf, ExportError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let path = unique_path(dir, base, ext)?;
    std::fs::write(&path, data).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), bytes = data.len(), "exported");
    Ok(path)
}

pub fn text_file_name(now: DateTime<Local>) -> String {
    format!("extracted_text_{}", now.timestamp_millis())
}

pub fn image_file_name(now: DateTime<Local>) -> String {
    now.format("snip-%Y-%m-%d-%H-%M-%S").to_string()
}

/// Save extracted text as `extracted_text_<millis>.txt` in `dir`
pub fn export_text(dir: &Path, text: &str) -> Result<PathBuf, ExportError> {
    write_new(dir, &text_file_name(Local::now()), "txt", text.as_bytes())
}

/// Save PNG data as `snip-YYYY-MM-DD-HH-MM-SS.png` in `dir`
pub fn export_image(dir: &Path, png_data: &[u8]) -> Result<PathBuf, ExportError> {
    write_new(dir, &image_file_name(Local::now()), "png", png_data)
}
