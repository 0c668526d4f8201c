//! Clipboard integration using wl-clipboard

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("{0} command not found. Please install wl-clipboard.")]
    ToolNotFound(&'static str),

    #[error("failed to copy to clipboard: {0}")]
    CopyFailure(String),

    #[error("failed to read clipboard: {0}")]
    PasteFailure(String),

    #[error("no image found in clipboard")]
    NoImage,
}

pub trait Clipboard {
    fn copy_text(&self, text: &str) -> Result<(), ClipboardError>;
    fn copy_image(&self, png_data: &[u8]) -> Result<(), ClipboardError>;
    /// PNG bytes of the clipboard image
    fn read_image(&self) -> Result<Vec<u8>, ClipboardError>;
}

impl<C: Clipboard + ?Sized> Clipboard for &C {
    fn copy_text(&self, text: &str) -> Result<(), ClipboardError> {
        (**self).copy_text(text)
    }

    fn copy_image(&self, png_data: &[u8]) -> Result<(), ClipboardError> {
        (**self).copy_image(png_data)
    }

    fn read_image(&self) -> Result<Vec<u8>, ClipboardError> {
        (**self).read_image()
    }
}

/// Check if a command is on PATH
pub fn is_tool_available(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Wayland clipboard through `wl-copy` and `wl-paste`
#[derive(Debug, Clone, Copy, Default)]
pub struct WlClipboard;

impl WlClipboard {
    fn copy(&self, mime: &str, data: &[u8]) -> Result<(), ClipboardError> {
        if !is_tool_available("wl-copy") {
            return Err(ClipboardError::ToolNotFound("wl-copy"));
        }

        let mut child = Command::new("wl-copy")
            .args(["--type", mime])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ClipboardError::CopyFailure(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(data)
                .map_err(|e| ClipboardError::CopyFailure(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ClipboardError::CopyFailure(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipboardError::CopyFailure(stderr.trim().to_string()));
        }

        debug!(mime, bytes = data.len(), "copied to clipboard");
        Ok(())
    }
}

impl Clipboard for WlClipboard {
    fn copy_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.copy("text/plain;charset=utf-8", text.as_bytes())
    }

    fn copy_image(&self, png_data: &[u8]) -> Result<(), ClipboardError> {
        self.copy("image/png", png_data)
    }

    fn read_image(&self) -> Result<Vec<u8>, ClipboardError> {
        if !is_tool_available("wl-paste") {
            return Err(ClipboardError::ToolNotFound("wl-paste"));
        }

        let types = Command::new("wl-paste")
            .arg("--list-types")
            .output()
            .map_err(|e| ClipboardError::PasteFailure(e.to_string()))?;
        let has_png = String::from_utf8_lossy(&types.stdout)
            .lines()
            .any(|t| t.trim() == "image/png");
        if !has_png {
            return Err(ClipboardError::NoImage);
        }

        let output = Command::new("wl-paste")
            .args(["--no-newline", "--type", "image/png"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ClipboardError::PasteFailure(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipboardError::PasteFailure(stderr.trim().to_string()));
        }
        if output.stdout.is_empty() {
            return Err(ClipboardError::NoImage);
        }

        Ok(output.stdout)
    }
}
