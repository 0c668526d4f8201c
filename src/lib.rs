//! textsnip - select a region of the screen and extract its text

pub mod capture;
pub mod clipboard;
pub mod config;
pub mod crop;
pub mod error;
pub mod explain;
pub mod export;
pub mod ocr;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod status;

#[cfg(feature = "gui")]
pub mod canvas;
#[cfg(feature = "gui")]
pub mod overlay;
#[cfg(feature = "gui")]
pub mod window;

pub use error::{Result, SnipError};
