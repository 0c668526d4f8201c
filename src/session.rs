//! One capture session: source image, selection and overlay surface.
//!
//! The overlay is released exactly once, on cancel, on commit, or when the
//! session is dropped along an error path.

use tracing::debug;

use crate::crop::{CroppedImage, Cropper, SourceImage};
use crate::error::Result;
use crate::selection::{Key, SelectionController};

/// A transient UI surface shown for the duration of a session
pub trait Overlay {
    fn teardown(&mut self);
}

/// Overlay for sessions driven without a display, e.g. `--region`
#[derive(Debug, Default)]
pub struct Headless;

impl Overlay for Headless {
    fn teardown(&mut self) {}
}

/// What a key press did to the session
#[derive(Debug)]
pub enum SessionOutcome {
    Continue,
    Cancelled,
    Committed(CroppedImage),
}

pub struct CaptureSession<O: Overlay> {
    source: SourceImage,
    controller: SelectionController,
    cropper: Cropper,
    overlay: Option<O>,
}

impl<O: Overlay> CaptureSession<O> {
    pub fn new(source: SourceImage, cropper: Cropper, overlay: O) -> Self {
        let (dw, dh) = source.display_size();
        Self {
            controller: SelectionController::new(dw, dh),
            source,
            cropper,
            overlay: Some(overlay),
        }
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SelectionController {
        &mut self.controller
    }

    /// True until the overlay has been torn down
    pub fn is_active(&self) -> bool {
        self.overlay.is_some()
    }

    /// The rendering surface changed size
    pub fn set_display_size(&mut self, width: f32, height: f32) {
        self.source.set_display_size(width, height);
        self.controller.set_display_size(width, height);
    }

    fn teardown(&mut self) {
        if let Some(mut overlay) = self.overlay.take() {
            overlay.teardown();
            debug!("overlay released");
        }
    }

    /// Discard the selection and release the overlay
    pub fn cancel(&mut self) {
        self.controller.cancel();
        self.teardown();
    }

    /// Validate the selection and crop it.
    ///
    /// A too-small or missing selection leaves the session open. Once the
    /// selection is accepted the overlay is released whether or not the
    /// crop itself succeeds.
    pub fn commit(&mut self) -> Result<CroppedImage> {
        let rect = self.controller.commit()?;
        let cropped = self.cropper.crop(&self.source, &rect);
        self.teardown();
        cropped
    }

    pub fn handle_key(&mut self, key: Key) -> Result<SessionOutcome> {
        match key {
            Key::Escape => {
                self.cancel();
                Ok(SessionOutcome::Cancelled)
            }
            Key::Enter => self.commit().map(SessionOutcome::Committed),
            Key::SelectAll => {
                self.controller.select_all();
                Ok(SessionOutcome::Continue)
            }
        }
    }
}

impl<O: Overlay> Drop for CaptureSession<O> {
    fn drop(&mut self) {
        self.teardown();
    }
}
