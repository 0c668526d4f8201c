//! Layer shell window setup for Wayland

use gtk4::prelude::*;
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Layer shell is not supported by the compositor")]
    LayerShellNotSupported,
}

/// Configure a window as a fullscreen overlay above every other surface
pub fn setup_layer_shell(window: &gtk4::ApplicationWindow) -> Result<(), WindowError> {
    if !gtk4_layer_shell::is_supported() {
        return Err(WindowError::LayerShellNotSupported);
    }

    window.init_layer_shell();
    window.set_namespace("textsnip");
    window.set_layer(Layer::Overlay);

    // Do not reserve space
    window.set_exclusive_zone(-1);

    for edge in [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right] {
        window.set_anchor(edge, true);
    }

    // Escape and Enter must reach us even while the pointer is elsewhere
    window.set_keyboard_mode(KeyboardMode::Exclusive);
    window.set_decorated(false);

    Ok(())
}
