//! Interactive fullscreen selection overlay

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::gdk;
use gtk4::gio::ApplicationFlags;
use gtk4::prelude::*;
use image::RgbaImage;
use tracing::{debug, warn};

use crate::canvas::{Canvas, OverlayWindow};
use crate::crop::{CroppedImage, Cropper, SourceImage};
use crate::selection::{Key, SelectionRect, MIN_SIZE};
use crate::session::CaptureSession;
use crate::status::{StatusLine, READY, STATUS_TTL};
use crate::window::{self, WindowError};

const APP_ID: &str = "io.github.textsnip";

/// Create CSS styling for the floating controls
fn create_css() -> gtk4::CssProvider {
    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        .button-container, .status-toast {
            background-color: rgba(30, 30, 30, 0.9);
            border-radius: 9999px;
            border: 1px solid rgba(255, 255, 255, 0.1);
            box-shadow: 0 4px 12px rgba(0, 0, 0, 0.4);
            color: #ffffff;
        }
        .status-toast {
            padding: 10px 20px;
            font-size: 16px;
        }
        .button-container label {
            margin: 0 8px;
            font-feature-settings: "tnum";
        }
        .button-container button.circular {
            min-width: 40px;
            min-height: 40px;
            padding: 3px;
            border-radius: 50%;
            border: none;
            background-color: rgba(255, 255, 255, 0.1);
            color: #ffffff;
        }
        .button-container button.circular.suggested-action {
            background-color: #3584e4;
        }
        .button-container button.circular.destructive-action {
            background-color: #e33b3b;
        }
        "#,
    );
    css_provider
}

/// Dimension readout plus cancel and save buttons
fn create_button_container() -> (gtk4::Box, gtk4::Label, gtk4::Button, gtk4::Button) {
    let button_container = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    button_container.add_css_class("button-container");
    button_container.set_margin_top(8);
    button_container.set_margin_bottom(8);
    button_container.set_margin_start(10);
    button_container.set_margin_end(10);

    let dimensions = gtk4::Label::new(Some("Select area to crop"));

    let cancel_btn = gtk4::Button::from_icon_name("window-close-symbolic");
    cancel_btn.add_css_class("circular");
    cancel_btn.add_css_class("destructive-action");
    cancel_btn.set_tooltip_text(Some("Cancel (Esc)"));

    let save_btn = gtk4::Button::from_icon_name("object-select-symbolic");
    save_btn.add_css_class("circular");
    save_btn.add_css_class("suggested-action");
    save_btn.set_tooltip_text(Some("Save selection (Enter)"));

    button_container.append(&dimensions);
    button_container.append(&cancel_btn);
    button_container.append(&save_btn);

    (button_container, dimensions, cancel_btn, save_btn)
}

/// Keep the controls centred under the selection, flipping above it near
/// the bottom of the screen.
fn place_controls(
    fixed: &gtk4::Fixed,
    container: &gtk4::Box,
    rect: &SelectionRect,
    screen_width: f32,
    screen_height: f32,
) {
    let (_, natural) = container.preferred_size();
    let btn_width = natural.width() as f32;
    let btn_height = natural.height() as f32;
    let margin = 12.0;

    let mut btn_x = rect.left + rect.width / 2.0 - btn_width / 2.0;
    let mut btn_y = rect.bottom() + margin;

    if btn_y + btn_height > screen_height - 10.0 {
        btn_y = rect.top - btn_height - margin;
        if btn_y < 10.0 {
            btn_y = rect.bottom() - btn_height - margin;
        }
    }
    btn_x = btn_x.min(screen_width - btn_width - 10.0).max(10.0);

    fixed.move_(container, btn_x as f64, btn_y as f64);
}

/// Show `message` in the toast and hide it once it expires
fn show_status(toast: &gtk4::Label, status: &Rc<RefCell<StatusLine>>, message: &str) {
    status.borrow_mut().set(message);
    toast.set_text(message);
    toast.set_visible(true);

    let toast_weak = toast.downgrade();
    let status = status.clone();
    glib::timeout_add_local_once(STATUS_TTL, move || {
        if let Some(toast) = toast_weak.upgrade() {
            let text = status.borrow().text().to_string();
            toast.set_text(&text);
            toast.set_visible(text != READY);
        }
    });
}

fn setup_keyboard_shortcuts(window: &gtk4::ApplicationWindow, canvas: &Canvas) {
    let key_controller = gtk4::EventControllerKey::new();
    let canvas_weak = canvas.downgrade();

    key_controller.connect_key_pressed(move |_, key, _, modifier| {
        let Some(canvas) = canvas_weak.upgrade() else {
            return glib::Propagation::Proceed;
        };
        let ctrl = modifier.contains(gdk::ModifierType::CONTROL_MASK);

        let action = if key == gdk::Key::Escape {
            Some(Key::Escape)
        } else if key == gdk::Key::Return || key == gdk::Key::KP_Enter {
            Some(Key::Enter)
        } else if ctrl && (key == gdk::Key::a || key == gdk::Key::A) {
            Some(Key::SelectAll)
        } else {
            None
        };

        match action {
            Some(key) => {
                canvas.handle_key(key);
                glib::Propagation::Stop
            }
            None => glib::Propagation::Proceed,
        }
    });

    window.add_controller(key_controller);
}

fn build_ui(
    app: &gtk4::Application,
    pixels: RgbaImage,
    cropper: Cropper,
    result: Rc<RefCell<Option<CroppedImage>>>,
    failure: Rc<RefCell<Option<WindowError>>>,
) {
    if let Some(settings) = gtk4::Settings::default() {
        settings.set_gtk_icon_theme_name(Some("Adwaita"));
    }

    let window = gtk4::ApplicationWindow::builder()
        .application(app)
        .title("textsnip")
        .build();

    if let Err(e) = window::setup_layer_shell(&window) {
        *failure.borrow_mut() = Some(e);
        app.quit();
        return;
    }

    // Captures are taken in physical pixels; the overlay is laid out in
    // logical ones.
    let scale = gdk::Display::default()
        .and_then(|d| d.monitors().item(0))
        .and_downcast::<gdk::Monitor>()
        .map(|m| m.scale_factor())
        .unwrap_or(1)
        .max(1) as f32;
    let display_width = pixels.width() as f32 / scale;
    let display_height = pixels.height() as f32 / scale;
    debug!(scale, display_width, display_height, "overlay geometry");

    let source = SourceImage::with_display_size(pixels, display_width, display_height);
    let session = CaptureSession::new(source, cropper, OverlayWindow::new(&window));

    let fixed = gtk4::Fixed::new();

    let canvas = Canvas::new();
    canvas.set_session(session);
    canvas.setup_controllers();
    canvas.set_size_request(display_width as i32, display_height as i32);
    fixed.put(&canvas, 0.0, 0.0);

    let (button_container, dimensions, cancel_btn, save_btn) = create_button_container();
    fixed.put(&button_container, 0.0, 0.0);

    let toast = gtk4::Label::new(None);
    toast.add_css_class("status-toast");
    toast.set_visible(false);
    fixed.put(&toast, (display_width / 2.0 - 120.0).max(0.0) as f64, 40.0);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &create_css(),
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
    window.set_child(Some(&fixed));

    let status = Rc::new(RefCell::new(StatusLine::default()));

    let container_weak = button_container.downgrade();
    let fixed_weak = fixed.downgrade();
    let dimensions_weak = dimensions.downgrade();
    canvas.set_on_selection_change(move |rect| {
        let (Some(container), Some(fixed), Some(dimensions)) = (
            container_weak.upgrade(),
            fixed_weak.upgrade(),
            dimensions_weak.upgrade(),
        ) else {
            return;
        };

        match rect {
            Some(rect) => {
                dimensions.set_text(&rect.dimensions_label());
                container.set_visible(rect.is_at_least(MIN_SIZE));
                place_controls(&fixed, &container, &rect, display_width, display_height);
            }
            None => container.set_visible(false),
        }
    });

    match canvas.selection() {
        Some(rect) => {
            dimensions.set_text(&rect.dimensions_label());
            place_controls(&fixed, &button_container, &rect, display_width, display_height);
        }
        None => button_container.set_visible(false),
    }

    let toast_weak = toast.downgrade();
    let status_ref = status.clone();
    canvas.set_on_status(move |message| {
        if let Some(toast) = toast_weak.upgrade() {
            show_status(&toast, &status_ref, message);
        }
    });

    canvas.set_on_commit(move |cropped| {
        *result.borrow_mut() = Some(cropped);
    });

    let canvas_weak = canvas.downgrade();
    cancel_btn.connect_clicked(move |_| {
        if let Some(canvas) = canvas_weak.upgrade() {
            canvas.cancel();
        }
    });

    let canvas_weak = canvas.downgrade();
    save_btn.connect_clicked(move |_| {
        if let Some(canvas) = canvas_weak.upgrade() {
            canvas.commit();
        }
    });

    setup_keyboard_shortcuts(&window, &canvas);

    window.present();
    canvas.grab_focus();
    show_status(&toast, &status, "Select Image");
}

/// Show the overlay over `pixels` and block until the user commits or
/// cancels. Returns `None` when the session was cancelled.
pub fn select_interactively(
    pixels: RgbaImage,
    cropper: Cropper,
) -> Result<Option<CroppedImage>, WindowError> {
    let app = gtk4::Application::builder()
        .application_id(APP_ID)
        .flags(ApplicationFlags::NON_UNIQUE)
        .build();

    let result = Rc::new(RefCell::new(None));
    let failure = Rc::new(RefCell::new(None));
    let pixels = RefCell::new(Some(pixels));

    {
        let result = result.clone();
        let failure = failure.clone();
        app.connect_activate(move |app| match pixels.borrow_mut().take() {
            Some(pixels) => build_ui(app, pixels, cropper, result.clone(), failure.clone()),
            None => warn!("overlay activated twice, ignoring"),
        });
    }

    // Our own arguments are parsed by clap, not GTK
    app.run_with_args::<&str>(&[]);

    if let Some(e) = failure.borrow_mut().take() {
        return Err(e);
    }
    let cropped = result.borrow_mut().take();
    Ok(cropped)
}
