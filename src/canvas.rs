//! Canvas widget that renders the capture and drives the selection controller

use std::cell::RefCell;
use std::collections::HashMap;

use gdk_pixbuf::{Colorspace, Pixbuf};
use gtk4::gdk;
use gtk4::graphene;
use gtk4::gsk;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{EventControllerMotion, GestureDrag};
use tracing::warn;

use crate::crop::CroppedImage;
use crate::error::SnipError;
use crate::selection::{Key, SelectionRect};
use crate::session::{CaptureSession, Overlay};

/// Callback invoked with the crop once a selection is committed
pub type CommitCallback = Box<dyn Fn(CroppedImage)>;

/// Callback invoked with a user-visible error message
pub type StatusCallback = Box<dyn Fn(&str)>;

/// Overlay handle held by the session; closes the window on teardown
pub struct OverlayWindow {
    window: glib::WeakRef<gtk4::ApplicationWindow>,
}

impl OverlayWindow {
    pub fn new(window: &gtk4::ApplicationWindow) -> Self {
        Self {
            window: window.downgrade(),
        }
    }
}

impl Overlay for OverlayWindow {
    fn teardown(&mut self) {
        // Closing from an idle callback keeps widget signals from firing
        // while the session is still borrowed.
        let window = self.window.clone();
        glib::idle_add_local_once(move || {
            if let Some(w) = window.upgrade() {
                w.close();
            }
        });
    }
}

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct Canvas {
        pub texture: RefCell<Option<gdk::Texture>>,
        pub session: RefCell<Option<CaptureSession<OverlayWindow>>>,
        pub on_commit: RefCell<Option<CommitCallback>>,
        pub on_status: RefCell<Option<StatusCallback>>,
        /// Cached cursor objects
        pub cursors: RefCell<HashMap<&'static str, gdk::Cursor>>,
        /// Current cursor name (to avoid unnecessary updates)
        pub current_cursor: RefCell<&'static str>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for Canvas {
        const NAME: &'static str = "TextsnipCanvas";
        type Type = super::Canvas;
        type ParentType = gtk4::Widget;
    }

    impl ObjectImpl for Canvas {
        fn constructed(&self) {
            self.parent_constructed();
            let obj = self.obj();
            obj.set_focusable(true);
            obj.set_can_focus(true);
        }
    }

    impl WidgetImpl for Canvas {
        fn size_allocate(&self, width: i32, height: i32, baseline: i32) {
            self.parent_size_allocate(width, height, baseline);
            if let Ok(mut session) = self.session.try_borrow_mut() {
                if let Some(session) = session.as_mut() {
                    session.set_display_size(width as f32, height as f32);
                }
            }
        }

        fn snapshot(&self, snapshot: &gtk4::Snapshot) {
            let widget = self.obj();
            let width = widget.width() as f32;
            let height = widget.height() as f32;

            // Screenshot scaled to the widget: this is display space
            if let Some(ref texture) = *self.texture.borrow() {
                let rect = graphene::Rect::new(0.0, 0.0, width, height);
                snapshot.append_texture(texture, &rect);
            }

            let dim_color = gdk::RGBA::new(0.0, 0.0, 0.0, 0.5);

            let Ok(session) = self.session.try_borrow() else {
                return;
            };
            let Some(session) = session.as_ref() else {
                return;
            };
            let controller = session.controller();

            let Some(sel) = controller.rect() else {
                snapshot.append_color(&dim_color, &graphene::Rect::new(0.0, 0.0, width, height));
                return;
            };

            // Dim the four strips around the selection
            if sel.top > 0.0 {
                snapshot.append_color(&dim_color, &graphene::Rect::new(0.0, 0.0, width, sel.top));
            }
            if sel.bottom() < height {
                snapshot.append_color(
                    &dim_color,
                    &graphene::Rect::new(0.0, sel.bottom(), width, height - sel.bottom()),
                );
            }
            if sel.left > 0.0 {
                snapshot.append_color(
                    &dim_color,
                    &graphene::Rect::new(0.0, sel.top, sel.left, sel.height),
                );
            }
            if sel.right() < width {
                snapshot.append_color(
                    &dim_color,
                    &graphene::Rect::new(sel.right(), sel.top, width - sel.right(), sel.height),
                );
            }

            self.draw_border(snapshot, &sel);

            if let Some(handles) = controller.handle_rects() {
                let handle_fill = gdk::RGBA::new(1.0, 1.0, 1.0, 1.0);
                let handle_border_color = gdk::RGBA::new(0.3, 0.3, 0.3, 1.0);

                for (_, handle) in handles {
                    let rect = graphene::Rect::new(handle.left, handle.top, handle.width, handle.height);
                    let outer = graphene::Rect::new(
                        handle.left - 1.0,
                        handle.top - 1.0,
                        handle.width + 2.0,
                        handle.height + 2.0,
                    );

                    snapshot.push_rounded_clip(&gsk::RoundedRect::from_rect(outer, 4.0));
                    snapshot.append_color(&handle_border_color, &outer);
                    snapshot.pop();

                    snapshot.push_rounded_clip(&gsk::RoundedRect::from_rect(rect, 3.0));
                    snapshot.append_color(&handle_fill, &rect);
                    snapshot.pop();
                }
            }
        }
    }

    impl Canvas {
        fn draw_border(&self, snapshot: &gtk4::Snapshot, sel: &SelectionRect) {
            let color = gdk::RGBA::new(1.0, 1.0, 1.0, 1.0);
            let bw = 2.0;
            let strips = [
                graphene::Rect::new(sel.left - bw, sel.top - bw, sel.width + bw * 2.0, bw),
                graphene::Rect::new(sel.left - bw, sel.bottom(), sel.width + bw * 2.0, bw),
                graphene::Rect::new(sel.left - bw, sel.top, bw, sel.height),
                graphene::Rect::new(sel.right(), sel.top, bw, sel.height),
            ];
            for strip in &strips {
                snapshot.append_color(&color, strip);
            }
        }
    }
}

glib::wrapper! {
    pub struct Canvas(ObjectSubclass<imp::Canvas>)
        @extends gtk4::Widget;
}

impl Canvas {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    /// Install the session whose source image this canvas shows
    pub fn set_session(&self, session: CaptureSession<OverlayWindow>) {
        let imp = self.imp();
        let rgba = session.source().pixels();
        let (w, h) = rgba.dimensions();

        let pixbuf = Pixbuf::from_bytes(
            &glib::Bytes::from(rgba.as_raw()),
            Colorspace::Rgb,
            true, // has_alpha
            8,    // bits_per_sample
            w as i32,
            h as i32,
            w as i32 * 4, // rowstride (4 bytes per pixel: RGBA)
        );
        *imp.texture.borrow_mut() = Some(gdk::Texture::for_pixbuf(&pixbuf));
        *imp.session.borrow_mut() = Some(session);

        self.queue_draw();
    }

    pub fn set_on_commit<F: Fn(CroppedImage) + 'static>(&self, callback: F) {
        *self.imp().on_commit.borrow_mut() = Some(Box::new(callback));
    }

    pub fn set_on_status<F: Fn(&str) + 'static>(&self, callback: F) {
        *self.imp().on_status.borrow_mut() = Some(Box::new(callback));
    }

    /// Forward selection changes to `callback`
    pub fn set_on_selection_change<F: Fn(Option<SelectionRect>) + 'static>(&self, callback: F) {
        if let Some(session) = self.imp().session.borrow_mut().as_mut() {
            session.controller_mut().set_on_change(callback);
        }
    }

    /// Current selection, if the session is still running
    pub fn selection(&self) -> Option<SelectionRect> {
        self.with_session(|s| s.controller().rect()).flatten()
    }

    fn report(&self, message: &str) {
        if let Some(ref callback) = *self.imp().on_status.borrow() {
            callback(message);
        }
    }

    /// Run `f` on the session if it is present and not already borrowed
    fn with_session<R>(&self, f: impl FnOnce(&mut CaptureSession<OverlayWindow>) -> R) -> Option<R> {
        let mut guard = self.imp().session.try_borrow_mut().ok()?;
        let result = guard.as_mut().map(f);
        result
    }

    /// Deliver a key to the session
    pub fn handle_key(&self, key: Key) {
        match key {
            Key::Escape => self.cancel(),
            Key::Enter => self.commit(),
            Key::SelectAll => {
                self.with_session(|s| s.controller_mut().select_all());
                self.queue_draw();
            }
        }
    }

    fn end_session(&self) {
        if let Ok(mut session) = self.imp().session.try_borrow_mut() {
            session.take();
        }
    }

    pub fn cancel(&self) {
        self.with_session(|s| s.cancel());
        self.end_session();
    }

    pub fn commit(&self) {
        let Some(result) = self.with_session(|s| s.commit()) else {
            return;
        };

        match result {
            Ok(cropped) => {
                self.end_session();
                if let Some(ref callback) = *self.imp().on_commit.borrow() {
                    callback(cropped);
                }
            }
            Err(e) => {
                warn!(error = %e, "commit failed");
                let message = match e {
                    SnipError::SelectionTooSmall { .. } | SnipError::NoSelection => {
                        "Selection area is too small".to_string()
                    }
                    other => format!("Failed to save cropped image: {}", other),
                };
                self.report(&message);
                let finished = self.with_session(|s| !s.is_active()).unwrap_or(true);
                if finished {
                    self.end_session();
                }
            }
        }
    }

    /// Initialize cached cursors
    fn init_cursors(&self) {
        let mut cursors = self.imp().cursors.borrow_mut();
        let cursor_names = [
            "default",
            "crosshair",
            "move",
            "grabbing",
            "nw-resize",
            "ne-resize",
            "sw-resize",
            "se-resize",
            "n-resize",
            "s-resize",
            "e-resize",
            "w-resize",
        ];
        for name in cursor_names {
            if let Some(cursor) = gdk::Cursor::from_name(name, None) {
                cursors.insert(name, cursor);
            }
        }
    }

    /// Set cursor by name (uses cache, only updates if changed)
    fn set_cursor_by_name(&self, name: &'static str) {
        let imp = self.imp();
        if *imp.current_cursor.borrow() == name {
            return;
        }
        *imp.current_cursor.borrow_mut() = name;
        if let Some(cursor) = imp.cursors.borrow().get(name) {
            self.set_cursor(Some(cursor));
        }
    }

    /// Setup gesture and motion controllers
    pub fn setup_controllers(&self) {
        self.init_cursors();

        let drag = GestureDrag::new();
        drag.set_button(gdk::BUTTON_PRIMARY);

        let canvas_weak = self.downgrade();
        drag.connect_drag_begin(move |_, x, y| {
            if let Some(canvas) = canvas_weak.upgrade() {
                let cursor = canvas.with_session(|s| {
                    let c = s.controller_mut();
                    c.pointer_down(x as f32, y as f32);
                    c.cursor_for_position(x as f32, y as f32)
                });
                if let Some(cursor) = cursor {
                    canvas.set_cursor_by_name(cursor);
                }
                canvas.queue_draw();
            }
        });

        let canvas_weak = self.downgrade();
        drag.connect_drag_update(move |gesture, offset_x, offset_y| {
            if let Some(canvas) = canvas_weak.upgrade() {
                let (start_x, start_y) = gesture.start_point().unwrap_or((0.0, 0.0));
                let x = (start_x + offset_x) as f32;
                let y = (start_y + offset_y) as f32;
                canvas.with_session(|s| s.controller_mut().on_pointer_move(x, y));
                canvas.queue_draw();
            }
        });

        let canvas_weak = self.downgrade();
        drag.connect_drag_end(move |gesture, offset_x, offset_y| {
            if let Some(canvas) = canvas_weak.upgrade() {
                let (start_x, start_y) = gesture.start_point().unwrap_or((0.0, 0.0));
                let x = (start_x + offset_x) as f32;
                let y = (start_y + offset_y) as f32;
                let cursor = canvas.with_session(|s| {
                    let c = s.controller_mut();
                    c.on_pointer_up();
                    c.cursor_for_position(x, y)
                });
                if let Some(cursor) = cursor {
                    canvas.set_cursor_by_name(cursor);
                }
                canvas.queue_draw();
            }
        });

        self.add_controller(drag);

        let motion = EventControllerMotion::new();
        let canvas_weak = self.downgrade();
        motion.connect_motion(move |_, x, y| {
            if let Some(canvas) = canvas_weak.upgrade() {
                let cursor =
                    canvas.with_session(|s| s.controller().cursor_for_position(x as f32, y as f32));
                if let Some(cursor) = cursor {
                    canvas.set_cursor_by_name(cursor);
                }
            }
        });
        self.add_controller(motion);
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}
