//! Crop rectangle state machine for create, move and resize interactions.
//!
//! All coordinates are in display space: the pixel grid of the rendered,
//! possibly scaled, screenshot. Mapping to the captured buffer happens in
//! [`crate::crop`].

use tracing::{debug, info};

use crate::error::{Result, SnipError};

/// Size of resize handles in pixels
pub const HANDLE_SIZE: f32 = 14.0;

/// Edge grab zone width in pixels
pub const EDGE_GRAB_WIDTH: f32 = 8.0;

/// Minimum selection width and height in display pixels.
///
/// The same floor is used when a new selection is released, while resizing,
/// and when a crop is validated.
pub const MIN_SIZE: f32 = 10.0;

/// One of the eight resize handles of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NorthWest,
        Handle::NorthEast,
        Handle::SouthEast,
        Handle::SouthWest,
        Handle::North,
        Handle::East,
        Handle::South,
        Handle::West,
    ];

    /// Get the cursor name for this handle
    pub fn cursor_name(&self) -> &'static str {
        match self {
            Handle::NorthWest => "nw-resize",
            Handle::NorthEast => "ne-resize",
            Handle::SouthEast => "se-resize",
            Handle::SouthWest => "sw-resize",
            Handle::North => "n-resize",
            Handle::East => "e-resize",
            Handle::South => "s-resize",
            Handle::West => "w-resize",
        }
    }

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            Handle::NorthWest | Handle::NorthEast | Handle::SouthEast | Handle::SouthWest
        )
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::West | Handle::NorthWest | Handle::SouthWest)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::East | Handle::NorthEast | Handle::SouthEast)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::North | Handle::NorthWest | Handle::NorthEast)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Handle::South | Handle::SouthWest | Handle::SouthEast)
    }

    /// Centre point of this handle on `rect`
    pub fn anchor(&self, rect: &SelectionRect) -> (f32, f32) {
        let cx = rect.left + rect.width / 2.0;
        let cy = rect.top + rect.height / 2.0;
        let x = if self.moves_left() {
            rect.left
        } else if self.moves_right() {
            rect.right()
        } else {
            cx
        };
        let y = if self.moves_top() {
            rect.top
        } else if self.moves_bottom() {
            rect.bottom()
        } else {
            cy
        };
        (x, y)
    }
}

/// Current pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// No pointer button held
    #[default]
    Idle,
    /// Drawing a new selection from an anchor corner
    Creating,
    /// Moving the existing selection
    Dragging,
    /// Resizing via one handle
    Resizing(Handle),
}

/// A selection rectangle in display space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SelectionRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a rectangle spanning two opposite corners, in any order
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            left: x0.min(x1),
            top: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.left && px <= self.right() && py >= self.top && py <= self.bottom()
    }

    /// True when both sides reach `min`
    pub fn is_at_least(&self, min: f32) -> bool {
        self.width >= min && self.height >= min
    }

    /// Shrink to fit `bounds_width` x `bounds_height`, then shift the origin
    /// into `[0, bound - size]`.
    pub fn clamped_to(&self, bounds_width: f32, bounds_height: f32) -> Self {
        let width = self.width.max(0.0).min(bounds_width);
        let height = self.height.max(0.0).min(bounds_height);
        Self {
            left: self.left.min(bounds_width - width).max(0.0),
            top: self.top.min(bounds_height - height).max(0.0),
            width,
            height,
        }
    }

    /// Text for the live dimension readout
    pub fn dimensions_label(&self) -> String {
        format!(
            "{} × {} px",
            self.width.round() as i64,
            self.height.round() as i64
        )
    }
}

/// Result of a keyboard event delivered to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Continue,
    Cancelled,
    Committed(SelectionRect),
}

/// Keys the selection overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    SelectAll,
}

/// Callback type for selection change notifications
pub type SelectionChangeCallback = Box<dyn Fn(Option<SelectionRect>)>;

/// Owns the crop rectangle for one capture session.
///
/// Exactly one [`InteractionMode`] is active at a time; pointer events are
/// dispatched on it. Once [`cancel`](Self::cancel) or a successful
/// [`commit`](Self::commit) has run, further events are ignored.
pub struct SelectionController {
    rect: Option<SelectionRect>,
    display_width: f32,
    display_height: f32,
    mode: InteractionMode,
    pointer_start: (f32, f32),
    start_rect: Option<SelectionRect>,
    closed: bool,
    on_change: Option<SelectionChangeCallback>,
}

impl SelectionController {
    /// Create a controller whose initial selection covers the centred half
    /// of the displayed image.
    pub fn new(display_width: f32, display_height: f32) -> Self {
        let width = display_width * 0.5;
        let height = display_height * 0.5;
        let initial = SelectionRect::new(
            (display_width - width) / 2.0,
            (display_height - height) / 2.0,
            width,
            height,
        );

        Self {
            rect: Some(initial),
            display_width,
            display_height,
            mode: InteractionMode::Idle,
            pointer_start: (0.0, 0.0),
            start_rect: None,
            closed: false,
            on_change: None,
        }
    }

    pub fn rect(&self) -> Option<SelectionRect> {
        self.rect
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn display_size(&self) -> (f32, f32) {
        (self.display_width, self.display_height)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Check if there's a selection large enough to crop
    pub fn has_valid_selection(&self) -> bool {
        self.rect.is_some_and(|r| r.is_at_least(MIN_SIZE))
    }

    /// Set callback for selection changes
    pub fn set_on_change<F: Fn(Option<SelectionRect>) + 'static>(&mut self, callback: F) {
        self.on_change = Some(Box::new(callback));
    }

    fn notify(&self) {
        if let Some(ref callback) = self.on_change {
            callback(self.rect);
        }
    }

    /// Update the rendered surface size and pull the selection back inside it
    pub fn set_display_size(&mut self, width: f32, height: f32) {
        if width == self.display_width && height == self.display_height {
            return;
        }
        self.display_width = width;
        self.display_height = height;
        if let Some(rect) = self.rect {
            self.rect = Some(rect.clamped_to(width, height));
        }
        self.notify();
    }

    /// Select the entire image
    pub fn select_all(&mut self) {
        if self.closed {
            return;
        }
        self.rect = Some(SelectionRect::new(
            0.0,
            0.0,
            self.display_width,
            self.display_height,
        ));
        self.notify();
    }

    /// Place a selection programmatically, clamped to the image bounds
    pub fn set_selection(&mut self, rect: SelectionRect) {
        if self.closed {
            return;
        }
        self.rect = Some(rect.clamped_to(self.display_width, self.display_height));
        self.notify();
    }

    fn clamp_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.max(0.0).min(self.display_width),
            y.max(0.0).min(self.display_height),
        )
    }

    /// Rectangles of all eight handles for the current selection
    pub fn handle_rects(&self) -> Option<[(Handle, SelectionRect); 8]> {
        let rect = self.rect?;
        let half = HANDLE_SIZE / 2.0;
        Some(Handle::ALL.map(|handle| {
            let (x, y) = handle.anchor(&rect);
            (
                handle,
                SelectionRect::new(x - half, y - half, HANDLE_SIZE, HANDLE_SIZE),
            )
        }))
    }

    /// Determine which handle (if any) is under the given point
    fn hit_test_handle(&self, x: f32, y: f32) -> Option<Handle> {
        let handles = self.handle_rects()?;
        // Corners take priority over the edge midpoints
        handles
            .iter()
            .filter(|(h, _)| h.is_corner())
            .chain(handles.iter().filter(|(h, _)| !h.is_corner()))
            .find(|(_, r)| r.contains(x, y))
            .map(|(h, _)| *h)
    }

    /// Determine which edge (if any) is under the given point
    fn hit_test_edge(&self, x: f32, y: f32) -> Option<Handle> {
        let rect = self.rect?;
        let grab = EDGE_GRAB_WIDTH;
        let in_horizontal = x >= rect.left && x <= rect.right();
        let in_vertical = y >= rect.top && y <= rect.bottom();

        if in_horizontal && (y - rect.top).abs() <= grab {
            return Some(Handle::North);
        }
        if in_horizontal && (y - rect.bottom()).abs() <= grab {
            return Some(Handle::South);
        }
        if in_vertical && (x - rect.left).abs() <= grab {
            return Some(Handle::West);
        }
        if in_vertical && (x - rect.right()).abs() <= grab {
            return Some(Handle::East);
        }
        None
    }

    /// Determine what interaction a press at the given point starts
    pub fn hit_test(&self, x: f32, y: f32) -> InteractionMode {
        if let Some(handle) = self.hit_test_handle(x, y) {
            return InteractionMode::Resizing(handle);
        }
        if let Some(handle) = self.hit_test_edge(x, y) {
            return InteractionMode::Resizing(handle);
        }
        if self.rect.is_some_and(|r| r.contains(x, y)) {
            return InteractionMode::Dragging;
        }
        InteractionMode::Creating
    }

    /// Get cursor name for the given position
    pub fn cursor_for_position(&self, x: f32, y: f32) -> &'static str {
        match self.mode {
            InteractionMode::Dragging => return "grabbing",
            InteractionMode::Resizing(handle) => return handle.cursor_name(),
            InteractionMode::Creating => return "crosshair",
            InteractionMode::Idle => {}
        }
        match self.hit_test(x, y) {
            InteractionMode::Resizing(handle) => handle.cursor_name(),
            InteractionMode::Dragging => "move",
            _ => "crosshair",
        }
    }

    /// Pointer pressed: hit-test and start the matching interaction
    pub fn pointer_down(&mut self, x: f32, y: f32) -> InteractionMode {
        if self.closed {
            return InteractionMode::Idle;
        }
        match self.hit_test(x, y) {
            InteractionMode::Resizing(handle) => self.begin_resize(handle, x, y),
            InteractionMode::Dragging => self.begin_drag(x, y),
            _ => self.begin_create(x, y),
        }
        self.mode
    }

    /// Start a new selection anchored at the given point
    pub fn begin_create(&mut self, x: f32, y: f32) {
        if self.closed {
            return;
        }
        let (x, y) = self.clamp_point(x, y);
        self.mode = InteractionMode::Creating;
        self.pointer_start = (x, y);
        self.start_rect = self.rect;
        self.rect = Some(SelectionRect::new(x, y, 0.0, 0.0));
        debug!(x, y, "creating selection");
        self.notify();
    }

    /// Start moving the current selection
    pub fn begin_drag(&mut self, x: f32, y: f32) {
        if self.closed || self.rect.is_none() {
            return;
        }
        self.mode = InteractionMode::Dragging;
        self.pointer_start = (x, y);
        self.start_rect = self.rect;
        debug!(x, y, "dragging selection");
        self.notify();
    }

    /// Start resizing the current selection through `handle`
    pub fn begin_resize(&mut self, handle: Handle, x: f32, y: f32) {
        if self.closed || self.rect.is_none() {
            return;
        }
        self.mode = InteractionMode::Resizing(handle);
        self.pointer_start = (x, y);
        self.start_rect = self.rect;
        debug!(?handle, x, y, "resizing selection");
        self.notify();
    }

    /// Pointer moved while a button is held
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let (sx, sy) = self.pointer_start;

        match self.mode {
            InteractionMode::Idle => return,
            InteractionMode::Creating => {
                let (x, y) = self.clamp_point(x, y);
                self.rect = Some(SelectionRect::from_corners(sx, sy, x, y));
            }
            InteractionMode::Dragging => {
                let Some(start) = self.start_rect else {
                    return;
                };
                let left = (start.left + x - sx)
                    .min(self.display_width - start.width)
                    .max(0.0);
                let top = (start.top + y - sy)
                    .min(self.display_height - start.height)
                    .max(0.0);
                self.rect = Some(SelectionRect::new(left, top, start.width, start.height));
            }
            InteractionMode::Resizing(handle) => {
                let Some(start) = self.start_rect else {
                    return;
                };
                self.rect = Some(self.apply_resize(start, handle, x - sx, y - sy));
            }
        }

        self.notify();
    }

    /// Move the edges implied by `handle` by the pointer delta.
    ///
    /// The size floor is applied against the fixed opposite edge before the
    /// moving edge is clamped to the image, so the rectangle cannot invert.
    fn apply_resize(&self, start: SelectionRect, handle: Handle, dx: f32, dy: f32) -> SelectionRect {
        let mut left = start.left;
        let mut top = start.top;
        let mut right = start.right();
        let mut bottom = start.bottom();

        if handle.moves_left() {
            left = (left + dx).min(right - MIN_SIZE).max(0.0);
        }
        if handle.moves_right() {
            right = (right + dx).max(left + MIN_SIZE).min(self.display_width);
        }
        if handle.moves_top() {
            top = (top + dy).min(bottom - MIN_SIZE).max(0.0);
        }
        if handle.moves_bottom() {
            bottom = (bottom + dy).max(top + MIN_SIZE).min(self.display_height);
        }

        SelectionRect::new(left, top, right - left, bottom - top)
            .clamped_to(self.display_width, self.display_height)
    }

    /// Pointer released: finish the current interaction
    pub fn on_pointer_up(&mut self) {
        if self.mode == InteractionMode::Idle {
            return;
        }

        if self.mode == InteractionMode::Creating {
            if let Some(rect) = self.rect.filter(|r| !r.is_at_least(MIN_SIZE)) {
                debug!(
                    width = rect.width,
                    height = rect.height,
                    "discarding selection below minimum size"
                );
                self.rect = None;
            }
        }

        self.mode = InteractionMode::Idle;
        self.start_rect = None;
        self.notify();
    }

    /// Abandon the session, discarding any selection
    pub fn cancel(&mut self) {
        if self.closed {
            return;
        }
        debug!("selection cancelled");
        self.mode = InteractionMode::Idle;
        self.start_rect = None;
        self.rect = None;
        self.closed = true;
        self.notify();
    }

    /// Finalize the selection for cropping.
    ///
    /// Fails without closing the session when there is no selection or it
    /// is below [`MIN_SIZE`], so the user can adjust and retry.
    pub fn commit(&mut self) -> Result<SelectionRect> {
        if self.closed {
            return Err(SnipError::SessionClosed);
        }
        if self.mode != InteractionMode::Idle {
            self.on_pointer_up();
        }

        let rect = self.rect.ok_or(SnipError::NoSelection)?;
        if !rect.is_at_least(MIN_SIZE) {
            return Err(SnipError::SelectionTooSmall {
                width: rect.width,
                height: rect.height,
                min: MIN_SIZE,
            });
        }

        self.closed = true;
        info!(
            left = rect.left,
            top = rect.top,
            width = rect.width,
            height = rect.height,
            "selection committed"
        );
        Ok(rect)
    }

    /// Keyboard dispatcher: Escape cancels, Enter commits
    pub fn on_key(&mut self, key: Key) -> Result<SessionEvent> {
        match key {
            Key::Escape => {
                self.cancel();
                Ok(SessionEvent::Cancelled)
            }
            Key::Enter => self.commit().map(SessionEvent::Committed),
            Key::SelectAll => {
                self.select_all();
                Ok(SessionEvent::Continue)
            }
        }
    }
}
