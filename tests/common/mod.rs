use std::cell::{Cell, RefCell};
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use textsnip::capture::{CaptureError, CaptureSource};
use textsnip::clipboard::{Clipboard, ClipboardError};
use textsnip::crop::CroppedImage;
use textsnip::ocr::{Language, OcrError, TextRecognizer};
use textsnip::session::Overlay;

/// Image whose red channel encodes x and green channel encodes y (mod 256).
pub fn coordinate_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
    })
}

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

pub fn cropped(width: u32, height: u32) -> CroppedImage {
    CroppedImage {
        image: solid_image(width, height, [255, 255, 255, 255]),
        source_region: textsnip::crop::PixelRect {
            x: 0,
            y: 0,
            width,
            height,
        },
    }
}

/// Overlay that counts teardowns and tracks how many are still shown.
pub struct CountingOverlay {
    pub teardowns: Rc<Cell<u32>>,
    pub live: Rc<Cell<i32>>,
}

impl CountingOverlay {
    pub fn new(teardowns: &Rc<Cell<u32>>, live: &Rc<Cell<i32>>) -> Self {
        live.set(live.get() + 1);
        Self {
            teardowns: teardowns.clone(),
            live: live.clone(),
        }
    }
}

impl Overlay for CountingOverlay {
    fn teardown(&mut self) {
        self.teardowns.set(self.teardowns.get() + 1);
        self.live.set(self.live.get() - 1);
    }
}

/// In-memory clipboard; records copies and optionally fails them.
#[derive(Default, Clone)]
pub struct FakeClipboard {
    pub texts: Rc<RefCell<Vec<String>>>,
    pub images: Rc<RefCell<Vec<Vec<u8>>>>,
    pub stored_image: Option<Vec<u8>>,
    pub fail: bool,
}

impl Clipboard for FakeClipboard {
    fn copy_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::ToolNotFound("wl-copy"));
        }
        self.texts.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn copy_image(&self, png_data: &[u8]) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::ToolNotFound("wl-copy"));
        }
        self.images.borrow_mut().push(png_data.to_vec());
        Ok(())
    }

    fn read_image(&self) -> Result<Vec<u8>, ClipboardError> {
        self.stored_image.clone().ok_or(ClipboardError::NoImage)
    }
}

pub struct FailingSource;

impl CaptureSource for FailingSource {
    fn capture_visible_surface(&self) -> Result<RgbaImage, CaptureError> {
        Err(CaptureError::PermissionDenied("screencopy refused".into()))
    }
}

pub struct FailingRecognizer;

impl TextRecognizer for FailingRecognizer {
    fn recognize(&self, _image: &CroppedImage, _language: Language) -> Result<String, OcrError> {
        Err(OcrError::Recognition("engine crashed".into()))
    }
}

/// Returns fixed text and remembers the language it was asked for.
pub struct FixedRecognizer {
    pub text: String,
    pub seen: Rc<RefCell<Vec<Language>>>,
}

impl FixedRecognizer {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            seen: Rc::default(),
        }
    }
}

impl TextRecognizer for FixedRecognizer {
    fn recognize(&self, _image: &CroppedImage, language: Language) -> Result<String, OcrError> {
        self.seen.borrow_mut().push(language);
        Ok(self.text.clone())
    }
}

/// Small deterministic xorshift generator for event sequences.
pub struct XorShift(pub u64);

impl XorShift {
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Integer-valued f32 in `[lo, hi)`
    pub fn range(&mut self, lo: i32, hi: i32) -> f32 {
        let span = (hi - lo) as u64;
        (lo + (self.next_u64() % span) as i32) as f32
    }
}
