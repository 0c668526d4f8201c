use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use image::RgbaImage;
use tracing::info;
use tracing_subscriber::EnvFilter;

use textsnip::capture::{self, CaptureError, ClipboardImageSource, ImageFileSource};
use textsnip::clipboard::WlClipboard;
use textsnip::config::{CaptureConfig, Config};
use textsnip::crop::{CropResolution, CroppedImage, Cropper, SourceImage};
use textsnip::explain::Model;
use textsnip::ocr::{Language, MockRecognizer};
use textsnip::pipeline::TextPipeline;
use textsnip::selection::SelectionRect;
use textsnip::session::{CaptureSession, Headless};
use textsnip::status::StatusLine;

#[derive(Parser)]
#[command(name = "textsnip", about = "Select a screen region and extract its text")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to <config dir>/textsnip/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use an image file instead of capturing the screen
    #[arg(short, long, conflicts_with = "from_clipboard")]
    input: Option<PathBuf>,

    /// Use the image currently on the clipboard
    #[arg(long)]
    from_clipboard: bool,

    /// Crop LEFT,TOP,WIDTH,HEIGHT without showing the overlay
    #[arg(long, value_parser = parse_region)]
    region: Option<SelectionRect>,

    /// Size the image is shown at, as WIDTHxHEIGHT (--region is relative to it)
    #[arg(long, value_parser = parse_size, requires = "region")]
    display_size: Option<(f32, f32)>,

    /// OCR language code (eng, spa, fra, deu, chi_sim, jpn, kor, ara, rus, por)
    #[arg(short, long)]
    lang: Option<String>,

    /// Explain the extracted text with the given model (openai, anthropic, gemini, local)
    #[arg(long)]
    explain: Option<String>,

    /// Save the extracted text to a file
    #[arg(long)]
    save: bool,

    /// Save the cropped image as PNG
    #[arg(long)]
    save_image: bool,

    /// Do not copy the text to the clipboard
    #[arg(long)]
    no_copy: bool,

    /// Put the cropped image on the clipboard (text copy replaces it unless --no-copy)
    #[arg(long)]
    copy_image: bool,

    /// Copy the explanation to the clipboard once generated (needs --explain)
    #[arg(long, requires = "explain")]
    copy_explanation: bool,

    /// Fall back to a generated placeholder if capture fails
    #[arg(long)]
    allow_synthetic: bool,

    /// Skip OCR and return sample text
    #[arg(long)]
    mock_ocr: bool,

    /// Keep every captured pixel instead of resampling to the on-screen size
    #[arg(long)]
    natural_resolution: bool,
}

impl Cli {
    /// Command-line flags take precedence over the config file
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(lang) = &self.lang {
            config.ocr.language = lang.parse::<Language>()?;
        }
        if let Some(model) = &self.explain {
            config.explain.enabled = true;
            config.explain.model = model.parse::<Model>()?;
        }
        if self.save {
            config.output.save_text = true;
        }
        if self.save_image {
            config.output.save_image = true;
        }
        if self.no_copy {
            config.output.copy_text = false;
        }
        if self.copy_image {
            config.output.copy_image = true;
        }
        if self.copy_explanation {
            config.output.copy_explanation = true;
        }
        if self.allow_synthetic {
            config.capture.allow_synthetic_fallback = true;
        }
        if self.natural_resolution {
            config.crop.resolution = CropResolution::Natural;
        }
        Ok(())
    }
}

fn parse_region(s: &str) -> Result<SelectionRect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid region '{}': {}", s, e))?;
    match parts[..] {
        [left, top, width, height] => Ok(SelectionRect::new(left, top, width, height)),
        _ => Err(format!("expected LEFT,TOP,WIDTH,HEIGHT, got '{}'", s)),
    }
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(&['x', 'X'][..])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("invalid width: {}", e))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("invalid height: {}", e))?;
    if w <= 0.0 || h <= 0.0 {
        return Err("display size must be positive".into());
    }
    Ok((w, h))
}

/// Screen capture is only compiled in with the `gui` feature
#[cfg(not(feature = "gui"))]
struct LiveCapture;

#[cfg(not(feature = "gui"))]
impl capture::CaptureSource for LiveCapture {
    fn capture_visible_surface(&self) -> std::result::Result<RgbaImage, CaptureError> {
        Err(CaptureError::Unavailable(
            "built without the `gui` feature; use --input or --from-clipboard".into(),
        ))
    }
}

#[cfg(feature = "gui")]
use textsnip::capture::WayshotSource as LiveCapture;

fn grab(cli: &Cli, config: &CaptureConfig) -> std::result::Result<RgbaImage, CaptureError> {
    if let Some(path) = &cli.input {
        capture::acquire(&ImageFileSource { path: path.clone() }, config)
    } else if cli.from_clipboard {
        capture::acquire(&ClipboardImageSource { clipboard: WlClipboard }, config)
    } else {
        capture::acquire(&LiveCapture, config)
    }
}

/// Crop `rect` directly, as if it had been drawn and committed on screen
fn crop_region(
    pixels: RgbaImage,
    cropper: Cropper,
    rect: SelectionRect,
    display_size: Option<(f32, f32)>,
) -> Result<CroppedImage> {
    let source = match display_size {
        Some((w, h)) => SourceImage::with_display_size(pixels, w, h),
        None => SourceImage::new(pixels),
    };
    let mut session = CaptureSession::new(source, cropper, Headless);
    session.controller_mut().set_selection(rect);
    Ok(session.commit()?)
}

#[cfg(feature = "gui")]
fn select(pixels: RgbaImage, cropper: Cropper) -> Result<Option<CroppedImage>> {
    Ok(textsnip::overlay::select_interactively(pixels, cropper)?)
}

#[cfg(not(feature = "gui"))]
fn select(_pixels: RgbaImage, _cropper: Cropper) -> Result<Option<CroppedImage>> {
    anyhow::bail!("interactive selection needs the `gui` feature; pass --region LEFT,TOP,WIDTH,HEIGHT")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };
    cli.apply(&mut config)?;

    let pixels = grab(&cli, &config.capture).context("no image to select from")?;
    let cropper = Cropper::new(config.crop.resolution);

    let cropped = match cli.region {
        Some(rect) => crop_region(pixels, cropper, rect, cli.display_size)?,
        None => match select(pixels, cropper)? {
            Some(cropped) => cropped,
            None => {
                eprintln!("Selection cancelled");
                return Ok(());
            }
        },
    };
    let (w, h) = cropped.dimensions();
    info!(width = w, height = h, "processing crop");

    let mut pipeline = TextPipeline::from_config(&config);
    if cli.mock_ocr {
        pipeline = pipeline.with_recognizer(Box::new(MockRecognizer::default()));
    }

    let mut status = StatusLine::default();
    let extraction = pipeline.process(&cropped, &mut status)?;

    if extraction.text.is_empty() {
        eprintln!("No text found");
    } else {
        println!("{}", extraction.text);
    }
    if let Some(explanation) = &extraction.explanation {
        println!();
        println!("{}", explanation);
    }

    // Each copy replaces the previous clipboard contents
    if extraction.explanation_copied {
        eprintln!("Explanation copied to clipboard");
    } else if extraction.copied {
        eprintln!("Text copied to clipboard");
    } else if extraction.image_copied {
        eprintln!("Image copied to clipboard");
    }
    if let Some(path) = &extraction.text_file {
        eprintln!("Saved text to {}", path.display());
    }
    if let Some(path) = &extraction.image_file {
        eprintln!("Saved image to {}", path.display());
    }
    for warning in &extraction.warnings {
        eprintln!("warning: {}", warning);
    }

    Ok(())
}
