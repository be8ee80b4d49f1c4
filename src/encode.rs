use image::RgbaImage;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{Result, ScanError};
use crate::format::EncodeHints;
use crate::qr::{encode_bit_matrix, render_qr_to_terminal};

/// Size of the screen the code will be shown on, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Seven eighths of the shorter side.
    pub fn target_dimension(&self) -> u32 {
        (u64::from(self.width.min(self.height)) * 7 / 8) as u32
    }
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self::new(1080, 1920)
    }
}

impl fmt::Display for DisplaySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for DisplaySize {
    type Err = ScanError;

    /// Parses `WIDTHxHEIGHT`, e.g. `1080x1920`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ScanError::invalid_input(format!("Invalid display size: {}", s));
        let (width, height) = s
            .trim()
            .split_once(|c: char| c.eq_ignore_ascii_case(&'x'))
            .ok_or_else(invalid)?;
        let width = width.trim().parse().map_err(|_| invalid())?;
        let height = height.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(width, height))
    }
}

/// Renders `contents` as a QR code image at least `dimension` pixels square.
pub fn encode_as_image(contents: &str, dimension: u32) -> Result<RgbaImage> {
    let hints = EncodeHints::for_contents(contents);
    if let Some(charset) = hints.character_set {
        info!("Encoding contents as {}", charset.name());
    }

    match encode_bit_matrix(contents, dimension, &hints) {
        Ok(matrix) => {
            info!(
                "Encoded {} characters into a {}x{} image",
                contents.chars().count(),
                matrix.width(),
                matrix.height()
            );
            Ok(matrix.to_image())
        }
        Err(e) => {
            warn!("Failed to encode contents: {}", e);
            Err(e)
        }
    }
}

/// Sizes the code to the display it will be shown on.
pub fn encode_for_display(contents: &str, display: DisplaySize) -> Result<RgbaImage> {
    encode_as_image(contents, display.target_dimension())
}

pub fn encode_to_file(contents: &str, dimension: u32, path: &Path) -> Result<RgbaImage> {
    let image = encode_as_image(contents, dimension)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    info!("Saved QR code to {}", path.display());
    Ok(image)
}

pub struct TerminalQr {
    pub contents: String,
    pub rendered: String,
    pub fits: bool,
}

pub fn encode_for_terminal(contents: &str) -> Result<TerminalQr> {
    let rendering = render_qr_to_terminal(contents)?;
    if !rendering.fits {
        warn!("QR code is larger than the terminal; enlarge the window to scan it");
    }
    Ok(TerminalQr {
        contents: contents.to_string(),
        rendered: rendering.text,
        fits: rendering.fits,
    })
}
