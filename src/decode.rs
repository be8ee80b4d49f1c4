use image::{DynamicImage, RgbaImage};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::binarize::hybrid_binarize;
use crate::bitmap::{downscale_for_decode, luminance_source};
use crate::error::{Result, ScanError};
use crate::format::DecodeHints;
use crate::reader::{Decoded, MultiFormatReader};

/// Outcome of one decode call together with how long it took.
#[derive(Debug)]
pub struct DecodeResult {
    pub outcome: Result<Decoded>,
    pub handling_time: Duration,
}

impl DecodeResult {
    pub fn decoded(&self) -> Option<&Decoded> {
        self.outcome.as_ref().ok()
    }

    pub fn text(&self) -> Option<&str> {
        self.decoded().map(|d| d.text.as_str())
    }

    pub fn is_found(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Elapsed decode time in seconds, e.g. `"0.042"`.
    pub fn handling_time_secs(&self) -> String {
        format!("{:.3}", self.handling_time.as_secs_f64())
    }
}

fn timed(run: impl FnOnce() -> Result<Decoded>) -> DecodeResult {
    let start = Instant::now();
    let outcome = run();
    let handling_time = start.elapsed();

    match &outcome {
        Ok(decoded) => info!(
            "Decoded {} in {:.3}s: {}",
            decoded.symbology,
            handling_time.as_secs_f64(),
            decoded.text
        ),
        Err(e) => debug!("Decode failed after {:.3}s: {}", handling_time.as_secs_f64(), e),
    }

    DecodeResult {
        outcome,
        handling_time,
    }
}

fn decode_pipeline(image: &DynamicImage, hints: &DecodeHints) -> Result<Decoded> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ScanError::invalid_input(format!(
            "Image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let scaled = downscale_for_decode(image);
    let luma = luminance_source(&scaled.to_rgba8());
    let binary = hybrid_binarize(&luma);

    MultiFormatReader::new(hints).decode(&binary)
}

pub fn decode_image(image: &DynamicImage) -> DecodeResult {
    decode_image_with_hints(image, &DecodeHints::default())
}

pub fn decode_image_with_hints(image: &DynamicImage, hints: &DecodeHints) -> DecodeResult {
    timed(|| decode_pipeline(image, hints))
}

/// Decodes a tightly packed RGBA buffer, e.g. a camera frame.
pub fn decode_rgba(data: &[u8], width: u32, height: u32, hints: &DecodeHints) -> DecodeResult {
    timed(|| {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| {
                ScanError::invalid_input(format!("Frame of {}x{} is too large", width, height))
            })?;
        if data.len() != expected {
            return Err(ScanError::invalid_input(format!(
                "RGBA buffer is {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }

        let rgba = RgbaImage::from_raw(width, height, data.to_vec())
            .ok_or_else(|| ScanError::invalid_input("Failed to create image from buffer"))?;
        decode_pipeline(&DynamicImage::ImageRgba8(rgba), hints)
    })
}

/// Opens an image file and decodes it. Failing to read the file is an
/// error; failing to find a code is reported inside the [`DecodeResult`].
pub fn decode_file(path: &Path, hints: &DecodeHints) -> Result<DecodeResult> {
    let image = image::open(path)?;
    Ok(decode_image_with_hints(&image, hints))
}
