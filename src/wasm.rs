use wasm_bindgen::prelude::*;

use crate::decode::{decode_rgba, DecodeResult};
use crate::error::ScanError;
use crate::format::DecodeHints;

#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanStatus {
    Found = 0,
    NotFound = 1,
    Error = 2,
}

#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct ScanResult {
    pub status: ScanStatus,
    /// Set when the code was only found after inverting the frame.
    pub inverted: bool,
    text: String,
    format: String,
    decode_type: String,
    handling_time: String,
}

#[wasm_bindgen]
impl ScanResult {
    pub fn get_text(&self) -> String {
        self.text.clone()
    }

    pub fn get_format(&self) -> String {
        self.format.clone()
    }

    pub fn get_decode_type(&self) -> String {
        self.decode_type.clone()
    }

    pub fn get_handling_time(&self) -> String {
        self.handling_time.clone()
    }
}

impl ScanResult {
    fn from_decode(result: &DecodeResult, inverted: bool) -> Self {
        let handling_time = result.handling_time_secs();
        match &result.outcome {
            Ok(decoded) => ScanResult {
                status: ScanStatus::Found,
                inverted,
                text: decoded.text.clone(),
                format: decoded.symbology.name().to_string(),
                decode_type: decoded.decode_type().name().to_string(),
                handling_time,
            },
            Err(e) if e.is_not_found() => {
                Self::empty(ScanStatus::NotFound, String::new(), handling_time)
            }
            Err(e) => Self::empty(ScanStatus::Error, e.to_string(), handling_time),
        }
    }

    fn empty(status: ScanStatus, text: String, handling_time: String) -> Self {
        ScanResult {
            status,
            inverted: false,
            text,
            format: String::new(),
            decode_type: String::new(),
            handling_time,
        }
    }
}

/// Scans camera frames handed over from the browser as RGBA bytes.
#[wasm_bindgen]
pub struct FrameScanner {
    hints: DecodeHints,
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl FrameScanner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> FrameScanner {
        console_error_panic_hook::set_once();
        FrameScanner {
            hints: DecodeHints::default(),
        }
    }

    pub fn set_try_harder(&mut self, try_harder: bool) {
        self.hints.try_harder = try_harder;
    }

    pub fn scan_frame(&self, data: &[u8], width: u32, height: u32) -> ScanResult {
        let result = decode_rgba(data, width, height, &self.hints);
        if !result.outcome.as_ref().is_err_and(ScanError::is_not_found) {
            return ScanResult::from_decode(&result, false);
        }

        // Light-on-dark codes (dark mode screens).
        let inverted = invert_rgb(data);
        let retry = decode_rgba(&inverted, width, height, &self.hints);
        ScanResult::from_decode(&retry, retry.is_found())
    }
}

fn invert_rgb(data: &[u8]) -> Vec<u8> {
    let mut inverted = data.to_vec();
    for pixel in inverted.chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            *channel = 255 - *channel;
        }
    }
    inverted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inversion_keeps_alpha() {
        assert_eq!(invert_rgb(&[0, 10, 255, 128]), vec![255, 245, 0, 128]);
    }

    #[test]
    fn blank_frame_is_not_found() {
        let scanner = FrameScanner::new();
        let frame = vec![255u8; 64 * 64 * 4];
        let result = scanner.scan_frame(&frame, 64, 64);
        assert_eq!(result.status, ScanStatus::NotFound);
        assert!(!result.inverted);
    }

    #[test]
    fn short_buffer_is_an_error() {
        let result = FrameScanner::new().scan_frame(&[0u8; 3], 2, 2);
        assert_eq!(result.status, ScanStatus::Error);
        assert!(!result.get_text().is_empty());
    }
}
