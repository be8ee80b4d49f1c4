use crate::error::{Result, ScanError};

#[cfg(feature = "encode")]
use crate::bitmap::BitMatrix;

#[cfg(feature = "encode")]
use crate::format::EncodeHints;

#[cfg(feature = "encode")]
use qrcode::{Color, EcLevel, QrCode};

#[cfg(feature = "decode")]
use crate::format::Symbology;

#[cfg(feature = "decode")]
use crate::reader::{Decoded, Reader};

#[cfg(feature = "decode")]
use image::GrayImage;

#[cfg(feature = "decode")]
use rqrr::PreparedImage;

/// Blank modules around the symbol in rendered images.
pub const QUIET_ZONE: u32 = 4;

/// Largest image side the encoder will allocate.
#[cfg(feature = "encode")]
pub const MAX_DIMENSION: u32 = 8192;

#[cfg(feature = "encode")]
const TERMINAL_QUIET_ZONE: usize = 2;

#[cfg(feature = "encode")]
fn build_code(contents: &str, hints: &EncodeHints) -> Result<QrCode> {
    if contents.is_empty() {
        return Err(ScanError::invalid_input("Found empty contents"));
    }

    let data = hints.effective_character_set().encode(contents)?;

    QrCode::with_error_correction_level(&data, EcLevel::L)
        .map_err(|e| ScanError::codec(format!("Failed to create QR code: {}", e)))
}

/// Writes `contents` as a QR symbol into a square matrix at least
/// `dimension` wide, scaled by a whole number of pixels per module and
/// centred inside a quiet zone.
#[cfg(feature = "encode")]
pub fn encode_bit_matrix(contents: &str, dimension: u32, hints: &EncodeHints) -> Result<BitMatrix> {
    if dimension == 0 {
        return Err(ScanError::invalid_input("Requested dimension is zero"));
    }
    if dimension > MAX_DIMENSION {
        return Err(ScanError::invalid_input(format!(
            "Requested dimension {} exceeds the maximum of {}",
            dimension, MAX_DIMENSION
        )));
    }

    let code = build_code(contents, hints)?;
    let modules = code.width() as u32;
    let padded = modules + QUIET_ZONE * 2;

    let output = dimension.max(padded);
    let multiple = output / padded;
    let padding = (output - modules * multiple) / 2;

    let mut matrix = BitMatrix::new(output, output);
    for (i, color) in code.to_colors().iter().enumerate() {
        if *color == Color::Dark {
            let x = i as u32 % modules;
            let y = i as u32 / modules;
            matrix.set_region(padding + x * multiple, padding + y * multiple, multiple, multiple);
        }
    }

    Ok(matrix)
}

#[cfg(feature = "encode")]
fn terminal_dimensions() -> (usize, usize) {
    use terminal_size::{terminal_size, Height, Width};

    terminal_size()
        .map(|(Width(w), Height(h))| {
            if w < 40 || h < 30 {
                (120, 60)
            } else {
                (w as usize, h as usize)
            }
        })
        .unwrap_or((120, 60))
}

/// Half-block text of a QR code and whether it fits the terminal it was
/// sized for.
#[cfg(feature = "encode")]
pub struct TerminalRendering {
    pub text: String,
    pub fits: bool,
}

/// Renders `contents` with half-block characters, centred in the current terminal.
#[cfg(feature = "encode")]
pub fn render_qr_to_terminal(contents: &str) -> Result<TerminalRendering> {
    let code = build_code(contents, &EncodeHints::for_contents(contents))?;
    let (term_width, term_height) = terminal_dimensions();
    Ok(TerminalRendering {
        text: render_half_blocks(&code, term_width, term_height),
        fits: fits_in(&code, term_width, term_height),
    })
}

#[cfg(feature = "encode")]
fn render_half_blocks(code: &QrCode, term_width: usize, term_height: usize) -> String {
    let qr_size = code.width();
    let colors = code.to_colors();
    let qr_with_quiet = qr_size + TERMINAL_QUIET_ZONE * 2;

    // One module per column, two module rows per terminal line.
    let display_height = qr_with_quiet.div_ceil(2);
    let pad_left = term_width.saturating_sub(qr_with_quiet) / 2;
    let pad_top = term_height.saturating_sub(display_height + 8) / 2;

    let is_dark = |row: usize, col: usize| -> bool {
        let inside = TERMINAL_QUIET_ZONE..qr_size + TERMINAL_QUIET_ZONE;
        if inside.contains(&row) && inside.contains(&col) {
            colors[(row - TERMINAL_QUIET_ZONE) * qr_size + (col - TERMINAL_QUIET_ZONE)] == Color::Dark
        } else {
            false
        }
    };

    let mut result = "\n".repeat(pad_top);
    let left_pad = " ".repeat(pad_left);

    for line in 0..display_height {
        let top_row = line * 2;
        let bottom_row = top_row + 1;

        result.push_str(&left_pad);
        for col in 0..qr_with_quiet {
            let ch = match (is_dark(top_row, col), is_dark(bottom_row, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Whether the half-block rendering fits, leaving six lines for a header.
#[cfg(feature = "encode")]
fn fits_in(code: &QrCode, term_width: usize, term_height: usize) -> bool {
    let qr_with_quiet = code.width() + TERMINAL_QUIET_ZONE * 2;
    qr_with_quiet <= term_width && qr_with_quiet.div_ceil(2) + 6 <= term_height
}

/// Payload bytes as text: UTF-8 when they form valid UTF-8, ISO-8859-1 otherwise.
#[cfg(feature = "decode")]
fn payload_to_text(payload: Vec<u8>) -> String {
    String::from_utf8(payload)
        .unwrap_or_else(|e| e.into_bytes().into_iter().map(char::from).collect())
}

#[cfg(feature = "decode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct QrReader;

#[cfg(feature = "decode")]
impl Reader for QrReader {
    fn name(&self) -> &'static str {
        "qr"
    }

    fn decode(&self, binary: &GrayImage) -> Result<Decoded> {
        let mut prepared = PreparedImage::prepare(binary.clone());
        let grids = prepared.detect_grids();

        if grids.is_empty() {
            return Err(ScanError::NotFound);
        }

        let mut last_error = None;
        for grid in &grids {
            let mut payload = Vec::new();
            match grid.decode_to(&mut payload) {
                Ok(_) => {
                    tracing::debug!("QR grid decoded, {} payload bytes", payload.len());
                    return Ok(Decoded::new(payload_to_text(payload), Symbology::QrCode));
                }
                Err(e) => {
                    tracing::debug!("QR grid failed to decode: {:?}", e);
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error.map_or_else(String::new, |e| format!("{:?}", e));
        Err(ScanError::codec(format!("Failed to decode QR code: {}", reason)))
    }
}


#[cfg(all(test, feature = "encode", feature = "decode"))]
mod tests {
    use super::*;
    use crate::binarize::hybrid_binarize;
    use crate::bitmap::luminance_source;

    fn read_back(contents: &str) -> Result<Decoded> {
        let matrix = encode_bit_matrix(contents, 240, &EncodeHints::for_contents(contents))?;
        let luma = luminance_source(&matrix.to_image());
        QrReader.decode(&hybrid_binarize(&luma))
    }

    #[test]
    fn test_qr_roundtrip() {
        let decoded = read_back("Test data for QR code roundtrip").unwrap();
        assert_eq!(decoded, Decoded::new("Test data for QR code roundtrip", Symbology::QrCode));
    }

    #[test]
    fn latin1_payload_reads_back() {
        assert_eq!(read_back("café crème").unwrap().text, "café crème");
    }

    #[test]
    fn utf8_payload_reads_back() {
        assert_eq!(read_back("二维码 扫描").unwrap().text, "二维码 扫描");
    }

    #[test]
    fn payload_text_falls_back_to_latin1() {
        assert_eq!(payload_to_text(b"plain".to_vec()), "plain");
        assert_eq!(payload_to_text(vec![0x63, 0x61, 0x66, 0xE9]), "café");
        assert_eq!(payload_to_text("ü".as_bytes().to_vec()), "ü");
    }
}
