use image::GrayImage;
use tracing::debug;

use crate::classify::{classify, DecodeType};
use crate::error::{Result, ScanError};
use crate::format::{DecodeHints, Symbology};
use crate::oned::code128::Code128Reader;
use crate::oned::ean::EanReader;
use crate::oned::LinearReader;
use crate::qr::QrReader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub symbology: Symbology,
}

impl Decoded {
    pub fn new(text: impl Into<String>, symbology: Symbology) -> Self {
        Self {
            text: text.into(),
            symbology,
        }
    }

    pub fn decode_type(&self) -> DecodeType {
        classify(&self.text)
    }
}

/// One symbology family, reading from an already binarized image
/// (black = 0, white = 255).
pub trait Reader {
    fn name(&self) -> &'static str;

    fn decode(&self, binary: &GrayImage) -> Result<Decoded>;
}

/// Tries every reader the hints allow, in order, and keeps the first hit.
pub struct MultiFormatReader {
    readers: Vec<Box<dyn Reader>>,
}

impl MultiFormatReader {
    pub fn new(hints: &DecodeHints) -> Self {
        let mut readers: Vec<Box<dyn Reader>> = Vec::new();

        if hints.allows(Symbology::QrCode) {
            readers.push(Box::new(QrReader));
        }

        let ean = EanReader::new(hints);
        if ean.is_enabled() {
            readers.push(Box::new(LinearReader::new(ean, hints)));
        }

        if hints.allows(Symbology::Code128) {
            readers.push(Box::new(LinearReader::new(Code128Reader, hints)));
        }

        for symbology in &hints.possible_formats {
            if !is_supported(*symbology) {
                debug!("No reader available for {}, skipping", symbology);
            }
        }

        Self { readers }
    }

    pub fn reader_names(&self) -> Vec<&'static str> {
        self.readers.iter().map(|r| r.name()).collect()
    }

    pub fn decode(&self, binary: &GrayImage) -> Result<Decoded> {
        let mut codec_error = None;

        for reader in &self.readers {
            match reader.decode(binary) {
                Ok(decoded) => return Ok(decoded),
                Err(ScanError::NotFound) => {
                    debug!("{} reader found nothing", reader.name());
                }
                Err(e) => {
                    debug!("{} reader failed: {}", reader.name(), e);
                    codec_error.get_or_insert(e);
                }
            }
        }

        Err(codec_error.unwrap_or(ScanError::NotFound))
    }
}

fn is_supported(symbology: Symbology) -> bool {
    matches!(
        symbology,
        Symbology::QrCode
            | Symbology::Ean13
            | Symbology::UpcA
            | Symbology::Ean8
            | Symbology::Code128
    )
}
