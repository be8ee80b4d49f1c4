use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbology {
    Aztec,
    Codabar,
    Code39,
    Code93,
    Code128,
    DataMatrix,
    Ean8,
    Ean13,
    Itf,
    Pdf417,
    QrCode,
    Rss14,
    RssExpanded,
    UpcA,
    UpcE,
}

pub const PRODUCT_FORMATS: &[Symbology] = &[
    Symbology::UpcA,
    Symbology::UpcE,
    Symbology::Ean13,
    Symbology::Ean8,
    Symbology::Rss14,
    Symbology::RssExpanded,
];

pub const INDUSTRIAL_FORMATS: &[Symbology] = &[
    Symbology::Code39,
    Symbology::Code93,
    Symbology::Code128,
    Symbology::Itf,
    Symbology::Codabar,
];

pub const QR_CODE_FORMATS: &[Symbology] = &[Symbology::QrCode];
pub const DATA_MATRIX_FORMATS: &[Symbology] = &[Symbology::DataMatrix];
pub const AZTEC_FORMATS: &[Symbology] = &[Symbology::Aztec];
pub const PDF417_FORMATS: &[Symbology] = &[Symbology::Pdf417];

impl Symbology {
    pub const ALL: [Symbology; 15] = [
        Symbology::Aztec,
        Symbology::Codabar,
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Code128,
        Symbology::DataMatrix,
        Symbology::Ean8,
        Symbology::Ean13,
        Symbology::Itf,
        Symbology::Pdf417,
        Symbology::QrCode,
        Symbology::Rss14,
        Symbology::RssExpanded,
        Symbology::UpcA,
        Symbology::UpcE,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Symbology::Aztec => "AZTEC",
            Symbology::Codabar => "CODABAR",
            Symbology::Code39 => "CODE_39",
            Symbology::Code93 => "CODE_93",
            Symbology::Code128 => "CODE_128",
            Symbology::DataMatrix => "DATA_MATRIX",
            Symbology::Ean8 => "EAN_8",
            Symbology::Ean13 => "EAN_13",
            Symbology::Itf => "ITF",
            Symbology::Pdf417 => "PDF_417",
            Symbology::QrCode => "QR_CODE",
            Symbology::Rss14 => "RSS_14",
            Symbology::RssExpanded => "RSS_EXPANDED",
            Symbology::UpcA => "UPC_A",
            Symbology::UpcE => "UPC_E",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Symbology {
    type Err = ScanError;

    /// Accepts `QR_CODE`, `qr-code`, `qrcode` and the like.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = squash(s.trim());
        Symbology::ALL
            .iter()
            .copied()
            .find(|symbology| squash(symbology.name()) == wanted)
            .ok_or_else(|| ScanError::invalid_input(format!("Unknown barcode format: {}", s)))
    }
}

/// Options handed to the reader for a single decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeHints {
    /// Symbologies the reader may report. Empty means all of them.
    pub possible_formats: BTreeSet<Symbology>,
    /// Scan more rows for 1D symbols at the cost of speed.
    pub try_harder: bool,
}

impl Default for DecodeHints {
    fn default() -> Self {
        let possible_formats = [
            PRODUCT_FORMATS,
            INDUSTRIAL_FORMATS,
            QR_CODE_FORMATS,
            DATA_MATRIX_FORMATS,
            AZTEC_FORMATS,
            PDF417_FORMATS,
        ]
        .concat()
        .into_iter()
        .collect();

        Self {
            possible_formats,
            try_harder: false,
        }
    }
}

impl DecodeHints {
    pub fn with_formats(formats: impl IntoIterator<Item = Symbology>) -> Self {
        Self {
            possible_formats: formats.into_iter().collect(),
            try_harder: false,
        }
    }

    pub fn allows(&self, symbology: Symbology) -> bool {
        self.possible_formats.is_empty() || self.possible_formats.contains(&symbology)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSet {
    Iso8859_1,
    Utf8,
}

impl CharacterSet {
    pub fn name(self) -> &'static str {
        match self {
            CharacterSet::Iso8859_1 => "ISO-8859-1",
            CharacterSet::Utf8 => "UTF-8",
        }
    }

    pub fn encode(self, contents: &str) -> Result<Vec<u8>> {
        match self {
            CharacterSet::Utf8 => Ok(contents.as_bytes().to_vec()),
            CharacterSet::Iso8859_1 => contents
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        ScanError::invalid_input(format!(
                            "Character {:?} cannot be encoded as ISO-8859-1",
                            c
                        ))
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeHints {
    /// `None` leaves the writer on its ISO-8859-1 default.
    pub character_set: Option<CharacterSet>,
}

impl EncodeHints {
    /// Requests UTF-8 only when some character falls outside the single-byte range.
    pub fn for_contents(contents: &str) -> Self {
        let character_set = contents
            .chars()
            .any(|c| u32::from(c) > 0xFF)
            .then_some(CharacterSet::Utf8);
        Self { character_set }
    }

    pub fn effective_character_set(&self) -> CharacterSet {
        self.character_set.unwrap_or(CharacterSet::Iso8859_1)
    }
}
