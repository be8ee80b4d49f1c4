pub mod bitmap;
pub mod classify;
pub mod error;
pub mod format;
pub mod logging;

#[cfg(feature = "decode")]
pub mod binarize;
#[cfg(feature = "decode")]
pub mod decode;
#[cfg(feature = "decode")]
pub mod oned;
#[cfg(feature = "decode")]
pub mod reader;

#[cfg(any(feature = "encode", feature = "decode"))]
pub mod qr;

#[cfg(feature = "encode")]
pub mod encode;
#[cfg(feature = "encode")]
pub mod terminal;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use bitmap::{downscale_for_decode, BitMatrix, DECODE_AREA_THRESHOLD};
pub use classify::{classify, DecodeType};
pub use error::{Result, ScanError};
pub use format::{CharacterSet, DecodeHints, EncodeHints, Symbology};

#[cfg(feature = "decode")]
pub use decode::{decode_file, decode_image, decode_image_with_hints, decode_rgba, DecodeResult};
#[cfg(feature = "decode")]
pub use reader::{Decoded, MultiFormatReader};

#[cfg(feature = "encode")]
pub use encode::{
    encode_as_image, encode_for_display, encode_for_terminal, encode_to_file, DisplaySize,
    TerminalQr,
};
#[cfg(feature = "encode")]
pub use terminal::display_qr;
