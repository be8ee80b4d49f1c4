use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("No barcode found in image")]
    NotFound,

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Codec error: {message}")]
    Codec { message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ScanError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn codec(message: impl Into<String>) -> Self {
        ScanError::Codec {
            message: message.into(),
        }
    }

    /// True for the "nothing to decode here" case, as opposed to bad input or
    /// a symbol that was located but could not be read.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScanError::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
