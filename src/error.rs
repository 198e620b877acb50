//! Error types for unquiz.
//!
//! Only decoding and output failures are errors. Extraction misses inside the
//! question pipeline are reported as [`Notice`](crate::model::Notice)s.

use std::io;
use thiserror::Error;

/// Result type alias for unquiz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an extraction run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input or writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we do not recognize.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF container could not be parsed.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// An embedded image could not be re-encoded as PNG.
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Serializing the question list or report failed.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error originates from reading the input document.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageEncode(err.to_string())
    }
}
