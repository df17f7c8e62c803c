//! Error types for IM3 encoding and decoding.

use thiserror::Error;

/// Result type alias for IM3 operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("incorrect identifier, got {0:?}")]
    InvalidIdentifier([u8; 2]),

    #[error("file is shorter than its header declares")]
    Truncated,

    #[error("data found past the end of a segment or the file")]
    TrailingData,

    #[error("invalid image dimensions {width}×{height}, must be a multiple of 8 between 8 and 2040")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("output image is {actual:?}, but the file holds a {expected:?} image")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("AC segment of plane {plane} is {len} bytes, which does not fit in the header")]
    SegmentTooLarge { plane: char, len: usize },

    #[error("invalid code length table: {0}")]
    InvalidCodeLengths(String),

    #[error("bitstream ended in the middle of a symbol")]
    BitstreamExhausted,

    #[error("no code in the table matches the bitstream")]
    InvalidCode,

    #[error("malformed coefficient stream: {0}")]
    MalformedCoefficients(String),

    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::Io(err),
        }
    }
}
