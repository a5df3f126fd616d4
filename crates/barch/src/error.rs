//! Errors of the BARCH codec and its raster collaborators

use std::{collections::TryReserveError, fmt, io};

use thiserror::Error;

/// Structural problems with an encoded stream or a source image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FormatError {
    /// Less than the 8 header bytes
    #[error("Header too short ({0} of 8 bytes)")]
    HeaderTooShort(usize),
    /// Width or height is negative
    #[error("Negative dimension {width}x{height}")]
    NegativeDimension {
        /// Width as stored in the header
        width: i32,
        /// Height as stored in the header
        height: i32,
    },
    /// Width or height does not fit the 32-bit header
    #[error("Dimension {width}x{height} does not fit the header")]
    DimensionTooLarge {
        /// Width of the raster
        width: usize,
        /// Height of the raster
        height: usize,
    },
    /// `width * height` does not fit in memory at all
    #[error("Image too large ({width}x{height})")]
    ImageTooLarge {
        /// Width of the raster
        width: usize,
        /// Height of the raster
        height: usize,
    },
    /// The row index has fewer bytes than the height requires
    #[error("Row index truncated (expected {expected} bytes, found {actual})")]
    RowIndexTruncated {
        /// `ceil(height / 8)`
        expected: usize,
        /// Bytes left after the header
        actual: usize,
    },
    /// The payload ran out of bits
    #[error("Unexpected end of stream")]
    UnexpectedEndOfStream,
    /// A pixel buffer does not match the dimensions
    #[error("Expected {expected} pixels, got {actual}")]
    PixelCountMismatch {
        /// `width * height`
        expected: usize,
        /// Length of the buffer
        actual: usize,
    },
    /// The source bitmap could not be read
    #[error("Invalid bitmap: {0}")]
    Bitmap(String),
}

/// An error of the codec
#[derive(Debug, Error)]
pub enum BarchError {
    /// The input is not a valid stream or image
    #[error("Invalid format: {0}")]
    InvalidFormat(#[from] FormatError),
    /// Allocation of a buffer failed
    #[error("Out of memory")]
    OutOfMemory(#[from] TryReserveError),
    /// File access failed
    #[error("Failed IO")]
    Io(#[from] io::Error),
    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Type alias for convenience
pub type BarchResult<T> = Result<T, BarchError>;

/// The coarse classification of a [`BarchError`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`BarchError::InvalidFormat`]
    InvalidFormat,
    /// See [`BarchError::OutOfMemory`]
    OutOfMemory,
    /// See [`BarchError::Io`]
    Io,
    /// See [`BarchError::Other`]
    Other,
}

impl ErrorKind {
    /// A message to show to a user
    pub fn describe(self) -> &'static str {
        match self {
            Self::InvalidFormat => "Invalid input file format",
            Self::OutOfMemory => "Out of memory, close some applications and try again",
            Self::Io => "Disk I/O error, check the disk and try again",
            Self::Other => "An unknown error occurred",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl BarchError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::OutOfMemory(_) => ErrorKind::OutOfMemory,
            Self::Io(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}
