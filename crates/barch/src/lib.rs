#![warn(missing_docs)]
//! # BARCH grayscale image codec
//!
//! A lossless format for 8-bit grayscale images that consist mostly of white
//! paper and black ink. Rows that are entirely white are dropped, every other
//! row is cut into groups of four pixels which are stored as
//! "all white" (1 bit), "all black" (2 bits) or verbatim (2 + 8 bits per pixel).
//!
//! ```
//! use barch::{ImageCodec, Barch, Raster};
//!
//! let raster = Raster::new(4, 2, vec![255, 255, 255, 255, 0, 0, 0, 0])?;
//! let bytes = Barch.encode(&raster)?;
//! assert_eq!(Barch.decode(&bytes)?, raster);
//! # Ok::<(), barch::BarchError>(())
//! ```

pub mod bits;
pub mod bmp;
mod container;
mod error;
pub mod group;
mod raster;
pub mod rows;

pub use container::{ContainerInfo, HEADER_LEN};
pub use error::{BarchError, BarchResult, ErrorKind, FormatError};
pub use raster::{Raster, BLACK, WHITE};

/// Something that turns rasters into bytes and back
pub trait ImageCodec {
    /// Compress a raster
    fn encode(&self, raster: &Raster) -> BarchResult<Vec<u8>>;
    /// Restore a raster
    fn decode(&self, bytes: &[u8]) -> BarchResult<Raster>;
}

/// The BARCH codec
///
/// This holds no state, every call works on its own buffers.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Barch;

impl ImageCodec for Barch {
    fn encode(&self, raster: &Raster) -> BarchResult<Vec<u8>> {
        container::encode(raster)
    }

    fn decode(&self, bytes: &[u8]) -> BarchResult<Raster> {
        container::decode(bytes)
    }
}

/// Encode a raster with [`Barch`]
pub fn encode(raster: &Raster) -> BarchResult<Vec<u8>> {
    Barch.encode(raster)
}

/// Decode a stream with [`Barch`]
pub fn decode(bytes: &[u8]) -> BarchResult<Raster> {
    Barch.decode(bytes)
}
