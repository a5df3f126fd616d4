//! # In-memory grayscale raster

use std::fmt;

use crate::error::{BarchResult, FormatError};

/// A white pixel
pub const WHITE: u8 = 0xFF;
/// A black pixel
pub const BLACK: u8 = 0x00;

/// An 8-bit grayscale image, stored row-major with one byte per pixel
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Create a raster from a pixel buffer
    ///
    /// Fails if the buffer does not hold exactly `width * height` pixels.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> BarchResult<Self> {
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(FormatError::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a raster where every pixel has the same value
    pub fn filled(width: usize, height: usize, value: u8) -> BarchResult<Self> {
        let len = pixel_count(width, height)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len)?;
        pixels.resize(len, value);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixels of row `y`
    ///
    /// Panics if `y >= height`
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    /// Iterate over all rows from top to bottom
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        let width = self.width;
        (0..self.height).map(move |y| &self.pixels[y * width..(y + 1) * width])
    }

    /// Return the underlying buffer
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// `width * height`, or an error if that overflows
pub(crate) fn pixel_count(width: usize, height: usize) -> BarchResult<usize> {
    width
        .checked_mul(height)
        .ok_or_else(|| FormatError::ImageTooLarge { width, height }.into())
}

#[cfg(feature = "image")]
mod bridge {
    use std::convert::TryFrom;

    use image::GrayImage;

    use super::Raster;
    use crate::error::{BarchError, BarchResult};

    impl Raster {
        /// Take over the buffer of a [`GrayImage`]
        pub fn from_image(image: GrayImage) -> BarchResult<Self> {
            let (width, height) = image.dimensions();
            Raster::new(width as usize, height as usize, image.into_raw())
        }

        /// Copy into a [`GrayImage`]
        pub fn to_image(&self) -> BarchResult<GrayImage> {
            let width = u32::try_from(self.width)
                .map_err(|_| BarchError::Other(format!("Width {} too large", self.width)))?;
            let height = u32::try_from(self.height)
                .map_err(|_| BarchError::Other(format!("Height {} too large", self.height)))?;
            GrayImage::from_raw(width, height, self.pixels.clone())
                .ok_or_else(|| BarchError::Other("Pixel buffer does not fit image".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Raster, WHITE};
    use crate::error::{BarchError, FormatError};

    #[test]
    fn test_new_checks_length() {
        let err = Raster::new(3, 2, vec![0; 5]).unwrap_err();
        assert!(matches!(
            err,
            BarchError::InvalidFormat(FormatError::PixelCountMismatch {
                expected: 6,
                actual: 5
            })
        ));
        assert!(Raster::new(0, 0, vec![]).is_ok());
        assert!(Raster::new(0, 7, vec![]).is_ok());
    }

    #[test]
    fn test_rows() {
        let raster = Raster::new(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(raster.row(1), &[4, 5, 6]);
        let rows: Vec<&[u8]> = raster.rows().collect();
        assert_eq!(rows, vec![&[1, 2, 3][..], &[4, 5, 6][..]]);
    }

    #[test]
    fn test_filled() {
        let raster = Raster::filled(4, 3, WHITE).unwrap();
        assert_eq!(raster.pixels().len(), 12);
        assert!(raster.pixels().iter().all(|&p| p == WHITE));
    }

    #[test]
    fn test_too_large() {
        let err = Raster::filled(usize::MAX, 2, 0).unwrap_err();
        assert!(matches!(
            err,
            BarchError::InvalidFormat(FormatError::ImageTooLarge { .. })
        ));
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_image_bridge() {
        let raster = Raster::new(2, 2, vec![0, 64, 128, 255]).unwrap();
        let image = raster.to_image().unwrap();
        assert_eq!(image.get_pixel(1, 0).0, [64]);
        assert_eq!(Raster::from_image(image).unwrap(), raster);
    }
}
