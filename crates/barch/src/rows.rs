//! # Row presence bitmap
//!
//! Rows that are entirely white are not stored in the payload at all.
//! The row index records one bit per row, least significant bit first
//! within each byte, `1` meaning "this row is stored".

use crate::{
    error::{BarchResult, FormatError},
    raster::{Raster, WHITE},
};

/// Whether row `y` has at least one pixel that is not white
pub fn is_row_present(raster: &Raster, y: usize) -> bool {
    !raster.row(y).iter().all(|&p| p == WHITE)
}

/// Number of bytes needed for the index of `height` rows
pub fn index_len(height: usize) -> usize {
    height / 8 + (height % 8).min(1)
}

/// One bit per row, `true` if the row is stored in the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIndex {
    present: Vec<bool>,
}

impl RowIndex {
    /// Classify every row of the raster
    pub fn classify(raster: &Raster) -> Self {
        let present = (0..raster.height())
            .map(|y| is_row_present(raster, y))
            .collect();
        Self { present }
    }

    /// Read the index for `height` rows from the start of `bytes`
    pub fn from_bytes(bytes: &[u8], height: usize) -> BarchResult<Self> {
        let expected = index_len(height);
        let bytes = bytes.get(..expected).ok_or(FormatError::RowIndexTruncated {
            expected,
            actual: bytes.len(),
        })?;
        let present = (0..height)
            .map(|i| bytes[i / 8] & (1 << (i % 8)) != 0)
            .collect();
        Ok(Self { present })
    }

    /// Serialize the index, `ceil(height / 8)` bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; index_len(self.present.len())];
        for (i, present) in self.present.iter().enumerate() {
            if *present {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        bytes
    }

    /// Number of rows covered
    pub fn len(&self) -> usize {
        self.present.len()
    }

    /// Whether the index covers no rows
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Whether row `y` is stored in the payload
    pub fn is_present(&self, y: usize) -> bool {
        self.present[y]
    }

    /// Number of rows stored in the payload
    pub fn present_count(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }

    /// Iterate over the rows, top to bottom
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.present.iter().copied()
    }
}
