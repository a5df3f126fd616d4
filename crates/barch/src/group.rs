//! # Group codes
//!
//! Every stored row is cut into groups of up to [`GROUP_SIZE`] pixels. The
//! last group of a row is narrower when the width is not a multiple of four;
//! encoder and decoder both derive that from the row width.
//!
//! | Group     | Code                          |
//! |-----------|-------------------------------|
//! | all white | `0`                           |
//! | all black | `10`                          |
//! | mixed     | `11` + 8 bits for every pixel |

use crate::{
    bits::{BitReader, BitWriter},
    error::FormatError,
    raster::{BLACK, WHITE},
};

/// Number of pixels in a full group
pub const GROUP_SIZE: usize = 4;

/// The code of a single group
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Group<'a> {
    /// Every pixel is `0xFF`
    AllWhite,
    /// Every pixel is `0x00`
    AllBlack,
    /// Anything else, stored verbatim
    Mixed(&'a [u8]),
}

impl<'a> Group<'a> {
    /// Pick the shortest code for the given pixels
    pub fn classify(pixels: &'a [u8]) -> Self {
        if pixels.iter().all(|&p| p == WHITE) {
            Group::AllWhite
        } else if pixels.iter().all(|&p| p == BLACK) {
            Group::AllBlack
        } else {
            Group::Mixed(pixels)
        }
    }

    /// Number of bits this group occupies in the payload
    pub fn bit_len(&self) -> usize {
        match self {
            Group::AllWhite => 1,
            Group::AllBlack => 2,
            Group::Mixed(pixels) => 2 + 8 * pixels.len(),
        }
    }

    /// Append the code to the writer
    pub fn encode(&self, writer: &mut BitWriter) {
        match self {
            Group::AllWhite => writer.write_bit(false),
            Group::AllBlack => writer.write_bits(0b10, 2),
            Group::Mixed(pixels) => {
                writer.write_bits(0b11, 2);
                for &pixel in pixels.iter() {
                    writer.write_bits(u32::from(pixel), 8);
                }
            }
        }
    }
}

/// Encode all groups of a row, left to right
pub fn encode_row(row: &[u8], writer: &mut BitWriter) {
    for chunk in row.chunks(GROUP_SIZE) {
        Group::classify(chunk).encode(writer);
    }
}

/// Decode a single group into `out`, which is as wide as the group
pub fn decode_group(reader: &mut BitReader, out: &mut [u8]) -> Result<(), FormatError> {
    if !reader.read_bit()? {
        out.fill(WHITE);
    } else if !reader.read_bit()? {
        out.fill(BLACK);
    } else {
        for pixel in out.iter_mut() {
            *pixel = reader.read_bits(8)? as u8;
        }
    }
    Ok(())
}

/// Decode all groups of a row, left to right
pub fn decode_row(reader: &mut BitReader, row: &mut [u8]) -> Result<(), FormatError> {
    for chunk in row.chunks_mut(GROUP_SIZE) {
        decode_group(reader, chunk)?;
    }
    Ok(())
}
