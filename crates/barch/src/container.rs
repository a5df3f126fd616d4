//! # The BARCH container
//!
//! ```text
//! offset 0     : i32 width  (little endian)
//! offset 4     : i32 height (little endian)
//! offset 8     : ceil(height / 8) bytes row index
//! offset 8 + N : MSB-first payload, group codes of all stored rows
//! ```

use std::convert::TryFrom;

use log::{debug, warn};

use crate::{
    bits::{BitReader, BitWriter},
    error::{BarchResult, FormatError},
    group::{decode_row, encode_row},
    raster::{Raster, WHITE},
    rows::{index_len, RowIndex},
};

/// Size of the width/height header
pub const HEADER_LEN: usize = 8;

fn parse_header(input: &[u8]) -> BarchResult<(usize, usize)> {
    let header = input
        .get(..HEADER_LEN)
        .ok_or(FormatError::HeaderTooShort(input.len()))?;
    let width = i32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let height = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    match (usize::try_from(width), usize::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(FormatError::NegativeDimension { width, height }.into()),
    }
}

fn write_header(out: &mut Vec<u8>, width: usize, height: usize) -> BarchResult<()> {
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => {
            out.extend_from_slice(&w.to_le_bytes());
            out.extend_from_slice(&h.to_le_bytes());
            Ok(())
        }
        _ => Err(FormatError::DimensionTooLarge { width, height }.into()),
    }
}

/// Encode a raster into a BARCH stream
pub fn encode(raster: &Raster) -> BarchResult<Vec<u8>> {
    let (width, height) = (raster.width(), raster.height());
    let index = RowIndex::classify(raster);
    let index_bytes = index.to_bytes();

    let mut writer = BitWriter::new();
    for (y, row) in raster.rows().enumerate() {
        if index.is_present(y) {
            encode_row(row, &mut writer);
        }
    }
    let payload = writer.done();

    let mut out = Vec::new();
    out.try_reserve_exact(HEADER_LEN + index_bytes.len() + payload.len())?;
    write_header(&mut out, width, height)?;
    out.extend_from_slice(&index_bytes);
    out.extend_from_slice(&payload);

    debug!(
        "Encoded {}x{} raster, {} of {} rows stored, {} payload bytes",
        width,
        height,
        index.present_count(),
        height,
        payload.len()
    );
    Ok(out)
}

/// Decode a BARCH stream into a raster
pub fn decode(input: &[u8]) -> BarchResult<Raster> {
    let (width, height) = parse_header(input)?;
    let rest = &input[HEADER_LEN..];

    let index = RowIndex::from_bytes(rest, height)?;
    let payload = &rest[index_len(height)..];

    // fail before allocating if the payload cannot possibly cover the stored rows
    let groups_per_row = width / 4 + (width % 4).min(1);
    let min_bits = index.present_count().saturating_mul(groups_per_row);
    if payload.len().saturating_mul(8) < min_bits {
        return Err(FormatError::UnexpectedEndOfStream.into());
    }

    let mut raster = Raster::filled(width, height, WHITE)?;
    let mut reader = BitReader::new(payload);
    for (y, present) in index.iter().enumerate() {
        if present {
            decode_row(&mut reader, raster.row_mut(y))?;
        }
    }

    let unused = reader.remaining_bytes();
    if !unused.is_empty() {
        warn!("Ignoring {} bytes after the payload", unused.len());
    }
    Ok(raster)
}

/// Summary of a BARCH stream, without decoding the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Width of the image
    pub width: usize,
    /// Height of the image
    pub height: usize,
    /// Rows that are stored in the payload
    pub present_rows: usize,
    /// Bytes of the row index
    pub index_len: usize,
    /// Bytes of the payload
    pub payload_len: usize,
}

impl ContainerInfo {
    /// Read the header and row index of a stream
    pub fn parse(input: &[u8]) -> BarchResult<Self> {
        let (width, height) = parse_header(input)?;
        let rest = &input[HEADER_LEN..];
        let index = RowIndex::from_bytes(rest, height)?;
        let index_len = index_len(height);
        Ok(Self {
            width,
            height,
            present_rows: index.present_count(),
            index_len,
            payload_len: rest.len() - index_len,
        })
    }

    /// Size of the whole stream
    pub fn total_len(&self) -> usize {
        HEADER_LEN + self.index_len + self.payload_len
    }

    /// Size of the raw raster divided by the stream size
    pub fn ratio(&self) -> f64 {
        self.width as f64 * self.height as f64 / self.total_len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, ContainerInfo, HEADER_LEN};
    use crate::{
        error::{BarchError, FormatError},
        raster::Raster,
    };

    #[test]
    fn test_header_little_endian() {
        let raster = Raster::filled(0x0102, 3, 255).unwrap();
        let bytes = encode(&raster).unwrap();
        assert_eq!(&bytes[..HEADER_LEN], &[0x02, 0x01, 0, 0, 3, 0, 0, 0]);
        assert_eq!(bytes.len(), HEADER_LEN + 1);
    }

    #[test]
    fn test_all_white() {
        let raster = Raster::filled(13, 17, 255).unwrap();
        let bytes = encode(&raster).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 3);
        assert!(bytes[HEADER_LEN..].iter().all(|&b| b == 0));
        assert_eq!(decode(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_all_black() {
        let raster = Raster::filled(8, 3, 0).unwrap();
        let bytes = encode(&raster).unwrap();
        // 3 rows * 2 groups * `10`
        assert_eq!(&bytes[HEADER_LEN..], &[0b111, 0b10101010, 0b10100000]);
        assert_eq!(decode(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_skipped_rows() {
        #[rustfmt::skip]
        let raster = Raster::new(5, 3, vec![
            255, 255, 255, 255, 255,
            255, 255, 0,   255, 9,
            255, 255, 255, 255, 255,
        ]).unwrap();
        let bytes = encode(&raster).unwrap();
        assert_eq!(bytes[HEADER_LEN], 0b010);
        assert_eq!(decode(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_header_too_short() {
        let err = decode(&[1, 0, 0, 0, 1, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            BarchError::InvalidFormat(FormatError::HeaderTooShort(7))
        ));
    }

    #[test]
    fn test_negative_dimension() {
        let err = decode(&[0xFF, 0xFF, 0xFF, 0xFF, 1, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            BarchError::InvalidFormat(FormatError::NegativeDimension {
                width: -1,
                height: 1
            })
        ));
    }

    #[test]
    fn test_huge_header_small_payload() {
        // claims 2^31-1 x 8 with every row present, but carries only 4 payload bytes
        let mut bytes = vec![0xFF, 0xFF, 0xFF, 0x7F, 8, 0, 0, 0, 0xFF];
        bytes.extend_from_slice(&[0; 4]);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            BarchError::InvalidFormat(FormatError::UnexpectedEndOfStream)
        ));
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let raster = Raster::new(2, 1, vec![0, 0]).unwrap();
        let mut bytes = encode(&raster).unwrap();
        bytes.push(0xAA);
        assert_eq!(decode(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_info() {
        let raster = Raster::new(4, 2, vec![255, 255, 255, 255, 0, 0, 0, 1]).unwrap();
        let bytes = encode(&raster).unwrap();
        let info = ContainerInfo::parse(&bytes).unwrap();
        assert_eq!(info.width, 4);
        assert_eq!(info.height, 2);
        assert_eq!(info.present_rows, 1);
        assert_eq!(info.index_len, 1);
        assert_eq!(info.payload_len, 5);
        assert_eq!(info.total_len(), bytes.len());
    }
}
