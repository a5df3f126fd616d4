//! # 8-bit grayscale Windows bitmaps
//!
//! Reading supports uncompressed 8-bit `BM` files stored bottom-up (positive
//! height) or top-down (negative height). Writing always produces a bottom-up
//! file with a 256 entry gray palette.

use std::convert::TryFrom;

use log::warn;
use nom::{
    bytes::complete::{tag, take},
    number::complete::{le_i32, le_u16, le_u32},
    IResult,
};

use crate::{
    error::{BarchResult, FormatError},
    raster::{pixel_count, Raster},
};

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const PALETTE_LEN: u32 = 256 * 4;
/// 300 dpi
const PELS_PER_METER: i32 = 11811;

#[derive(Debug)]
#[allow(dead_code)] // format definition
struct FileHeader {
    size: u32,
    reserved1: u16,
    reserved2: u16,
    /// start of the pixel data
    offset: u32,
}

#[derive(Debug)]
#[allow(dead_code)] // format definition
struct InfoHeader {
    size: u32,
    width: i32,
    /// negative for top-down bitmaps
    height: i32,
    planes: u16,
    bit_count: u16,
    compression: u32,
    size_image: u32,
    x_pels_per_meter: i32,
    y_pels_per_meter: i32,
    clr_used: u32,
    clr_important: u32,
}

fn parse_file_header(input: &[u8]) -> IResult<&[u8], FileHeader> {
    let (input, _) = tag(&b"BM"[..])(input)?;
    let (input, size) = le_u32(input)?;
    let (input, reserved1) = le_u16(input)?;
    let (input, reserved2) = le_u16(input)?;
    let (input, offset) = le_u32(input)?;
    let header = FileHeader {
        size,
        reserved1,
        reserved2,
        offset,
    };
    Ok((input, header))
}

fn parse_info_header(input: &[u8]) -> IResult<&[u8], InfoHeader> {
    let (input, size) = le_u32(input)?;
    let (input, width) = le_i32(input)?;
    let (input, height) = le_i32(input)?;
    let (input, planes) = le_u16(input)?;
    let (input, bit_count) = le_u16(input)?;
    let (input, compression) = le_u32(input)?;
    let (input, size_image) = le_u32(input)?;
    let (input, x_pels_per_meter) = le_i32(input)?;
    let (input, y_pels_per_meter) = le_i32(input)?;
    let (input, clr_used) = le_u32(input)?;
    let (input, clr_important) = le_u32(input)?;
    let header = InfoHeader {
        size,
        width,
        height,
        planes,
        bit_count,
        compression,
        size_image,
        x_pels_per_meter,
        y_pels_per_meter,
        clr_used,
        clr_important,
    };
    Ok((input, header))
}

/// Read a palette of `count` BGRX entries
fn parse_palette(input: &[u8], count: usize) -> IResult<&[u8], &[u8]> {
    take(count * 4)(input)
}

fn is_gray_ramp(palette: &[u8]) -> bool {
    palette
        .chunks_exact(4)
        .enumerate()
        .all(|(i, bgrx)| bgrx[..3].iter().all(|&c| usize::from(c) == i))
}

fn bitmap_error(msg: impl Into<String>) -> FormatError {
    FormatError::Bitmap(msg.into())
}

type NomErr<'a> = nom::Err<nom::error::Error<&'a [u8]>>;

fn nom_error<'a>(
    file: &'a [u8],
    what: &'static str,
) -> impl FnOnce(NomErr<'a>) -> FormatError + 'a {
    move |err| match err {
        nom::Err::Incomplete(_) => bitmap_error(format!("{} truncated", what)),
        nom::Err::Error(e) | nom::Err::Failure(e) => bitmap_error(format!(
            "{} failed ({:?} at offset {})",
            what,
            e.code,
            file.len() - e.input.len()
        )),
    }
}

/// Row size in bytes, including the padding to a multiple of 4
fn stride(width: usize) -> usize {
    (width + 3) & !3
}

/// Parse an uncompressed 8-bit bitmap file into a raster, top row first
pub fn read_bmp(input: &[u8]) -> BarchResult<Raster> {
    let (rest, file_header) = parse_file_header(input).map_err(nom_error(input, "File header"))?;
    let (rest, info) = parse_info_header(rest).map_err(nom_error(input, "Info header"))?;

    if info.bit_count != 8 {
        let msg = format!("Expected 8 bits per pixel, found {}", info.bit_count);
        return Err(bitmap_error(msg).into());
    }
    if info.compression != 0 {
        let msg = format!("Unsupported compression {}", info.compression);
        return Err(bitmap_error(msg).into());
    }
    let width = usize::try_from(info.width)
        .map_err(|_| bitmap_error(format!("Negative width {}", info.width)))?;
    let top_down = info.height < 0;
    let height = info.height.unsigned_abs() as usize;

    // the palette follows the (possibly extended) info header
    let extra = (info.size.saturating_sub(INFO_HEADER_LEN)) as usize;
    let palette_count = match info.clr_used {
        0 => 256,
        n => n.min(256) as usize,
    };
    let palette = rest
        .get(extra..)
        .and_then(|rest| parse_palette(rest, palette_count).ok())
        .map(|(_, palette)| palette);
    match palette {
        Some(palette) if !is_gray_ramp(palette) => {
            warn!("Palette is not a gray ramp, keeping the indices as intensities")
        }
        Some(_) => {}
        None => warn!("Bitmap palette is missing or truncated"),
    }

    let stride = stride(width);
    let len = pixel_count(width, height)?;
    let data = input
        .get(file_header.offset as usize..)
        .ok_or_else(|| bitmap_error("Pixel data offset out of bounds"))?;
    if height > 0 {
        // the last row does not need its padding
        let needed = stride
            .checked_mul(height - 1)
            .and_then(|n| n.checked_add(width))
            .ok_or_else(|| bitmap_error("Pixel data size overflow"))?;
        if data.len() < needed {
            return Err(bitmap_error(format!(
                "Pixel data truncated ({} of {} bytes)",
                data.len(),
                needed
            ))
            .into());
        }
    }

    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len)?;
    for y in 0..height {
        let src_row = if top_down { y } else { height - 1 - y };
        let start = src_row * stride;
        pixels.extend_from_slice(&data[start..start + width]);
    }
    Raster::new(width, height, pixels)
}

/// Serialize a raster as a bottom-up 8-bit bitmap file with a gray palette
pub fn write_bmp(raster: &Raster) -> BarchResult<Vec<u8>> {
    let (width, height) = (raster.width(), raster.height());
    let too_large = || FormatError::DimensionTooLarge { width, height };
    let stride = stride(width);
    let image_len = stride
        .checked_mul(height)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(too_large)?;
    let w = i32::try_from(width).map_err(|_| too_large())?;
    let h = i32::try_from(height).map_err(|_| too_large())?;
    let offset = FILE_HEADER_LEN + INFO_HEADER_LEN + PALETTE_LEN;
    let file_len = offset.checked_add(image_len).ok_or_else(too_large)?;

    let mut out = Vec::new();
    out.try_reserve_exact(file_len as usize)?;

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_len.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&INFO_HEADER_LEN.to_le_bytes());
    out.extend_from_slice(&w.to_le_bytes());
    out.extend_from_slice(&h.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&8u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&image_len.to_le_bytes());
    out.extend_from_slice(&PELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&PELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&256u32.to_le_bytes());
    out.extend_from_slice(&256u32.to_le_bytes());

    for i in 0..=255u8 {
        out.extend_from_slice(&[i, i, i, 0]);
    }

    let padding = [0u8; 3];
    for y in (0..height).rev() {
        out.extend_from_slice(raster.row(y));
        out.extend_from_slice(&padding[..stride - width]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{read_bmp, write_bmp};
    use crate::{
        error::{BarchError, FormatError},
        raster::Raster,
    };

    /// A minimal bitmap with a 2-entry palette
    fn handmade(width: i32, height: i32, rows: &[&[u8]]) -> Vec<u8> {
        let stride = ((width + 3) & !3) as usize;
        let offset = 14 + 40 + 8;
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&[0; 16]);
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 0, 1, 1, 1, 0]);
        for row in rows {
            out.extend_from_slice(row);
            out.resize(out.len() + stride - row.len(), 0xEE);
        }
        out
    }

    #[test]
    fn test_bottom_up() {
        let bytes = handmade(5, 2, &[&[6, 7, 8, 9, 10], &[1, 2, 3, 4, 5]]);
        let raster = read_bmp(&bytes).unwrap();
        assert_eq!(raster.width(), 5);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.pixels(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_top_down() {
        let bytes = handmade(3, -2, &[&[1, 2, 3], &[4, 5, 6]]);
        let raster = read_bmp(&bytes).unwrap();
        assert_eq!(raster.pixels(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_write_read() {
        let pixels: Vec<u8> = (0..35u8).map(|i| i * 7).collect();
        let raster = Raster::new(7, 5, pixels).unwrap();
        let bytes = write_bmp(&raster).unwrap();
        assert_eq!(bytes.len(), 14 + 40 + 1024 + 8 * 5);
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(read_bmp(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_empty() {
        let raster = Raster::new(0, 0, vec![]).unwrap();
        let bytes = write_bmp(&raster).unwrap();
        assert_eq!(read_bmp(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_wrong_magic() {
        let mut bytes = handmade(1, 1, &[&[0]]);
        bytes[0] = b'X';
        let err = read_bmp(&bytes).unwrap_err();
        assert!(matches!(
            err,
            BarchError::InvalidFormat(FormatError::Bitmap(_))
        ));
    }

    #[test]
    fn test_wrong_depth() {
        let mut bytes = handmade(1, 1, &[&[0]]);
        bytes[28] = 24;
        let err = read_bmp(&bytes).unwrap_err();
        assert!(matches!(
            err,
            BarchError::InvalidFormat(FormatError::Bitmap(msg)) if msg.contains("24")
        ));
    }

    #[test]
    fn test_truncated_pixels() {
        let mut bytes = handmade(4, 2, &[&[1, 2, 3, 4], &[5, 6, 7, 8]]);
        bytes.truncate(bytes.len() - 1);
        assert!(read_bmp(&bytes).is_err());
    }
}
