use barch::{BarchResult, ImageCodec, Raster};
use color_eyre::eyre::{self, eyre};
use log::info;

use super::{convert::load_raster, files::FileKind, opt::CheckOpts};

/// Sizes observed while checking an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub raw_len: usize,
    pub encoded_len: usize,
    pub lossless: bool,
}

/// Encode and decode a raster, comparing the result with the input
pub fn check_raster<C: ImageCodec + ?Sized>(codec: &C, raster: &Raster) -> BarchResult<CheckReport> {
    let encoded = codec.encode(raster)?;
    let decoded = codec.decode(&encoded)?;
    Ok(CheckReport {
        raw_len: raster.pixels().len(),
        encoded_len: encoded.len(),
        lossless: &decoded == raster,
    })
}

pub fn run<C: ImageCodec + ?Sized>(codec: &C, opt: CheckOpts) -> eyre::Result<()> {
    let kind = match FileKind::of(&opt.file) {
        Some(FileKind::Barch) | None => {
            return Err(eyre!("Expected a BMP or PNG image, got `{}`", opt.file.display()))
        }
        Some(kind) => kind,
    };
    let raster = load_raster(&opt.file, kind).map_err(|e| eyre!("{}: {}", e.kind(), e))?;
    let report = check_raster(codec, &raster).map_err(|e| eyre!("{}: {}", e.kind(), e))?;

    info!(
        "{}x{}: {} bytes -> {} bytes ({:.2}:1)",
        raster.width(),
        raster.height(),
        report.raw_len,
        report.encoded_len,
        report.raw_len as f64 / report.encoded_len as f64
    );
    if !report.lossless {
        return Err(eyre!("Decoded image differs from `{}`", opt.file.display()));
    }
    info!("Round trip OK");
    Ok(())
}
