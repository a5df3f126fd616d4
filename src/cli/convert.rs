use std::{
    fs,
    path::{Path, PathBuf},
};

use barch::{
    bmp::{read_bmp, write_bmp},
    BarchError, BarchResult, FormatError, ImageCodec, Raster,
};
use color_eyre::eyre::{self, eyre, WrapErr};
use image::{ColorType, ImageError, ImageFormat};
use log::{error, info, warn};
use rayon::prelude::*;

use super::{
    files::{list_images, output_path, FileKind},
    opt::{ConvertOpts, Format},
};

fn image_error(err: ImageError) -> BarchError {
    match err {
        ImageError::IoError(e) => BarchError::Io(e),
        ImageError::Limits(e) => BarchError::Other(e.to_string()),
        e => FormatError::Bitmap(e.to_string()).into(),
    }
}

/// Read a BMP or PNG file into a raster
pub fn load_raster(path: &Path, kind: FileKind) -> BarchResult<Raster> {
    let bytes = fs::read(path)?;
    match kind {
        FileKind::Bitmap => read_bmp(&bytes),
        FileKind::Png => {
            let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                .map_err(image_error)?;
            if image.color() != ColorType::L8 {
                warn!(
                    "'{}' is {:?}, converting to 8-bit grayscale",
                    path.display(),
                    image.color()
                );
            }
            Raster::from_image(image.into_luma8())
        }
        FileKind::Barch => Err(BarchError::Other(format!(
            "'{}' is already a BARCH file",
            path.display()
        ))),
    }
}

/// Write a raster as a BMP or PNG file
pub fn save_raster(raster: &Raster, path: &Path, format: Format) -> BarchResult<()> {
    match format {
        Format::Bmp => fs::write(path, write_bmp(raster)?)?,
        Format::Png => raster
            .to_image()?
            .save_with_format(path, ImageFormat::Png)
            .map_err(image_error)?,
    }
    Ok(())
}

/// Compress one image file, returns the path of the BARCH file
pub fn encode_file<C: ImageCodec + ?Sized>(
    codec: &C,
    path: &Path,
    kind: FileKind,
    out: Option<&Path>,
) -> BarchResult<PathBuf> {
    let raster = load_raster(path, kind)?;
    let encoded = codec.encode(&raster)?;
    drop(raster);
    let out_path = output_path(path, out, ".packed.barch");
    fs::write(&out_path, encoded)?;
    Ok(out_path)
}

/// Restore one BARCH file, returns the path of the image
pub fn decode_file<C: ImageCodec + ?Sized>(
    codec: &C,
    path: &Path,
    out: Option<&Path>,
    format: Format,
) -> BarchResult<PathBuf> {
    let bytes = fs::read(path)?;
    let raster = codec.decode(&bytes)?;
    let out_path = output_path(path, out, &format!(".unpacked.{}", format.extension()));
    save_raster(&raster, &out_path, format)?;
    Ok(out_path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Convert a single file, picking the direction from its extension
pub fn process_file<C: ImageCodec + ?Sized>(
    codec: &C,
    path: &Path,
    opt: &ConvertOpts,
) -> BarchResult<PathBuf> {
    let out = opt.out.as_deref();
    match FileKind::of(path) {
        Some(FileKind::Barch) => {
            info!("{}: Decoding...", path.display());
            let out_path = decode_file(codec, path, out, opt.format)?;
            info!("{}: Decoded! {}", path.display(), file_name(&out_path));
            Ok(out_path)
        }
        Some(kind) => {
            info!("{}: Encoding...", path.display());
            let out_path = encode_file(codec, path, kind, out)?;
            info!("{}: Encoded! {}", path.display(), file_name(&out_path));
            Ok(out_path)
        }
        None => Err(BarchError::Other("Unknown file type".to_string())),
    }
}

/// Replace folders with the image files inside them
fn expand(paths: &[PathBuf]) -> eyre::Result<Vec<PathBuf>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_dir() {
            let entries = list_images(path)
                .wrap_err_with(|| format!("Failed to list folder `{}`", path.display()))?;
            files.extend(entries.into_iter().map(|e| e.path));
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Convert all given files in a small pool of worker threads
pub fn run<C: ImageCodec + Sync + ?Sized>(codec: &C, opt: ConvertOpts) -> eyre::Result<()> {
    let files = expand(&opt.files)?;
    if files.is_empty() {
        info!("Nothing to do");
        return Ok(());
    }
    if let Some(out) = &opt.out {
        fs::create_dir_all(out)
            .wrap_err_with(|| format!("Failed to create output folder `{}`", out.display()))?;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opt.jobs.max(1))
        .build()?;
    let results: Vec<(&PathBuf, BarchResult<PathBuf>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| (path, process_file(codec, path, &opt)))
            .collect()
    });

    let mut failed = 0;
    for (path, result) in &results {
        if let Err(e) = result {
            failed += 1;
            error!("{}: {} ({})", path.display(), e.kind(), e);
        }
    }
    if failed > 0 {
        return Err(eyre!("{} of {} files failed", failed, results.len()));
    }
    Ok(())
}
