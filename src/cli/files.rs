use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

/// The kinds of files the tool works with
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// `*.bmp`
    Bitmap,
    /// `*.png`
    Png,
    /// `*.barch`
    Barch,
}

impl FileKind {
    /// Classify a path by its extension (case insensitive)
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "bmp" => Some(Self::Bitmap),
            "png" => Some(Self::Png),
            "barch" => Some(Self::Barch),
            _ => None,
        }
    }
}

/// An image file in a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// All image files directly inside `dir`, sorted by name
pub fn list_images(dir: &Path) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        let path = entry.path();
        if !meta.is_file() || FileKind::of(&path).is_none() {
            continue;
        }
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            size: meta.len(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Format a file size with two decimals, e.g. `1.50 KB`
pub fn human_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// `dir/name.suffix`, where `dir` defaults to the folder of `input`
pub fn output_path(input: &Path, out: Option<&Path>, suffix: &str) -> PathBuf {
    let mut name = input.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    match out {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}
