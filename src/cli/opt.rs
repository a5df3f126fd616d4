use std::{fmt, path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};

/// The format decoded images are written in
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    /// Windows Bitmap, 8 bits per pixel
    Bmp,
    /// Portable Network Graphic, 8-bit grayscale
    Png,
}

#[derive(Debug)]
/// Failed to parse a format name
pub struct FormatError {}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Use one of `bmp` or `png`")?;
        Ok(())
    }
}

impl std::error::Error for FormatError {}

impl Default for Format {
    fn default() -> Self {
        Format::Bmp
    }
}

impl FromStr for Format {
    type Err = FormatError;
    fn from_str(val: &str) -> Result<Self, Self::Err> {
        match val {
            "bmp" | "bitmap" => Ok(Self::Bmp),
            "png" => Ok(Self::Png),
            _ => Err(FormatError {}),
        }
    }
}

impl Format {
    /// The file extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Parser)]
/// Compress grayscale images into BARCH files and back
pub struct Options {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the images in a folder
    List(ListOpts),
    /// Compress images (*.bmp, *.png) and restore BARCH files (*.barch)
    Convert(ConvertOpts),
    /// Describe a BARCH file
    Info(InfoOpts),
    /// Compress an image in memory and verify it decodes to the same pixels
    Check(CheckOpts),
}

#[derive(Parser)]
pub struct ListOpts {
    /// The folder to look into
    #[clap(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Parser)]
pub struct ConvertOpts {
    /// Files or folders to process
    #[clap(required = true)]
    pub files: Vec<PathBuf>,
    /// Where to store the output (defaults to next to the input)
    #[clap(long, short = 'o')]
    pub out: Option<PathBuf>,
    /// Format of decoded images. Valid choices are "bmp" and "png"
    #[clap(default_value_t, long, short = 'f')]
    pub format: Format,
    /// How many files to process at the same time
    #[clap(long, short = 'j', default_value = "3")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct InfoOpts {
    /// A BARCH file
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct CheckOpts {
    /// A BMP or PNG image
    pub file: PathBuf,
}
