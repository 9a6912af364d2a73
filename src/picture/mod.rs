//! Image tools built on the `image` crate.

pub mod combine;
pub mod convert;
pub mod grid;
pub mod ico;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::{Result, ToolError};

/// Extensions accepted as conversion sources. `psd` is listed so that it is
/// picked up in batches and reported, but it cannot be decoded.
pub const INPUT_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "webp", "bmp", "gif", "tiff", "psd"];

/// Formats images can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize)]
pub enum TargetFormat {
    Jpg,
    Jpeg,
    Png,
    Webp,
    Bmp,
    Gif,
    Tiff,
}

impl TargetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Jpg => "jpg",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Png => "png",
            TargetFormat::Webp => "webp",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Gif => "gif",
            TargetFormat::Tiff => "tiff",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" => Some(TargetFormat::Jpg),
            "jpeg" => Some(TargetFormat::Jpeg),
            "png" => Some(TargetFormat::Png),
            "webp" => Some(TargetFormat::Webp),
            "bmp" => Some(TargetFormat::Bmp),
            "gif" => Some(TargetFormat::Gif),
            "tif" | "tiff" => Some(TargetFormat::Tiff),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            TargetFormat::Jpg | TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Webp => ImageFormat::WebP,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::Gif => ImageFormat::Gif,
            TargetFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// zlib level for a 1..=100 quality: 100 gives 0, 1 gives 9.
pub fn png_compression_level(quality: u8) -> u8 {
    let quality = quality.clamp(1, 100) as f32;
    9 - (quality / 11.11) as u8
}

fn png_compression(quality: u8) -> CompressionType {
    match png_compression_level(quality) {
        level if level >= 7 => CompressionType::Best,
        level if level <= 2 => CompressionType::Fast,
        _ => CompressionType::Default,
    }
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Decode an image, sniffing the format from its content.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    if !path.is_file() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    if has_extension(path, &["psd"]) {
        return Err(ToolError::UnsupportedFormat(format!(
            "{} (Photoshop documents cannot be decoded)",
            path.display()
        )));
    }
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Encode `image` to `path`. Quality (1..=100) applies to JPEG directly and
/// to PNG as a compression level; the other encoders have no quality knob.
pub fn save_image(image: &DynamicImage, path: &Path, format: TargetFormat, quality: u8) -> Result<()> {
    let quality = quality.clamp(1, 100);
    match format {
        TargetFormat::Jpg | TargetFormat::Jpeg => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            image.to_rgb8().write_with_encoder(encoder)?;
        }
        TargetFormat::Png => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder = PngEncoder::new_with_quality(writer, png_compression(quality), FilterType::Adaptive);
            image.write_with_encoder(encoder)?;
        }
        other => {
            // The remaining encoders only take 8-bit RGB(A).
            let normalized = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            normalized.save_with_format(path, other.image_format())?;
        }
    }
    Ok(())
}

/// Refuse to replace an existing file unless asked to.
pub fn check_overwrite(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(ToolError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// Directory the outputs of `input` go to when none is given.
pub fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn quality_maps_to_png_levels() {
        assert_eq!(png_compression_level(100), 0);
        assert_eq!(png_compression_level(1), 9);
        assert_eq!(png_compression_level(50), 5);
        assert_eq!(png_compression(10), CompressionType::Best);
        assert_eq!(png_compression(90), CompressionType::Fast);
        assert_eq!(png_compression(50), CompressionType::Default);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(TargetFormat::from_path(Path::new("a.JPG")), Some(TargetFormat::Jpg));
        assert_eq!(TargetFormat::from_path(Path::new("a.tif")), Some(TargetFormat::Tiff));
        assert_eq!(TargetFormat::from_path(Path::new("a.psd")), None);
    }

    #[test]
    fn psd_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let psd = dir.path().join("layered.psd");
        std::fs::write(&psd, b"8BPS").unwrap();
        assert!(matches!(open_image(&psd), Err(ToolError::UnsupportedFormat(_))));
    }

    #[test]
    fn every_target_format_can_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 200])));
        for format in [
            TargetFormat::Jpg,
            TargetFormat::Png,
            TargetFormat::Webp,
            TargetFormat::Bmp,
            TargetFormat::Gif,
            TargetFormat::Tiff,
        ] {
            let path = dir.path().join(format!("out.{}", format.extension()));
            save_image(&image, &path, format, 80).unwrap();
            let decoded = open_image(&path).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (3, 2), "{format:?}");
        }
    }

    #[test]
    fn existing_output_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.png");
        std::fs::write(&file, b"").unwrap();
        assert!(check_overwrite(&file, false).is_err());
        assert!(check_overwrite(&file, true).is_ok());
    }
}
