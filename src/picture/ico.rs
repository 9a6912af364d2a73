//! Turn an image into a Windows icon.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::imageops::FilterType;
use image::ExtendedColorType;
use tracing::info;

use super::{check_overwrite, open_image};
use crate::error::{Result, ToolError};
use crate::report::Report;

pub const PRESET_SIZES: [u32; 5] = [16, 32, 48, 64, 128];
pub const MIN_SIDE: u32 = 16;
pub const MAX_SIDE: u32 = 256;

/// One icon frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct IconSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for IconSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for IconSize {
    type Err = String;

    /// Accepts `32` (square) or `48x32`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (w, h) = match s.split_once('x') {
            Some((w, h)) => (w.trim(), h.trim()),
            None => (s.as_str(), s.as_str()),
        };
        let parse = |v: &str| {
            v.parse::<u32>()
                .map_err(|_| format!("'{s}' is not a size like 32 or 48x48"))
        };
        let size = IconSize {
            width: parse(w)?,
            height: parse(h)?,
        };
        let valid = MIN_SIDE..=MAX_SIDE;
        if !valid.contains(&size.width) || !valid.contains(&size.height) {
            return Err(format!(
                "icon sides must be between {MIN_SIDE} and {MAX_SIDE} pixels, got {size}"
            ));
        }
        Ok(size)
    }
}

/// Default output path: the input with an `.ico` extension.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("ico")
}

/// Write an icon with one frame per requested size.
pub fn image_to_ico(input: &Path, output: &Path, sizes: &[IconSize], overwrite: bool) -> Result<Report> {
    if sizes.is_empty() {
        return Err(ToolError::InvalidInput("at least one icon size is required".to_string()));
    }
    check_overwrite(output, overwrite)?;
    let source = open_image(input)?;

    let mut unique: Vec<IconSize> = Vec::with_capacity(sizes.len());
    for size in sizes {
        if !unique.contains(size) {
            unique.push(*size);
        }
    }

    let mut frames = Vec::with_capacity(unique.len());
    for size in &unique {
        let resized = source
            .resize_exact(size.width, size.height, FilterType::Lanczos3)
            .to_rgba8();
        frames.push(IcoFrame::as_png(
            resized.as_raw(),
            size.width,
            size.height,
            ExtendedColorType::Rgba8,
        )?);
    }

    let writer = BufWriter::new(File::create(output)?);
    IcoEncoder::new(writer).encode_images(&frames)?;

    let listed: Vec<String> = unique.iter().map(IconSize::to_string).collect();
    info!("Wrote {} with sizes {}", output.display(), listed.join(", "));

    let mut report = Report::new("image-to-ico");
    report.push_output(output);
    Ok(report.with_summary(format!("icon with {} frame(s): {}", frames.len(), listed.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn parses_square_and_custom_sizes() {
        assert_eq!("32".parse::<IconSize>().unwrap(), IconSize { width: 32, height: 32 });
        assert_eq!("64X48".parse::<IconSize>().unwrap(), IconSize { width: 64, height: 48 });
        assert!("8".parse::<IconSize>().is_err());
        assert!("300x32".parse::<IconSize>().is_err());
        assert!("big".parse::<IconSize>().is_err());
    }

    #[test]
    fn writes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("logo.png");
        RgbaImage::from_pixel(100, 80, Rgba([0, 0, 255, 255])).save(&input).unwrap();
        let output = default_output(&input);

        let sizes = [
            IconSize { width: 16, height: 16 },
            IconSize { width: 256, height: 256 },
            IconSize { width: 16, height: 16 },
        ];
        let report = image_to_ico(&input, &output, &sizes, false).unwrap();
        assert_eq!(report.summary, "icon with 2 frame(s): 16x16, 256x256");

        // The decoder picks the largest frame.
        let icon = image::open(&output).unwrap();
        assert_eq!((icon.width(), icon.height()), (256, 256));
    }
}
