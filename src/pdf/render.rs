//! Render PDF pages to raster images with `pdftoppm`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use super::ranges::parse_page_ranges;
use super::{load_document, output_stem};
use crate::error::{Result, ToolError};
use crate::external::ExternalProgram;
use crate::report::Report;

/// Output formats for rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize)]
pub enum RenderFormat {
    #[default]
    Png,
    Jpg,
    Tiff,
    Bmp,
}

impl RenderFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RenderFormat::Png => "png",
            RenderFormat::Jpg => "jpg",
            RenderFormat::Tiff => "tiff",
            RenderFormat::Bmp => "bmp",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub dpi: u32,
    pub format: RenderFormat,
    /// JPEG quality, 1..=100
    pub quality: u8,
    /// Page selection; `None` renders every page
    pub pages: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            format: RenderFormat::Png,
            quality: 90,
            pages: None,
        }
    }
}

/// Path of the image written for `page`.
pub fn page_image_path(output_dir: &Path, stem: &str, page: u32, format: RenderFormat) -> PathBuf {
    output_dir
        .join(format!("{stem}_images"))
        .join(format!("{stem}_page_{page}.{}", format.extension()))
}

pub(crate) fn save_rendered(image: &DynamicImage, path: &Path, format: RenderFormat, quality: u8) -> Result<()> {
    match format {
        RenderFormat::Jpg => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
            image.to_rgb8().write_with_encoder(encoder)?;
        }
        RenderFormat::Png => image.save_with_format(path, ImageFormat::Png)?,
        RenderFormat::Tiff => image.save_with_format(path, ImageFormat::Tiff)?,
        RenderFormat::Bmp => image.save_with_format(path, ImageFormat::Bmp)?,
    }
    Ok(())
}

/// Render the selected pages of `input` into `{output_dir}/{stem}_images/`.
pub async fn render_pdf(
    renderer: &ExternalProgram,
    input: &Path,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<Report> {
    if options.dpi == 0 {
        return Err(ToolError::InvalidInput("dpi must be greater than 0".to_string()));
    }
    let doc = load_document(input)?;
    let total = doc.get_pages().len() as u32;
    let pages = match &options.pages {
        Some(spec) => parse_page_ranges(spec, total)?,
        None => (1..=total).collect(),
    };
    drop(doc);

    renderer.ensure_available("-v").await?;

    let stem = output_stem(input);
    fs::create_dir_all(output_dir.join(format!("{stem}_images")))?;
    let scratch = tempfile::tempdir()?;
    let mut report = Report::new("pdf-to-image");

    info!("Rendering {} pages of {} at {} dpi", pages.len(), input.display(), options.dpi);
    for page in &pages {
        let prefix = scratch.path().join(format!("page{page}"));
        let number = page.to_string();
        let args: Vec<OsString> = vec![
            "-png".into(),
            "-singlefile".into(),
            "-r".into(),
            options.dpi.to_string().into(),
            "-f".into(),
            (&number).into(),
            "-l".into(),
            (&number).into(),
            input.into(),
            (&prefix).into(),
        ];
        renderer.run(args).await?;

        let rendered = prefix.with_extension("png");
        let image = image::open(&rendered)?;
        let target = page_image_path(output_dir, &stem, *page, options.format);
        save_rendered(&image, &target, options.format, options.quality)?;
        debug!("Page {} -> {}", page, target.display());
        report.push_output(&target);
    }

    Ok(report.with_summary(format!(
        "rendered {} pages to {}",
        pages.len(),
        output_dir.join(format!("{stem}_images")).display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn page_images_live_in_stem_folder() {
        let path = page_image_path(Path::new("/out"), "report", 3, RenderFormat::Jpg);
        assert_eq!(path, PathBuf::from("/out/report_images/report_page_3.jpg"));
    }

    #[test]
    fn jpeg_output_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 100])));
        let path = dir.path().join("p.jpg");
        save_rendered(&image, &path, RenderFormat::Jpg, 80).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[tokio::test]
    async fn zero_dpi_is_rejected() {
        let options = RenderOptions {
            dpi: 0,
            ..Default::default()
        };
        let renderer = ExternalProgram::new("pdftoppm");
        let err = render_pdf(&renderer, Path::new("x.pdf"), Path::new("."), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
