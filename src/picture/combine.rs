//! Compose several images onto one canvas.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, info, warn};

use super::{TargetFormat, open_image, save_image};
use crate::error::{Result, ToolError};
use crate::report::Report;

/// Inputs larger than this in total are downscaled before composing.
pub const LARGE_INPUT_BYTES: u64 = 10 * 1024 * 1024;
/// Pixel budget per image after downscaling.
pub const MAX_PIXELS: u64 = 1024 * 1024;
const PLACEMENT_ATTEMPTS: usize = 100;
const JPEG_QUALITY: u8 = 95;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize)]
pub enum Layout {
    /// Grid of equal cells, as square as possible
    #[default]
    Uniform,
    /// Side by side
    Horizontal,
    /// Stacked top to bottom
    Vertical,
    /// Scattered without overlap on a square canvas
    Random,
}

/// Where each image goes on a canvas of `width` x `height`. Images with no
/// position could not be placed and are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub width: u32,
    pub height: u32,
    pub positions: Vec<Option<(u32, u32)>>,
}

#[derive(Debug, Clone)]
pub struct CombineOptions {
    pub layout: Layout,
    /// Use a random subset of this many images
    pub pick: Option<usize>,
    /// Number of variants to export
    pub count: u32,
    pub seed: Option<u64>,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Uniform,
            pick: None,
            count: 1,
            seed: None,
        }
    }
}

fn overlaps(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32)) -> bool {
    !(a.2 <= b.0 || a.0 >= b.2 || a.3 <= b.1 || a.1 >= b.3)
}

/// Lay out images of the given sizes.
pub fn plan(sizes: &[(u32, u32)], layout: Layout, rng: &mut fastrand::Rng) -> Plan {
    let n = sizes.len() as u32;
    let max_w = sizes.iter().map(|s| s.0).max().unwrap_or(0);
    let max_h = sizes.iter().map(|s| s.1).max().unwrap_or(0);

    match layout {
        Layout::Uniform => {
            let cols = (n as f64).sqrt().ceil().max(1.0) as u32;
            let rows = n.div_ceil(cols);
            let positions = (0..n)
                .map(|i| Some(((i % cols) * max_w, (i / cols) * max_h)))
                .collect();
            Plan {
                width: cols * max_w,
                height: rows * max_h,
                positions,
            }
        }
        Layout::Horizontal => {
            let mut x = 0;
            let positions = sizes
                .iter()
                .map(|&(w, _)| {
                    let at = Some((x, 0));
                    x += w;
                    at
                })
                .collect();
            Plan {
                width: x,
                height: max_h,
                positions,
            }
        }
        Layout::Vertical => {
            let mut y = 0;
            let positions = sizes
                .iter()
                .map(|&(_, h)| {
                    let at = Some((0, y));
                    y += h;
                    at
                })
                .collect();
            Plan {
                width: max_w,
                height: y,
                positions,
            }
        }
        Layout::Random => {
            let area: u64 = sizes.iter().map(|&(w, h)| w as u64 * h as u64).sum();
            let side = ((area as f64).sqrt() * 1.5) as u32;
            let mut placed: Vec<(u32, u32, u32, u32)> = Vec::new();
            let positions = sizes
                .iter()
                .map(|&(w, h)| {
                    if w > side || h > side {
                        return None;
                    }
                    for _ in 0..PLACEMENT_ATTEMPTS {
                        let x = rng.u32(0..=side - w);
                        let y = rng.u32(0..=side - h);
                        let rect = (x, y, x + w, y + h);
                        if !placed.iter().any(|other| overlaps(rect, *other)) {
                            placed.push(rect);
                            return Some((x, y));
                        }
                    }
                    None
                })
                .collect();
            Plan {
                width: side,
                height: side,
                positions,
            }
        }
    }
}

/// Size that keeps the aspect ratio and fits in `MAX_PIXELS`.
pub fn fit_pixels(width: u32, height: u32) -> (u32, u32) {
    let pixels = width as u64 * height as u64;
    if pixels <= MAX_PIXELS {
        return (width, height);
    }
    let ratio = (MAX_PIXELS as f64 / pixels as f64).sqrt();
    (
        ((width as f64 * ratio) as u32).max(1),
        ((height as f64 * ratio) as u32).max(1),
    )
}

/// Paint the images on a white canvas following `plan`.
pub fn compose(images: &[RgbImage], plan: &Plan) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(plan.width.max(1), plan.height.max(1), BACKGROUND);
    for (image, position) in images.iter().zip(&plan.positions) {
        if let Some((x, y)) = position {
            imageops::replace(&mut canvas, image, *x as i64, *y as i64);
        }
    }
    canvas
}

/// `{base}_{index}{ext}` for multi-variant exports.
pub fn variant_path(output: &Path, index: u32) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("combined");
    let name = match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{index}.{ext}"),
        None => format!("{stem}_{index}"),
    };
    output.with_file_name(name)
}

fn select(count: usize, pick: Option<usize>, rng: &mut fastrand::Rng) -> Vec<usize> {
    match pick {
        Some(k) if k > 0 && k < count => {
            let mut all: Vec<usize> = (0..count).collect();
            rng.shuffle(&mut all);
            all.truncate(k);
            all
        }
        Some(k) if k >= count => {
            warn!("--pick {} is not smaller than the {} inputs, using all of them", k, count);
            (0..count).collect()
        }
        _ => (0..count).collect(),
    }
}

/// Combine `inputs` into `output` (or several numbered variants of it).
pub fn combine_images(inputs: &[PathBuf], output: &Path, options: &CombineOptions) -> Result<Report> {
    if inputs.is_empty() {
        return Err(ToolError::InvalidInput("no images given".to_string()));
    }
    if options.count == 0 {
        return Err(ToolError::InvalidInput("export count must be at least 1".to_string()));
    }
    let format = TargetFormat::from_path(output).ok_or_else(|| {
        ToolError::UnsupportedFormat(format!("cannot tell the image format of {}", output.display()))
    })?;

    let mut sources: Vec<(DynamicImage, u64)> = Vec::with_capacity(inputs.len());
    for path in inputs {
        let bytes = fs::metadata(path)
            .map_err(|_| ToolError::MissingInput(path.clone()))?
            .len();
        sources.push((open_image(path)?, bytes));
    }

    let mut rng = match options.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut report = Report::new("image-combine");
    let mut dropped = 0usize;
    for variant in 1..=options.count {
        let chosen = select(sources.len(), options.pick, &mut rng);
        let total_bytes: u64 = chosen.iter().map(|&i| sources[i].1).sum();
        let shrink = total_bytes > LARGE_INPUT_BYTES;
        if shrink {
            debug!("Inputs total {} bytes, downscaling", total_bytes);
        }

        let images: Vec<RgbImage> = chosen
            .iter()
            .map(|&i| {
                let image = &sources[i].0;
                let (w, h) = if shrink {
                    fit_pixels(image.width(), image.height())
                } else {
                    (image.width(), image.height())
                };
                if (w, h) == (image.width(), image.height()) {
                    image.to_rgb8()
                } else {
                    image.resize_exact(w, h, FilterType::Lanczos3).to_rgb8()
                }
            })
            .collect();

        let sizes: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
        let plan = plan(&sizes, options.layout, &mut rng);
        dropped += plan.positions.iter().filter(|p| p.is_none()).count();
        let canvas = compose(&images, &plan);

        let target = if options.count > 1 {
            variant_path(output, variant)
        } else {
            output.to_path_buf()
        };
        let quality = if matches!(format, TargetFormat::Jpg | TargetFormat::Jpeg) {
            JPEG_QUALITY
        } else {
            100
        };
        save_image(&DynamicImage::ImageRgb8(canvas), &target, format, quality)?;
        info!("Wrote {} ({}x{})", target.display(), plan.width, plan.height);
        report.push_output(&target);
    }

    if dropped > 0 {
        warn!("{} image placements did not fit on the random canvas and were left out", dropped);
    }
    let summary = format!(
        "combined {} images into {} file(s)",
        options.pick.filter(|&k| k > 0 && k < inputs.len()).unwrap_or(inputs.len()),
        report.outputs.len()
    );
    Ok(report.with_summary(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_uses_largest_cell() {
        let mut rng = fastrand::Rng::with_seed(1);
        let plan = plan(&[(10, 10), (20, 5), (5, 5)], Layout::Uniform, &mut rng);
        assert_eq!((plan.width, plan.height), (40, 20));
        assert_eq!(plan.positions, vec![Some((0, 0)), Some((20, 0)), Some((0, 10))]);
    }

    #[test]
    fn strips_add_up_sizes() {
        let mut rng = fastrand::Rng::with_seed(1);
        let h = plan(&[(10, 4), (6, 9)], Layout::Horizontal, &mut rng);
        assert_eq!((h.width, h.height), (16, 9));
        assert_eq!(h.positions[1], Some((10, 0)));

        let v = plan(&[(10, 4), (6, 9)], Layout::Vertical, &mut rng);
        assert_eq!((v.width, v.height), (10, 13));
        assert_eq!(v.positions[1], Some((0, 4)));
    }

    #[test]
    fn random_layout_never_overlaps() {
        let sizes = vec![(30, 20); 8];
        let mut rng = fastrand::Rng::with_seed(42);
        let plan = plan(&sizes, Layout::Random, &mut rng);
        assert_eq!(plan.width, ((8.0f64 * 600.0).sqrt() * 1.5) as u32);

        let rects: Vec<_> = plan
            .positions
            .iter()
            .flatten()
            .map(|&(x, y)| (x, y, x + 30, y + 20))
            .collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.2 <= plan.width && a.3 <= plan.height);
            for b in &rects[i + 1..] {
                assert!(!overlaps(*a, *b));
            }
        }
    }

    #[test]
    fn oversized_image_is_left_out() {
        let mut rng = fastrand::Rng::with_seed(7);
        let plan = plan(&[(1000, 1), (1, 1)], Layout::Random, &mut rng);
        assert_eq!(plan.positions[0], None);
        assert!(plan.positions[1].is_some());
    }

    #[test]
    fn downscale_keeps_aspect() {
        assert_eq!(fit_pixels(800, 600), (800, 600));
        let (w, h) = fit_pixels(4000, 2000);
        assert!(w as u64 * h as u64 <= MAX_PIXELS);
        assert_eq!(w / h, 2);
    }

    #[test]
    fn variants_are_numbered() {
        assert_eq!(variant_path(Path::new("/t/out.jpg"), 3), PathBuf::from("/t/out_3.jpg"));
    }

    #[test]
    fn picks_a_subset() {
        let mut rng = fastrand::Rng::with_seed(3);
        let chosen = select(5, Some(2), &mut rng);
        assert_eq!(chosen.len(), 2);
        assert_ne!(chosen[0], chosen[1]);
        assert_eq!(select(3, Some(9), &mut rng), vec![0, 1, 2]);
        assert_eq!(select(3, Some(0), &mut rng), vec![0, 1, 2]);
    }

    #[test]
    fn writes_numbered_variants() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])).save(&a).unwrap();
        RgbImage::from_pixel(2, 6, Rgb([0, 0, 255])).save(&b).unwrap();

        let options = CombineOptions {
            layout: Layout::Horizontal,
            count: 2,
            seed: Some(9),
            ..Default::default()
        };
        let output = dir.path().join("sheet.png");
        let report = combine_images(&[a, b], &output, &options).unwrap();
        assert_eq!(report.outputs, vec![dir.path().join("sheet_1.png"), dir.path().join("sheet_2.png")]);

        let sheet = image::open(&report.outputs[0]).unwrap().to_rgb8();
        assert_eq!(sheet.dimensions(), (6, 6));
        assert_eq!(sheet.get_pixel(0, 5).0, [255, 255, 255]);
        assert_eq!(sheet.get_pixel(5, 5).0, [0, 0, 255]);
    }
}
