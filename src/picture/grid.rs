//! Cut an image into an evenly sized grid of tiles.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use super::{default_output_dir, open_image};
use crate::error::{Result, ToolError};
use crate::report::Report;

/// Pixel rectangle of one tile: `(left, top, width, height)`.
pub type TileRect = (u32, u32, u32, u32);

/// Tile rectangles in row-major order. Pixels that do not divide evenly
/// are dropped from the right and bottom edges.
pub fn tile_rects(width: u32, height: u32, rows: u32, cols: u32) -> Result<Vec<(u32, u32, TileRect)>> {
    if rows == 0 || cols == 0 {
        return Err(ToolError::InvalidInput("rows and columns must be at least 1".to_string()));
    }
    let tile_w = width / cols;
    let tile_h = height / rows;
    if tile_w == 0 || tile_h == 0 {
        return Err(ToolError::InvalidInput(format!(
            "a {width}x{height} image is too small for a {rows}x{cols} grid"
        )));
    }

    let mut rects = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            rects.push((row, col, (col * tile_w, row * tile_h, tile_w, tile_h)));
        }
    }
    Ok(rects)
}

/// Split `input` into `rows` x `cols` PNG tiles under
/// `{output_dir}/{stem}_split/`.
pub fn split_grid(input: &Path, output_dir: Option<&Path>, rows: u32, cols: u32) -> Result<Report> {
    let image = open_image(input)?;
    let rects = tile_rects(image.width(), image.height(), rows, cols)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .to_string();
    let base = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(input));
    let save_dir = base.join(format!("{stem}_split"));
    fs::create_dir_all(&save_dir)?;

    let written: Vec<PathBuf> = rects
        .par_iter()
        .map(|&(row, col, (x, y, w, h))| -> Result<PathBuf> {
            let path = save_dir.join(format!("{stem}_tile_{row}_{col}.png"));
            image.crop_imm(x, y, w, h).save(&path)?;
            Ok(path)
        })
        .collect::<Result<_>>()?;

    info!("Split {} into {} tiles in {}", input.display(), written.len(), save_dir.display());
    let mut report = Report::new("image-grid");
    for path in &written {
        report.push_output(path);
    }
    Ok(report.with_summary(format!(
        "split into {} tiles in {}",
        written.len(),
        save_dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn remainder_pixels_are_dropped() {
        let rects = tile_rects(10, 7, 3, 3).unwrap();
        assert_eq!(rects.len(), 9);
        assert_eq!(rects[0], (0, 0, (0, 0, 3, 2)));
        assert_eq!(rects[8], (2, 2, (6, 4, 3, 2)));
    }

    #[test]
    fn too_small_image_is_rejected() {
        assert!(tile_rects(2, 9, 3, 3).is_err());
        assert!(tile_rects(9, 9, 0, 3).is_err());
    }

    #[test]
    fn writes_named_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cat.png");
        let mut img = RgbImage::new(9, 6);
        img.put_pixel(8, 5, Rgb([255, 0, 0]));
        img.save(&input).unwrap();

        let report = split_grid(&input, None, 2, 3).unwrap();
        assert_eq!(report.outputs.len(), 6);
        let corner = dir.path().join("cat_split").join("cat_tile_1_2.png");
        assert!(report.outputs.contains(&corner));

        let tile = image::open(&corner).unwrap().to_rgb8();
        assert_eq!(tile.dimensions(), (3, 3));
        assert_eq!(tile.get_pixel(2, 2).0, [255, 0, 0]);
    }
}
