//! Convert images between formats, one file or a whole folder.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{INPUT_EXTENSIONS, TargetFormat, check_overwrite, default_output_dir, has_extension, open_image, save_image};
use crate::error::{Result, ToolError};
use crate::report::Report;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub format: TargetFormat,
    /// 1..=100, values outside are clamped
    pub quality: u8,
    /// Where converted files go; defaults to the input's folder
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: TargetFormat::Png,
            quality: 100,
            output_dir: None,
            overwrite: false,
        }
    }
}

/// `{output_dir}/{stem}.{ext}`
pub fn converted_path(input: &Path, output_dir: &Path, format: TargetFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    output_dir.join(format!("{stem}.{}", format.extension()))
}

/// Convert one image into `output_dir`.
pub fn convert_image(input: &Path, output_dir: &Path, options: &ConvertOptions) -> Result<PathBuf> {
    let target = converted_path(input, output_dir, options.format);
    if target == input {
        return Err(ToolError::InvalidInput(format!(
            "{} is already a .{} file in the output folder",
            input.display(),
            options.format.extension()
        )));
    }
    check_overwrite(&target, options.overwrite)?;

    let image = open_image(input)?;
    save_image(&image, &target, options.format, options.quality)?;
    debug!("{} -> {}", input.display(), target.display());
    Ok(target)
}

/// Image files directly inside `dir`, sorted by name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, &INPUT_EXTENSIONS))
        .collect();
    files.sort();
    Ok(files)
}

/// Convert `input`, which may be a single image or a folder of images.
///
/// In folder mode a failing file is recorded and the batch continues.
pub fn convert_path(input: &Path, options: &ConvertOptions) -> Result<Report> {
    let mut report = Report::new("image-convert");

    if input.is_file() {
        let output_dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(input));
        fs::create_dir_all(&output_dir)?;
        let target = convert_image(input, &output_dir, options)?;
        report.push_output(&target);
        return Ok(report.with_summary(format!("converted {}", input.display())));
    }
    if !input.is_dir() {
        return Err(ToolError::MissingInput(input.to_path_buf()));
    }

    let output_dir = options.output_dir.clone().unwrap_or_else(|| input.to_path_buf());
    fs::create_dir_all(&output_dir)?;
    let files = list_images(input)?;
    if files.is_empty() {
        return Err(ToolError::InvalidInput(format!(
            "no convertible images in {}",
            input.display()
        )));
    }

    info!("Converting {} images to {}", files.len(), options.format.extension());
    let results: Vec<(PathBuf, Result<PathBuf>)> = files
        .par_iter()
        .map(|file| (file.clone(), convert_image(file, &output_dir, options)))
        .collect();

    for (file, result) in results {
        match result {
            Ok(target) => report.push_output(&target),
            Err(e) => {
                warn!("Failed to convert {}: {}", file.display(), e);
                report.push_failure(&file, &e);
            }
        }
    }

    let summary = format!(
        "converted {} of {} images ({} failed)",
        report.outputs.len(),
        files.len(),
        report.failures.len()
    );
    Ok(report.with_summary(summary))
}
