//! Image Convert - change the format of an image or a folder of images
//!
//! # Features
//!
//! - jpg, jpeg, png, webp, bmp, gif and tiff output
//! - Quality 1-100: JPEG quality, or PNG compression (higher quality, less compression)
//! - Folders are converted in parallel; one bad file does not stop the batch
//! - Existing files are kept unless `--overwrite` is given
//!
//! # Usage
//!
//! ```bash
//! image-convert photo.png -f jpg --quality 85
//! image-convert screenshots/ -f webp -o converted/
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::ImageConvertArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(ImageConvertArgs::parse()).await
}
