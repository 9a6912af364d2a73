//! Image to PDF - one page per image, page size equal to the image size
//!
//! ```bash
//! image-to-pdf scan1.jpg scan2.png -o scans.pdf
//! image-to-pdf scans/ -o scans.pdf
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::ImageToPdfArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(ImageToPdfArgs::parse()).await
}
