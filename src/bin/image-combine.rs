//! Image Combine - compose several images on one white canvas
//!
//! # Layouts
//!
//! - `uniform`: grid of equal cells
//! - `horizontal` / `vertical`: a single strip
//! - `random`: scattered without overlap; images that do not fit are left out
//!
//! # Usage
//!
//! ```bash
//! image-combine a.jpg b.jpg c.jpg d.jpg -o collage.jpg
//!
//! # Three random collages of 4 out of the inputs, reproducible
//! image-combine photos/*.png -o mix.png -l random --pick 4 --count 3 --seed 7
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::ImageCombineArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(ImageCombineArgs::parse()).await
}
