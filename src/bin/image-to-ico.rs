//! Image to ICO - build a Windows icon with one frame per size
//!
//! ```bash
//! image-to-ico logo.png -s 16,32,48,256
//! image-to-ico logo.png -s 64x48 -o app.ico --overwrite
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::ImageToIcoArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(ImageToIcoArgs::parse()).await
}
