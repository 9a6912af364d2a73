//! Image Grid - cut an image into rows x cols tiles (a 3x3 grid by default)

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::ImageGridArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(ImageGridArgs::parse()).await
}
