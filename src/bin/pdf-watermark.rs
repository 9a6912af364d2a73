//! PDF Watermark - stamp a semi-transparent text on every page
//!
//! # Usage
//!
//! ```bash
//! pdf-watermark contract.pdf -t CONFIDENTIAL
//! pdf-watermark contract.pdf -t DRAFT --position bottom-right --font-size 24 --opacity 0.5
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::PdfWatermarkArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(PdfWatermarkArgs::parse()).await
}
