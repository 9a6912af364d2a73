//! PDF Split - cut a PDF into smaller files
//!
//! # Usage
//!
//! ```bash
//! # One file per page, next to the input
//! pdf-split report.pdf
//!
//! # Ten pages per file into parts/
//! pdf-split report.pdf -n 10 -o parts
//!
//! # Pages 1-3 and 7 only: writes report_range_1-3.pdf and report_range_7-7.pdf
//! pdf-split report.pdf -r "1-3,7"
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::PdfSplitArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(PdfSplitArgs::parse()).await
}
