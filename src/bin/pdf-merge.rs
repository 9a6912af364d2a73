//! PDF Merge - join pages of several PDFs
//!
//! Inputs are merged in the order given. Append `:pages` to an input to take
//! only some of its pages.
//!
//! ```bash
//! pdf-merge cover.pdf body.pdf:2-10 appendix.pdf:1,3 -o book.pdf
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::PdfMergeArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(PdfMergeArgs::parse()).await
}
