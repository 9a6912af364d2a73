//! PDF to Word - extract the text layer of a PDF into a .docx file

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::PdfToWordArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(PdfToWordArgs::parse()).await
}
