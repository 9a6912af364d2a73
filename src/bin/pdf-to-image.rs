//! PDF to Image - render pages with `pdftoppm` (poppler-utils)
//!
//! Images are written to `{output-dir}/{stem}_images/{stem}_page_{n}.{ext}`.
//! Set `SANYUAN_PDFTOPPM` when pdftoppm is not on PATH.
//!
//! ```bash
//! pdf-to-image slides.pdf --dpi 300 -f jpg --quality 90 -p 1-5
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::PdfToImageArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(PdfToImageArgs::parse()).await
}
