//! Sanyuan - launcher for the Sanyuan Toolbox
//!
//! This is the main entry point when running `cargo run`. It lists the tools
//! in the toolbox and runs any of them in-process with the same arguments
//! its standalone binary takes.
//!
//! ```bash
//! # Which tools are installed?
//! sanyuan list
//!
//! # Run a tool through the launcher
//! sanyuan rmb-upper 1234.56
//! sanyuan dir-tree . --max-depth 2
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

use sanyuan_toolbox::catalog::{availability, render_listing};
use sanyuan_toolbox::cli::{
    AudioExtractArgs, DirTreeArgs, EmptyDirsArgs, ImageCombineArgs, ImageConvertArgs, ImageGridArgs,
    ImageToIcoArgs, ImageToPdfArgs, PdfMergeArgs, PdfSplitArgs, PdfToImageArgs, PdfToWordArgs,
    PdfWatermarkArgs, RmbUpperArgs, UnitConvertArgs,
};
use sanyuan_toolbox::run_tool;

#[derive(Parser)]
#[command(name = "sanyuan")]
#[command(about = "Launcher for the Sanyuan Toolbox")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the tools and whether their binaries are installed
    List {
        #[arg(long, help = "Print the catalog as JSON")]
        json: bool,
    },
    /// Split a PDF every N pages or extract page ranges
    PdfSplit(PdfSplitArgs),
    /// Merge selected pages of several PDFs into one
    PdfMerge(PdfMergeArgs),
    /// Add a text watermark to every page of a PDF
    PdfWatermark(PdfWatermarkArgs),
    /// Render PDF pages to image files
    PdfToImage(PdfToImageArgs),
    /// Convert the text of a PDF into a .docx document
    PdfToWord(PdfToWordArgs),
    /// Put images into a PDF, one per page
    ImageToPdf(ImageToPdfArgs),
    /// Convert images between formats
    ImageConvert(ImageConvertArgs),
    /// Create a Windows .ico icon
    ImageToIco(ImageToIcoArgs),
    /// Cut an image into a grid of tiles
    ImageGrid(ImageGridArgs),
    /// Compose several images on one canvas
    ImageCombine(ImageCombineArgs),
    /// Extract the audio track of a video
    AudioExtract(AudioExtractArgs),
    /// Convert between length units
    UnitConvert(UnitConvertArgs),
    /// Write an amount as upper-case Chinese currency text
    RmbUpper(RmbUpperArgs),
    /// Print a directory tree
    DirTree(DirTreeArgs),
    /// Remove empty folders
    EmptyDirs(EmptyDirsArgs),
}

fn list_tools(json: bool) -> Result<()> {
    let statuses = availability();
    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        println!("{}", render_listing(&statuses));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::List { json } => {
            if !json {
                sanyuan_toolbox::display_license_notice("sanyuan");
            }
            list_tools(json)
        }
        Command::PdfSplit(args) => run_tool(args).await,
        Command::PdfMerge(args) => run_tool(args).await,
        Command::PdfWatermark(args) => run_tool(args).await,
        Command::PdfToImage(args) => run_tool(args).await,
        Command::PdfToWord(args) => run_tool(args).await,
        Command::ImageToPdf(args) => run_tool(args).await,
        Command::ImageConvert(args) => run_tool(args).await,
        Command::ImageToIco(args) => run_tool(args).await,
        Command::ImageGrid(args) => run_tool(args).await,
        Command::ImageCombine(args) => run_tool(args).await,
        Command::AudioExtract(args) => run_tool(args).await,
        Command::UnitConvert(args) => run_tool(args).await,
        Command::RmbUpper(args) => run_tool(args).await,
        Command::DirTree(args) => run_tool(args).await,
        Command::EmptyDirs(args) => run_tool(args).await,
    }
}
