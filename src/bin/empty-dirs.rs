//! Empty Dirs - remove empty folders, including folders that only hold empty folders
//!
//! Use `--dry-run` first to see what would go.

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::EmptyDirsArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(EmptyDirsArgs::parse()).await
}
