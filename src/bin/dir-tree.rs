//! Dir Tree - print a directory as a tree
//!
//! # Usage
//!
//! ```bash
//! dir-tree
//! dir-tree ~/project -i target,node_modules --max-depth 3
//! dir-tree ~/project -o structure.txt
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::DirTreeArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(DirTreeArgs::parse()).await
}
