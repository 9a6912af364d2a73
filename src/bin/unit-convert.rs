//! Unit Convert - length conversion across metric, imperial, Chinese,
//! astronomical and nautical units
//!
//! ```bash
//! unit-convert 1 mile km
//! unit-convert 3 尺 cm -d 2
//! unit-convert --list
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::UnitConvertArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(UnitConvertArgs::parse()).await
}
