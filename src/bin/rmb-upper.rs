//! RMB Upper - write an amount as upper-case Chinese currency text
//!
//! ```bash
//! rmb-upper 1234.56   # 壹仟贰佰叁拾肆元伍角陆分
//! ```

use anyhow::Result;
use clap::Parser;
use sanyuan_toolbox::cli::RmbUpperArgs;

#[tokio::main]
async fn main() -> Result<()> {
    sanyuan_toolbox::run_tool(RmbUpperArgs::parse()).await
}
