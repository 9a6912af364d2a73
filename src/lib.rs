//! Sanyuan Toolbox - everyday file utilities for PDFs, pictures, audio and folders
//!
//! This crate provides a collection of small command-line tools and the library
//! functions behind them. Every tool reads its inputs, validates them, does one
//! job and reports what it wrote.
//!
//! # Command-Line Tools
//!
//! Each tool ships as its own binary and is also a subcommand of the
//! `sanyuan` launcher (`sanyuan list` shows what is installed):
//!
//! - **PDF**: `pdf-split`, `pdf-merge`, `pdf-watermark`, `pdf-to-image`,
//!   `pdf-to-word`, `image-to-pdf`
//! - **Picture**: `image-convert`, `image-to-ico`, `image-grid`, `image-combine`
//! - **Audio**: `audio-extract` (needs `ffmpeg`)
//! - **File**: `dir-tree`, `empty-dirs`
//! - **Other**: `unit-convert`, `rmb-upper`
//!
//! # Quick Start
//!
//! ```bash
//! # Split a PDF into single pages, then merge two of them back
//! pdf-split report.pdf -o parts
//! pdf-merge parts/report_p1-1.pdf parts/report_p3-3.pdf -o short.pdf
//!
//! # Convert a folder of screenshots to JPEG
//! image-convert screenshots/ -f jpg --quality 85
//!
//! # The same through the launcher, with a JSON report
//! sanyuan image-convert screenshots/ -f jpg --json
//! ```
//!
//! # Library Usage
//!
//! - [`pdf`] - splitting, merging, watermarking and converting PDFs
//! - [`picture`] - image format conversion, icons, grids and collages
//! - [`audio`] - audio extraction through ffmpeg
//! - [`files`] - directory trees and empty folder cleanup
//! - [`units`] and [`rmb`] - length units and Chinese currency text
//! - [`catalog`] - the list of tools and where their binaries live
//! - [`cli`] - command-line argument definitions
//!
//! # License
//!
//! This project is licensed under the Apache License 2.0.

pub mod audio;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod external;
pub mod files;
pub mod pdf;
pub mod picture;
pub mod report;
pub mod rmb;
pub mod units;

pub use error::{Result, ToolError};
pub use report::Report;

use chrono::Datelike;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::ToolArgs;

/// Display the license notice for a program
pub fn display_license_notice(program_name: &str) {
	let version = env!("CARGO_PKG_VERSION");
	let current_year = chrono::Utc::now().year();
	let copyright_year = if current_year == 2024 {
		"2024".to_string()
	} else {
		format!("2024-{}", current_year)
	};

	println!("{} {} Copyright (C) {} The Sanyuan Toolbox authors", program_name, version, copyright_year);
	println!("This program comes with ABSOLUTELY NO WARRANTY.");
	println!("Licensed under the Apache License, Version 2.0: https://www.apache.org/licenses/LICENSE-2.0");
	println!();
}

/// Install the fmt subscriber. `RUST_LOG` overrides the default level,
/// which is INFO, or WARN when `quiet` is set.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { LevelFilter::WARN } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    // A second call (launcher tests, repeated runs) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run a parsed tool invocation: banner, logging, the tool itself, report.
pub async fn run_tool<A: ToolArgs>(args: A) -> anyhow::Result<()> {
    let common = args.common().clone();
    if !common.quiet && !common.json {
        display_license_notice(A::BINARY);
    }
    init_logging(common.quiet);

    let report = args.execute().await?;
    report.print(common.json)?;
    Ok(())
}
