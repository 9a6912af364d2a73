//! Command line arguments of every tool.
//!
//! Each struct is used twice: parsed directly by the tool's own binary and
//! wrapped as a subcommand of the `sanyuan` launcher.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::audio;
use crate::error::{Result, ToolError};
use crate::external::ExternalProgram;
use crate::files::prune::prune_empty_dirs;
use crate::files::tree::{DEFAULT_IGNORE, TreeOptions, dir_tree};
use crate::pdf::docx::pdf_to_docx;
use crate::pdf::from_images::images_to_pdf;
use crate::pdf::merge::{MergeSource, merge_pdfs};
use crate::pdf::render::{RenderFormat, RenderOptions, render_pdf};
use crate::pdf::split::{SplitMode, split_pdf};
use crate::pdf::watermark::{Position, WatermarkStyle, parse_opacity, watermark_pdf};
use crate::picture::combine::{CombineOptions, Layout, combine_images};
use crate::picture::convert::{ConvertOptions, convert_path};
use crate::picture::grid::split_grid;
use crate::picture::ico::{self, IconSize, image_to_ico};
use crate::picture::TargetFormat;
use crate::report::Report;
use crate::{rmb, units};

/// Flags every tool accepts.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, short = 'q', help = "Minimal output mode (no banner, warnings only)")]
    pub quiet: bool,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,
}

/// A parsed tool invocation that can be executed.
pub trait ToolArgs {
    /// Binary name, used for the banner and the report
    const BINARY: &'static str;

    fn common(&self) -> &CommonArgs;

    fn execute(&self) -> impl Future<Output = Result<Report>> + Send;
}

fn input_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pdf-split")]
#[command(about = "Split a PDF every N pages or extract page ranges")]
#[command(version)]
pub struct PdfSplitArgs {
    /// PDF file to split
    pub input: PathBuf,

    #[arg(long, short = 'o', help = "Directory for the parts (defaults to the input's directory)")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, short = 'n', default_value_t = 1, conflicts_with = "ranges", help = "Pages per output file")]
    pub every: u32,

    #[arg(long, short = 'r', help = "Only these pages, e.g. \"1-3,5,8-10\"; one file per consecutive run")]
    pub ranges: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for PdfSplitArgs {
    const BINARY: &'static str = "pdf-split";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let mode = match &self.ranges {
            Some(spec) => SplitMode::Ranges(spec.clone()),
            None => SplitMode::Every(self.every),
        };
        let output_dir = self.output_dir.clone().unwrap_or_else(|| input_dir(&self.input));
        split_pdf(&self.input, &output_dir, &mode)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pdf-merge")]
#[command(about = "Merge selected pages of several PDFs into one")]
#[command(version)]
pub struct PdfMergeArgs {
    /// Inputs in merge order, each `file.pdf` or `file.pdf:1-3,5`
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<MergeSource>,

    #[arg(long, short = 'o', help = "Merged PDF to write")]
    pub output: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for PdfMergeArgs {
    const BINARY: &'static str = "pdf-merge";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        merge_pdfs(&self.inputs, &self.output)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pdf-watermark")]
#[command(about = "Add a text watermark to every page of a PDF")]
#[command(version)]
pub struct PdfWatermarkArgs {
    /// PDF file to watermark
    pub input: PathBuf,

    #[arg(long, short = 't', help = "Watermark text")]
    pub text: String,

    #[arg(long, short = 'o', help = "Output PDF (defaults to {stem}_watermarked.pdf next to the input)")]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = 36, value_parser = clap::value_parser!(u16).range(10..=72), help = "Font size in points (10-72)")]
    pub font_size: u16,

    #[arg(long, default_value_t = 0.5, value_parser = parse_opacity, help = "Opacity between 0.1 and 1")]
    pub opacity: f32,

    #[arg(long, value_enum, default_value_t = Position::Center)]
    pub position: Position,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl PdfWatermarkArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = crate::pdf::output_stem(&self.input);
            self.input.with_file_name(format!("{stem}_watermarked.pdf"))
        })
    }
}

impl ToolArgs for PdfWatermarkArgs {
    const BINARY: &'static str = "pdf-watermark";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let style = WatermarkStyle {
            text: self.text.clone(),
            font_size: f32::from(self.font_size),
            opacity: self.opacity,
            position: self.position,
        };
        watermark_pdf(&self.input, &self.output_path(), &style)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pdf-to-image")]
#[command(about = "Render PDF pages to image files with pdftoppm")]
#[command(version)]
pub struct PdfToImageArgs {
    /// PDF file to render
    pub input: PathBuf,

    #[arg(long, short = 'o', help = "Base directory; images go to {dir}/{stem}_images/")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    #[arg(long, short = 'f', value_enum, default_value_t = RenderFormat::Png)]
    pub format: RenderFormat,

    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100), help = "JPEG quality")]
    pub quality: u8,

    #[arg(long, short = 'p', help = "Pages to render, e.g. \"1-3,5\" (default: all)")]
    pub pages: Option<String>,

    #[arg(long, env = "SANYUAN_PDFTOPPM", default_value = "pdftoppm", help = "pdftoppm executable")]
    pub pdftoppm: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for PdfToImageArgs {
    const BINARY: &'static str = "pdf-to-image";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let options = RenderOptions {
            dpi: self.dpi,
            format: self.format,
            quality: self.quality,
            pages: self.pages.clone(),
        };
        let output_dir = self.output_dir.clone().unwrap_or_else(|| input_dir(&self.input));
        let renderer = ExternalProgram::new(&self.pdftoppm);
        render_pdf(&renderer, &self.input, &output_dir, &options).await
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pdf-to-word")]
#[command(about = "Convert the text of a PDF into a Word (.docx) document")]
#[command(version)]
pub struct PdfToWordArgs {
    /// PDF file to convert
    pub input: PathBuf,

    #[arg(long, short = 'o', help = "Output .docx (defaults to the input path with .docx)")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for PdfToWordArgs {
    const BINARY: &'static str = "pdf-to-word";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        pdf_to_docx(&self.input, self.output.as_deref())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "image-to-pdf")]
#[command(about = "Put images into a PDF, one image per page")]
#[command(version)]
pub struct ImageToPdfArgs {
    /// Image files or directories of images, in page order
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    #[arg(long, short = 'o', help = "PDF to write")]
    pub output: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for ImageToPdfArgs {
    const BINARY: &'static str = "image-to-pdf";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        images_to_pdf(&self.inputs, &self.output)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "image-convert")]
#[command(about = "Convert an image, or every image in a folder, to another format")]
#[command(version)]
pub struct ImageConvertArgs {
    /// Image file or folder of images
    pub input: PathBuf,

    #[arg(long, short = 'f', value_enum, help = "Target format")]
    pub format: TargetFormat,

    #[arg(
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u8).range(1..=100),
        help = "Quality 1-100 (JPEG quality, PNG compression); WebP output is always lossless"
    )]
    pub quality: u8,

    #[arg(long, short = 'o', help = "Output folder (defaults to the input's folder)")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Replace existing files")]
    pub overwrite: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for ImageConvertArgs {
    const BINARY: &'static str = "image-convert";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let options = ConvertOptions {
            format: self.format,
            quality: self.quality,
            output_dir: self.output_dir.clone(),
            overwrite: self.overwrite,
        };
        convert_path(&self.input, &options)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "image-to-ico")]
#[command(about = "Create a Windows .ico icon from an image")]
#[command(version)]
pub struct ImageToIcoArgs {
    /// Source image
    pub input: PathBuf,

    #[arg(long, short = 'o', help = "Output .ico (defaults to the input path with .ico)")]
    pub output: Option<PathBuf>,

    /// Icon sizes, e.g. `16`, `32`, `64x48`; repeat or comma separate
    #[arg(long, short = 's', value_delimiter = ',', default_value = "16")]
    pub sizes: Vec<IconSize>,

    #[arg(long, help = "Replace an existing icon")]
    pub overwrite: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for ImageToIcoArgs {
    const BINARY: &'static str = "image-to-ico";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| ico::default_output(&self.input));
        image_to_ico(&self.input, &output, &self.sizes, self.overwrite)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "image-grid")]
#[command(about = "Cut an image into a grid of equal tiles")]
#[command(version)]
pub struct ImageGridArgs {
    /// Image to cut
    pub input: PathBuf,

    #[arg(long, default_value_t = 3)]
    pub rows: u32,

    #[arg(long, default_value_t = 3)]
    pub cols: u32,

    #[arg(long, short = 'o', help = "Base directory; tiles go to {dir}/{stem}_split/")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for ImageGridArgs {
    const BINARY: &'static str = "image-grid";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        split_grid(&self.input, self.output_dir.as_deref(), self.rows, self.cols)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "image-combine")]
#[command(about = "Compose several images on one white canvas")]
#[command(version)]
pub struct ImageCombineArgs {
    /// Image files to combine
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    #[arg(long, short = 'o', help = "Combined image; the extension picks the format")]
    pub output: PathBuf,

    #[arg(long, short = 'l', value_enum, default_value_t = Layout::Uniform)]
    pub layout: Layout,

    #[arg(long, help = "Use a random subset of this many images")]
    pub pick: Option<usize>,

    #[arg(long, short = 'c', default_value_t = 1, help = "Number of variants to export")]
    pub count: u32,

    #[arg(long, help = "Seed for reproducible random choices")]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for ImageCombineArgs {
    const BINARY: &'static str = "image-combine";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let options = CombineOptions {
            layout: self.layout,
            pick: self.pick,
            count: self.count,
            seed: self.seed,
        };
        combine_images(&self.inputs, &self.output, &options)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "audio-extract")]
#[command(about = "Extract the audio track of a video with ffmpeg")]
#[command(version)]
pub struct AudioExtractArgs {
    /// Video file (mp4, avi, mkv, mov)
    pub input: PathBuf,

    #[arg(long, short = 'o', help = "Output .mp3 or .wav (defaults to the input path with .mp3)")]
    pub output: Option<PathBuf>,

    #[arg(long, env = "SANYUAN_FFMPEG", default_value = "ffmpeg", help = "ffmpeg executable")]
    pub ffmpeg: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for AudioExtractArgs {
    const BINARY: &'static str = "audio-extract";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let ffmpeg = ExternalProgram::new(&self.ffmpeg);
        audio::extract_audio(&ffmpeg, &self.input, self.output.as_deref()).await
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "unit-convert")]
#[command(about = "Convert a length between metric, imperial, Chinese and other units")]
#[command(version)]
pub struct UnitConvertArgs {
    /// Value to convert
    #[arg(required_unless_present = "list", allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Source unit, e.g. `km`, `尺`, `光年(ly)`
    #[arg(required_unless_present = "list")]
    pub from: Option<String>,

    /// Target unit
    #[arg(required_unless_present = "list")]
    pub to: Option<String>,

    #[arg(long, short = 'd', default_value_t = 6, allow_negative_numbers = true, help = "Decimal places")]
    pub decimals: i32,

    #[arg(long, help = "List all units by category")]
    pub list: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for UnitConvertArgs {
    const BINARY: &'static str = "unit-convert";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let report = Report::new(Self::BINARY);
        if self.list {
            let count = units::UNITS.len();
            return Ok(report
                .with_text(units::unit_listing())
                .with_summary(format!("{count} units")));
        }
        let (Some(value), Some(from), Some(to)) = (self.value, &self.from, &self.to) else {
            return Err(ToolError::InvalidInput(
                "expected VALUE FROM TO or --list".to_string(),
            ));
        };
        let line = units::format_conversion(value, from, to, self.decimals)?;
        Ok(report.with_summary(line))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "rmb-upper")]
#[command(about = "Write an amount as upper-case Chinese currency text")]
#[command(version)]
pub struct RmbUpperArgs {
    /// Amount such as 1234.56 (up to 7 decimal places)
    pub amount: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for RmbUpperArgs {
    const BINARY: &'static str = "rmb-upper";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        let text = rmb::to_upper(&self.amount)?;
        Ok(Report::new(Self::BINARY).with_summary(text))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "dir-tree")]
#[command(about = "Print the structure of a directory as a tree")]
#[command(version)]
pub struct DirTreeArgs {
    /// Directory to list
    #[arg(default_value = ".")]
    pub root: PathBuf,

    #[arg(long, short = 'o', help = "Write the tree to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, short = 'i', value_delimiter = ',', help = "Extra names to ignore")]
    pub ignore: Vec<String>,

    #[arg(long, help = "Replace the default ignore list instead of extending it")]
    pub no_default_ignore: bool,

    #[arg(long, short = 'd', help = "Maximum depth to descend")]
    pub max_depth: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl DirTreeArgs {
    pub fn tree_options(&self) -> TreeOptions {
        let mut ignore: Vec<String> = if self.no_default_ignore {
            Vec::new()
        } else {
            DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect()
        };
        for name in &self.ignore {
            if !ignore.contains(name) {
                ignore.push(name.clone());
            }
        }
        TreeOptions {
            ignore,
            max_depth: self.max_depth,
        }
    }
}

impl ToolArgs for DirTreeArgs {
    const BINARY: &'static str = "dir-tree";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        dir_tree(&self.root, &self.tree_options(), self.output.as_deref())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "empty-dirs")]
#[command(about = "Remove empty folders below a directory")]
#[command(version)]
pub struct EmptyDirsArgs {
    /// Directory to clean (kept even if it ends up empty)
    pub root: PathBuf,

    #[arg(long, short = 'n', help = "Only list what would be removed")]
    pub dry_run: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToolArgs for EmptyDirsArgs {
    const BINARY: &'static str = "empty-dirs";

    fn common(&self) -> &CommonArgs {
        &self.common
    }

    async fn execute(&self) -> Result<Report> {
        prune_empty_dirs(&self.root, self.dry_run)
    }
}
