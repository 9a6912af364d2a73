//! Registry of the tools shipped in the toolbox.

use std::env;
use std::path::PathBuf;

use serde::Serialize;

/// Category for grouping tools in listings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum ToolCategory {
    Pdf,
    Picture,
    Audio,
    File,
    Other,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 5] = [
        ToolCategory::Pdf,
        ToolCategory::Picture,
        ToolCategory::Audio,
        ToolCategory::File,
        ToolCategory::Other,
    ];

    /// Display name for the category header.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolCategory::Pdf => "PDF tools",
            ToolCategory::Picture => "Picture tools",
            ToolCategory::Audio => "Audio tools",
            ToolCategory::File => "File tools",
            ToolCategory::Other => "Other tools",
        }
    }
}

/// Metadata for a tool in the toolbox.
#[derive(Clone, Debug, Serialize)]
pub struct ToolMetadata {
    /// Display name of the tool
    pub name: &'static str,
    /// Binary name, also the launcher subcommand
    pub binary: &'static str,
    /// Short description of what the tool does
    pub description: &'static str,
    pub category: ToolCategory,
}

/// All tools in the toolbox, ordered by category.
pub const TOOLS: &[ToolMetadata] = &[
    // PDF
    ToolMetadata {
        name: "PDF Split",
        binary: "pdf-split",
        description: "Split a PDF every N pages or by page ranges",
        category: ToolCategory::Pdf,
    },
    ToolMetadata {
        name: "PDF Merge",
        binary: "pdf-merge",
        description: "Merge selected pages of several PDFs",
        category: ToolCategory::Pdf,
    },
    ToolMetadata {
        name: "PDF Watermark",
        binary: "pdf-watermark",
        description: "Stamp a text watermark on every page",
        category: ToolCategory::Pdf,
    },
    ToolMetadata {
        name: "PDF to Image",
        binary: "pdf-to-image",
        description: "Render PDF pages to PNG, JPG, TIFF or BMP",
        category: ToolCategory::Pdf,
    },
    ToolMetadata {
        name: "PDF to Word",
        binary: "pdf-to-word",
        description: "Convert the text of a PDF into a .docx document",
        category: ToolCategory::Pdf,
    },
    ToolMetadata {
        name: "Image to PDF",
        binary: "image-to-pdf",
        description: "Put images into a PDF, one per page",
        category: ToolCategory::Pdf,
    },
    // Picture
    ToolMetadata {
        name: "Image Convert",
        binary: "image-convert",
        description: "Convert images between formats, singly or by folder",
        category: ToolCategory::Picture,
    },
    ToolMetadata {
        name: "Image to ICO",
        binary: "image-to-ico",
        description: "Create a Windows icon in one or more sizes",
        category: ToolCategory::Picture,
    },
    ToolMetadata {
        name: "Image Grid",
        binary: "image-grid",
        description: "Cut an image into a grid of tiles (3x3 by default)",
        category: ToolCategory::Picture,
    },
    ToolMetadata {
        name: "Image Combine",
        binary: "image-combine",
        description: "Compose several images on one canvas",
        category: ToolCategory::Picture,
    },
    // Audio
    ToolMetadata {
        name: "Audio Extract",
        binary: "audio-extract",
        description: "Extract the audio track of a video with ffmpeg",
        category: ToolCategory::Audio,
    },
    // File
    ToolMetadata {
        name: "Directory Tree",
        binary: "dir-tree",
        description: "Print the structure of a directory",
        category: ToolCategory::File,
    },
    ToolMetadata {
        name: "Empty Folder Cleanup",
        binary: "empty-dirs",
        description: "Remove empty folders below a directory",
        category: ToolCategory::File,
    },
    // Other
    ToolMetadata {
        name: "Unit Convert",
        binary: "unit-convert",
        description: "Convert between metric, imperial, Chinese and other length units",
        category: ToolCategory::Other,
    },
    ToolMetadata {
        name: "RMB Upper Case",
        binary: "rmb-upper",
        description: "Write an amount as upper-case Chinese currency text",
        category: ToolCategory::Other,
    },
];

fn with_exe_suffix(binary_name: &str) -> String {
    format!("{}{}", binary_name, env::consts::EXE_SUFFIX)
}

/// Find the binary path for a tool.
/// Checks next to the current executable, target/release/, target/debug/,
/// and finally falls back to the bare name for a PATH lookup.
pub fn find_binary(binary_name: &str) -> PathBuf {
    let file_name = with_exe_suffix(binary_name);

    if let Ok(exe_path) = env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let sibling = exe_dir.join(&file_name);
        if sibling.exists() {
            return sibling;
        }
    }

    for profile in ["release", "debug"] {
        let candidate = PathBuf::from("target").join(profile).join(&file_name);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from(file_name)
}

/// A tool together with where (and whether) its binary was found.
#[derive(Clone, Debug, Serialize)]
pub struct ToolStatus {
    pub tool: ToolMetadata,
    pub path: PathBuf,
    pub available: bool,
}

/// Check every tool's binary.
pub fn availability() -> Vec<ToolStatus> {
    TOOLS
        .iter()
        .map(|tool| {
            let path = find_binary(tool.binary);
            // A bare name means nothing was found on disk; it may still be on PATH.
            let available = path.exists() || on_path(&path);
            ToolStatus {
                tool: tool.clone(),
                path,
                available,
            }
        })
        .collect()
}

fn on_path(name: &std::path::Path) -> bool {
    if name.components().count() != 1 {
        return false;
    }
    env::var_os("PATH").is_some_and(|paths| env::split_paths(&paths).any(|dir| dir.join(name).is_file()))
}

/// Human readable catalog grouped by category, ending with a count line.
pub fn render_listing(statuses: &[ToolStatus]) -> String {
    let mut out = String::new();
    for category in ToolCategory::ALL {
        out.push_str(category.display_name());
        out.push('\n');
        for status in statuses.iter().filter(|s| s.tool.category == category) {
            let mark = if status.available { "+" } else { "-" };
            out.push_str(&format!(
                "  {} {:<14} {}\n",
                mark, status.tool.binary, status.tool.description
            ));
        }
    }
    let available = statuses.iter().filter(|s| s.available).count();
    out.push_str(&format!("available: {}/{}", available, statuses.len()));
    out
}
