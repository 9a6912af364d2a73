use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Failure cases shared by every tool in the box.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a PDF cannot be parsed, edited or saved.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Decoding or encoding failures from the image codecs.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Raised when JSON serialization of a report fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failures while packaging an Office document.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Raised when a directory walk hits an unreadable entry.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The input path given on the command line does not exist.
    #[error("input not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The target file already exists and overwriting was not requested.
    #[error("output already exists: {} (pass --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),

    /// A PDF that loaded fine but contains no pages.
    #[error("PDF has no pages: {}", .0.display())]
    EmptyDocument(PathBuf),

    /// A page selection that does not describe any usable page.
    #[error("invalid page range '{spec}': {reason}")]
    InvalidPageRange { spec: String, reason: String },

    /// Unit symbol not present in the conversion table.
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    /// Number that cannot be written as currency text.
    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// The file format is recognised but cannot be read or written.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Generic validation failure for user supplied options.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A helper program (ffmpeg, pdftoppm) could not be started.
    #[error("'{program}' is not available: {reason}")]
    ExternalToolMissing { program: String, reason: String },

    /// A helper program ran but reported failure.
    #[error("'{program}' failed with {status}: {detail}")]
    ExternalToolFailed {
        program: String,
        status: String,
        detail: String,
    },

    /// The run was interrupted before the helper program finished.
    #[error("cancelled")]
    Cancelled,
}
