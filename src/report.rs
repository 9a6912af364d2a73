//! Outcome of a tool run, printed either as a human summary or as JSON.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// One input that could not be processed during a batch run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Failure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a single tool invocation.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Report {
    /// Binary name of the tool that produced this report
    pub tool: String,
    /// One-line human readable status
    pub summary: String,
    /// Files (or directories) created or removed
    pub outputs: Vec<PathBuf>,
    /// Inputs that were skipped because of an error
    pub failures: Vec<Failure>,
    /// Free-form text result (tree listing, converted amount, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Report {
    pub fn new(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn push_output(&mut self, path: impl AsRef<Path>) {
        self.outputs.push(path.as_ref().to_path_buf());
    }

    pub fn push_failure(&mut self, path: impl AsRef<Path>, error: impl ToString) {
        self.failures.push(Failure {
            path: path.as_ref().to_path_buf(),
            error: error.to_string(),
        });
    }

    /// Print the report to stdout.
    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        if let Some(text) = &self.text {
            println!("{}", text);
        }
        for output in &self.outputs {
            println!("  -> {}", output.display());
        }
        for failure in &self.failures {
            println!("  !! {}: {}", failure.path.display(), failure.error);
        }
        if !self.summary.is_empty() {
            println!("{}", self.summary);
        }
        Ok(())
    }
}
