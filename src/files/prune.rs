//! Remove empty directories below a root.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, ToolError};
use crate::report::Report;

/// True when `dir` holds nothing but directories already in `removed`.
fn is_empty_after(dir: &Path, removed: &HashSet<PathBuf>) -> std::io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        if !removed.contains(&entry?.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Delete every empty directory below `root`, deepest first, so that
/// folders holding only empty folders go too. The root itself is kept.
///
/// With `dry_run` nothing is deleted and the report lists what would be.
pub fn prune_empty_dirs(root: &Path, dry_run: bool) -> Result<Report> {
    if !root.is_dir() {
        return Err(ToolError::InvalidInput(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut report = Report::new("empty-dirs");
    let mut removed: HashSet<PathBuf> = HashSet::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                warn!("Skipping {}: {}", path.display(), e);
                report.push_failure(&path, &e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        match is_empty_after(dir, &removed) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("Cannot read {}: {}", dir.display(), e);
                report.push_failure(dir, &e);
                continue;
            }
        }

        if !dry_run
            && let Err(e) = fs::remove_dir(dir)
        {
            warn!("Cannot remove {}: {}", dir.display(), e);
            report.push_failure(dir, &e);
            continue;
        }
        debug!("{} {}", if dry_run { "Would remove" } else { "Removed" }, dir.display());
        removed.insert(dir.to_path_buf());
        report.push_output(dir);
    }

    let verb = if dry_run { "would remove" } else { "removed" };
    info!("{} {} empty folders below {}", verb, removed.len(), root.display());
    let summary = format!("{verb} {} empty folders", removed.len());
    Ok(report.with_summary(summary))
}
