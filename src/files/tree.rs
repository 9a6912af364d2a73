//! Text rendering of a directory tree.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::report::Report;

pub const DEFAULT_IGNORE: [&str; 3] = [".git", "__pycache__", ".DS_Store"];

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Entry names left out of the listing, directories included
    pub ignore: Vec<String>,
    /// Deepest level listed; 1 shows only the root's entries
    pub max_depth: Option<usize>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            max_depth: None,
        }
    }
}

fn walk(dir: &Path, options: &TreeOptions, prefix: &str, depth: usize, out: &mut String) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            let reason = match e.kind() {
                ErrorKind::PermissionDenied => "permission denied".to_string(),
                _ => e.to_string(),
            };
            out.push_str(&format!("cannot access {}: {}\n", dir.display(), reason));
            return;
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !options.ignore.iter().any(|ignored| ignored == name))
        .collect();
    names.sort();

    let count = names.len();
    for (i, name) in names.into_iter().enumerate() {
        let is_last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        out.push_str(&name);
        out.push('\n');

        let path = dir.join(&name);
        // Symlinked directories are listed but not followed.
        let is_dir = fs::symlink_metadata(&path).is_ok_and(|m| m.is_dir());
        let deeper = options.max_depth.is_none_or(|max| depth < max);
        if is_dir && deeper {
            let child_prefix = format!("{prefix}{}", if is_last { SPACE } else { PIPE });
            walk(&path, options, &child_prefix, depth + 1, out);
        }
    }
}

/// The tree below `root` without the header line.
pub fn tree_body(root: &Path, options: &TreeOptions) -> Result<String> {
    if !root.is_dir() {
        return Err(ToolError::InvalidInput(format!(
            "not a directory: {}",
            root.display()
        )));
    }
    if options.max_depth == Some(0) {
        return Err(ToolError::InvalidInput("max depth must be at least 1".to_string()));
    }
    let mut out = String::new();
    walk(root, options, "", 1, &mut out);
    Ok(out)
}

/// Header, blank line and tree.
pub fn render_tree(root: &Path, options: &TreeOptions) -> Result<String> {
    let ignoring = if options.ignore.is_empty() {
        "nothing".to_string()
    } else {
        options.ignore.join(", ")
    };
    let body = tree_body(root, options)?;
    Ok(format!("Directory structure (ignoring: {ignoring}):\n\n{body}"))
}

/// Render the tree of `root` to stdout (via the report) or to `output`.
pub fn dir_tree(root: &Path, options: &TreeOptions, output: Option<&Path>) -> Result<Report> {
    let text = render_tree(root, options)?;
    let lines = text.lines().count().saturating_sub(2);
    debug!("Rendered {} entries below {}", lines, root.display());

    let mut report = Report::new("dir-tree").with_summary(format!("{lines} entries"));
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &text)?;
            info!("Saved tree of {} to {}", root.display(), path.display());
            report.push_output(path);
            Ok(report)
        }
        None => Ok(report.with_text(text.trim_end())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/bin")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("Cargo.toml"), "").unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        fs::write(root.join("src/bin/tool.rs"), "").unwrap();
        fs::write(root.join("zz.DS_Store"), "").unwrap();
        fs::write(root.join(".DS_Store"), "").unwrap();
        dir
    }

    #[test]
    fn renders_branches_and_skips_ignored() {
        let dir = sample_tree();
        let body = tree_body(dir.path(), &TreeOptions::default()).unwrap();
        assert_eq!(
            body,
            "├── Cargo.toml\n\
             ├── src\n\
             │   ├── bin\n\
             │   │   └── tool.rs\n\
             │   └── lib.rs\n\
             └── zz.DS_Store\n"
        );
    }

    #[test]
    fn last_visible_entry_closes_the_branch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::create_dir(dir.path().join("zz_ignored")).unwrap();
        let options = TreeOptions {
            ignore: vec!["zz_ignored".into()],
            max_depth: None,
        };
        assert_eq!(tree_body(dir.path(), &options).unwrap(), "└── a.txt\n");
    }

    #[test]
    fn depth_limit_stops_descent() {
        let dir = sample_tree();
        let options = TreeOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let body = tree_body(dir.path(), &options).unwrap();
        assert_eq!(body, "├── Cargo.toml\n├── src\n└── zz.DS_Store\n");
    }

    #[test]
    fn header_names_the_ignore_list() {
        let dir = sample_tree();
        let text = render_tree(dir.path(), &TreeOptions::default()).unwrap();
        assert!(text.starts_with("Directory structure (ignoring: .git, __pycache__, .DS_Store):\n\n├── "));
    }

    #[test]
    fn writes_to_file() {
        let dir = sample_tree();
        let out = dir.path().join("out/tree.txt");
        let report = dir_tree(dir.path(), &TreeOptions::default(), Some(&out)).unwrap();
        assert_eq!(report.outputs, vec![out.clone()]);
        assert!(fs::read_to_string(&out).unwrap().contains("└── zz.DS_Store"));
        assert!(tree_body(&out, &TreeOptions::default()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_gets_a_notice_line() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(dir.path().join("open.txt"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root reads through any mode bits.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let body = tree_body(dir.path(), &TreeOptions::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(
            body.unwrap(),
            format!(
                "├── locked\ncannot access {}: permission denied\n└── open.txt\n",
                locked.display()
            )
        );
    }
}
