//! Running helper programs (ffmpeg, pdftoppm).
//!
//! The child's stdout and stderr are read line by line on background tasks
//! and forwarded as [`ProcessEvent`]s. Lines are logged at debug level and
//! the last few are kept so a failure can say what the program complained
//! about. Ctrl-C kills the child and returns [`ToolError::Cancelled`].

use std::collections::VecDeque;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use crate::error::{Result, ToolError};

/// Number of output lines kept for error messages.
const TAIL_LINES: usize = 8;

/// Events produced while a helper program runs.
#[derive(Debug)]
pub enum ProcessEvent {
    /// A line of output from stdout or stderr
    Output(String),
    /// Reading one of the pipes failed
    Error(String),
}

/// A helper program at a fixed location.
#[derive(Debug, Clone)]
pub struct ExternalProgram {
    program: PathBuf,
}

fn forward_lines<R>(reader: R, tx: UnboundedSender<ProcessEvent>, label: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(ProcessEvent::Output(line)).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx.send(ProcessEvent::Error(format!("{label} error: {e}")));
                    break;
                }
            }
        }
    });
}

impl ExternalProgram {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn name(&self) -> String {
        self.program.display().to_string()
    }

    /// Run the program with a version flag to make sure it can be started.
    /// Some tools (pdftoppm) print their version on stderr, and older builds
    /// exit non-zero for it, so only a failure to start counts as missing.
    pub async fn ensure_available(&self, version_flag: &str) -> Result<()> {
        let output = Command::new(&self.program)
            .arg(version_flag)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ToolError::ExternalToolMissing {
                program: self.name(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let banner = stdout
            .lines()
            .chain(stderr.lines())
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default();
        debug!("Found {} ({}): {}", self.name(), output.status, banner);
        Ok(())
    }

    /// Run the program to completion.
    pub async fn run<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::ExternalToolMissing {
                program: self.name(),
                reason: e.to_string(),
            })?;
        info!("Started {} (pid {:?})", self.name(), child.id());

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, tx.clone(), "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, tx, "stderr");
        }

        let mut tail = VecDeque::with_capacity(TAIL_LINES);
        let status = loop {
            tokio::select! {
                Some(event) = rx.recv() => record(event, &mut tail),
                status = child.wait() => break status?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, stopping {}", self.name());
                    // kill_on_drop takes the child down with us
                    return Err(ToolError::Cancelled);
                }
            }
        };
        while let Some(event) = rx.recv().await {
            record(event, &mut tail);
        }

        if status.success() {
            debug!("{} finished", self.name());
            return Ok(());
        }
        Err(ToolError::ExternalToolFailed {
            program: self.name(),
            status: status.to_string(),
            detail: Vec::from(tail).join("\n"),
        })
    }
}

fn record(event: ProcessEvent, tail: &mut VecDeque<String>) {
    let line = match event {
        ProcessEvent::Output(line) => {
            debug!("{}", line);
            line
        }
        ProcessEvent::Error(message) => {
            warn!("{}", message);
            message
        }
    };
    if line.trim().is_empty() {
        return;
    }
    if tail.len() == TAIL_LINES {
        tail.pop_front();
    }
    tail.push_back(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_reported() {
        let program = ExternalProgram::new("/nonexistent/sanyuan-helper");
        let err = program.ensure_available("-version").await.unwrap_err();
        assert!(matches!(err, ToolError::ExternalToolMissing { .. }));
    }

    #[test]
    fn tail_keeps_last_lines() {
        let mut tail = VecDeque::new();
        for i in 0..20 {
            record(ProcessEvent::Output(format!("line {i}")), &mut tail);
        }
        record(ProcessEvent::Output("   ".into()), &mut tail);
        assert_eq!(tail.len(), TAIL_LINES);
        assert_eq!(tail.back().map(String::as_str), Some("line 19"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_carries_output_tail() {
        let program = ExternalProgram::new("sh");
        let err = program
            .run(["-c", "echo first >&2; echo boom >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            ToolError::ExternalToolFailed { detail, .. } => {
                assert_eq!(detail, "first\nboom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
