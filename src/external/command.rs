//! Shared helpers for running external programs

use super::error::{ToolError, ToolResult};
use std::ffi::OsString;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Longest stderr excerpt carried into an error message
const DETAIL_LIMIT: usize = 400;

/// Build a command with stdin closed and both output streams captured
pub(crate) fn captured(program: &str, args: &[OsString]) -> Command {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Run to completion, returning the raw output whatever the exit status
pub(crate) async fn output(program: &str, args: &[OsString]) -> ToolResult<Output> {
    log::debug!("Running {} {:?}", program, args);
    captured(program, args)
        .output()
        .await
        .map_err(|source| ToolError::Launch {
            program: program.to_string(),
            source,
        })
}

/// Run to completion and require a successful exit status
pub(crate) async fn run_checked(program: &str, args: &[OsString]) -> ToolResult<Output> {
    let output = output(program, args).await?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            detail: stderr_excerpt(&output.stderr),
        })
    }
}

/// Last non-empty stderr text, trimmed to a readable length
pub(crate) fn stderr_excerpt(stderr: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut start = trimmed.len().saturating_sub(DETAIL_LIMIT);
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    Some(trimmed[start..].replace('\n', " | "))
}
