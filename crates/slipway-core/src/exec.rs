//! External tool invocation over tokio::process, with captured output and
//! a stderr tail on failure.

use std::ffi::OsStr;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {code}: {stderr_tail}")]
    Failed {
        tool: String,
        code: String,
        stderr_tail: String,
    },
    #[error("failed to feed stdin of {tool}: {source}")]
    Stdin {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured output of a successful run.
#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run a tool to completion, capturing stdout/stderr. Non-zero exit maps
/// to `ExecError::Failed` carrying the tail of stderr.
pub async fn run<I, S>(tool: &str, args: I) -> Result<ToolOutput, ExecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| ExecError::Spawn {
            tool: tool.to_string(),
            source,
        })?;
    finish(tool, output)
}

/// Run a tool feeding `input` to its stdin. Used for tools that insist on
/// interactive confirmation and offer no non-interactive flag; a known
/// workaround, not a designed interface.
pub async fn run_with_stdin<I, S>(tool: &str, args: I, input: &[u8]) -> Result<ToolOutput, ExecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ExecError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input)
            .await
            .map_err(|source| ExecError::Stdin {
                tool: tool.to_string(),
                source,
            })?;
        // Dropping stdin closes the pipe so the child sees EOF.
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| ExecError::Spawn {
            tool: tool.to_string(),
            source,
        })?;
    finish(tool, output)
}

fn finish(tool: &str, output: std::process::Output) -> Result<ToolOutput, ExecError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !output.status.success() {
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(ExecError::Failed {
            tool: tool.to_string(),
            code,
            stderr_tail: stderr_tail(&stderr),
        });
    }
    tracing::debug!("{} succeeded ({} bytes stdout)", tool, stdout.len());
    Ok(ToolOutput { stdout, stderr })
}

/// Last few lines of stderr, enough to diagnose without flooding the log.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
