//! External process invocation with captured stderr and a hard timeout.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;

/// Errors from running an external process.
///
/// Note that a non-zero exit is NOT an error at this layer; it is reported
/// through [`RunOutput`] and interpreted by the caller.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The binary could not be spawned (usually: not installed).
    #[error("Failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The process exceeded its time limit and was killed.
    #[error("Process {program} timed out after {timeout_secs} seconds and was killed")]
    Timeout { program: String, timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a completed process run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, if the process exited normally (None when killed by signal).
    pub exit_code: Option<i32>,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Captured standard error output.
    pub stderr: String,
}

/// Runs external commands. Stdout is discarded; stderr is captured for
/// diagnostics.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<RunOutput, RunnerError>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        time_limit: Duration,
    ) -> Result<RunOutput, RunnerError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunnerError::Spawn {
                program: program.display().to_string(),
                reason: e.to_string(),
            })?;

        let stderr = child.stderr.take();

        let result = timeout(time_limit, async {
            let mut captured = String::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    captured.push_str(&line);
                    captured.push('\n');
                }
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, captured))
        })
        .await;

        match result {
            Ok(Ok((status, captured))) => Ok(RunOutput {
                exit_code: status.code(),
                success: status.success(),
                stderr: captured.trim().to_string(),
            }),
            Ok(Err(e)) => Err(RunnerError::Io(e)),
            Err(_) => {
                // kill_on_drop would reap it eventually, but be explicit so
                // the child is gone before we report the timeout.
                let _ = child.kill().await;
                Err(RunnerError::Timeout {
                    program: program.display().to_string(),
                    timeout_secs: time_limit.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh(args: &[&str]) -> (PathBuf, Vec<String>) {
        (
            PathBuf::from("/bin/sh"),
            args.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_run_success() {
        let runner = TokioProcessRunner;
        let (program, args) = sh(&["-c", "exit 0"]);
        let output = runner
            .run(&program, &args, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_is_not_an_error() {
        let runner = TokioProcessRunner;
        let (program, args) = sh(&["-c", "echo 'boom' >&2; exit 3"]);
        let output = runner
            .run(&program, &args, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stderr, "boom");
    }

    #[tokio::test]
    async fn test_run_captures_multiline_stderr() {
        let runner = TokioProcessRunner;
        let (program, args) = sh(&["-c", "echo one >&2; echo two >&2; exit 1"]);
        let output = runner
            .run(&program, &args, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(output.stderr.contains("one"));
        assert!(output.stderr.contains("two"));
    }

    #[tokio::test]
    async fn test_run_timeout_kills_process() {
        let runner = TokioProcessRunner;
        let (program, args) = sh(&["-c", "sleep 30"]);
        let start = std::time::Instant::now();
        let err = runner
            .run(&program, &args, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(10));
        match err {
            RunnerError::Timeout { timeout_secs, .. } => assert_eq!(timeout_secs, 1),
            other => panic!("expected timeout, got {:?}", other),
        }
        // The diagnostic must be non-empty.
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_run_missing_binary() {
        let runner = TokioProcessRunner;
        let err = runner
            .run(
                Path::new("/definitely/not/a/binary"),
                &[],
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
