use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::runner::{ProcessRunner, RunOutput, RunnerError};

/// One recorded `run` call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

enum Behavior {
    Succeed,
    Fail { exit_code: i32, stderr: String },
    Timeout { timeout_secs: u64 },
}

/// A [`ProcessRunner`] that returns a scripted result and records every
/// invocation.
pub struct MockProcessRunner {
    behavior: Behavior,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockProcessRunner {
    pub fn succeeding() -> Self {
        Self {
            behavior: Behavior::Succeed,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self {
            behavior: Behavior::Fail {
                exit_code,
                stderr: stderr.to_string(),
            },
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn timing_out(timeout_secs: u64) -> Self {
        Self {
            behavior: Behavior::Timeout { timeout_secs },
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        _timeout: Duration,
    ) -> Result<RunOutput, RunnerError> {
        if let Ok(mut calls) = self.invocations.lock() {
            calls.push(Invocation {
                program: program.to_path_buf(),
                args: args.to_vec(),
            });
        }

        match &self.behavior {
            Behavior::Succeed => Ok(RunOutput {
                exit_code: Some(0),
                success: true,
                stderr: String::new(),
            }),
            Behavior::Fail { exit_code, stderr } => Ok(RunOutput {
                exit_code: Some(*exit_code),
                success: false,
                stderr: stderr.clone(),
            }),
            Behavior::Timeout { timeout_secs } => Err(RunnerError::Timeout {
                program: program.display().to_string(),
                timeout_secs: *timeout_secs,
            }),
        }
    }
}
