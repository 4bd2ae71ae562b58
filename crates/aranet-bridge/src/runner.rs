//! Invoking the external scanning/reading tool.
//!
//! The [`CommandRunner`] trait is the seam between the reader and the
//! operating system. [`ProcessRunner`] spawns a real child process;
//! [`MockRunner`](crate::MockRunner) replays canned output in tests.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::ToolConfig;
use crate::error::{Error, Result};

/// Captured output of one tool invocation.
///
/// The default is an empty, successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, decoded as UTF-8 (lossily).
    pub stdout: String,
    /// Standard error, decoded as UTF-8 (lossily).
    pub stderr: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
}

impl Default for CommandOutput {
    fn default() -> Self {
        Self::success("")
    }
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Returns the failure message, if the invocation failed.
    ///
    /// Any non-whitespace stderr is a failure and is returned verbatim,
    /// surrounding whitespace included. A non-zero exit code with empty
    /// stderr is also a failure.
    pub fn failure(&self) -> Option<String> {
        if !self.stderr.trim().is_empty() {
            return Some(self.stderr.clone());
        }
        match self.exit_code {
            Some(0) => None,
            Some(code) => Some(format!("exited with status {}", code)),
            None => Some("terminated by signal".to_string()),
        }
    }
}

/// Something that can run the external tool with a set of arguments.
///
/// Implementations block the calling task until the tool exits.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the tool with `args` and capture its output.
    ///
    /// Errors here are about running the tool at all (spawn failure,
    /// timeout). A tool that ran and reported a failure returns `Ok` with
    /// the failure in [`CommandOutput::stderr`].
    async fn run(&self, args: &[String]) -> Result<CommandOutput>;
}

/// Runs the tool as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner for `program` with no timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Create a runner from tool configuration.
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.timeout_duration(),
        }
    }

    /// Set the timeout. The child is killed when it expires.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The program this runner invokes.
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, args: &[String]) -> Result<CommandOutput> {
        debug!(program = %self.program, ?args, "Running external tool");

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(duration) => tokio::time::timeout(duration, child)
                .await
                .map_err(|_| Error::timeout(format!("run {}", self.program), duration))??,
            None => child.await?,
        };

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        debug!(
            exit_code = ?output.exit_code,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "External tool finished"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_on_stderr() {
        let output = CommandOutput {
            stdout: "= Device 1 =\nName: Office\n".to_string(),
            stderr: "  No Bluetooth adapter\n".to_string(),
            exit_code: Some(0),
        };
        assert_eq!(output.failure().as_deref(), Some("  No Bluetooth adapter\n"));
    }

    #[test]
    fn test_whitespace_stderr_is_not_failure() {
        let output = CommandOutput {
            stdout: String::new(),
            stderr: " \n\t".to_string(),
            exit_code: Some(0),
        };
        assert_eq!(output.failure(), None);
    }

    #[test]
    fn test_failure_on_exit_code() {
        let output = CommandOutput {
            exit_code: Some(2),
            ..CommandOutput::default()
        };
        assert_eq!(output.failure().as_deref(), Some("exited with status 2"));

        let output = CommandOutput {
            exit_code: None,
            ..CommandOutput::default()
        };
        assert!(output.failure().is_some());
    }

    #[test]
    fn test_success() {
        assert_eq!(CommandOutput::success("ok").failure(), None);
    }

    #[test]
    fn test_from_config() {
        let config = ToolConfig::new("/usr/local/bin/aranetctl");
        let runner = ProcessRunner::from_config(&config);
        assert_eq!(runner.program(), "/usr/local/bin/aranetctl");
        assert_eq!(runner.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let runner = ProcessRunner::new("aranet-bridge-test-no-such-program");
        let err = runner.run(&[]).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let runner = ProcessRunner::new("sh");
        let args = vec![
            "-c".to_string(),
            "echo 'Name: Office'; echo 'oops' >&2".to_string(),
        ];
        let output = runner.run(&args).await.unwrap();
        assert_eq!(output.stdout, "Name: Office\n");
        assert_eq!(output.stderr, "oops\n");
        assert_eq!(output.exit_code, Some(0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_child() {
        let runner = ProcessRunner::new("sleep").with_timeout(Duration::from_millis(50));
        let err = runner.run(&["5".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
