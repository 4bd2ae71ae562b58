//! Mock runner for testing without the external tool.
//!
//! [`MockRunner`] implements [`CommandRunner`] by replaying queued responses
//! in order and recording the arguments of every call. Once the queue is
//! empty it returns the fallback output (empty, successful by default).
//!
//! # Features
//!
//! - **Canned output**: queue captured tool output for scan and read calls
//! - **Failure injection**: queue stderr text, exit codes or I/O errors
//! - **Latency simulation**: delay each call to exercise timeouts

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::runner::{CommandOutput, CommandRunner};

#[derive(Debug)]
enum MockResponse {
    Output(CommandOutput),
    Io(std::io::ErrorKind, String),
}

/// A scripted [`CommandRunner`].
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: Mutex<VecDeque<MockResponse>>,
    fallback: Mutex<CommandOutput>,
    calls: Mutex<Vec<Vec<String>>>,
    call_count: AtomicU32,
    /// Simulated latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
}

impl MockRunner {
    /// Create a runner with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub async fn push_output(&self, stdout: impl Into<String>) {
        self.push(MockResponse::Output(CommandOutput::success(stdout)))
            .await;
    }

    /// Queue a response that writes to stderr.
    pub async fn push_stderr(&self, stdout: impl Into<String>, stderr: impl Into<String>) {
        self.push(MockResponse::Output(CommandOutput {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: Some(1),
        }))
        .await;
    }

    /// Queue a response with a specific exit code and empty stderr.
    pub async fn push_exit_code(&self, stdout: impl Into<String>, code: i32) {
        self.push(MockResponse::Output(CommandOutput {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(code),
        }))
        .await;
    }

    /// Queue an I/O error, as if the tool could not be spawned.
    pub async fn push_io_error(&self, kind: std::io::ErrorKind, message: impl Into<String>) {
        self.push(MockResponse::Io(kind, message.into())).await;
    }

    /// Set the output returned once the queue is empty.
    pub async fn set_fallback(&self, output: CommandOutput) {
        *self.fallback.lock().await = output;
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Arguments of every call so far.
    pub async fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().await.clone()
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    async fn push(&self, response: MockResponse) {
        self.responses.lock().await.push_back(response);
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, args: &[String]) -> Result<CommandOutput> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.calls.lock().await.push(args.to_vec());

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let next = self.responses.lock().await.pop_front();
        match next {
            Some(MockResponse::Output(output)) => Ok(output),
            Some(MockResponse::Io(kind, message)) => {
                Err(std::io::Error::new(kind, message).into())
            }
            None => Ok(self.fallback.lock().await.clone()),
        }
    }
}
