use crate::domain::model::HttpSample;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// One invocation of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Every external program goes through this seam.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion. A non-zero exit is reported through
    /// `CommandOutput::success`, not as an error; spawn failures and
    /// timeouts are errors.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    fn is_available(&self, program: &str) -> bool;
}

#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Fetches `url` including the full body and reports status and total time.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<HttpSample>;
}

pub trait ResourceProbe: Send + Sync {
    /// Used percentage of the filesystem that holds `path`.
    fn disk_usage_percent(&self, path: &Path) -> Result<f64>;
    fn memory_usage_percent(&self) -> Result<f64>;
}
