//! Test doubles for the ports.

use crate::domain::model::HttpSample;
use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec, HttpProbe, ResourceProbe};
use crate::utils::error::{Result, SiteOpsError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

type Handler = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync>;

/// Records every invocation. Programs without a handler succeed silently.
/// Handlers are looked up by "program first-arg" first, then by program.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    handlers: HashMap<String, Handler>,
    unavailable: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, key: &str, handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        self.handlers.insert(key.to_string(), Box::new(handler));
        self
    }

    pub fn without(mut self, program: &str) -> Self {
        self.unavailable.insert(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        let keyed = spec
            .args
            .first()
            .map(|first| format!("{} {}", spec.program, first));
        let handler = keyed
            .and_then(|k| self.handlers.get(&k))
            .or_else(|| self.handlers.get(&spec.program));
        match handler {
            Some(handler) => handler(spec),
            None => Ok(ok_output("")),
        }
    }

    fn is_available(&self, program: &str) -> bool {
        !self.unavailable.contains(program)
    }
}

pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

pub fn failed_output(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Handler that writes `size` bytes to the argument `from_end` places from the end.
pub fn writes_file(
    from_end: usize,
    size: usize,
) -> impl Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync + 'static {
    move |spec: &CommandSpec| {
        let index = spec.args.len() - 1 - from_end;
        std::fs::write(&spec.args[index], vec![0u8; size])?;
        Ok(ok_output(""))
    }
}

pub fn command_error(program: &'static str) -> impl Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync + 'static {
    move |_spec: &CommandSpec| Err(SiteOpsError::command(program, "simulated failure"))
}

/// Replays queued samples; an exhausted queue yields a network error.
#[derive(Default)]
pub struct ScriptedProbe {
    samples: Mutex<VecDeque<Result<HttpSample>>>,
    pub requests: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn with(samples: Vec<Result<HttpSample>>) -> Self {
        Self {
            samples: Mutex::new(samples.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn status(status: u16, millis: u64) -> Result<HttpSample> {
        Ok(HttpSample {
            status,
            elapsed: Duration::from_millis(millis),
        })
    }
}

#[async_trait]
impl HttpProbe for ScriptedProbe {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<HttpSample> {
        self.requests.lock().unwrap().push(url.to_string());
        self.samples
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SiteOpsError::processing("connection refused")))
    }
}

pub struct FixedResources {
    pub disk: f64,
    pub memory: f64,
    pub disk_paths: Mutex<Vec<PathBuf>>,
}

impl FixedResources {
    pub fn new(disk: f64, memory: f64) -> Self {
        Self {
            disk,
            memory,
            disk_paths: Mutex::new(Vec::new()),
        }
    }
}

impl ResourceProbe for FixedResources {
    fn disk_usage_percent(&self, path: &Path) -> Result<f64> {
        self.disk_paths.lock().unwrap().push(path.to_path_buf());
        Ok(self.disk)
    }

    fn memory_usage_percent(&self) -> Result<f64> {
        Ok(self.memory)
    }
}
