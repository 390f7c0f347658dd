use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec};
use crate::utils::error::{Result, SiteOpsError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs real programs with `tokio::process`. The child is killed when its
/// timeout expires.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("Running: {} {}", spec.program, spec.args.join(" "));

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| SiteOpsError::command(&spec.program, format!("failed to start: {}", e)))?;

        // Fed from a separate task so a chatty child cannot block on a full stdout pipe.
        if let (Some(input), Some(mut stdin)) = (spec.stdin.clone(), child.stdin.take()) {
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&input).await {
                    tracing::debug!("stdin closed early: {}", e);
                }
            });
        }

        match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(CommandOutput {
                    success: output.status.success(),
                    code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            Err(_) => Err(SiteOpsError::CommandTimeout {
                program: spec.program.clone(),
                seconds: spec.timeout.as_secs(),
            }),
        }
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
