//! External process execution
//!
//! Every call to `git`, `docker`, `kubectl` or `gcloud` goes through a
//! [`ToolRunner`], so commands can be tested against a scripted runner.

use async_trait::async_trait;
use kubic_core::Ci3Error;
use std::fmt;
use std::io;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// A single external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name, looked up on PATH
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Text written to the program's stdin, which is then closed
    pub stdin: Option<String>,
    /// Capture stdout/stderr instead of relaying them to the terminal
    pub capture: bool,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            capture: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feeds `input` to the program's stdin
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Captures output so it can be inspected
    pub fn capture(mut self) -> Self {
        self.capture = true;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, None when killed by a signal
    pub code: Option<i32>,
    /// Captured stdout (empty when relayed)
    pub stdout: String,
    /// Captured stderr (empty when relayed)
    pub stderr: String,
}

impl ToolOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turns a non-zero exit into a [`Ci3Error::ToolFailed`]
    ///
    /// # Returns
    /// The captured stdout on success
    pub fn check(self, action: &str, target: &str) -> Result<String, Ci3Error> {
        if self.success() {
            return Ok(self.stdout);
        }

        let stderr = self.stderr.trim();
        let message = if stderr.is_empty() {
            match self.code {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            }
        } else {
            stderr.to_string()
        };
        Err(Ci3Error::tool_failed(action, target, message))
    }
}

/// Runs external tools
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs the invocation to completion
    ///
    /// An error means the process could not be started or waited on; a
    /// non-zero exit is reported through [`ToolOutput::code`].
    async fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput>;
}

/// Runs an invocation and maps every failure to [`Ci3Error::ToolFailed`]
pub async fn run_checked(
    runner: &dyn ToolRunner,
    invocation: Invocation,
    action: &str,
    target: &str,
) -> Result<String, Ci3Error> {
    let output = runner.run(&invocation).await.map_err(|e| {
        Ci3Error::tool_failed(
            action,
            target,
            format!("could not run `{}`: {}", invocation.program, e),
        )
    })?;
    output.check(action, target)
}

/// Runner spawning real processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        debug!("Running: {}", invocation);

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        command.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        if invocation.capture {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let mut child = command.spawn()?;

        if let Some(input) = &invocation.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
        }

        let output = child.wait_with_output().await?;
        let result = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.stderr.trim().is_empty() {
            debug!("{} stderr: {}", invocation.program, result.stderr.trim());
        }
        debug!("{} exited with {:?}", invocation.program, result.code);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("kubectl").args(["apply", "-f", "-"]);
        assert_eq!(inv.to_string(), "kubectl apply -f -");
        assert!(!inv.capture);
        assert!(inv.stdin.is_none());
    }

    #[test]
    fn test_check_success_returns_stdout() {
        let out = ToolOutput::ok("main\n");
        assert_eq!(out.check("read branch", "HEAD").unwrap(), "main\n");
    }

    #[test]
    fn test_check_failure_uses_stderr() {
        let err = ToolOutput::failed(1, "no such image\n")
            .check("push docker image", "web:latest")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to push docker image `web:latest`: no such image"
        );
    }

    #[test]
    fn test_check_failure_without_stderr() {
        let err = ToolOutput::failed(2, "").check("build", "web").unwrap_err();
        assert!(err.to_string().ends_with("exited with status 2"));
    }

    #[tokio::test]
    async fn test_system_runner_captures_stdout() {
        let inv = Invocation::new("echo").arg("hello").capture();
        let out = SystemRunner::new().run(&inv).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_system_runner_pipes_stdin() {
        let inv = Invocation::new("cat").stdin("kind: Namespace\n").capture();
        let out = SystemRunner::new().run(&inv).await.unwrap();
        assert_eq!(out.stdout, "kind: Namespace\n");
    }

    #[tokio::test]
    async fn test_run_checked_failure() {
        let inv = Invocation::new("false").capture();
        let err = run_checked(&SystemRunner::new(), inv, "run", "false")
            .await
            .unwrap_err();
        assert!(matches!(err, Ci3Error::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_run_checked_missing_program() {
        let inv = Invocation::new("kubic-definitely-not-installed").capture();
        let err = run_checked(&SystemRunner::new(), inv, "run", "tool")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could not run"));
    }
}
