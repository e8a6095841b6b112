//! External process execution.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::RealRuntime;

/// Which output streams of a child process are captured.
///
/// Streams that are not captured are inherited from the current process, so
/// package manager progress goes straight to the user's terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    #[default]
    Inherit,
    Stderr,
    All,
}

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub stdin: Option<Vec<u8>>,
    pub capture: Capture,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
            capture: Capture::Inherit,
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

    pub fn envs(mut self, env: &[(String, String)]) -> Self {
        self.env.extend_from_slice(env);
        self
    }

    pub fn stdin(mut self, input: Vec<u8>) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// The program name as shown in messages.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Program and arguments joined by spaces, for logging.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program_name())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completed {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Completed {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Default::default()
        }
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self, invocation), fields(command = %invocation.command_line()))]
    pub(crate) fn exec_impl(&self, invocation: &Invocation) -> Result<Completed> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        for (key, value) in &invocation.env {
            command.env(key, value);
        }

        command.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        match invocation.capture {
            Capture::Inherit => {
                command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            Capture::Stderr => {
                command.stdout(Stdio::inherit()).stderr(Stdio::piped());
            }
            Capture::All => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to execute {}", invocation.program_name()))?;

        // Feed stdin from a separate thread so a child filling its stdout pipe
        // cannot block us while we are still writing.
        let output = std::thread::scope(|scope| {
            let writer = match (child.stdin.take(), invocation.stdin.as_deref()) {
                (Some(mut pipe), Some(input)) => {
                    Some(scope.spawn(move || pipe.write_all(input)))
                }
                _ => None,
            };
            let output = child.wait_with_output();
            if let Some(writer) = writer {
                // A broken pipe only means the child stopped reading early.
                let _ = writer.join();
            }
            output
        })
        .with_context(|| format!("Failed to wait for {}", invocation.program_name()))?;

        Ok(Completed {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
