//! Reusable command-execution configuration shared by an adapter's calls.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;

use crate::error::Error;
use crate::runtime::{Completed, Invocation, Runtime};

/// Environment and exit-status policy applied to every command an adapter
/// runs.
///
/// With no `bad_exit_codes`, any non-zero exit is a failure. When some are
/// given, only those codes are failures and other non-zero codes are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandConfig {
    pub env: Vec<(String, String)>,
    pub bad_exit_codes: Vec<i32>,
}

impl CommandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn bad_exit_codes(mut self, codes: &[i32]) -> Self {
        self.bad_exit_codes = codes.to_vec();
        self
    }

    /// Start an invocation of `program` carrying this configuration's env.
    pub fn command(&self, program: impl Into<PathBuf>) -> Invocation {
        Invocation::new(program).envs(&self.env)
    }

    /// Judge the exit status of a finished command.
    pub fn check_exit(&self, invocation: &Invocation, completed: &Completed) -> Result<(), Error> {
        let program = invocation.program_name();
        match completed.code {
            Some(0) => Ok(()),
            None => Err(Error::Signaled { program }),
            Some(code) if self.bad_exit_codes.is_empty() || self.bad_exit_codes.contains(&code) => {
                Err(Error::CommandFailed { program, code })
            }
            Some(code) => {
                warn!("{} exited with code {}, accepted", program, code);
                Ok(())
            }
        }
    }

    /// Run the command and fail on a bad exit status.
    pub fn run<R: Runtime>(&self, runtime: &R, invocation: &Invocation) -> Result<Completed> {
        let completed = self.spawn(runtime, invocation)?;
        self.check_exit(invocation, &completed)?;
        Ok(completed)
    }

    /// Run the command and fail if it wrote anything to stderr, then on a
    /// bad exit status.
    pub fn run_checking_stderr<R: Runtime>(
        &self,
        runtime: &R,
        invocation: &Invocation,
    ) -> Result<Completed> {
        let completed = self.spawn(runtime, invocation)?;
        check_stderr(&completed)?;
        self.check_exit(invocation, &completed)?;
        Ok(completed)
    }

    /// Run the command without judging its outcome.
    pub fn spawn<R: Runtime>(&self, runtime: &R, invocation: &Invocation) -> Result<Completed> {
        debug!("Running {}", invocation.command_line());
        runtime
            .exec(invocation)
            .with_context(|| format!("Failed to run {}", invocation.program_name()))
    }
}

/// Any output on stderr is an error carrying that output.
pub fn check_stderr(completed: &Completed) -> Result<(), Error> {
    let text = completed.stderr_text();
    if text.trim().is_empty() {
        Ok(())
    } else {
        Err(Error::Stderr(text))
    }
}
