//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over every OS facility the
//! crate touches, so adapters can be exercised against a mock and every
//! external command line checked without running it.
//!
//! # Structure
//!
//! - `env` - Environment variables and privilege information
//! - `fs` - File system operations (read, write, directories, removal)
//! - `process` - External process execution
//! - `user` - User and group database lookups

mod env;
mod fs;
mod process;
mod user;

use anyhow::Result;
use std::env as std_env;
use std::path::Path;

pub use process::{Capture, Completed, Invocation};
pub use user::GroupEntry;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    /// Whether `path` exists. Only a missing entry is `Ok(false)`; any other
    /// failure to stat it is an error.
    fn exists(&self, path: &Path) -> Result<bool>;
    fn is_dir(&self, path: &Path) -> bool;

    /// Create a single directory with the given Unix mode.
    fn create_dir(&self, path: &Path, mode: u32) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    // Privilege
    fn is_privileged(&self) -> bool;

    // Users and groups
    /// Name of the user owning the real UID of this process.
    fn current_username(&self) -> Result<String>;

    /// Look up a group by name. `Ok(None)` if the group does not exist.
    fn lookup_group(&self, name: &str) -> Result<Option<GroupEntry>>;

    /// Every group id the user belongs to, primary group included.
    /// `Ok(None)` if the user does not exist.
    fn user_group_ids(&self, username: &str) -> Result<Option<Vec<u32>>>;

    // Processes
    /// Run an external command to completion.
    ///
    /// Returns `Err` only when the process could not be started or waited on;
    /// the exit status is reported in [`Completed`] for the caller to judge.
    fn exec(&self, invocation: &Invocation) -> Result<Completed>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        self.create_dir_impl(path, mode)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn is_privileged(&self) -> bool {
        self.is_privileged_impl()
    }

    fn current_username(&self) -> Result<String> {
        self.current_username_impl()
    }

    fn lookup_group(&self, name: &str) -> Result<Option<GroupEntry>> {
        self.lookup_group_impl(name)
    }

    fn user_group_ids(&self, username: &str) -> Result<Option<Vec<u32>>> {
        self.user_group_ids_impl(username)
    }

    fn exec(&self, invocation: &Invocation) -> Result<Completed> {
        self.exec_impl(invocation)
    }
}
