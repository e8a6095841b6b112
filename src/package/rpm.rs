//! RPM family adapter: `yum`.

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use super::command::CommandConfig;
use super::{Manager, PackageType};
use crate::runtime::Runtime;

pub const PATH_RPM: &str = "/usr/bin/yum";

pub struct Rpm<'a, R: Runtime> {
    runtime: &'a R,
    path_exec: PathBuf,
    cmd: CommandConfig,
}

impl<'a, R: Runtime> Rpm<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self {
            runtime,
            path_exec: PathBuf::from(PATH_RPM),
            cmd: CommandConfig::new(),
        }
    }

    fn yum(&self, args: &[&str], names: &[&str]) -> Result<()> {
        let invocation = self
            .cmd
            .command(&self.path_exec)
            .args(args.iter().chain(names).copied());
        self.cmd.run(self.runtime, &invocation)?;
        Ok(())
    }
}

impl<R: Runtime> Manager for Rpm<'_, R> {
    fn package_type(&self) -> PackageType {
        PackageType::Rpm
    }

    fn path_exec(&self) -> &Path {
        &self.path_exec
    }

    fn install(&self, names: &[&str]) -> Result<()> {
        info!("installing {}", names.join(" "));
        self.yum(&["install"], names)
    }

    fn remove(&self, names: &[&str]) -> Result<()> {
        info!("removing {}", names.join(" "));
        self.yum(&["remove"], names)
    }

    /// yum has no notion of configuration purging.
    fn purge(&self, names: &[&str]) -> Result<()> {
        self.remove(names)
    }

    fn update_index(&self) -> Result<()> {
        info!("updating package index");
        self.yum(&["makecache"], &[])
    }

    fn update(&self) -> Result<()> {
        info!("updating packages");
        self.yum(&["update"], &[])
    }

    fn upgrade(&self) -> Result<()> {
        info!("upgrading system");
        self.yum(&["update"], &[])
    }

    fn clean(&self) -> Result<()> {
        info!("cleaning package cache");
        self.yum(&["clean", "packages"], &[])
    }
}
