//! Arch family adapter: `pacman`, with `paccache` for cache cleaning.

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use super::command::CommandConfig;
use super::{Manager, PackageType};
use crate::runtime::Runtime;

pub const PATH_PACMAN: &str = "/usr/bin/pacman";
pub const PATH_PACCACHE: &str = "/usr/bin/paccache";

pub struct Pacman<'a, R: Runtime> {
    runtime: &'a R,
    path_exec: PathBuf,
    cmd: CommandConfig,
}

impl<'a, R: Runtime> Pacman<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self {
            runtime,
            path_exec: PathBuf::from(PATH_PACMAN),
            cmd: CommandConfig::new(),
        }
    }

    fn run(&self, program: &Path, args: &[&str], names: &[&str]) -> Result<()> {
        let invocation = self
            .cmd
            .command(program)
            .args(args.iter().chain(names).copied());
        self.cmd.run(self.runtime, &invocation)?;
        Ok(())
    }

    fn pacman(&self, args: &[&str], names: &[&str]) -> Result<()> {
        self.run(&self.path_exec, args, names)
    }
}

impl<R: Runtime> Manager for Pacman<'_, R> {
    fn package_type(&self) -> PackageType {
        PackageType::Pacman
    }

    fn path_exec(&self) -> &Path {
        &self.path_exec
    }

    fn install(&self, names: &[&str]) -> Result<()> {
        info!("installing {}", names.join(" "));
        self.pacman(&["-S", "--needed", "--noprogressbar"], names)
    }

    fn remove(&self, names: &[&str]) -> Result<()> {
        info!("removing {}", names.join(" "));
        self.pacman(&["-Rs"], names)
    }

    fn purge(&self, names: &[&str]) -> Result<()> {
        info!("purging {}", names.join(" "));
        self.pacman(&["-Rsn"], names)
    }

    fn update_index(&self) -> Result<()> {
        info!("updating package index");
        self.pacman(&["-Sy", "--noprogressbar"], &[])
    }

    fn update(&self) -> Result<()> {
        info!("updating packages");
        self.pacman(&["-Syu", "--needed", "--noprogressbar"], &[])
    }

    fn upgrade(&self) -> Result<()> {
        info!("upgrading system");
        self.pacman(&["-Syu"], &[])
    }

    fn clean(&self) -> Result<()> {
        info!("cleaning package cache");
        self.run(Path::new(PATH_PACCACHE), &["-r"], &[])
    }
}
