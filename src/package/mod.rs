//! Package-manager adapters, one per distribution family.
//!
//! Every adapter implements [`Manager`] by running one fixed command line per
//! operation. The Debian adapter additionally manages signing keys and
//! repository files.

mod command;
mod deb;
mod pacman;
mod rpm;

use anyhow::Result;
use log::info;
use serde::Serialize;
use std::path::Path;

use crate::config::Config;
use crate::distro::{self, Distro};
use crate::error::Error;
use crate::runtime::Runtime;

pub use command::{CommandConfig, check_stderr};
pub use deb::{Deb, PATH_DEB, PATH_GPG};
pub use pacman::{PATH_PACCACHE, PATH_PACMAN, Pacman};
pub use rpm::{PATH_RPM, Rpm};

/// Package format handled by an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PackageType {
    Deb,
    Rpm,
    Pacman,
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageType::Deb => write!(f, "deb"),
            PackageType::Rpm => write!(f, "rpm"),
            PackageType::Pacman => write!(f, "pacman"),
        }
    }
}

/// The capability set common to every package manager.
pub trait Manager {
    fn package_type(&self) -> PackageType;

    /// Path of the package manager binary.
    fn path_exec(&self) -> &Path;

    fn install(&self, names: &[&str]) -> Result<()>;
    fn remove(&self, names: &[&str]) -> Result<()>;
    /// Remove packages together with their configuration files.
    fn purge(&self, names: &[&str]) -> Result<()>;
    /// Refresh the package index without upgrading anything.
    fn update_index(&self) -> Result<()>;
    fn update(&self) -> Result<()>;
    fn upgrade(&self) -> Result<()>;
    /// Clean the package cache.
    fn clean(&self) -> Result<()>;
}

/// Return the adapter for `distro`.
pub fn new_manager<'a, R: Runtime>(
    runtime: &'a R,
    distro: Distro,
    config: &Config,
) -> Result<Box<dyn Manager + 'a>> {
    let package_type = distro
        .package_type()
        .ok_or_else(|| Error::UnsupportedDistro(distro.to_string()))?;
    info!("Using the {} package manager for {}", package_type, distro);

    Ok(match package_type {
        PackageType::Deb => Box::new(Deb::new(runtime, config.clone())?),
        PackageType::Rpm => Box::new(Rpm::new(runtime)),
        PackageType::Pacman => Box::new(Pacman::new(runtime)),
    })
}

/// Detect the running distribution and return its adapter.
pub fn detect_manager<'a, R: Runtime>(
    runtime: &'a R,
    config: &Config,
) -> Result<Box<dyn Manager + 'a>> {
    let distro = distro::detect(runtime, config.os_release())?;
    new_manager(runtime, distro, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn test_new_manager_by_family() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_privileged().return_const(true);
        let config = Config::default();

        let cases = [
            (Distro::Debian, PackageType::Deb, "/usr/bin/apt-get"),
            (Distro::Ubuntu, PackageType::Deb, "/usr/bin/apt-get"),
            (Distro::Fedora, PackageType::Rpm, "/usr/bin/yum"),
            (Distro::CentOS, PackageType::Rpm, "/usr/bin/yum"),
            (Distro::Arch, PackageType::Pacman, "/usr/bin/pacman"),
            (Distro::Manjaro, PackageType::Pacman, "/usr/bin/pacman"),
        ];
        for (distro, package_type, path) in cases {
            let manager = new_manager(&runtime, distro, &config).unwrap();
            assert_eq!(manager.package_type(), package_type);
            assert_eq!(manager.path_exec(), Path::new(path));
        }
    }

    #[test]
    fn test_new_manager_unsupported() {
        let runtime = MockRuntime::new();
        let config = Config::default();

        for distro in [Distro::Unknown, Distro::OpenSUSE] {
            let err = new_manager(&runtime, distro, &config).err().unwrap();
            assert_eq!(
                err.downcast_ref::<Error>(),
                Some(&Error::UnsupportedDistro(distro.to_string()))
            );
        }
    }

    #[test]
    fn test_new_manager_deb_requires_superuser() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_privileged().return_const(false);

        let err = new_manager(&runtime, Distro::Debian, &Config::default())
            .err()
            .unwrap();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::NotSuperUser));
    }

    #[test]
    fn test_detect_manager() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/etc/os-release");
        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| Ok(true));
        runtime
            .expect_read_to_string()
            .with(eq(path))
            .returning(|_| Ok("ID=manjaro\n".to_string()));

        let manager = detect_manager(&runtime, &Config::default()).unwrap();
        assert_eq!(manager.package_type(), PackageType::Pacman);
    }

    #[test]
    fn test_package_type_display() {
        assert_eq!(PackageType::Deb.to_string(), "deb");
        assert_eq!(PackageType::Rpm.to_string(), "rpm");
        assert_eq!(PackageType::Pacman.to_string(), "pacman");
    }
}
