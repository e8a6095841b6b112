//! Linux distribution detection from `/etc/os-release`.

use anyhow::Result;
use log::debug;
use serde::Serialize;
use std::path::Path;

use crate::error::Error;
use crate::os_release::OsRelease;
use crate::package::PackageType;
use crate::runtime::Runtime;

/// Represents a distribution of Linux system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Distro {
    Unknown,
    Debian,
    Ubuntu,
    Fedora,
    CentOS,
    OpenSUSE,
    Arch,
    /// Manjaro Linux, based on Arch
    Manjaro,
}

/// `ID` values of os-release and the distribution each one names.
const ID_TO_DISTRO: &[(&str, Distro)] = &[
    ("debian", Distro::Debian),
    ("ubuntu", Distro::Ubuntu),
    ("centos", Distro::CentOS),
    ("fedora", Distro::Fedora),
    ("opensuse-leap", Distro::OpenSUSE),
    ("opensuse-tumbleweed", Distro::OpenSUSE),
    ("arch", Distro::Arch),
    ("manjaro", Distro::Manjaro),
];

impl Distro {
    /// Map an os-release `ID` to a distribution; unmapped IDs are `Unknown`.
    pub fn from_id(id: &str) -> Self {
        ID_TO_DISTRO
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, distro)| *distro)
            .unwrap_or(Distro::Unknown)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Distro::Unknown => "unknown distribution",
            Distro::Debian => "Debian",
            Distro::Ubuntu => "Ubuntu",
            Distro::Fedora => "Fedora",
            Distro::CentOS => "CentOS",
            Distro::OpenSUSE => "openSUSE",
            Distro::Arch => "Arch",
            Distro::Manjaro => "Manjaro",
        }
    }

    /// Package format of the distribution, if there is an adapter for it.
    pub fn package_type(&self) -> Option<PackageType> {
        match self {
            Distro::Debian | Distro::Ubuntu => Some(PackageType::Deb),
            Distro::Fedora | Distro::CentOS => Some(PackageType::Rpm),
            Distro::Arch | Distro::Manjaro => Some(PackageType::Pacman),
            Distro::OpenSUSE | Distro::Unknown => None,
        }
    }
}

impl std::fmt::Display for Distro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the Linux distribution described by the os-release file at `path`.
///
/// A missing file is not an error and yields [`Distro::Unknown`], as do a
/// missing or unmapped `ID`. A file that cannot be accessed or parsed is an
/// error.
pub fn detect<R: Runtime>(runtime: &R, path: &Path) -> Result<Distro> {
    if !runtime.exists(path)? {
        debug!("{:?} not found", path);
        return Ok(Distro::Unknown);
    }

    let release = OsRelease::read(runtime, path)?;
    let distro = match release.get("ID") {
        Ok(id) => Distro::from_id(id),
        Err(_) => Distro::Unknown,
    };
    debug!("Detected {}", distro);
    Ok(distro)
}

/// The `VERSION_ID` of the distribution, as a free-form string.
pub fn detect_version<R: Runtime>(runtime: &R, path: &Path) -> Result<String> {
    read_field(runtime, path, "VERSION_ID")
}

/// The `VERSION_CODENAME` of the distribution, e.g. `bookworm`.
pub fn detect_codename<R: Runtime>(runtime: &R, path: &Path) -> Result<String> {
    read_field(runtime, path, "VERSION_CODENAME")
}

fn read_field<R: Runtime>(runtime: &R, path: &Path, key: &str) -> Result<String> {
    if !runtime.exists(path)? {
        anyhow::bail!("{}", Distro::Unknown);
    }
    let release = OsRelease::read(runtime, path)?;
    Ok(release.get(key)?.to_string())
}
