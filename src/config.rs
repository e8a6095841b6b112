use std::path::{Path, PathBuf};

/// OS identification file read by distribution detection.
pub const OS_RELEASE: &str = "/etc/os-release";

/// Keyserver used when none is given to a key import.
pub const DEFAULT_KEYSERVER: &str = "hkp://keyserver.ubuntu.com:80";

/// Filesystem locations used by detection and the Debian adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub os_release: PathBuf,
    /// Directory holding `<alias>-archive-keyring.gpg` files
    pub keyrings_dir: PathBuf,
    /// Directory holding `<alias>.list` repository files
    pub sources_dir: PathBuf,
    /// GnuPG home that must exist before keys can be imported
    pub gnupg_dir: PathBuf,
    pub keyserver: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            os_release: PathBuf::from(OS_RELEASE),
            keyrings_dir: PathBuf::from("/usr/share/keyrings"),
            sources_dir: PathBuf::from("/etc/apt/sources.list.d"),
            gnupg_dir: PathBuf::from("/root/.gnupg"),
            keyserver: DEFAULT_KEYSERVER.to_string(),
        }
    }
}

impl Config {
    /// Default configuration with the given overrides applied.
    pub fn new(
        os_release: Option<PathBuf>,
        keyrings_dir: Option<PathBuf>,
        sources_dir: Option<PathBuf>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            os_release: os_release.unwrap_or(defaults.os_release),
            keyrings_dir: keyrings_dir.unwrap_or(defaults.keyrings_dir),
            sources_dir: sources_dir.unwrap_or(defaults.sources_dir),
            ..defaults
        }
    }

    pub fn keyring(&self, alias: &str) -> PathBuf {
        self.keyrings_dir
            .join(format!("{}-archive-keyring.gpg", alias))
    }

    pub fn repository(&self, alias: &str) -> PathBuf {
        self.sources_dir.join(format!("{}.list", alias))
    }

    pub fn os_release(&self) -> &Path {
        &self.os_release
    }
}
