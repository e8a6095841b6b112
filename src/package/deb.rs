//! Debian family adapter: `apt-get`, plus signing keys and repositories.
//!
//! `apt-get` is used rather than `apt` since its output is stable for
//! scripts. Keys are stored as dearmored keyrings under the keyrings
//! directory and referenced from the repository file with `signed-by`, which
//! replaces the deprecated `apt-key`.

use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::command::{CommandConfig, check_stderr};
use super::{Manager, PackageType};
use crate::config::Config;
use crate::error::Error;
use crate::http::HttpClient;
use crate::runtime::{Capture, Runtime};

pub const PATH_DEB: &str = "/usr/bin/apt-get";
pub const PATH_GPG: &str = "/usr/bin/gpg";

/// Exit code apt-get uses for every error.
const APT_ERROR_CODE: i32 = 100;

pub struct Deb<'a, R: Runtime> {
    runtime: &'a R,
    path_exec: PathBuf,
    cmd: CommandConfig,
    /// gpg shares apt's environment, but any non-zero exit is a failure
    gpg: CommandConfig,
    config: Config,
    http: HttpClient,
}

impl<'a, R: Runtime> Deb<'a, R> {
    /// Create the adapter. Managing packages needs superuser privileges.
    pub fn new(runtime: &'a R, config: Config) -> Result<Self> {
        if !runtime.is_privileged() {
            return Err(Error::NotSuperUser.into());
        }

        let noninteractive = CommandConfig::new().env("DEBIAN_FRONTEND", "noninteractive");
        Ok(Self {
            runtime,
            path_exec: PathBuf::from(PATH_DEB),
            cmd: noninteractive.clone().bad_exit_codes(&[APT_ERROR_CODE]),
            gpg: noninteractive,
            config,
            http: HttpClient::with_defaults()?,
        })
    }

    pub fn with_path_exec(mut self, path: impl Into<PathBuf>) -> Self {
        self.path_exec = path.into();
        self
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn keyring(&self, alias: &str) -> PathBuf {
        self.config.keyring(alias)
    }

    pub fn repository(&self, alias: &str) -> PathBuf {
        self.config.repository(alias)
    }

    fn apt(&self, args: &[&str]) -> Result<()> {
        let invocation = self.cmd.command(&self.path_exec).args(args.iter().copied());
        self.cmd.run(self.runtime, &invocation)?;
        Ok(())
    }

    fn apt_with_names(&self, args: &[&str], names: &[&str]) -> Result<()> {
        let all: Vec<&str> = args.iter().chain(names).copied().collect();
        self.apt(&all)
    }

    /// Make sure the GnuPG home exists, which gpg needs to import keys.
    pub fn pre_usage(&self) -> Result<()> {
        let dir = &self.config.gnupg_dir;

        if !self.runtime.exists(dir)? {
            debug!("Creating {:?}", dir);
            return self.runtime.create_dir(dir, 0o700);
        }
        if !self.runtime.is_dir(dir) {
            return Err(Error::NotADirectory(dir.clone()).into());
        }
        Ok(())
    }

    /// Download an armored signing key and store it dearmored as the keyring
    /// of `alias`.
    pub fn import_key(&self, alias: &str, key_url: &str) -> Result<()> {
        info!("importing key");
        if !url_has_file(key_url) {
            return Err(Error::KeyUrl(key_url.to_string()).into());
        }

        let key = self.http.download(key_url)?;

        let invocation = self
            .gpg
            .command(PATH_GPG)
            .arg("--dearmor")
            .stdin(key)
            .capture(Capture::All);
        let completed = self.gpg.spawn(self.runtime, &invocation)?;
        check_stderr(&completed)?;
        self.gpg.check_exit(&invocation, &completed)?;

        self.runtime.write(&self.keyring(alias), &completed.stdout)
    }

    /// Receive `key` from a keyserver into the keyring of `alias`.
    ///
    /// An empty `keyserver` uses the configured default.
    pub fn import_key_from_server(&self, alias: &str, keyserver: &str, key: &str) -> Result<()> {
        info!("importing key from server");
        let keyserver = if keyserver.is_empty() {
            self.config.keyserver.as_str()
        } else {
            keyserver
        };

        let keyring = self.keyring(alias);
        let invocation = self
            .gpg
            .command(PATH_GPG)
            .args(["--no-default-keyring", "--keyring"])
            .arg(keyring.display().to_string())
            .args(["--keyserver", keyserver, "--recv-keys", key])
            .capture(Capture::Stderr);
        let completed = self.gpg.spawn(self.runtime, &invocation)?;

        // gpg reports progress on stderr, only a failure is an error here
        let stderr = completed.stderr_text();
        if stderr.contains("failed") {
            return Err(Error::Stderr(stderr).into());
        }
        self.gpg.check_exit(&invocation, &completed)?;
        Ok(())
    }

    pub fn remove_key(&self, alias: &str) -> Result<()> {
        info!("removing key");
        self.runtime.remove_file(&self.keyring(alias))
    }

    /// Write the repository file of `alias` for the first of `urls`, signed
    /// by the keyring of `alias`, then refresh the index.
    ///
    /// The repository file is left in place if the refresh fails.
    pub fn add_repo(&self, alias: &str, urls: &[&str]) -> Result<()> {
        info!("adding repository");
        let url = urls.first().ok_or(Error::NoRepoUrl)?;

        let content = format!(
            "deb [signed-by={}] {} main/\n",
            self.keyring(alias).display(),
            url
        );
        self.runtime
            .write(&self.repository(alias), content.as_bytes())?;

        self.update_index()
    }

    /// Delete the keyring and the repository file of `alias`, then refresh
    /// the index. Stops at the first failure.
    pub fn remove_repo(&self, alias: &str) -> Result<()> {
        info!("removing repository");
        self.runtime.remove_file(&self.keyring(alias))?;
        self.runtime.remove_file(&self.repository(alias))?;

        self.update_index()
    }
}

/// Whether the last path segment of `url` looks like a file name.
fn url_has_file(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .is_some_and(|file| file.contains('.'))
}

impl<R: Runtime> Manager for Deb<'_, R> {
    fn package_type(&self) -> PackageType {
        PackageType::Deb
    }

    fn path_exec(&self) -> &Path {
        &self.path_exec
    }

    fn install(&self, names: &[&str]) -> Result<()> {
        info!("installing {}", names.join(" "));
        self.apt_with_names(&["install", "-y"], names)
    }

    fn remove(&self, names: &[&str]) -> Result<()> {
        info!("removing {}", names.join(" "));
        self.apt_with_names(&["remove", "-y"], names)
    }

    fn purge(&self, names: &[&str]) -> Result<()> {
        info!("purging {}", names.join(" "));
        self.apt_with_names(&["purge", "-y"], names)
    }

    fn update_index(&self) -> Result<()> {
        info!("updating package index");
        let invocation = self
            .cmd
            .command(&self.path_exec)
            .args(["update", "-qq"])
            .capture(Capture::Stderr);
        self.cmd.run_checking_stderr(self.runtime, &invocation)?;
        Ok(())
    }

    fn update(&self) -> Result<()> {
        info!("updating packages");
        self.apt(&["upgrade", "-y"])
    }

    fn upgrade(&self) -> Result<()> {
        info!("upgrading system");
        self.apt(&["dist-upgrade", "-y"])
    }

    fn clean(&self) -> Result<()> {
        info!("cleaning package cache");
        self.apt(&["autoremove", "-y"])?;
        self.apt(&["clean"])
    }
}
