use anyhow::Result;
use assert_cmd::Command;
use assert_cmd::cargo;
use distpkg::config::Config;
use distpkg::http::HttpClient;
use distpkg::package::{Deb, PATH_DEB, PATH_GPG};
use distpkg::runtime::{Completed, GroupEntry, Invocation, RealRuntime, Runtime};
use mockito::Server;
use std::env::VarError;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

const UBUNTU: &str = r#"PRETTY_NAME="Ubuntu 22.04.3 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
VERSION_CODENAME=jammy
ID=ubuntu
ID_LIKE=debian
"#;

/// Real filesystem, privileged, and every external command recorded instead
/// of run.
struct RecordingRuntime {
    real: RealRuntime,
    commands: Mutex<Vec<Invocation>>,
}

impl RecordingRuntime {
    fn new() -> Self {
        Self {
            real: RealRuntime,
            commands: Mutex::new(Vec::new()),
        }
    }

    fn command_lines(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }
}

impl Runtime for RecordingRuntime {
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        self.real.env_var(key)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.real.read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.real.write(path, contents)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.real.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.real.is_dir(path)
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        self.real.create_dir(path, mode)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.real.remove_file(path)
    }

    fn is_privileged(&self) -> bool {
        true
    }

    fn current_username(&self) -> Result<String> {
        Ok("root".to_string())
    }

    fn lookup_group(&self, name: &str) -> Result<Option<GroupEntry>> {
        Ok(Some(GroupEntry {
            name: name.to_string(),
            gid: 1000,
        }))
    }

    fn user_group_ids(&self, _username: &str) -> Result<Option<Vec<u32>>> {
        Ok(Some(vec![0]))
    }

    fn exec(&self, invocation: &Invocation) -> Result<Completed> {
        self.commands.lock().unwrap().push(invocation.clone());
        let mut completed = Completed::success();
        if invocation.program == Path::new(PATH_GPG) {
            completed.stdout = b"DEARMORED".to_vec();
        }
        Ok(completed)
    }
}

#[test]
fn test_import_key_add_repo_remove_repo_round_trip() {
    let dir = tempdir().unwrap();
    let keyrings = dir.path().join("keyrings");
    let sources = dir.path().join("sources.list.d");
    std::fs::create_dir(&keyrings).unwrap();
    std::fs::create_dir(&sources).unwrap();

    let mut server = Server::new();
    let _key = server
        .mock("GET", "/repo/key.gpg")
        .with_status(200)
        .with_body("ARMORED")
        .create();

    let config = Config {
        keyrings_dir: keyrings.clone(),
        sources_dir: sources.clone(),
        gnupg_dir: dir.path().join(".gnupg"),
        ..Config::default()
    };
    let runtime = RecordingRuntime::new();
    let deb = Deb::new(&runtime, config)
        .unwrap()
        .with_http_client(HttpClient::with_defaults().unwrap());

    let keyring = keyrings.join("example-archive-keyring.gpg");
    let list = sources.join("example.list");

    deb.pre_usage().unwrap();
    assert!(dir.path().join(".gnupg").is_dir());

    deb.import_key("example", &format!("{}/repo/key.gpg", server.url()))
        .unwrap();
    deb.add_repo("example", &["https://repo.example.com/debian"])
        .unwrap();

    assert_eq!(std::fs::read(&keyring).unwrap(), b"DEARMORED");
    assert_eq!(
        std::fs::read_to_string(&list).unwrap(),
        format!(
            "deb [signed-by={}] https://repo.example.com/debian main/\n",
            keyring.display()
        )
    );

    deb.remove_repo("example").unwrap();
    assert!(!keyring.exists());
    assert!(!list.exists());

    assert_eq!(
        runtime.command_lines(),
        vec![
            format!("{} --dearmor", PATH_GPG),
            format!("{} update -qq", PATH_DEB),
            format!("{} update -qq", PATH_DEB),
        ]
    );
}

#[test]
fn test_remove_repo_without_files_fails() {
    let dir = tempdir().unwrap();
    let config = Config {
        keyrings_dir: dir.path().to_path_buf(),
        sources_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let runtime = RecordingRuntime::new();
    let deb = Deb::new(&runtime, config).unwrap();

    assert!(deb.remove_repo("missing").is_err());
    assert!(runtime.command_lines().is_empty());
}

#[test]
fn test_cli_info() {
    let dir = tempdir().unwrap();
    let os_release = dir.path().join("os-release");
    std::fs::write(&os_release, UBUNTU).unwrap();

    Command::new(cargo::cargo_bin!("distpkg"))
        .arg("--os-release")
        .arg(&os_release)
        .arg("info")
        .assert()
        .success()
        .stdout(predicates::str::contains("Distribution: Ubuntu"))
        .stdout(predicates::str::contains("Version:      22.04"))
        .stdout(predicates::str::contains("Packages:     deb"));
}

#[test]
fn test_cli_info_json() {
    let dir = tempdir().unwrap();
    let os_release = dir.path().join("os-release");
    std::fs::write(&os_release, "ID=manjaro\nVERSION_ID=23.1\n").unwrap();

    let output = Command::new(cargo::cargo_bin!("distpkg"))
        .env("DISTPKG_OS_RELEASE", &os_release)
        .args(["info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["distro"], "Manjaro");
    assert_eq!(json["name"], "Manjaro");
    assert_eq!(json["version"], "23.1");
    assert_eq!(json["package_type"], "Pacman");
}

#[test]
fn test_cli_info_missing_os_release() {
    let dir = tempdir().unwrap();

    Command::new(cargo::cargo_bin!("distpkg"))
        .arg("--os-release")
        .arg(dir.path().join("absent"))
        .arg("info")
        .assert()
        .success()
        .stdout(predicates::str::contains("unknown distribution"));
}

#[test]
fn test_cli_info_unparsable_os_release() {
    let dir = tempdir().unwrap();
    let os_release = dir.path().join("os-release");
    std::fs::write(&os_release, "ID=debian\nnot a pair\n").unwrap();

    Command::new(cargo::cargo_bin!("distpkg"))
        .arg("--os-release")
        .arg(&os_release)
        .arg("info")
        .assert()
        .failure()
        .stderr(predicates::str::contains("line 2"));
}

#[test]
fn test_cli_install_on_unknown_distribution() {
    let dir = tempdir().unwrap();
    let os_release = dir.path().join("os-release");
    std::fs::write(&os_release, "ID=gentoo\n").unwrap();

    Command::new(cargo::cargo_bin!("distpkg"))
        .arg("--os-release")
        .arg(&os_release)
        .args(["install", "vim"])
        .assert()
        .failure()
        .stderr(predicates::str::contains(
            "no package manager available for unknown distribution",
        ));
}

#[test]
fn test_cli_repo_requires_debian() {
    let dir = tempdir().unwrap();
    let os_release = dir.path().join("os-release");
    std::fs::write(&os_release, "ID=arch\n").unwrap();

    Command::new(cargo::cargo_bin!("distpkg"))
        .arg("--os-release")
        .arg(&os_release)
        .args(["repo", "add", "example", "https://repo.example.com"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Debian-based systems, not Arch"));
}

#[test]
fn test_cli_paths_from_environment() {
    let dir = tempdir().unwrap();
    let os_release = dir.path().join("os-release");
    std::fs::write(&os_release, UBUNTU).unwrap();
    let keyrings = dir.path().join("keyrings");
    let sources = dir.path().join("sources.list.d");

    let output = Command::new(cargo::cargo_bin!("distpkg"))
        .env("DISTPKG_OS_RELEASE", &os_release)
        .env("DISTPKG_KEYRINGS_DIR", &keyrings)
        .env("DISTPKG_SOURCES_DIR", &sources)
        .args(["info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["keyrings_dir"], keyrings.display().to_string());
    assert_eq!(json["sources_dir"], sources.display().to_string());
}

#[test]
fn test_cli_flags_override_environment() {
    let dir = tempdir().unwrap();

    Command::new(cargo::cargo_bin!("distpkg"))
        .env("DISTPKG_OS_RELEASE", dir.path().join("absent"))
        .env("DISTPKG_SOURCES_DIR", "/from/env")
        .env_remove("DISTPKG_KEYRINGS_DIR")
        .args(["--sources-dir", "/from/flag", "info"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Sources:      /from/flag"))
        .stdout(predicates::str::contains("Keyrings:     /usr/share/keyrings"));
}
