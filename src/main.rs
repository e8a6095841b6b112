use anyhow::{Result, bail};
use clap::Parser;
use distpkg::config::Config;
use distpkg::distro::{self, Distro};
use distpkg::package::{self, Deb, Manager, PackageType};
use distpkg::runtime::{RealRuntime, Runtime};
use distpkg::user::{self, System};
use serde::Serialize;
use std::path::PathBuf;

/// distpkg - one interface to the Linux package managers
///
/// Detects the running distribution from /etc/os-release and drives its
/// package manager (apt-get, yum or pacman).
///
/// Examples:
///   distpkg info                  # Show the detected distribution
///   distpkg install curl git      # Install packages
///   distpkg group add docker      # Add the invoking user to a group
#[derive(Parser, Debug)]
#[command(author, version = env!("DISTPKG_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// OS identification file (also via DISTPKG_OS_RELEASE)
    #[arg(long, env = "DISTPKG_OS_RELEASE", value_name = "PATH", global = true)]
    os_release: Option<PathBuf>,

    /// Directory for signing keyrings (also via DISTPKG_KEYRINGS_DIR)
    #[arg(long, env = "DISTPKG_KEYRINGS_DIR", value_name = "DIR", global = true)]
    keyrings_dir: Option<PathBuf>,

    /// Directory for apt repository lists (also via DISTPKG_SOURCES_DIR)
    #[arg(long, env = "DISTPKG_SOURCES_DIR", value_name = "DIR", global = true)]
    sources_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show the detected distribution, its package type and managed paths
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install packages
    Install(PackagesArgs),

    /// Remove packages
    Remove(PackagesArgs),

    /// Remove packages and their configuration files
    Purge(PackagesArgs),

    /// Refresh the package index
    UpdateIndex,

    /// Update installed packages
    Update,

    /// Upgrade the whole system
    Upgrade,

    /// Clean the package cache
    Clean,

    /// Manage repository signing keys (Debian-based systems)
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Manage apt repositories (Debian-based systems)
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },

    /// Manage group membership of the invoking user
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
}

#[derive(clap::Args, Debug)]
struct PackagesArgs {
    /// Package names
    #[arg(required = true, value_name = "NAME")]
    names: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
enum KeyCommands {
    /// Download an armored key and store it as the keyring of ALIAS
    Import { alias: String, url: String },

    /// Receive a key from a keyserver into the keyring of ALIAS
    ImportServer {
        alias: String,
        key: String,
        /// Keyserver to query (defaults to hkp://keyserver.ubuntu.com:80)
        #[arg(long, default_value = "")]
        keyserver: String,
    },

    /// Delete the keyring of ALIAS
    Remove { alias: String },
}

#[derive(clap::Subcommand, Debug)]
enum RepoCommands {
    /// Add a repository signed by the keyring of ALIAS
    Add {
        alias: String,
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
    },

    /// Delete the repository and keyring of ALIAS
    Remove { alias: String },
}

#[derive(clap::Subcommand, Debug)]
enum GroupCommands {
    /// Add the invoking user to GROUP
    Add { group: String },
}

#[derive(Serialize, Debug)]
struct Info {
    distro: Distro,
    name: &'static str,
    version: Option<String>,
    package_type: Option<PackageType>,
    keyrings_dir: PathBuf,
    sources_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::new(
        cli.os_release.clone(),
        cli.keyrings_dir.clone(),
        cli.sources_dir.clone(),
    );
    run(&RealRuntime, &config, cli.command)
}

fn run<R: Runtime>(runtime: &R, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Info { json } => info(runtime, config, json)?,
        Commands::Install(args) => {
            package::detect_manager(runtime, config)?.install(&as_strs(&args.names))?
        }
        Commands::Remove(args) => {
            package::detect_manager(runtime, config)?.remove(&as_strs(&args.names))?
        }
        Commands::Purge(args) => {
            package::detect_manager(runtime, config)?.purge(&as_strs(&args.names))?
        }
        Commands::UpdateIndex => package::detect_manager(runtime, config)?.update_index()?,
        Commands::Update => package::detect_manager(runtime, config)?.update()?,
        Commands::Upgrade => package::detect_manager(runtime, config)?.upgrade()?,
        Commands::Clean => package::detect_manager(runtime, config)?.clean()?,
        Commands::Key { command } => {
            let deb = debian(runtime, config)?;
            match command {
                KeyCommands::Import { alias, url } => {
                    deb.pre_usage()?;
                    deb.import_key(&alias, &url)?
                }
                KeyCommands::ImportServer {
                    alias,
                    key,
                    keyserver,
                } => {
                    deb.pre_usage()?;
                    deb.import_key_from_server(&alias, &keyserver, &key)?
                }
                KeyCommands::Remove { alias } => deb.remove_key(&alias)?,
            }
        }
        Commands::Repo { command } => {
            let deb = debian(runtime, config)?;
            match command {
                RepoCommands::Add { alias, urls } => deb.add_repo(&alias, &as_strs(&urls))?,
                RepoCommands::Remove { alias } => deb.remove_repo(&alias)?,
            }
        }
        Commands::Group {
            command: GroupCommands::Add { group },
        } => {
            if let Some(msg) = user::add_group_from_cmd(runtime, System::current(), &group)? {
                print!("{}", msg);
            }
        }
    }
    Ok(())
}

fn info<R: Runtime>(runtime: &R, config: &Config, json: bool) -> Result<()> {
    let distro = distro::detect(runtime, config.os_release())?;
    let info = Info {
        distro,
        name: distro.name(),
        version: distro::detect_version(runtime, config.os_release()).ok(),
        package_type: distro.package_type(),
        keyrings_dir: config.keyrings_dir.clone(),
        sources_dir: config.sources_dir.clone(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Distribution: {}", info.name);
        println!("Version:      {}", info.version.as_deref().unwrap_or("-"));
        println!(
            "Packages:     {}",
            info.package_type
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        println!("Keyrings:     {}", info.keyrings_dir.display());
        println!("Sources:      {}", info.sources_dir.display());
    }
    Ok(())
}

fn debian<'a, R: Runtime>(runtime: &'a R, config: &Config) -> Result<Deb<'a, R>> {
    let distro = distro::detect(runtime, config.os_release())?;
    if distro.package_type() != Some(PackageType::Deb) {
        bail!(
            "keys and repositories can only be managed on Debian-based systems, not {}",
            distro
        );
    }
    Deb::new(runtime, config.clone())
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}
