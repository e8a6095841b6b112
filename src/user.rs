//! User and group administration.

use anyhow::Result;
use log::{debug, info};

use crate::error::Error;
use crate::package::check_stderr;
use crate::runtime::{Capture, Invocation, Runtime};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    Linux,
    MacOS,
    FreeBSD,
    Windows,
    Other,
}

impl System {
    /// The system this binary was built for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => System::Linux,
            "macos" => System::MacOS,
            "freebsd" => System::FreeBSD,
            "windows" => System::Windows,
            _ => System::Other,
        }
    }
}

impl std::fmt::Display for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            System::Linux => "Linux",
            System::MacOS => "macOS",
            System::FreeBSD => "FreeBSD",
            System::Windows => "Windows",
            System::Other => "unknown system",
        };
        write!(f, "{}", name)
    }
}

/// The user who invoked the program, looking through `sudo`.
pub fn real_user<R: Runtime>(runtime: &R) -> Result<String> {
    match runtime.env_var("SUDO_USER") {
        Ok(name) if !name.is_empty() => Ok(name),
        _ => runtime.current_username(),
    }
}

/// Add the real user to `group` unless already a member.
///
/// Returns a message telling the user to reboot when the membership was
/// changed, `None` when nothing had to be done.
///
/// # Panics
///
/// On any system other than Linux.
pub fn add_group_from_cmd<R: Runtime>(
    runtime: &R,
    system: System,
    group: &str,
) -> Result<Option<String>> {
    if system != System::Linux {
        unimplemented!("{}", system);
    }

    let username = real_user(runtime)?;

    let grp = runtime
        .lookup_group(group)?
        .ok_or_else(|| Error::GroupNotFound(group.to_string()))?;
    let groups = runtime
        .user_group_ids(&username)?
        .ok_or_else(|| Error::UserNotFound(username.clone()))?;

    if groups.contains(&grp.gid) {
        debug!("{} is already in group {}", username, group);
        return Ok(None);
    }

    info!("adding {} to group {}", username, group);
    let invocation = Invocation::new("usermod")
        .args(["-aG", group, username.as_str()])
        .capture(Capture::Stderr);
    let completed = runtime.exec(&invocation)?;
    check_stderr(&completed)?;
    match completed.code {
        Some(0) => {}
        Some(code) => {
            return Err(Error::CommandFailed {
                program: invocation.program_name(),
                code,
            }
            .into());
        }
        None => {
            return Err(Error::Signaled {
                program: invocation.program_name(),
            }
            .into());
        }
    }

    Ok(Some(format!(
        "the user {:?} has been added to the group {:?}.\nYou MUST reboot the system.\n",
        username, group
    )))
}
