//! User and group database lookups.

use anyhow::{Context, Result};

use super::RealRuntime;

/// A group as found in the system group database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub gid: u32,
}

#[cfg(unix)]
impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn current_username_impl(&self) -> Result<String> {
        use nix::unistd::{User, getuid};

        let uid = getuid();
        let user = User::from_uid(uid)
            .context("Failed to read the user database")?
            .with_context(|| format!("No user entry for uid {}", uid))?;
        Ok(user.name)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn lookup_group_impl(&self, name: &str) -> Result<Option<GroupEntry>> {
        use nix::unistd::Group;

        let group = Group::from_name(name).context("Failed to read the group database")?;
        Ok(group.map(|g| GroupEntry {
            name: g.name,
            gid: g.gid.as_raw(),
        }))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn user_group_ids_impl(&self, username: &str) -> Result<Option<Vec<u32>>> {
        use nix::unistd::{User, getgrouplist};
        use std::ffi::CString;

        let Some(user) = User::from_name(username).context("Failed to read the user database")?
        else {
            return Ok(None);
        };

        let c_name = CString::new(user.name.as_str())?;
        let gids = getgrouplist(&c_name, user.gid)
            .with_context(|| format!("Failed to list groups of {}", username))?;
        Ok(Some(gids.into_iter().map(|gid| gid.as_raw()).collect()))
    }
}

#[cfg(not(unix))]
impl RealRuntime {
    pub(crate) fn current_username_impl(&self) -> Result<String> {
        anyhow::bail!("user lookup is only supported on Unix")
    }

    pub(crate) fn lookup_group_impl(&self, _name: &str) -> Result<Option<GroupEntry>> {
        anyhow::bail!("group lookup is only supported on Unix")
    }

    pub(crate) fn user_group_ids_impl(&self, _username: &str) -> Result<Option<Vec<u32>>> {
        anyhow::bail!("group lookup is only supported on Unix")
    }
}
