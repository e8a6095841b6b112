//! Parser for the shell-style `KEY=value` format of `/etc/os-release`.

use anyhow::Result;
use std::path::Path;

use crate::error::Error;
use crate::runtime::Runtime;

/// The key/value pairs of an os-release file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    entries: Vec<(String, String)>,
}

impl OsRelease {
    /// Read and parse the file at `path`.
    pub fn read<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        Ok(Self::parse(&content)?)
    }

    pub fn parse(content: &str) -> Result<Self, Error> {
        let mut release = Self::default();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parse_err = |reason: &str| Error::OsReleaseParse {
                line: idx + 1,
                reason: reason.to_string(),
            };

            let (key, value) = line.split_once('=').ok_or_else(|| parse_err("missing '='"))?;
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(parse_err("invalid key"));
            }
            let value = parse_value(value).map_err(|reason| parse_err(reason))?;
            release.insert(key, value);
        }

        Ok(release)
    }

    fn insert(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Value of `key`, failing with [`Error::KeyNotFound`] if absent.
    pub fn get(&self, key: &str) -> Result<&str, Error> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }
}

fn parse_value(raw: &str) -> Result<String, &'static str> {
    let mut chars = raw.chars();
    let value = match chars.next() {
        Some('"') => {
            let mut value = String::new();
            loop {
                match chars.next() {
                    None => return Err("unterminated double quote"),
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(c @ ('"' | '\\' | '$' | '`')) => value.push(c),
                        Some(c) => {
                            value.push('\\');
                            value.push(c);
                        }
                        None => return Err("unterminated double quote"),
                    },
                    Some(c) => value.push(c),
                }
            }
            value
        }
        Some('\'') => {
            let rest = chars.as_str();
            let end = rest.find('\'').ok_or("unterminated single quote")?;
            let value = rest[..end].to_string();
            chars = rest[end + 1..].chars();
            value
        }
        _ => return Ok(raw.trim().to_string()),
    };

    let trailing = chars.as_str().trim_start();
    if !trailing.is_empty() && !trailing.starts_with('#') {
        return Err("unexpected text after quoted value");
    }
    Ok(value)
}
