pub mod config;
pub mod distro;
pub mod error;
pub mod http;
pub mod os_release;
pub mod package;
pub mod runtime;
pub mod user;
