//! Blocking HTTP client used to fetch signing keys.

mod client;

pub use client::HttpClient;
