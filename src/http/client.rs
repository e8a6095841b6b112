//! HTTP client with error handling. Downloads are attempted once; a failure
//! is returned to the caller as is.

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;

/// HTTP client for downloading small files into memory.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the crate's user agent.
    pub fn with_defaults() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("distpkg/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// Downloads the whole body of `url`.
    #[tracing::instrument(skip(self))]
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to start download request")?;

        let response = response
            .error_for_status()
            .with_context(|| format!("Failed to download {}", url))?;

        let bytes = response
            .bytes()
            .context("Failed to read download body")?;

        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
