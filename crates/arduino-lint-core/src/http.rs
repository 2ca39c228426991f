//! Blocking HTTP access for URL liveness checks and index downloads.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, trace};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A shared blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Result<Client, String>,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!("arduino-lint/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| e.to_string());
        Self { client, timeout }
    }

    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client(&self) -> Result<&Client, String> {
        self.client.as_ref().map_err(Clone::clone)
    }

    /// Checks that `url` answers a HEAD request with 200.
    ///
    /// # Errors
    ///
    /// Returns the response status (`404 Not Found`) or the transport
    /// error text.
    pub fn check_url(&self, url: &str) -> Result<(), String> {
        trace!(url, "Checking URL");
        let response = self
            .client()?
            .head(url)
            .send()
            .map_err(|e| e.to_string())?;
        let status = response.status();
        debug!(url, %status, "URL check");
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(status.to_string())
        }
    }

    /// Downloads `url` as text.
    ///
    /// # Errors
    ///
    /// Returns the status or transport error text.
    pub fn get_text(&self, url: &str) -> Result<String, String> {
        let response = self.client()?.get(url).send().map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} fetching {url}"));
        }
        response.text().map_err(|e| e.to_string())
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
