//! HTTP retrieval of release archives, metadata, and extension packages.
//!
//! Provides a trait-based abstraction so that the provisioning pipeline can
//! be exercised without network access. Every request made by
//! [`HttpDownloader`] is bounded by a global timeout.

use std::path::Path;
use std::time::Duration;

/// Default network timeout for every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Trait for fetching remote resources.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```no_run
/// use devenv_installer::artefact::download::{ArtefactDownloader, HttpDownloader};
///
/// let downloader = HttpDownloader::default();
/// let body = downloader.fetch_text("https://api.github.com/repos/o/t/releases/latest")?;
/// # Ok::<(), devenv_installer::artefact::download::DownloadError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Fetch `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 2xx.
    fn fetch_text(&self, url: &str) -> Result<String, DownloadError>;

    /// Fetch `url` and write the body to `dest`, replacing any existing
    /// file. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, the
    /// body is empty, or the file cannot be written.
    fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("request to {url} failed: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server answered with an empty body.
    #[error("empty response from {url}")]
    Empty {
        /// The URL that returned no bytes.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Create a downloader whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ArtefactDownloader for HttpDownloader {
    fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        let written = std::io::copy(&mut response.into_body().as_reader(), &mut file)?;
        if written == 0 {
            return Err(DownloadError::Empty {
                url: url.to_owned(),
            });
        }
        Ok(written)
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
