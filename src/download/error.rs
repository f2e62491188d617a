//! Transport-level download errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why a fetch could not produce a complete file on disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Build {
        #[source]
        source: reqwest::Error,
    },

    /// Request never completed (DNS, connect, TLS, mid-stream drop).
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a usable body.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// Local write failed.
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn build(source: reqwest::Error) -> Self {
        Self::Build { source }
    }

    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the server responded but refused or had nothing to
    /// serve, as opposed to transport or local failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::HttpStatus { .. })
    }
}
