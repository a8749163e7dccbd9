use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OuiError>;

/// Which side of the pipeline produced malformed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// The local cache file
    Cache,
    /// The downloaded registry table
    Remote,
}

/// Errors produced while resolving, loading, or refreshing OUI data.
#[derive(Error, Debug)]
pub enum OuiError {
    /// No MAC-like substring was found in the input
    #[error("Invalid OUI supplied: {input:?}")]
    InvalidInput { input: String },

    /// The cache file does not exist
    #[error("OUI cache not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The cache file exists but could not be read
    #[error("Failed to read OUI cache at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rows in the cache file or the remote table are malformed
    #[error("Malformed OUI data in {location} at line {line}: {message}")]
    Parse {
        origin: DataOrigin,
        location: String,
        line: u64,
        message: String,
    },

    /// The remote registry could not be downloaded
    #[error("Failed to fetch OUI registry from {url}: {message}")]
    Network { url: String, message: String },

    /// The cache file could not be written
    #[error("Failed to write OUI cache at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key is well-formed but the registry has no entry for it
    #[error("Manufacturer not found for OUI {key}")]
    Unresolved { key: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl OuiError {
    #[must_use]
    pub fn cache_parse(
        location: impl Into<String>,
        line: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            origin: DataOrigin::Cache,
            location: location.into(),
            line,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn remote_parse(
        location: impl Into<String>,
        line: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            origin: DataOrigin::Remote,
            location: location.into(),
            line,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for failures that mean the local cache is missing or unusable.
    /// A fresh refresh followed by another lookup may succeed. A malformed
    /// remote table is not a cache failure.
    pub fn is_cache_failure(&self) -> bool {
        matches!(
            self,
            OuiError::NotFound { .. }
                | OuiError::Read { .. }
                | OuiError::Parse {
                    origin: DataOrigin::Cache,
                    ..
                }
        )
    }
}
