//! Error types for the remote disk module.
//!
//! Every failure carries the URL that produced it so the log line written at
//! the call site is enough to diagnose the problem after the fact.

use thiserror::Error;

/// Errors that can occur while talking to the remote disk provider.
#[derive(Debug, Error)]
pub enum DiskError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP status from the provider or the download host.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded into a listing.
    #[error("malformed response from {url}: {reason}")]
    MalformedBody {
        /// The URL whose response was rejected.
        url: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl DiskError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed body error.
    pub fn malformed_body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_error_timeout_display() {
        let error = DiskError::timeout("https://downloader.disk.yandex.ru/d/abc");
        let msg = error.to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("/d/abc"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_disk_error_http_status_display() {
        let error = DiskError::http_status("https://cloud-api.yandex.net/v1/disk", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("cloud-api.yandex.net"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_disk_error_malformed_body_display() {
        let error = DiskError::malformed_body("https://api.test/list", "missing _embedded");
        let msg = error.to_string();
        assert!(msg.contains("malformed"), "Expected 'malformed' in: {msg}");
        assert!(msg.contains("missing _embedded"), "Expected reason in: {msg}");
    }

    #[test]
    fn test_disk_error_invalid_url_display() {
        let error = DiskError::invalid_url("not-a-url");
        assert_eq!(error.to_string(), "invalid URL: not-a-url");
    }
}
