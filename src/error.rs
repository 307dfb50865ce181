//! Error types for ransomwatch.
//!
//! All failures are strongly typed using thiserror so callers can match on
//! specific conditions and render clear messages. Library code never panics
//! on bad input or a bad feed; everything surfaces as one of these types.

use std::path::PathBuf;

use thiserror::Error;

use crate::alert::AlertId;
use crate::company::CompanyId;

/// Validation errors raised by registry and triage mutations.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Company name cannot be empty")]
    EmptyCompanyName,

    #[error("A company named '{name}' already exists")]
    DuplicateCompanyName {
        name: String,
    },

    #[error("At least one keyword is required")]
    EmptyKeywordSet,

    #[error("Company not found: {id}")]
    CompanyNotFound {
        id: CompanyId,
    },

    #[error("Alert not found: {id}")]
    AlertNotFound {
        id: AlertId,
    },

    #[error("Unknown alert status '{raw}' (expected Open, In Progress, Complete or False Positive)")]
    UnknownStatus {
        raw: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Storage errors from loading or saving the JSON collection files.
///
/// A missing file is not an error (collections start empty); these cover
/// unreadable files, failed writes and unparseable content.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {message}", path.display())]
    Corrupt {
        path: PathBuf,
        message: String,
    },
}

/// Fetch errors from the disclosure feed.
///
/// Each variant renders a distinct operator-facing message; none of them
/// aborts the session, only the fetch that raised it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Feed request timed out after {seconds}s")]
    Timeout {
        seconds: u64,
    },

    #[error("Feed responded with HTTP {status}: {body_preview}")]
    Http {
        status: u16,
        body_preview: String,
    },

    #[error("Feed request failed: {message}")]
    Transport {
        message: String,
    },

    #[error("Feed response was not valid JSON: {body_preview}")]
    Decode {
        body_preview: String,
    },
}

/// A reported date that does not parse as `YYYY-MM-DD`.
///
/// Never fatal: the scan logs it and treats the entry as undated.
#[derive(Debug, Error)]
#[error("Unrecognized reported date '{raw}' (expected YYYY-MM-DD)")]
pub struct DateParseError {
    /// The raw date string as it appeared in the feed.
    pub raw: String,
}

/// Top-level error type for ransomwatch operations.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Feed error: {0}")]
    Fetch(#[from] FetchError),
}

impl WatchError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is a feed fetch error.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// Result type alias for ransomwatch operations.
pub type WatchResult<T> = Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_duplicate_name() {
        let err = ValidationError::DuplicateCompanyName {
            name: "Acme Corp".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Acme Corp"));
        assert!(msg.contains("already exists"));
    }

    #[test]
    fn test_validation_error_company_not_found() {
        let id = CompanyId::new();
        let err = ValidationError::CompanyNotFound { id };
        let msg = format!("{err}");
        assert!(msg.contains("Company not found"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_storage_error_corrupt() {
        let err = StorageError::Corrupt {
            path: PathBuf::from("/tmp/alerts.json"),
            message: "expected value at line 1".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("alerts.json"));
        assert!(msg.contains("not valid JSON"));
    }

    #[test]
    fn test_fetch_error_timeout() {
        let err = FetchError::Timeout { seconds: 60 };
        let msg = format!("{err}");
        assert!(msg.contains("60s"));
    }

    #[test]
    fn test_fetch_error_http_status() {
        let err = FetchError::Http {
            status: 503,
            body_preview: "service unavailable".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("503"));
        assert!(msg.contains("service unavailable"));
    }

    #[test]
    fn test_date_parse_error_display() {
        let err = DateParseError {
            raw: "yesterday".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("yesterday"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_watch_error_from_validation() {
        let err: WatchError = ValidationError::EmptyCompanyName.into();
        assert!(err.is_validation());
        assert!(!err.is_storage());
    }

    #[test]
    fn test_watch_error_from_fetch() {
        let err: WatchError = FetchError::Transport {
            message: "connection refused".to_string(),
        }
        .into();
        assert!(err.is_fetch());
        let msg = format!("{err}");
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_watch_error_from_storage() {
        let err: WatchError = StorageError::Io {
            path: PathBuf::from("/tmp/companies.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(err.is_storage());
    }
}
