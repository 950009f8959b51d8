//! Error types for memsync-core

use std::fmt;
use std::path::PathBuf;

/// Result type for memsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause reported by an external fetch/add/remove call
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Identity used by the predicate forms of the matcher until a caller
/// attaches a better one with [`Error::with_identity`].
pub(crate) const PREDICATE_IDENTITY: &str = "item matching predicate";

/// Errors that can occur in memsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An identity lookup matched zero items
    #[error("Not found: {identity}")]
    NotFound { identity: String },

    /// An identity lookup matched more than one item
    #[error("Ambiguous match: {count} items matched {identity}, expected exactly one")]
    AmbiguousMatch { identity: String, count: usize },

    /// Pagination traversal aborted on a transport or server error
    #[error("Failed to fetch page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: BoxError,
    },

    /// A scan kept receiving full pages past the configured cap
    #[error("Page limit exceeded: still receiving full pages after {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },

    /// One or more add/remove operations failed
    #[error(transparent)]
    PartialApply(#[from] PartialApplyError),

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parsed but failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Replace the identity carried by a `NotFound` or `AmbiguousMatch` error.
    ///
    /// Other variants are returned unchanged, so this can be applied with
    /// `map_err` to any matcher result.
    pub fn with_identity(self, identity: impl Into<String>) -> Self {
        match self {
            Error::NotFound { .. } => Error::NotFound {
                identity: identity.into(),
            },
            Error::AmbiguousMatch { count, .. } => Error::AmbiguousMatch {
                identity: identity.into(),
                count,
            },
            other => other,
        }
    }

    /// Create an invalid configuration error with the given message
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error means the lookup could not resolve a single item
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::AmbiguousMatch { .. })
    }
}

/// Kind of mutating call issued against a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => f.write_str("add"),
            Operation::Remove => f.write_str("remove"),
        }
    }
}

/// A single add or remove that the remote collection rejected
#[derive(Debug, thiserror::Error)]
#[error("{operation} {key}: {cause}")]
pub struct OperationFailure {
    /// The call that failed
    pub operation: Operation,
    /// Rendered identity of the member
    pub key: String,
    /// Cause reported by the collection
    #[source]
    pub cause: BoxError,
}

/// Aggregate of every failed operation in one reconciliation cycle
///
/// Only produced after the full operation list was attempted.
/// `final_membership` is the best-known state at that point, rendered
/// with `Display`.
#[derive(Debug, thiserror::Error)]
#[error("{} of the planned membership changes failed: {}", .failures.len(), summarize(.failures))]
pub struct PartialApplyError {
    pub failures: Vec<OperationFailure>,
    pub final_membership: Vec<String>,
}

impl PartialApplyError {
    /// Rendered keys of every failed operation, in attempt order
    pub fn failed_keys(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.key.as_str()).collect()
    }
}

fn summarize(failures: &[OperationFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_identity_rewrites_lookup_errors() {
        let err = Error::NotFound {
            identity: PREDICATE_IDENTITY.to_string(),
        }
        .with_identity("project checkout");
        assert_eq!(err.to_string(), "Not found: project checkout");

        let err = Error::AmbiguousMatch {
            identity: PREDICATE_IDENTITY.to_string(),
            count: 3,
        }
        .with_identity("policy strict");
        assert!(err.to_string().contains("3 items matched policy strict"));
    }

    #[test]
    fn with_identity_leaves_other_errors_alone() {
        let err = Error::invalid_config("page_size must be at least 1").with_identity("ignored");
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(!err.is_lookup_failure());
    }

    #[test]
    fn partial_apply_error_lists_each_failure() {
        let err = PartialApplyError {
            failures: vec![
                OperationFailure {
                    operation: Operation::Add,
                    key: "Y".to_string(),
                    cause: "permission denied".into(),
                },
                OperationFailure {
                    operation: Operation::Remove,
                    key: "A".to_string(),
                    cause: "timeout".into(),
                },
            ],
            final_membership: vec!["X".to_string()],
        };

        let display = err.to_string();
        assert!(display.starts_with("2 of the planned membership changes failed"));
        assert!(display.contains("add Y: permission denied"));
        assert!(display.contains("remove A: timeout"));
        assert_eq!(err.failed_keys(), vec!["Y", "A"]);
    }

    #[test]
    fn fetch_error_exposes_source() {
        use std::error::Error as _;

        let err = Error::Fetch {
            page: 3,
            source: "connection reset".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch page 3: connection reset");
        assert!(err.source().is_some());
    }
}
