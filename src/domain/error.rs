//! Error types for explorer view operations.
//!
//! Nothing in the view layer is fatal: controllers turn these errors into
//! empty or "no data" states. The variants exist so callers can log what
//! went wrong and tests can assert on it.

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while fetching or decoding explorer data.
#[derive(Debug, Error)]
pub enum ViewError {
    /// Network-related errors from HTTP requests.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing or data structure errors.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what failed to parse.
        message: String,
    },

    /// A query parameter is missing or malformed.
    #[error("Invalid query parameter '{key}': {reason}")]
    InvalidQuery {
        /// The query parameter name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("Client initialization failed: {0}")]
    ClientInit(String),
}

impl ViewError {
    /// Create a new parse error with the given message.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new invalid query error.
    ///
    /// # Arguments
    ///
    /// * `key` - The query parameter that was rejected
    /// * `reason` - Description of why the value is invalid
    #[must_use]
    pub fn invalid_query(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            key,
            reason: reason.into(),
        }
    }

    /// Create a new client initialization error.
    #[must_use]
    pub fn client_init(message: impl Into<String>) -> Self {
        Self::ClientInit(message.into())
    }

    /// Convert to a `color_eyre::Report` for the binary's error handling.
    #[must_use = "this converts the error into a Report for display"]
    pub fn into_report(self) -> color_eyre::Report {
        color_eyre::eyre::eyre!("{}", self)
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
