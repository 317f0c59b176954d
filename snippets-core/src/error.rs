//! Error types for snippet operations
//!
//! The render path is total: applying snippets and resolving tags never
//! returns an error to the caller. The errors in this module come from the
//! edges around it:
//! - Loading snippet snapshots and engine configuration
//! - Compiling anchor patterns (the engine downgrades these to warnings)
//! - Validating snippet definitions before they are stored
//!
//! # Error Codes
//!
//! Each variant has a stable error code (e.g., `MALFORMED_PATTERN`) that hosts
//! can use for logging, alerting, or mapping to localized messages.
//!
//! # Example
//!
//! ```rust
//! use snippets_core::error::{SnippetError, ErrorCategory};
//!
//! fn report(err: SnippetError) {
//!     match err.category() {
//!         ErrorCategory::Validation => println!("fix the snippet: {}", err),
//!         ErrorCategory::NotFound => println!("missing: {}", err),
//!         _ => println!("[{}] {}", err.error_code(), err),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for snippet operations
pub type Result<T> = std::result::Result<T, SnippetError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Snippet or configuration content is invalid
    Validation,
    /// A referenced file or resource doesn't exist
    NotFound,
    /// Input could not be read or decoded
    External,
    /// Internal error
    Internal,
}

/// Errors that can occur around snippet processing
#[derive(Error, Debug)]
pub enum SnippetError {
    // ═══════════════════════════════════════════════════════════════════════
    // Definition errors (anchor patterns and snippet fields)
    // ═══════════════════════════════════════════════════════════════════════

    /// Custom anchor pattern has invalid syntax or unsupported flags
    #[error("Malformed anchor pattern for snippet {snippet_id}: '{pattern}': {reason}")]
    MalformedPattern {
        snippet_id: u64,
        pattern: String,
        reason: String,
    },

    /// Snippet targets a custom element but has no pattern
    #[error("Snippet {snippet_id} uses a custom element but has no element_regex")]
    MissingCustomPattern { snippet_id: u64 },

    /// Snippet definition failed validation
    #[error("Invalid snippet {snippet_id}: {reason}")]
    InvalidDefinition { snippet_id: u64, reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Loading errors (snapshots and configuration)
    // ═══════════════════════════════════════════════════════════════════════

    /// Failed to load a snippet snapshot from file
    #[error("Failed to load snippets from '{path}': {reason}")]
    SnapshotLoadError { path: String, reason: String },

    /// Engine configuration is invalid
    #[error("Invalid engine configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("IO error: {message}")]
    IoError { message: String },
}

impl From<std::io::Error> for SnippetError {
    fn from(err: std::io::Error) -> Self {
        SnippetError::IoError {
            message: err.to_string(),
        }
    }
}

impl SnippetError {
    /// Returns true if the failure is local to one snippet
    ///
    /// Recoverable errors leave the rest of a render pass untouched: the
    /// offending snippet is skipped and the pass continues.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SnippetError::MalformedPattern { .. }
                | SnippetError::MissingCustomPattern { .. }
                | SnippetError::InvalidDefinition { .. }
        )
    }

    /// Returns the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            SnippetError::MalformedPattern { .. }
            | SnippetError::MissingCustomPattern { .. }
            | SnippetError::InvalidDefinition { .. }
            | SnippetError::InvalidConfig { .. } => ErrorCategory::Validation,

            SnippetError::SnapshotLoadError { .. } => ErrorCategory::NotFound,

            SnippetError::JsonError(_) | SnippetError::IoError { .. } => ErrorCategory::External,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SnippetError::MalformedPattern { .. } => "MALFORMED_PATTERN",
            SnippetError::MissingCustomPattern { .. } => "MISSING_CUSTOM_PATTERN",
            SnippetError::InvalidDefinition { .. } => "INVALID_DEFINITION",
            SnippetError::SnapshotLoadError { .. } => "SNAPSHOT_LOAD_ERROR",
            SnippetError::InvalidConfig { .. } => "INVALID_CONFIG",
            SnippetError::JsonError(_) => "JSON_ERROR",
            SnippetError::IoError { .. } => "IO_ERROR",
        }
    }

    /// Converts this error to a JSON-serializable response object
    ///
    /// ```json
    /// {
    ///   "error": {
    ///     "code": "MALFORMED_PATTERN",
    ///     "message": "Malformed anchor pattern for snippet 4: ...",
    ///     "category": "validation",
    ///     "recoverable": true
    ///   }
    /// }
    /// ```
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                recoverable: self.is_recoverable(),
            },
        }
    }
}

/// JSON-serializable error response for host APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail for JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code (e.g., "MALFORMED_PATTERN")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Error category
    pub category: ErrorCategory,
    /// Whether the failure is confined to a single snippet
    pub recoverable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = SnippetError::MalformedPattern {
            snippet_id: 4,
            pattern: "/(/".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.error_code(), "MALFORMED_PATTERN");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.is_recoverable());

        let err = SnippetError::SnapshotLoadError {
            path: "missing.json".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(err.error_code(), "SNAPSHOT_LOAD_ERROR");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_response_serialization() {
        let err = SnippetError::MissingCustomPattern { snippet_id: 7 };
        let response = err.to_error_response();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"]["code"], "MISSING_CUSTOM_PATTERN");
        assert_eq!(json["error"]["category"], "validation");
        assert_eq!(json["error"]["recoverable"], true);
        assert!(json["error"]["message"].as_str().unwrap().contains("7"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SnippetError = io.into();
        assert_eq!(err.category(), ErrorCategory::External);
        assert!(err.to_string().contains("gone"));
    }
}
