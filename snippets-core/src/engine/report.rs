//! Per-pass diagnostics

use serde::{Deserialize, Serialize};

use crate::error::SnippetError;

/// A recoverable problem with one snippet during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub snippet_id: u64,
    /// Stable error code (e.g., "MALFORMED_PATTERN")
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn from_error(snippet_id: u64, error: &SnippetError) -> Self {
        Self {
            snippet_id,
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Outcome of a render pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassReport {
    /// Resulting markup
    pub markup: String,

    /// Snippets spliced into the markup, in order
    pub applied: Vec<u64>,

    /// Snippets that don't apply to the current page
    pub skipped: Vec<u64>,

    /// Snippets whose anchor wasn't found
    pub unmatched: Vec<u64>,

    /// Snippets dropped from the pass because of a definition problem
    pub warnings: Vec<Diagnostic>,
}

impl PassReport {
    pub(crate) fn unchanged(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            ..Default::default()
        }
    }

    /// Whether any snippet changed the markup
    pub fn is_modified(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
