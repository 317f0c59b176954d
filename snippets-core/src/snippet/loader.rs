//! Snapshot Loader
//!
//! Loads snippet definitions exported by the storage layer:
//! - JSON strings
//! - JSON files
//!
//! Both a bare array of definitions and a `{ "snippets": [...] }` document
//! are accepted. A definition that can't be read, or that fails validation,
//! is dropped with a warning and recorded on the snapshot; the others still
//! load. Only a document without either shape fails the whole load.

use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde_json::Value;

use crate::engine::Diagnostic;
use crate::error::{Result, SnippetError};

use super::definition::SnippetDefinition;
use super::snapshot::SnippetSnapshot;

/// Loader for snippet snapshots
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    /// Whether to validate enabled definitions on load
    validate_on_load: bool,
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            validate_on_load: true,
        }
    }

    /// Disable validation on load
    ///
    /// Broken definitions then reach the engine, which skips them per pass.
    pub fn skip_validation(mut self) -> Self {
        self.validate_on_load = false;
        self
    }

    /// Parse definitions from a JSON string
    ///
    /// Returns the accepted definitions and a diagnostic for each rejected one.
    pub fn definitions_from_json(
        &self,
        json: &str,
    ) -> Result<(Vec<SnippetDefinition>, Vec<Diagnostic>)> {
        let mut definitions = Vec::new();
        let mut rejected = Vec::new();

        for entry in document_entries(json)? {
            let snippet_id = entry.get("id").and_then(entry_id).unwrap_or(0);

            let definition: SnippetDefinition = match serde_json::from_value(entry) {
                Ok(definition) => definition,
                Err(e) => {
                    reject(&mut rejected, snippet_id, e.into());
                    continue;
                }
            };

            if self.validate_on_load && definition.enabled {
                if let Err(errors) = definition.validate() {
                    let error = SnippetError::InvalidDefinition {
                        snippet_id: definition.id,
                        reason: errors.join("; "),
                    };
                    reject(&mut rejected, definition.id, error);
                    continue;
                }
            }

            definitions.push(definition);
        }

        Ok((definitions, rejected))
    }

    /// Load a snapshot from a JSON string
    pub fn load_from_json(&self, json: &str) -> Result<SnippetSnapshot> {
        let (definitions, rejected) = self.definitions_from_json(json)?;
        let total = definitions.len() + rejected.len();
        let snapshot = SnippetSnapshot::new(definitions).with_rejected(rejected);

        tracing::debug!(
            "Loaded {} enabled snippet(s) out of {}, {} rejected",
            snapshot.len(),
            total,
            snapshot.rejected().len()
        );
        Ok(snapshot)
    }

    /// Load a snapshot from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<SnippetSnapshot> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SnippetError::SnapshotLoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.load_from_json(&content).map_err(|e| match e {
            SnippetError::JsonError(inner) => SnippetError::SnapshotLoadError {
                path: path.display().to_string(),
                reason: inner.to_string(),
            },
            other => other,
        })
    }
}

fn document_entries(json: &str) -> Result<Vec<Value>> {
    let document: Value = serde_json::from_str(json)?;
    match document {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut document) => match document.remove("snippets") {
            Some(Value::Array(entries)) => Ok(entries),
            _ => Err(serde_json::Error::custom("expected a `snippets` array").into()),
        },
        _ => Err(serde_json::Error::custom("expected an array of snippet definitions").into()),
    }
}

fn entry_id(id: &Value) -> Option<u64> {
    match id {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn reject(rejected: &mut Vec<Diagnostic>, snippet_id: u64, error: SnippetError) {
    tracing::warn!("Dropping snippet {}: {}", snippet_id, error);
    rejected.push(Diagnostic::from_error(snippet_id, &error));
}
