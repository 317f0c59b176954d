//! Immutable per-render snapshot of enabled snippets

use crate::engine::Diagnostic;
use crate::error::SnippetError;

use super::anchor::Anchor;
use super::definition::SnippetDefinition;

/// An enabled snippet with its anchor compiled once
#[derive(Debug)]
pub struct SnapshotEntry {
    definition: SnippetDefinition,
    anchor: Result<Anchor, SnippetError>,
}

impl SnapshotEntry {
    fn new(definition: SnippetDefinition) -> Self {
        let anchor = Anchor::compile(&definition);
        Self { definition, anchor }
    }

    pub fn definition(&self) -> &SnippetDefinition {
        &self.definition
    }

    /// The compiled anchor, or why it couldn't be compiled
    pub fn anchor(&self) -> Result<&Anchor, &SnippetError> {
        self.anchor.as_ref()
    }
}

/// The ordered, enabled snippets for one render pass
///
/// Built by the host from whatever storage it uses. Disabled definitions are
/// dropped and the rest are ordered by `(sort, id)`. A snapshot is never
/// mutated after construction and can be shared between concurrent passes.
#[derive(Debug, Default)]
pub struct SnippetSnapshot {
    entries: Vec<SnapshotEntry>,
    rejected: Vec<Diagnostic>,
}

impl SnippetSnapshot {
    pub fn new(definitions: impl IntoIterator<Item = SnippetDefinition>) -> Self {
        let mut definitions: Vec<SnippetDefinition> =
            definitions.into_iter().filter(|d| d.enabled).collect();
        definitions.sort_by_key(|d| d.order_key());

        Self {
            entries: definitions.into_iter().map(SnapshotEntry::new).collect(),
            rejected: Vec::new(),
        }
    }

    pub(crate) fn with_rejected(mut self, rejected: Vec<Diagnostic>) -> Self {
        self.rejected = rejected;
        self
    }

    /// A snapshot with no snippets
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in application order
    pub fn iter(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.iter()
    }

    /// Definitions in application order
    pub fn definitions(&self) -> impl Iterator<Item = &SnippetDefinition> {
        self.entries.iter().map(|e| &e.definition)
    }

    /// Definitions dropped while loading, with the reason
    pub fn rejected(&self) -> &[Diagnostic] {
        &self.rejected
    }

    /// Look up an entry by snippet id
    pub fn get(&self, id: u64) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.definition.id == id)
    }
}

impl FromIterator<SnippetDefinition> for SnippetSnapshot {
    fn from_iter<I: IntoIterator<Item = SnippetDefinition>>(iter: I) -> Self {
        Self::new(iter)
    }
}
