//! Snippet definitions and snapshots
//!
//! A snippet is a fragment of markup with placement rules: which element it
//! anchors to ([`AnchorKind`]), where it goes relative to that element
//! ([`Position`]) and which pages it applies to ([`ApplyScope`]).
//!
//! The storage layer owns definitions. The engine receives them as a
//! [`SnippetSnapshot`]: enabled only, ordered by `(sort, id)`, anchors
//! compiled once.

mod anchor;
mod definition;
mod loader;
mod snapshot;

pub use anchor::Anchor;
pub use definition::{AnchorKind, ApplyScope, Position, SnippetDefinition};
pub use loader::SnapshotLoader;
pub use snapshot::{SnapshotEntry, SnippetSnapshot};
