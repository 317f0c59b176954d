//! Dotted-path resolution
//!
//! Resolves tag paths such as `page.items.1.name` against a context root and
//! renders the result as a string.
//!
//! ## Algorithm
//!
//! 1. Split on `.`, dropping empty segments. No segments: the current item
//!    itself is the result.
//! 2. The first purely numeric segment `k` splits the path into
//!    `head.k.tail`. `head` is looked up on the current item (or the current
//!    item is used when `head` is empty), element `k` is selected from the
//!    resulting collection, and `tail` is resolved recursively on that
//!    element.
//! 3. Without numeric segments the path is looked up directly: a single
//!    segment with `get`, a compound path with the item's native dotted lookup
//!    when it has one, otherwise one segment at a time.
//! 4. Paths under the root binding (`page`) are first offered to that
//!    object's own dotted lookup, so host-specific path semantics win.
//! 5. The value is rendered by [`render_value`]: scalars as text, objects via
//!    their own string conversion, non-empty collections as compact JSON.
//!
//! Every failure (missing property, indexing a non-collection, index out of
//! range) yields `None`.

mod coerce;

pub use coerce::render_value;

use crate::context::{ContextValue, PAGE_BINDING};

/// Resolves dotted tag paths against a context root
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Binding whose object gets first refusal on compound paths
    root_binding: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResolver {
    /// Create a resolver using the `page` root binding
    pub fn new() -> Self {
        Self {
            root_binding: PAGE_BINDING.to_string(),
        }
    }

    /// Use a different root binding name
    pub fn with_root_binding(mut self, name: impl Into<String>) -> Self {
        self.root_binding = name.into();
        self
    }

    pub fn root_binding(&self) -> &str {
        &self.root_binding
    }

    /// Resolve a path and render the result as a string
    pub fn resolve(&self, root: &ContextValue, path: &str) -> Option<String> {
        let value = self.resolve_value(root, path)?;
        let rendered = render_value(&value);
        if rendered.is_none() {
            tracing::trace!("Path '{}' resolved to an empty value", path);
        }
        rendered
    }

    /// Resolve a path to the raw context value
    pub fn resolve_value(&self, root: &ContextValue, path: &str) -> Option<ContextValue> {
        if let Some(value) = self.delegate_to_binding(root, path) {
            return Some(value);
        }
        let value = resolve_segments(root, &split_path(path));
        if value.is_none() {
            tracing::trace!("Path '{}' did not resolve", path);
        }
        value
    }

    /// Offer `binding.rest` to the bound object's own dotted lookup
    fn delegate_to_binding(&self, root: &ContextValue, path: &str) -> Option<ContextValue> {
        let segments = split_path(path);
        let (first, rest) = segments.split_first()?;
        if *first != self.root_binding || rest.is_empty() {
            return None;
        }

        let bound = root.get(first)?;
        if !bound.supports_dotted_lookup() {
            return None;
        }
        bound.get_dotted(&rest.join("."))
    }
}

/// Resolve a path with the default resolver
pub fn resolve_path(root: &ContextValue, path: &str) -> Option<String> {
    PathResolver::new().resolve(root, path)
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('.').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn parse_index(segment: &str) -> Option<usize> {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}

fn resolve_segments(current: &ContextValue, segments: &[&str]) -> Option<ContextValue> {
    if segments.is_empty() {
        return Some(current.clone());
    }

    let numeric = segments
        .iter()
        .enumerate()
        .find_map(|(pos, segment)| parse_index(segment).map(|index| (pos, index)));

    let Some((pos, index)) = numeric else {
        return lookup(current, segments);
    };

    let (head, tail) = (&segments[..pos], &segments[pos + 1..]);
    let element = if head.is_empty() {
        current.at(index)?
    } else {
        let collection = lookup(current, head)?;
        if !collection.is_collection() {
            return None;
        }
        collection.at(index)?
    };

    if tail.is_empty() {
        Some(element)
    } else {
        resolve_segments(&element, tail)
    }
}

/// Look up a path that contains no numeric segments
fn lookup(current: &ContextValue, segments: &[&str]) -> Option<ContextValue> {
    match segments {
        [] => Some(current.clone()),
        [single] => current.get(single),
        _ => {
            if current.supports_dotted_lookup() {
                if let Some(value) = current.get_dotted(&segments.join(".")) {
                    return Some(value);
                }
            }
            segments
                .iter()
                .try_fold(current.clone(), |item, segment| item.get(segment))
        }
    }
}
