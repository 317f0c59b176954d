//! Tag substitution in snippet content

use crate::config::TagOptions;
use crate::context::ContextValue;
use crate::resolver::PathResolver;

/// A piece of snippet content: literal text or the inner text of a tag
enum Piece<'a> {
    Text(&'a str),
    Tag(&'a str),
}

/// Splits content into literal text and tags
///
/// Tags are matched non-greedily and never nest: in `{{a {{b}}` only
/// `{{b}}` is a tag. An unterminated tag is literal text.
struct TagScanner<'a, 'm> {
    rest: &'a str,
    open: &'m str,
    close: &'m str,
}

impl<'a, 'm> TagScanner<'a, 'm> {
    fn new(content: &'a str, tags: &'m TagOptions) -> Self {
        Self {
            rest: content,
            open: &tags.open,
            close: &tags.close,
        }
    }

    fn literal(&mut self, len: usize) -> Piece<'a> {
        let (text, rest) = self.rest.split_at(len);
        self.rest = rest;
        Piece::Text(text)
    }
}

impl<'a> Iterator for TagScanner<'a, '_> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Piece<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        if self.open.is_empty() || self.close.is_empty() {
            return Some(self.literal(self.rest.len()));
        }

        let rest = self.rest;
        let Some(open_at) = rest.find(self.open) else {
            return Some(self.literal(rest.len()));
        };
        let after_open = &rest[open_at + self.open.len()..];
        let Some(close_at) = after_open.find(self.close) else {
            return Some(self.literal(rest.len()));
        };
        let inner = &after_open[..close_at];

        // a later open marker starts the real tag
        if let Some(nested) = inner.rfind(self.open) {
            return Some(self.literal(open_at + self.open.len() + nested));
        }
        if open_at > 0 {
            return Some(self.literal(open_at));
        }

        self.rest = &after_open[close_at + self.close.len()..];
        Some(Piece::Tag(inner))
    }
}

/// Replace every `{{path}}` tag in `content` with its resolved value
///
/// Unresolved tags render as the empty string, and resolved text is
/// inserted verbatim. An unterminated tag is left as-is.
pub fn populate_tags(
    content: &str,
    root: &ContextValue,
    resolver: &PathResolver,
    tags: &TagOptions,
    separator: &str,
) -> String {
    let mut out = String::with_capacity(content.len());
    for piece in TagScanner::new(content, tags) {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Tag(inner) => out.push_str(&resolve_tag(inner, root, resolver, separator)),
        }
    }
    out
}

/// Resolve a tag body, trying `|`-separated alternatives in order
pub fn resolve_tag(
    inner: &str,
    root: &ContextValue,
    resolver: &PathResolver,
    separator: &str,
) -> String {
    let inner = inner.trim();
    let resolve = |path: &str| resolver.resolve(root, path.trim());

    let resolved = if separator.is_empty() {
        resolve(inner)
    } else {
        inner.split(separator).find_map(resolve)
    };

    resolved.unwrap_or_else(|| {
        tracing::trace!("Tag '{}' resolved to nothing", inner);
        String::new()
    })
}

/// Paths referenced by the tags in `content`, in order of appearance
pub fn tag_paths<'a>(content: &'a str, tags: &TagOptions) -> Vec<&'a str> {
    TagScanner::new(content, tags)
        .filter_map(|piece| match piece {
            Piece::Tag(inner) => Some(inner.trim()),
            Piece::Text(_) => None,
        })
        .collect()
}
