//! Anchor patterns
//!
//! Anchors are plain regular expressions run over the rendered markup; there
//! is no DOM. A snippet can only target what a single expression can match,
//! and markup inside comments or attribute values can match too.
//!
//! Custom patterns come in two forms:
//! - bare: `<main[^>]*>` is used as-is (Rust `regex` syntax)
//! - delimited: `/\<main.*?\>/i` as written in the management form, where
//!   the first character is the delimiter and trailing letters are flags
//!
//! Delimited flags `i`, `m`, `s`, `x` and `U` become inline flags, `A`
//! anchors the match at the start of the document, and `u`, `D`, `S`, `X`
//! and `J` are accepted without effect.

use regex::{Match, Regex};

use crate::error::{Result, SnippetError};

use super::definition::{AnchorKind, SnippetDefinition};

const REGEX_META: &str = r"\.+*?()|[]{}^$#&-~";

/// A compiled anchor
#[derive(Debug, Clone)]
pub struct Anchor {
    regex: Regex,
}

impl Anchor {
    /// Compile the effective anchor of a definition
    pub fn compile(definition: &SnippetDefinition) -> Result<Self> {
        match definition.anchor_kind {
            AnchorKind::Custom => {
                let pattern = definition
                    .effective_pattern()
                    .ok_or(SnippetError::MissingCustomPattern {
                        snippet_id: definition.id,
                    })?;
                Self::parse_custom(definition.id, pattern)
            }
            kind => {
                let pattern = kind.builtin_pattern().unwrap_or_default();
                Self::from_regex(definition.id, pattern, pattern)
            }
        }
    }

    /// Parse a user-supplied pattern, bare or delimited
    pub fn parse_custom(snippet_id: u64, pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        let expression = match split_delimited(trimmed) {
            Some((delimiter, body, flags)) => translate_delimited(delimiter, body, flags).map_err(|reason| {
                SnippetError::MalformedPattern {
                    snippet_id,
                    pattern: pattern.to_string(),
                    reason,
                }
            })?,
            None => trimmed.to_string(),
        };
        Self::from_regex(snippet_id, pattern, &expression)
    }

    fn from_regex(snippet_id: u64, original: &str, expression: &str) -> Result<Self> {
        Regex::new(expression)
            .map(|regex| Self { regex })
            .map_err(|e| SnippetError::MalformedPattern {
                snippet_id,
                pattern: original.to_string(),
                reason: e.to_string(),
            })
    }

    /// First match in the markup
    pub fn find<'h>(&self, markup: &'h str) -> Option<Match<'h>> {
        self.regex.find(markup)
    }

    /// The compiled expression
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Split `/body/flags` into delimiter, body and flags
///
/// The delimiter is the first character when it is not alphanumeric,
/// whitespace or a backslash; the body runs to its last occurrence, and only
/// letters may follow.
fn split_delimited(pattern: &str) -> Option<(char, &str, &str)> {
    let delimiter = pattern.chars().next()?;
    if delimiter.is_alphanumeric() || delimiter.is_whitespace() || delimiter == '\\' {
        return None;
    }

    let start = delimiter.len_utf8();
    let end = pattern.rfind(delimiter)?;
    if end < start {
        return None;
    }

    let flags = &pattern[end + delimiter.len_utf8()..];
    if !flags.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((delimiter, &pattern[start..end], flags))
}

fn translate_delimited(delimiter: char, body: &str, flags: &str) -> std::result::Result<String, String> {
    let mut inline = String::new();
    let mut anchored = false;

    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' | 'x' | 'U' => {
                if !inline.contains(flag) {
                    inline.push(flag);
                }
            }
            'A' => anchored = true,
            // no counterpart in the regex crate; accepted for stored patterns
            'u' | 'D' | 'S' | 'X' | 'J' => {}
            other => return Err(format!("unsupported flag '{}'", other)),
        }
    }

    let body = unescape_body(body, delimiter);
    let mut expression = String::with_capacity(body.len() + 12);
    if !inline.is_empty() {
        expression.push_str("(?");
        expression.push_str(&inline);
        expression.push(')');
    }
    if anchored {
        expression.push_str(r"\A(?:");
        expression.push_str(&body);
        expression.push(')');
    } else {
        expression.push_str(&body);
    }
    Ok(expression)
}

/// `\<` and `\>` are literal brackets in the stored syntax but word
/// boundaries in `regex`; an escaped delimiter is just the delimiter
fn unescape_body(body: &str, delimiter: char) -> String {
    let literal_delimiter = !REGEX_META.contains(delimiter);
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('<' | '>')) => out.push(next),
            Some(next) if next == delimiter && literal_delimiter => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
