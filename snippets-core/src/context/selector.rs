//! A small page selector language
//!
//! Selectors are comma-separated clauses that must all match:
//!
//! ```text
//! template=basic-page|home, id>10, title*=News
//! ```
//!
//! Supported operators:
//! - `=` / `!=`  equality (any of the `|`-separated values)
//! - `*=`        contains
//! - `^=` / `$=` starts / ends with
//! - `>` `<` `>=` `<=` numeric comparison
//!
//! Field names may be dotted (`parent.name`) when the object supports
//! dotted lookup.

use super::{ContextObject, ContextValue};

/// Comparison operator of a selector clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorOp {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

// Longest operators first so `!=` wins over `=`
const OPERATORS: &[(&str, SelectorOp)] = &[
    ("!=", SelectorOp::NotEquals),
    ("*=", SelectorOp::Contains),
    ("^=", SelectorOp::StartsWith),
    ("$=", SelectorOp::EndsWith),
    (">=", SelectorOp::GreaterOrEqual),
    ("<=", SelectorOp::LessOrEqual),
    ("=", SelectorOp::Equals),
    (">", SelectorOp::GreaterThan),
    ("<", SelectorOp::LessThan),
];

/// A single `field op value` clause
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorClause {
    pub field: String,
    pub op: SelectorOp,
    pub values: Vec<String>,
}

/// A parsed selector: all clauses must match
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub clauses: Vec<SelectorClause>,
}

impl Selector {
    /// Parse a selector expression
    ///
    /// Returns `None` for empty selectors and for any clause without a
    /// field name or operator.
    pub fn parse(input: &str) -> Option<Self> {
        let clauses = split_unquoted(input, ',')
            .into_iter()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(parse_clause)
            .collect::<Option<Vec<_>>>()?;

        if clauses.is_empty() {
            return None;
        }
        Some(Self { clauses })
    }

    /// Evaluate against an object
    pub fn matches(&self, object: &dyn ContextObject) -> bool {
        self.clauses.iter().all(|clause| clause.matches(object))
    }
}

fn parse_clause(clause: &str) -> Option<SelectorClause> {
    let start = clause.find(|c| matches!(c, '!' | '*' | '^' | '$' | '<' | '>' | '='))?;
    let (op_text, op) = OPERATORS
        .iter()
        .find(|(text, _)| clause[start..].starts_with(text))?;

    let field = clause[..start].trim();
    if field.is_empty() {
        return None;
    }

    let values = split_unquoted(&clause[start + op_text.len()..], '|')
        .into_iter()
        .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .collect();

    Some(SelectorClause {
        field: field.to_string(),
        op: *op,
        values,
    })
}

/// Split on `separator`, ignoring separators inside single or double quotes
fn split_unquoted(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (pos, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == separator => {
                parts.push(&input[start..pos]);
                start = pos + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

impl SelectorClause {
    fn matches(&self, object: &dyn ContextObject) -> bool {
        let actual = field_text(object, &self.field).unwrap_or_default();

        match self.op {
            // `!=` holds only when the field differs from every listed value
            SelectorOp::NotEquals => self.values.iter().all(|v| *v != actual),
            _ => self.values.iter().any(|expected| self.compare(&actual, expected)),
        }
    }

    fn compare(&self, actual: &str, expected: &str) -> bool {
        match self.op {
            SelectorOp::Equals => actual == expected,
            SelectorOp::NotEquals => actual != expected,
            SelectorOp::Contains => actual.contains(expected),
            SelectorOp::StartsWith => actual.starts_with(expected),
            SelectorOp::EndsWith => actual.ends_with(expected),
            SelectorOp::GreaterThan => numeric(actual, expected, |a, b| a > b),
            SelectorOp::LessThan => numeric(actual, expected, |a, b| a < b),
            SelectorOp::GreaterOrEqual => numeric(actual, expected, |a, b| a >= b),
            SelectorOp::LessOrEqual => numeric(actual, expected, |a, b| a <= b),
        }
    }
}

fn field_text(object: &dyn ContextObject, field: &str) -> Option<String> {
    let value = if field.contains('.') && object.supports_dotted_lookup() {
        object.get_dotted(field)?
    } else {
        object.get(field)?
    };

    match value {
        ContextValue::Bool(b) => Some(if b { "1" } else { "0" }.to_string()),
        other => other.scalar_text(),
    }
}

fn numeric(actual: &str, expected: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.trim().parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(b)) => cmp(a, b),
        _ => false,
    }
}
