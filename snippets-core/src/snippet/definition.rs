//! Snippet definitions as stored by the management layer

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::anchor::Anchor;

/// Element a snippet is anchored to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    /// `<head>` opening tag (attributes allowed)
    #[serde(alias = "/\\<head.*?\\>/i")]
    HeadOpen,
    /// `</head>`
    #[default]
    #[serde(alias = "/\\<\\/head\\>/i")]
    HeadClose,
    /// `<body>` opening tag (attributes allowed)
    #[serde(alias = "/\\<body.*?\\>/i")]
    BodyOpen,
    /// `</body>`
    #[serde(alias = "/\\<\\/body\\>/i")]
    BodyClose,
    /// User-supplied pattern in `element_regex`
    #[serde(rename = "other", alias = "custom")]
    Custom,
}

impl AnchorKind {
    /// Built-in pattern for the fixed kinds
    pub fn builtin_pattern(self) -> Option<&'static str> {
        match self {
            AnchorKind::HeadOpen => Some(r"(?i)<head\b[^>]*>"),
            AnchorKind::HeadClose => Some(r"(?i)</head\s*>"),
            AnchorKind::BodyOpen => Some(r"(?i)<body\b[^>]*>"),
            AnchorKind::BodyClose => Some(r"(?i)</body\s*>"),
            AnchorKind::Custom => None,
        }
    }
}

/// Where content goes relative to the anchor match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Before,
    After,
    Replace,
}

/// Which pages a snippet applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyScope {
    All,
    #[serde(rename = "admin")]
    AdminOnly,
    #[default]
    #[serde(rename = "non_admin")]
    NonAdminOnly,
    PageList,
    Selector,
}

/// A stored snippet
///
/// Field names on the wire follow the persisted columns (`snippet`,
/// `element`, `element_regex`, `apply_to`, ...). The engine only reads these;
/// `label`, `summary` and the audit fields are carried for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetDefinition {
    pub id: u64,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Raw content with `{{path}}` tags
    #[serde(rename = "snippet", default)]
    pub raw_content: String,

    #[serde(rename = "element", default)]
    pub anchor_kind: AnchorKind,

    /// Custom anchor pattern, used when `anchor_kind` is `Custom`
    #[serde(
        rename = "element_regex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub anchor_pattern: Option<String>,

    #[serde(default)]
    pub position: Position,

    #[serde(rename = "apply_to", default)]
    pub apply_scope: ApplyScope,

    /// Page identifiers for `PageList` scope; only positive integers survive loading
    #[serde(
        rename = "apply_to_page_list",
        default,
        deserialize_with = "deserialize_page_list"
    )]
    pub apply_page_list: Vec<u64>,

    #[serde(
        rename = "apply_to_selector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub apply_selector: Option<String>,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub enabled: bool,

    #[serde(rename = "sort", default)]
    pub sort_order: i64,

    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,

    #[serde(rename = "created_users_id", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<u64>,

    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified: Option<DateTime<Utc>>,

    #[serde(rename = "modified_users_id", default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<u64>,
}

impl SnippetDefinition {
    /// Create an enabled snippet that applies to all pages, before `</head>`
    pub fn new(id: u64, raw_content: impl Into<String>) -> Self {
        Self {
            id,
            label: format!("Snippet {}", id),
            summary: None,
            raw_content: raw_content.into(),
            anchor_kind: AnchorKind::HeadClose,
            anchor_pattern: None,
            position: Position::Before,
            apply_scope: ApplyScope::All,
            apply_page_list: Vec::new(),
            apply_selector: None,
            enabled: true,
            sort_order: 0,
            created: None,
            created_by: None,
            modified: None,
            modified_by: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_anchor(mut self, kind: AnchorKind) -> Self {
        self.anchor_kind = kind;
        self
    }

    /// Anchor to a custom pattern
    pub fn with_custom_anchor(mut self, pattern: impl Into<String>) -> Self {
        self.anchor_kind = AnchorKind::Custom;
        self.anchor_pattern = Some(pattern.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_scope(mut self, scope: ApplyScope) -> Self {
        self.apply_scope = scope;
        self
    }

    /// Restrict to listed pages (sets `PageList` scope)
    pub fn with_page_list(mut self, pages: impl IntoIterator<Item = u64>) -> Self {
        self.apply_scope = ApplyScope::PageList;
        self.apply_page_list = pages.into_iter().filter(|id| *id > 0).collect();
        self
    }

    /// Restrict to pages matching a selector (sets `Selector` scope)
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.apply_scope = ApplyScope::Selector;
        self.apply_selector = Some(selector.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Application order key: `(sort, id)`
    pub fn order_key(&self) -> (i64, u64) {
        (self.sort_order, self.id)
    }

    /// Effective anchor pattern text
    pub fn effective_pattern(&self) -> Option<&str> {
        match self.anchor_kind {
            AnchorKind::Custom => self.anchor_pattern.as_deref().filter(|p| !p.trim().is_empty()),
            kind => kind.builtin_pattern(),
        }
    }

    /// Validate the definition
    ///
    /// Returns every problem found rather than stopping at the first.
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.label.trim().is_empty() {
            errors.push("label is required".to_string());
        }

        if self.anchor_kind == AnchorKind::Custom {
            match self.effective_pattern() {
                None => errors.push("element_regex is required for element 'other'".to_string()),
                Some(_) => {
                    if let Err(e) = Anchor::compile(self) {
                        errors.push(e.to_string());
                    }
                }
            }
        }

        match self.apply_scope {
            ApplyScope::PageList if self.apply_page_list.is_empty() => {
                errors.push("apply_to_page_list must list at least one page".to_string());
            }
            ApplyScope::Selector
                if self.apply_selector.as_deref().map_or(true, |s| s.trim().is_empty()) =>
            {
                errors.push("apply_to_selector is required for selector scope".to_string());
            }
            _ => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Accepts `"5,9"`, `[5, 9]`, `["5", "9"]` or null; drops anything that
/// isn't a positive integer
fn deserialize_page_list<'de, D>(deserializer: D) -> std::result::Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let entries: Vec<Value> = match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(text)) => text
            .split(',')
            .map(|part| Value::String(part.to_string()))
            .collect(),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    };

    let mut pages = Vec::with_capacity(entries.len());
    for entry in entries {
        match parse_page_id(&entry) {
            Some(id) => pages.push(id),
            None => {
                let shown = match &entry {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                if !shown.is_empty() {
                    tracing::warn!("Dropping malformed page list entry '{}'", shown);
                }
            }
        }
    }
    Ok(pages)
}

fn parse_page_id(entry: &Value) -> Option<u64> {
    let id = match entry {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok()?
        }
        _ => return None,
    };
    (id > 0).then_some(id)
}

/// Accepts RFC 3339 and the SQL `YYYY-MM-DD HH:MM:SS` form (read as UTC).
/// Zero dates and anything unparseable load as `None`.
fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(text)) => parse_timestamp(&text),
        Some(Value::Number(n)) => n
            .as_i64()
            .filter(|secs| *secs > 0)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with("0000-00-00") {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(_) => {
            tracing::warn!("Ignoring unparseable timestamp '{}'", text);
            None
        }
    }
}

/// Accepts booleans and the stored `0`/`1` forms
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().map_or(false, |n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "on" | "yes"),
        _ => false,
    })
}
