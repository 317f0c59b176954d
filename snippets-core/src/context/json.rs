//! `serde_json` adapters for context objects

use serde_json::{Map, Value};

use super::selector::Selector;
use super::{ContextObject, ContextValue, PageContext};

/// A JSON object exposed as a property-bearing context object
///
/// Supports native dotted lookup through nested objects, so `meta.og.title`
/// resolves in one step. Paths that step into arrays are left to the
/// resolver's index handling. The object is also a keyed collection: `at(0)`
/// selects the member keyed `"0"`.
#[derive(Debug, Clone, Default)]
pub struct JsonObject {
    data: Map<String, Value>,
}

impl JsonObject {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Build from any JSON value; non-objects yield an empty object
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Self::new(data),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    fn lookup_nested(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let mut current = self.data.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

impl ContextObject for JsonObject {
    fn get(&self, name: &str) -> Option<ContextValue> {
        self.data.get(name).cloned().map(ContextValue::from)
    }

    fn supports_dotted_lookup(&self) -> bool {
        true
    }

    fn get_dotted(&self, path: &str) -> Option<ContextValue> {
        self.lookup_nested(path).cloned().map(ContextValue::from)
    }

    fn is_collection(&self) -> bool {
        true
    }

    fn at(&self, index: usize) -> Option<ContextValue> {
        self.get(&index.to_string())
    }

    fn to_text(&self) -> String {
        if self.data.is_empty() {
            return String::new();
        }
        Value::Object(self.data.clone()).to_string()
    }

    fn to_json(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

/// A page backed by a JSON object
///
/// - identifier: the `id` field
/// - admin area: `admin: true`, or `template` equal to `"admin"`
/// - selectors: evaluated with [`Selector`] against the page's fields
///
/// Converting the page itself to text yields its identifier.
#[derive(Debug, Clone, Default)]
pub struct JsonPage {
    fields: JsonObject,
}

impl JsonPage {
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            fields: JsonObject::new(data),
        }
    }

    /// Build from any JSON value; non-objects yield a page without fields
    pub fn from_value(value: Value) -> Self {
        Self {
            fields: JsonObject::from_value(value),
        }
    }

    /// Page template name, if set
    pub fn template(&self) -> Option<&str> {
        self.fields.as_map().get("template").and_then(|v| v.as_str())
    }
}

impl ContextObject for JsonPage {
    fn get(&self, name: &str) -> Option<ContextValue> {
        self.fields.get(name)
    }

    fn supports_dotted_lookup(&self) -> bool {
        true
    }

    fn get_dotted(&self, path: &str) -> Option<ContextValue> {
        self.fields.get_dotted(path)
    }

    fn to_text(&self) -> String {
        self.identifier().to_string()
    }

    fn to_json(&self) -> Value {
        Value::from(self.identifier())
    }
}

impl PageContext for JsonPage {
    fn identifier(&self) -> u64 {
        self.fields
            .as_map()
            .get("id")
            .and_then(|id| match id {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .unwrap_or(0)
    }

    fn is_admin_area(&self) -> bool {
        let flagged = self
            .fields
            .as_map()
            .get("admin")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        flagged || self.template() == Some("admin")
    }

    fn matches_selector(&self, selector: &str) -> bool {
        match Selector::parse(selector) {
            Some(selector) => selector.matches(self),
            None => {
                tracing::debug!("Unparseable selector '{}' matches nothing", selector);
                false
            }
        }
    }
}
