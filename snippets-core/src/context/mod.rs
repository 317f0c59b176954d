//! Context objects - the data tags are resolved against
//!
//! The engine never knows the concrete shape of the host's data. Hosts expose
//! their page (and anything reachable from it) through [`ContextObject`], and
//! the page additionally answers the classification queries of
//! [`PageContext`]. Values flowing out of a lookup are [`ContextValue`]s:
//! scalars, nested objects, ordered lists, or keyed maps.
//!
//! ## Architecture
//!
//! ```text
//!   SnippetVars { page: <PageContext> }
//!         │
//!         │ get("page")
//!         ▼
//!   ContextValue::Object ──get("items")──▶ ContextValue::List
//!                                                │ at(1)
//!                                                ▼
//!                                       ContextValue::Object ──get("name")──▶ Text
//! ```
//!
//! [`JsonObject`] and [`JsonPage`] adapt plain `serde_json` data for hosts
//! (and tests) that don't have a richer model.

mod json;
mod selector;

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

pub use json::{JsonObject, JsonPage};
pub use selector::{Selector, SelectorClause, SelectorOp};

/// Name under which the current page is bound for tag resolution
pub const PAGE_BINDING: &str = "page";

/// A property-bearing object supplied by the host
///
/// Implementations must be cheap to query; the resolver may call `get`
/// several times per tag.
pub trait ContextObject: Send + Sync {
    /// Fetch a single named property
    fn get(&self, name: &str) -> Option<ContextValue>;

    /// Whether this object resolves compound `a.b.c` paths itself
    fn supports_dotted_lookup(&self) -> bool {
        false
    }

    /// Resolve a compound dotted path in one step
    ///
    /// Only consulted when [`supports_dotted_lookup`](Self::supports_dotted_lookup)
    /// returns true. Returning `None` lets the resolver fall back to walking
    /// the path one segment at a time.
    fn get_dotted(&self, _path: &str) -> Option<ContextValue> {
        None
    }

    /// Whether [`at`](Self::at) can select elements of this object
    fn is_collection(&self) -> bool {
        false
    }

    /// Select an element by 0-based index
    fn at(&self, _index: usize) -> Option<ContextValue> {
        None
    }

    /// The host's own string conversion of this object
    fn to_text(&self) -> String;

    /// Representation used when this object appears inside a serialized collection
    fn to_json(&self) -> Value {
        Value::String(self.to_text())
    }
}

/// The page currently being rendered
pub trait PageContext: ContextObject {
    /// Numeric page identifier
    fn identifier(&self) -> u64;

    /// Whether the page belongs to the administration area
    fn is_admin_area(&self) -> bool;

    /// Whether the page matches a host selector expression
    fn matches_selector(&self, selector: &str) -> bool;
}

/// A value reachable from the context root
#[derive(Clone)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Property-bearing object
    Object(Arc<dyn ContextObject>),
    /// Ordered collection
    List(Vec<ContextValue>),
    /// Keyed collection, in insertion order
    Map(Vec<(String, ContextValue)>),
}

impl ContextValue {
    /// Wrap a host object
    pub fn object<T: ContextObject + 'static>(object: T) -> Self {
        ContextValue::Object(Arc::new(object))
    }

    /// Fetch a named property from an object or keyed collection
    pub fn get(&self, name: &str) -> Option<ContextValue> {
        match self {
            ContextValue::Object(object) => object.get(name),
            ContextValue::Map(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// Whether this value can be indexed with [`at`](Self::at)
    pub fn is_collection(&self) -> bool {
        match self {
            ContextValue::List(_) | ContextValue::Map(_) => true,
            ContextValue::Object(object) => object.is_collection(),
            _ => false,
        }
    }

    /// Select a collection element by 0-based index
    ///
    /// Keyed collections are indexed by key, so `at(2)` finds the entry keyed `"2"`.
    pub fn at(&self, index: usize) -> Option<ContextValue> {
        match self {
            ContextValue::List(items) => items.get(index).cloned(),
            ContextValue::Map(_) => self.get(&index.to_string()),
            ContextValue::Object(object) if object.is_collection() => object.at(index),
            _ => None,
        }
    }

    /// Whether this value resolves compound dotted paths natively
    pub fn supports_dotted_lookup(&self) -> bool {
        match self {
            ContextValue::Object(object) => object.supports_dotted_lookup(),
            _ => false,
        }
    }

    /// Native compound lookup, if supported
    pub fn get_dotted(&self, path: &str) -> Option<ContextValue> {
        match self {
            ContextValue::Object(object) if object.supports_dotted_lookup() => {
                object.get_dotted(path)
            }
            _ => None,
        }
    }

    /// Scalar rendering; `None` for null and for collections
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            ContextValue::Null => None,
            ContextValue::Bool(b) => Some(b.to_string()),
            ContextValue::Number(n) => Some(n.to_string()),
            ContextValue::Text(s) => Some(s.clone()),
            ContextValue::Object(object) => Some(object.to_text()),
            ContextValue::List(_) | ContextValue::Map(_) => None,
        }
    }

    /// Convert to JSON for collection serialization
    pub fn to_json(&self) -> Value {
        match self {
            ContextValue::Null => Value::Null,
            ContextValue::Bool(b) => Value::Bool(*b),
            ContextValue::Number(n) => Value::Number(n.clone()),
            ContextValue::Text(s) => Value::String(s.clone()),
            ContextValue::Object(object) => object.to_json(),
            ContextValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            ContextValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Null => write!(f, "Null"),
            ContextValue::Bool(b) => write!(f, "Bool({})", b),
            ContextValue::Number(n) => write!(f, "Number({})", n),
            ContextValue::Text(s) => write!(f, "Text({:?})", s),
            ContextValue::Object(object) => write!(f, "Object({})", object.to_text()),
            ContextValue::List(items) => f.debug_list().entries(items).finish(),
            ContextValue::Map(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
        }
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ContextValue::Null,
            Value::Bool(b) => ContextValue::Bool(b),
            Value::Number(n) => ContextValue::Number(n),
            Value::String(s) => ContextValue::Text(s),
            Value::Array(items) => ContextValue::List(items.into_iter().map(ContextValue::from).collect()),
            Value::Object(map) => ContextValue::object(JsonObject::new(map)),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

/// Root bindings a snippet's tags are resolved against
///
/// Conventionally holds a single `page` binding, built fresh for every
/// render pass.
#[derive(Debug, Clone, Default)]
pub struct SnippetVars {
    bindings: Vec<(String, ContextValue)>,
}

impl SnippetVars {
    /// Create empty bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings holding only the current page
    pub fn for_page<P: PageContext + 'static>(page: Arc<P>) -> Self {
        Self::new().with(PAGE_BINDING, ContextValue::Object(page))
    }

    /// Add or replace a binding
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a binding in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ContextValue>) {
        let name = name.into();
        let value = value.into();
        match self.bindings.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.bindings.push((name, value)),
        }
    }

    /// Names of all bindings
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(name, _)| name.as_str())
    }

    /// Turn the bindings into a resolvable root value
    pub fn to_value(&self) -> ContextValue {
        ContextValue::object(self.clone())
    }
}

impl ContextObject for SnippetVars {
    fn get(&self, name: &str) -> Option<ContextValue> {
        self.bindings
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn to_text(&self) -> String {
        self.to_json().to_string()
    }

    fn to_json(&self) -> Value {
        Value::Object(
            self.bindings
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion_shapes() {
        let value = ContextValue::from(json!({
            "title": "Hello",
            "count": 3,
            "tags": ["a", "b"],
        }));

        assert!(matches!(value, ContextValue::Object(_)));
        assert_eq!(value.get("title").unwrap().scalar_text().unwrap(), "Hello");
        assert_eq!(value.get("count").unwrap().scalar_text().unwrap(), "3");

        let tags = value.get("tags").unwrap();
        assert!(tags.is_collection());
        assert_eq!(tags.at(1).unwrap().scalar_text().unwrap(), "b");
        assert!(tags.at(2).is_none());
    }

    #[test]
    fn test_keyed_collection_lookup() {
        let map = ContextValue::Map(vec![
            ("0".to_string(), ContextValue::from("zero")),
            ("en".to_string(), ContextValue::from("English")),
        ]);

        assert_eq!(map.get("en").unwrap().scalar_text().unwrap(), "English");
        assert_eq!(map.at(0).unwrap().scalar_text().unwrap(), "zero");
        assert_eq!(map.to_json(), json!({"0": "zero", "en": "English"}));
    }

    #[test]
    fn test_scalars_are_not_collections() {
        let text = ContextValue::from("plain");
        assert!(!text.is_collection());
        assert!(text.at(0).is_none());
        assert!(text.get("len").is_none());
    }

    #[test]
    fn test_vars_replace_binding() {
        let vars = SnippetVars::new()
            .with("site", "first")
            .with("site", "second");

        assert_eq!(vars.names().count(), 1);
        assert_eq!(vars.get("site").unwrap().scalar_text().unwrap(), "second");
        assert_eq!(vars.to_json(), json!({"site": "second"}));
    }
}
