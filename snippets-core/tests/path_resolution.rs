//! Public-API checks for standalone path resolution.

use serde_json::json;
use snippets_core::{resolve_path, ContextValue, PathResolver, SnippetVars};

fn context(value: serde_json::Value) -> ContextValue {
    ContextValue::from(value)
}

#[test]
fn test_scalar_and_indexed_paths() {
    let root = context(json!({
        "page": {
            "title": "Hi",
            "items": [{"name": "A"}, {"name": "B"}]
        }
    }));

    assert_eq!(resolve_path(&root, "page.title").as_deref(), Some("Hi"));
    assert_eq!(resolve_path(&root, "page.items.1.name").as_deref(), Some("B"));
}

#[test]
fn test_failures_yield_nothing() {
    let root = context(json!({"page": {}}));

    assert_eq!(resolve_path(&root, "page.missing.0.x"), None);
    assert_eq!(resolve_path(&root, "page.missing"), None);
    assert_eq!(resolve_path(&root, "page.0"), None);
}

#[test]
fn test_collections_serialize_as_json() {
    let root = context(json!({"page": {"tags": ["a", "b", 3], "none": []}}));

    let tags = resolve_path(&root, "page.tags").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&tags).unwrap();
    assert_eq!(parsed, json!(["a", "b", 3]));

    assert_eq!(resolve_path(&root, "page.none"), None);
}

#[test]
fn test_resolver_over_vars() {
    let vars = SnippetVars::new()
        .with("site", json!({"name": "Example", "langs": ["en", "de"]}))
        .with("page", json!({"title": "Home"}));
    let resolver = PathResolver::new();
    let root = vars.to_value();

    assert_eq!(resolver.resolve(&root, "site.name").as_deref(), Some("Example"));
    assert_eq!(resolver.resolve(&root, "site.langs.1").as_deref(), Some("de"));
    assert_eq!(resolver.resolve(&root, "..page..title").as_deref(), Some("Home"));
}

#[test]
fn test_json_objects_index_by_key_under_any_binding() {
    let vars = SnippetVars::new()
        .with("site", json!({"map": {"0": "x", "1": {"name": "y"}}}))
        .with("page", json!({"map": {"0": "x"}}));
    let root = vars.to_value();

    assert_eq!(resolve_path(&root, "site.map.0").as_deref(), Some("x"));
    assert_eq!(resolve_path(&root, "site.map.1.name").as_deref(), Some("y"));
    assert_eq!(resolve_path(&root, "page.map.0").as_deref(), Some("x"));
    assert_eq!(resolve_path(&root, "site.map.2"), None);
}
