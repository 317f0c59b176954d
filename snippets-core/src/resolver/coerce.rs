//! Final value coercion for resolved tags

use crate::context::ContextValue;

/// Render a resolved value as tag output
///
/// - scalars render as text, objects via their own string conversion
/// - non-empty lists and maps render as compact JSON
/// - null, empty collections and empty text render as `None`
pub fn render_value(value: &ContextValue) -> Option<String> {
    let text = match value {
        ContextValue::List(items) if items.is_empty() => return None,
        ContextValue::Map(entries) if entries.is_empty() => return None,
        ContextValue::List(_) | ContextValue::Map(_) => value.to_json().to_string(),
        scalar => scalar.scalar_text()?,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(render_value(&ContextValue::from("x")).as_deref(), Some("x"));
        assert_eq!(render_value(&ContextValue::from(json!(2.5))).as_deref(), Some("2.5"));
        assert_eq!(render_value(&ContextValue::Bool(true)).as_deref(), Some("true"));
        assert_eq!(render_value(&ContextValue::Null), None);
        assert_eq!(render_value(&ContextValue::from("")), None);
    }

    #[test]
    fn test_collections_render_as_json() {
        let list = ContextValue::from(json!([1, "two", {"three": 3}]));
        assert_eq!(render_value(&list).as_deref(), Some(r#"[1,"two",{"three":3}]"#));

        let map = ContextValue::Map(vec![("k".to_string(), ContextValue::from("v"))]);
        assert_eq!(render_value(&map).as_deref(), Some(r#"{"k":"v"}"#));
    }

    #[test]
    fn test_empty_collections_render_nothing() {
        assert_eq!(render_value(&ContextValue::List(vec![])), None);
        assert_eq!(render_value(&ContextValue::Map(vec![])), None);
        assert_eq!(render_value(&ContextValue::from(json!({}))), None);
    }
}
