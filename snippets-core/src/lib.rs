//! # Snippets Core - markup snippet injection
//!
//! Injects configured fragments of markup ("snippets") into a page's
//! rendered output:
//!
//! - **PathResolver**: resolves `{{a.b.0.c}}` dotted paths against a context
//!   of host objects, lists and maps, and renders the result as text
//! - **SnippetEngine**: decides which snippets apply to the page, fills their
//!   tags, finds each snippet's anchor and splices the content before, after
//!   or in place of it
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐    ┌──────────────────┐    ┌───────────────────┐
//! │  SnapshotLoader   │───▶│ SnippetSnapshot  │───▶│   SnippetEngine   │
//! │  (JSON → defs)    │    │ (enabled, sorted,│    │ (one render pass) │
//! └───────────────────┘    │  anchors built)  │    └─────────┬─────────┘
//!                          └──────────────────┘              │
//!                                          ┌─────────────────┴──────────┐
//!                                          ▼                            ▼
//!                                 ┌─────────────────┐         ┌──────────────────┐
//!                                 │  PathResolver   │         │  PageContext     │
//!                                 │ ({{tags}} → txt)│         │ (scope checks)   │
//!                                 └─────────────────┘         └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use snippets_core::{JsonPage, SnapshotLoader, SnippetEngine};
//! use serde_json::json;
//!
//! let snapshot = SnapshotLoader::new().load_from_json(r#"[
//!     {
//!         "id": 1,
//!         "label": "Meta",
//!         "snippet": "<meta name='x' content='{{page.title}}'>",
//!         "element": "head_close",
//!         "apply_to": "all",
//!         "enabled": true
//!     }
//! ]"#).unwrap();
//!
//! let page = Arc::new(JsonPage::from_value(json!({"id": 1, "title": "Hi"})));
//! let engine = SnippetEngine::new();
//!
//! let out = engine.apply_all("<head><title>X</title></head>", &page, &snapshot);
//! assert_eq!(out, "<head><title>X</title><meta name='x' content='Hi'></head>");
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod snippet;

use std::sync::Arc;

// Re-export main types
pub use config::{EngineConfig, TagOptions};
pub use context::{
    ContextObject, ContextValue, JsonObject, JsonPage, PageContext, Selector, SnippetVars,
    PAGE_BINDING,
};
pub use engine::{Diagnostic, PassReport, SnippetEngine};
pub use error::{ErrorCategory, ErrorDetail, ErrorResponse, Result, SnippetError};
pub use resolver::{render_value, resolve_path, PathResolver};
pub use snippet::{
    Anchor, AnchorKind, ApplyScope, Position, SnapshotLoader, SnippetDefinition, SnippetSnapshot,
};

/// Apply a snapshot to markup with the default engine
pub fn apply_all<P: PageContext + 'static>(
    markup: &str,
    page: &Arc<P>,
    snapshot: &SnippetSnapshot,
) -> String {
    SnippetEngine::new().apply_all(markup, page, snapshot)
}

/// Apply a single snippet to markup with the default engine
pub fn apply_one(
    snippet: &SnippetDefinition,
    markup: &str,
    vars: &SnippetVars,
    options: &TagOptions,
) -> String {
    SnippetEngine::new().apply_one(snippet, markup, vars, options)
}

/// Whether a snippet applies to a page
pub fn is_applicable<P: PageContext + ?Sized>(snippet: &SnippetDefinition, page: &P) -> bool {
    engine::is_applicable(snippet, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_snapshot() -> SnippetSnapshot {
        SnapshotLoader::new()
            .load_from_json(
                &json!({
                    "snippets": [
                        {
                            "id": 10,
                            "label": "Analytics",
                            "snippet": "<script src='/a.js' data-page='{{page.id}}'></script>",
                            "element": "body_close",
                            "apply_to": "non_admin",
                            "sort": 2,
                            "enabled": 1
                        },
                        {
                            "id": 11,
                            "label": "Canonical",
                            "snippet": "<link rel='canonical' href='{{page.httpUrl|page.url}}'>",
                            "element": "head_close",
                            "apply_to": "page_list",
                            "apply_to_page_list": "5,9",
                            "sort": 1,
                            "enabled": "1"
                        },
                        {
                            "id": 12,
                            "label": "Admin banner",
                            "snippet": "<div class='banner'>{{page.title}}</div>",
                            "element": "body_open",
                            "position": "after",
                            "apply_to": "admin",
                            "enabled": true
                        },
                        {
                            "id": 13,
                            "label": "Draft",
                            "snippet": "<!-- draft -->",
                            "enabled": false
                        }
                    ]
                })
                .to_string(),
            )
            .unwrap()
    }

    const DOC: &str = "<html><head><title>T</title></head><body><p>x</p></body></html>";

    #[test]
    fn test_full_workflow() {
        let snapshot = create_test_snapshot();
        assert_eq!(snapshot.len(), 3);

        let page = Arc::new(JsonPage::from_value(json!({
            "id": 5,
            "title": "Home",
            "url": "/home/",
            "template": "home"
        })));

        let report = SnippetEngine::new().apply_all_with_report(DOC, &page, &snapshot);
        assert_eq!(report.applied, vec![11, 10]);
        assert_eq!(report.skipped, vec![12]);
        assert!(!report.has_warnings());
        assert_eq!(
            report.markup,
            "<html><head><title>T</title><link rel='canonical' href='/home/'></head>\
             <body><p>x</p><script src='/a.js' data-page='5'></script></body></html>"
        );
    }

    #[test]
    fn test_admin_page_workflow() {
        let snapshot = create_test_snapshot();
        let page = Arc::new(JsonPage::from_value(json!({
            "id": 2,
            "title": "Pages",
            "template": "admin"
        })));

        let out = apply_all(DOC, &page, &snapshot);
        assert_eq!(
            out,
            "<html><head><title>T</title></head><body><div class='banner'>Pages</div><p>x</p></body></html>"
        );
    }

    #[test]
    fn test_top_level_helpers() {
        let page = JsonPage::from_value(json!({"id": 9}));
        let snippet = SnippetDefinition::new(1, "[{{page.id}}]").with_page_list([9]);
        assert!(is_applicable(&snippet, &page));

        let vars = SnippetVars::for_page(Arc::new(page));
        let out = apply_one(&snippet, "</head>", &vars, &TagOptions::default());
        assert_eq!(out, "[9]</head>");

        let root = vars.to_value();
        assert_eq!(resolve_path(&root, "page.id"), Some("9".to_string()));
    }
}
