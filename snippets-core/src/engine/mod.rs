//! Snippet Engine - applies snippets to rendered markup
//!
//! ## Render pass
//!
//! ```text
//! rendered markup ──┐
//!                   ▼
//!   ┌─────────────────────────────────────────┐
//!   │ for each snippet, in (sort, id) order:  │
//!   │   1. applicable to this page?           │──no──▶ skip, continue
//!   │   2. find first anchor match            │──none─▶ unchanged, continue
//!   │   3. substitute {{tags}} in content     │
//!   │   4. splice before / after / in place   │
//!   └─────────────────────────────────────────┘
//!                   │
//!                   ▼
//!            markup for the next snippet
//! ```
//!
//! A pass never fails. Inapplicable snippets and missing anchors leave the
//! markup alone; a snippet whose anchor can't be compiled is skipped with a
//! warning in the [`PassReport`]. Definitions the loader rejected are listed
//! there too.

mod report;
mod tags;

pub use report::{Diagnostic, PassReport};
pub use tags::{populate_tags, resolve_tag, tag_paths};

use std::sync::Arc;

use regex::Match;

use crate::config::{EngineConfig, TagOptions};
use crate::context::{ContextValue, PageContext, SnippetVars};
use crate::error::Result;
use crate::resolver::PathResolver;
use crate::snippet::{Anchor, ApplyScope, Position, SnippetDefinition, SnippetSnapshot};

/// Whether a snippet applies to a page
pub fn is_applicable<P: PageContext + ?Sized>(snippet: &SnippetDefinition, page: &P) -> bool {
    match snippet.apply_scope {
        ApplyScope::All => true,
        ApplyScope::AdminOnly => page.is_admin_area(),
        ApplyScope::NonAdminOnly => !page.is_admin_area(),
        ApplyScope::PageList => {
            !snippet.apply_page_list.is_empty()
                && snippet.apply_page_list.contains(&page.identifier())
        }
        ApplyScope::Selector => snippet
            .apply_selector
            .as_deref()
            .map(str::trim)
            .filter(|selector| !selector.is_empty())
            .is_some_and(|selector| page.matches_selector(selector)),
    }
}

/// Put `content` at the anchor match according to `position`
pub fn splice(markup: &str, anchor: Match<'_>, content: &str, position: Position) -> String {
    let (before, matched, after) = (
        &markup[..anchor.start()],
        anchor.as_str(),
        &markup[anchor.end()..],
    );

    let mut out = String::with_capacity(markup.len() + content.len());
    out.push_str(before);
    match position {
        Position::Before => {
            out.push_str(content);
            out.push_str(matched);
        }
        Position::After => {
            out.push_str(matched);
            out.push_str(content);
        }
        Position::Replace => out.push_str(content),
    }
    out.push_str(after);
    out
}

/// The snippet application engine
///
/// Holds only configuration; every pass works on its own copies, so one
/// engine can serve concurrent renders.
#[derive(Debug, Clone, Default)]
pub struct SnippetEngine {
    config: EngineConfig,
    resolver: PathResolver,
}

impl SnippetEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine from a validated configuration
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let resolver = PathResolver::new().with_root_binding(config.root_binding.clone());
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Bindings for a page under the configured root binding
    pub fn vars_for<P: PageContext + 'static>(&self, page: &Arc<P>) -> SnippetVars {
        let page: Arc<P> = Arc::clone(page);
        SnippetVars::new().with(self.config.root_binding.clone(), ContextValue::Object(page))
    }

    /// Whether a snippet applies to a page
    pub fn is_applicable<P: PageContext + ?Sized>(&self, snippet: &SnippetDefinition, page: &P) -> bool {
        is_applicable(snippet, page)
    }

    /// Resolve a single dotted path against bindings
    pub fn resolve_path(&self, vars: &SnippetVars, path: &str) -> Option<String> {
        self.resolver.resolve(&vars.to_value(), path)
    }

    /// Apply one snippet to markup, regardless of applicability
    ///
    /// Returns the markup unchanged when the anchor is missing or can't be
    /// compiled.
    pub fn apply_one(
        &self,
        snippet: &SnippetDefinition,
        markup: &str,
        vars: &SnippetVars,
        options: &TagOptions,
    ) -> String {
        let anchor = match Anchor::compile(snippet) {
            Ok(anchor) => anchor,
            Err(e) => {
                tracing::warn!("Skipping snippet {}: {}", snippet.id, e);
                return markup.to_string();
            }
        };

        let root = vars.to_value();
        self.apply_with_anchor(snippet, &anchor, markup, &root, options)
            .unwrap_or_else(|| markup.to_string())
    }

    /// Apply every applicable snippet in the snapshot
    pub fn apply_all<P: PageContext + 'static>(
        &self,
        markup: &str,
        page: &Arc<P>,
        snapshot: &SnippetSnapshot,
    ) -> String {
        self.apply_all_with_report(markup, page, snapshot).markup
    }

    /// Apply every applicable snippet and report what happened
    pub fn apply_all_with_report<P: PageContext + 'static>(
        &self,
        markup: &str,
        page: &Arc<P>,
        snapshot: &SnippetSnapshot,
    ) -> PassReport {
        let mut report = PassReport::unchanged(markup);
        report.warnings.extend(snapshot.rejected().iter().cloned());
        if markup.is_empty() || snapshot.is_empty() {
            return report;
        }

        let root = self.vars_for(page).to_value();
        let mut current = markup.to_string();

        for entry in snapshot.iter() {
            let snippet = entry.definition();

            if !is_applicable(snippet, page.as_ref()) {
                tracing::debug!("Snippet {} does not apply to page {}", snippet.id, page.identifier());
                report.skipped.push(snippet.id);
                continue;
            }

            let anchor = match entry.anchor() {
                Ok(anchor) => anchor,
                Err(e) => {
                    tracing::warn!("Skipping snippet {}: {}", snippet.id, e);
                    report.warnings.push(Diagnostic::from_error(snippet.id, e));
                    continue;
                }
            };

            match self.apply_with_anchor(snippet, anchor, &current, &root, &self.config.tags) {
                Some(next) => {
                    tracing::debug!("Applied snippet {} ({:?})", snippet.id, snippet.position);
                    current = next;
                    report.applied.push(snippet.id);
                }
                None => report.unmatched.push(snippet.id),
            }
        }

        report.markup = current;
        report
    }

    fn apply_with_anchor(
        &self,
        snippet: &SnippetDefinition,
        anchor: &Anchor,
        markup: &str,
        root: &ContextValue,
        options: &TagOptions,
    ) -> Option<String> {
        let Some(found) = anchor.find(markup) else {
            tracing::trace!("Anchor of snippet {} not found", snippet.id);
            return None;
        };

        let content = populate_tags(
            &snippet.raw_content,
            root,
            &self.resolver,
            options,
            &self.config.alternative_separator,
        );
        Some(splice(markup, found, &content, snippet.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::JsonPage;
    use crate::snippet::AnchorKind;
    use serde_json::json;

    fn page(value: serde_json::Value) -> Arc<JsonPage> {
        Arc::new(JsonPage::from_value(value))
    }

    const DOC: &str = "<html><head><title>X</title></head><body><p>hi</p></body></html>";

    #[test]
    fn test_scenario_meta_before_head_close() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1, "title": "Hi"}));
        let snapshot = SnippetSnapshot::new(vec![SnippetDefinition::new(
            1,
            "<meta name='x' content='{{page.title}}'>",
        )]);

        let out = engine.apply_all("<head><title>X</title></head>", &page, &snapshot);
        assert_eq!(out, "<head><title>X</title><meta name='x' content='Hi'></head>");
    }

    #[test]
    fn test_positions() {
        let engine = SnippetEngine::new();
        let vars = SnippetVars::new();
        let tags = TagOptions::default();
        let base = SnippetDefinition::new(1, "C").with_custom_anchor("<T>");

        let before = engine.apply_one(&base.clone().with_position(Position::Before), "a<T>b", &vars, &tags);
        let after = engine.apply_one(&base.clone().with_position(Position::After), "a<T>b", &vars, &tags);
        let replace = engine.apply_one(&base.with_position(Position::Replace), "a<T>b", &vars, &tags);

        assert_eq!(before, "aC<T>b");
        assert_eq!(after, "a<T>Cb");
        assert_eq!(replace, "aCb");
    }

    #[test]
    fn test_empty_content_replace_removes_anchor() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1}));
        let snapshot = SnippetSnapshot::new(vec![SnippetDefinition::new(1, "")
            .with_custom_anchor("<div class=\"ad\">")
            .with_position(Position::Replace)]);

        let out = engine.apply_all("<p><div class=\"ad\"></div></p>", &page, &snapshot);
        assert_eq!(out, "<p></div></p>");
    }

    #[test]
    fn test_rejected_definitions_surface_as_warnings() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1}));
        let snapshot = crate::snippet::SnapshotLoader::new()
            .load_from_json(
                r#"[
                    {"id": 1, "label": "Good", "snippet": "<ok>", "enabled": 1, "apply_to": "all"},
                    {"id": 2, "label": "Bad", "snippet": "<bad>", "element": "other", "enabled": 1, "apply_to": "all"}
                ]"#,
            )
            .unwrap();

        let report = engine.apply_all_with_report(DOC, &page, &snapshot);
        assert_eq!(report.applied, vec![1]);
        assert!(report.markup.contains("<ok></head>"));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].snippet_id, 2);
        assert_eq!(report.warnings[0].code, "INVALID_DEFINITION");
    }

    #[test]
    fn test_single_shot_anchor() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1}));
        let snapshot = SnippetSnapshot::new(vec![SnippetDefinition::new(1, "<x>")]);

        let out = engine.apply_all("</head></head>", &page, &snapshot);
        assert_eq!(out, "<x></head></head>");
    }

    #[test]
    fn test_inapplicable_snippet_does_not_stop_the_pass() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 7}));
        let snapshot = SnippetSnapshot::new(vec![
            SnippetDefinition::new(1, "<a>").with_page_list([5, 9]).with_sort_order(1),
            SnippetDefinition::new(2, "<b>").with_sort_order(2),
        ]);

        let report = engine.apply_all_with_report(DOC, &page, &snapshot);
        assert_eq!(report.skipped, vec![1]);
        assert_eq!(report.applied, vec![2]);
        assert!(report.markup.contains("<b></head>"));
        assert!(!report.markup.contains("<a>"));
    }

    #[test]
    fn test_malformed_pattern_is_a_warning() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1}));
        let snapshot = SnippetSnapshot::new(vec![
            SnippetDefinition::new(1, "<bad>").with_custom_anchor("/(/").with_sort_order(1),
            SnippetDefinition::new(2, "<ok>").with_anchor(AnchorKind::BodyClose).with_sort_order(2),
        ]);

        let report = engine.apply_all_with_report(DOC, &page, &snapshot);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].snippet_id, 1);
        assert_eq!(report.warnings[0].code, "MALFORMED_PATTERN");
        assert_eq!(report.applied, vec![2]);
        assert!(report.markup.contains("<ok></body>"));
    }

    #[test]
    fn test_apply_one_with_broken_anchor_returns_input() {
        let engine = SnippetEngine::new();
        let snippet = SnippetDefinition::new(1, "x").with_custom_anchor("/[/");
        let out = engine.apply_one(&snippet, DOC, &SnippetVars::new(), &TagOptions::default());
        assert_eq!(out, DOC);
    }

    #[test]
    fn test_missing_anchor_leaves_markup() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1}));
        let snapshot = SnippetSnapshot::new(vec![SnippetDefinition::new(1, "<x>")]);

        let report = engine.apply_all_with_report("<p>fragment</p>", &page, &snapshot);
        assert_eq!(report.markup, "<p>fragment</p>");
        assert_eq!(report.unmatched, vec![1]);
        assert!(!report.is_modified());
    }

    #[test]
    fn test_empty_markup_is_untouched() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1}));
        let snapshot = SnippetSnapshot::new(vec![
            SnippetDefinition::new(1, "<x>").with_custom_anchor("^"),
        ]);
        assert_eq!(engine.apply_all("", &page, &snapshot), "");
    }

    #[test]
    fn test_scopes() {
        let public = JsonPage::from_value(json!({"id": 5, "template": "home"}));
        let admin = JsonPage::from_value(json!({"id": 2, "template": "admin"}));

        let all = SnippetDefinition::new(1, "");
        let admin_only = SnippetDefinition::new(1, "").with_scope(ApplyScope::AdminOnly);
        let non_admin = SnippetDefinition::new(1, "").with_scope(ApplyScope::NonAdminOnly);
        let listed = SnippetDefinition::new(1, "").with_page_list([5, 9]);
        let empty_list = SnippetDefinition::new(1, "").with_scope(ApplyScope::PageList);
        let selector = SnippetDefinition::new(1, "").with_selector("template=home");
        let empty_selector = SnippetDefinition::new(1, "").with_selector("  ");

        assert!(is_applicable(&all, &public) && is_applicable(&all, &admin));
        assert!(!is_applicable(&admin_only, &public) && is_applicable(&admin_only, &admin));
        assert!(is_applicable(&non_admin, &public) && !is_applicable(&non_admin, &admin));
        assert!(is_applicable(&listed, &public) && !is_applicable(&listed, &admin));
        assert!(!is_applicable(&empty_list, &public));
        assert!(is_applicable(&selector, &public) && !is_applicable(&selector, &admin));
        assert!(!is_applicable(&empty_selector, &public));
    }

    #[test]
    fn test_later_snippets_see_earlier_output() {
        let engine = SnippetEngine::new();
        let page = page(json!({"id": 1}));
        let snapshot = SnippetSnapshot::new(vec![
            SnippetDefinition::new(1, "<div id=\"slot\"></div>")
                .with_anchor(AnchorKind::BodyOpen)
                .with_position(Position::After)
                .with_sort_order(1),
            SnippetDefinition::new(2, "<span>filled</span>")
                .with_custom_anchor("<div id=\"slot\">")
                .with_position(Position::After)
                .with_sort_order(2),
        ]);

        let out = engine.apply_all(DOC, &page, &snapshot);
        assert!(out.contains("<body><div id=\"slot\"><span>filled</span></div><p>"));
    }

    #[test]
    fn test_custom_root_binding() {
        let config = EngineConfig {
            root_binding: "doc".to_string(),
            ..Default::default()
        };
        let engine = SnippetEngine::with_config(config).unwrap();
        let page = page(json!({"id": 3, "title": "Hi"}));
        let snapshot = SnippetSnapshot::new(vec![SnippetDefinition::new(1, "[{{doc.title}}{{page.title}}]")]);

        let out = engine.apply_all("</head>", &page, &snapshot);
        assert_eq!(out, "[Hi]</head>");

        let vars = engine.vars_for(&page);
        assert_eq!(engine.resolve_path(&vars, "doc.title").as_deref(), Some("Hi"));
        assert_eq!(engine.resolve_path(&vars, "page.title"), None);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            tags: TagOptions::new("%", "%"),
            ..Default::default()
        };
        assert!(SnippetEngine::with_config(config).is_err());
    }
}
