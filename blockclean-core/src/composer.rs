//! composer.rs - Composes and caches the effective rule set of each tool.
//!
//! A tool's effective rules come from two places: what the tool declares for
//! each of its fields, and the tags its enabled inline-formatting tools
//! produce. The composer merges the two (declared entries win, one level
//! deep) and memoizes the result per tool name. The union of all inline
//! tools' rules is memoized separately since every tool with a full inline
//! toolbar shares it.
//!
//! Both caches assume the registry does not change while the composer is
//! alive. Call [`RuleComposer::invalidate`] after swapping tool definitions.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::SanitizerError;
use crate::registry::{InlineToolbar, ToolDescriptor, ToolRegistry};
use crate::rules::{Rule, RuleSet};

/// Per-tool rule composition over a [`ToolRegistry`].
pub struct RuleComposer {
    registry: Arc<dyn ToolRegistry>,
    /// Composed rule sets keyed by tool name.
    config_cache: RwLock<HashMap<String, Arc<RuleSet>>>,
    /// Union of every inline tool's rules.
    inline_cache: RwLock<Option<Arc<RuleSet>>>,
}

impl RuleComposer {
    pub fn new(registry: Arc<dyn ToolRegistry>) -> Self {
        Self {
            registry,
            config_cache: RwLock::new(HashMap::new()),
            inline_cache: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &dyn ToolRegistry {
        self.registry.as_ref()
    }

    /// Returns the effective rule set for `tool_name`, composing it on first
    /// use.
    ///
    /// Tools without declared rules (or with an empty `sanitize` block) get
    /// their inline config as-is. Otherwise each declared field maps to:
    /// the inline config overlaid with the field's rule set, for mappings;
    /// the declared value itself, for anything else.
    pub fn compose_tool_config(&self, tool_name: &str) -> Result<Arc<RuleSet>, SanitizerError> {
        {
            let cache = read(&self.config_cache);
            if let Some(config) = cache.get(tool_name) {
                debug!("Serving composed rules from cache for tool '{}'.", tool_name);
                return Ok(Arc::clone(config));
            }
        }

        let tool = self
            .registry
            .tool(tool_name)
            .ok_or_else(|| SanitizerError::ToolNotFound(tool_name.to_string()))?;
        let base = self.inline_config_for(tool)?;

        let composed = match tool.declared_rules() {
            Some(declared) => compose_fields(&base, declared),
            None => {
                debug!("Tool '{}' declares no rules; using its inline config.", tool_name);
                base
            }
        };

        let mut cache = write(&self.config_cache);
        let entry = cache
            .entry(tool_name.to_string())
            .or_insert_with(|| Arc::new(composed));
        debug!("Composed and cached {} rule entries for tool '{}'.", entry.len(), tool_name);
        Ok(Arc::clone(entry))
    }

    /// Returns the rules contributed by the inline tools `tool_name` enables,
    /// with line breaks always allowed.
    pub fn inline_tools_config(&self, tool_name: &str) -> Result<RuleSet, SanitizerError> {
        let tool = self
            .registry
            .tool(tool_name)
            .ok_or_else(|| SanitizerError::ToolNotFound(tool_name.to_string()))?;
        self.inline_config_for(tool)
    }

    /// Returns the union of every registered inline tool's rules. Later tools
    /// override earlier ones on the same tag. Computed once.
    pub fn all_inline_tools_config(&self) -> Arc<RuleSet> {
        if let Some(config) = read(&self.inline_cache).as_ref() {
            return Arc::clone(config);
        }

        let mut config = RuleSet::new();
        let inline_tools = self.registry.inline_tools();
        for tool in &inline_tools {
            if let Some(rules) = &tool.sanitize {
                config.extend_from(rules);
            }
        }
        debug!(
            "Aggregated {} tag rules from {} inline tools.",
            config.len(),
            inline_tools.len()
        );

        let mut slot = write(&self.inline_cache);
        Arc::clone(slot.get_or_insert_with(|| Arc::new(config)))
    }

    /// Drops every cached composition.
    pub fn invalidate(&self) {
        write(&self.config_cache).clear();
        *write(&self.inline_cache) = None;
        debug!("Rule composer caches invalidated.");
    }

    fn inline_config_for(&self, tool: &ToolDescriptor) -> Result<RuleSet, SanitizerError> {
        let mut config = match &tool.settings.inline_toolbar {
            InlineToolbar::All => RuleSet::clone(&self.all_inline_tools_config()),
            InlineToolbar::Only(names) => {
                let mut config = RuleSet::new();
                for name in names {
                    let inline_tool = self.registry.inline_tool(name).ok_or_else(|| {
                        SanitizerError::InlineToolNotFound {
                            tool: tool.name.clone(),
                            inline_tool: name.clone(),
                        }
                    })?;
                    if let Some(rules) = &inline_tool.sanitize {
                        config.extend_from(rules);
                    }
                }
                config
            }
            InlineToolbar::Disabled => RuleSet::new(),
        };
        config.allow_line_breaks();
        Ok(config)
    }
}

fn compose_fields(base: &RuleSet, declared: &RuleSet) -> RuleSet {
    declared
        .iter()
        .map(|(field, rule)| {
            let composed = match rule {
                Rule::Set(field_rules) => {
                    let mut merged = base.merged_with(field_rules);
                    merged.allow_line_breaks();
                    Rule::Set(merged)
                }
                other => other.clone(),
            };
            (field.clone(), composed)
        })
        .collect()
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticToolRegistry;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn rules(value: Value) -> RuleSet {
        serde_json::from_value(value).unwrap()
    }

    fn only(names: &[&str]) -> InlineToolbar {
        InlineToolbar::Only(names.iter().map(|n| n.to_string()).collect())
    }

    /// Records how often the composer asks about each tool.
    struct CountingRegistry {
        inner: StaticToolRegistry,
        lookups: Mutex<HashMap<String, usize>>,
        inline_scans: AtomicUsize,
    }

    impl CountingRegistry {
        fn new(inner: StaticToolRegistry) -> Self {
            Self {
                inner,
                lookups: Mutex::new(HashMap::new()),
                inline_scans: AtomicUsize::new(0),
            }
        }

        fn lookups(&self, name: &str) -> usize {
            self.lookups.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    impl ToolRegistry for CountingRegistry {
        fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
            *self.lookups.lock().unwrap().entry(name.to_string()).or_default() += 1;
            self.inner.tool(name)
        }

        fn inline_tools(&self) -> Vec<&ToolDescriptor> {
            self.inline_scans.fetch_add(1, Ordering::SeqCst);
            self.inner.inline_tools()
        }
    }

    fn editor_tools() -> StaticToolRegistry {
        StaticToolRegistry::new([
            ToolDescriptor::new("paragraph")
                .with_sanitize(rules(json!({ "text": { "b": true } })))
                .with_inline_toolbar(InlineToolbar::All),
            ToolDescriptor::new("header")
                .with_sanitize(rules(json!({ "text": { "a": true }, "level": false, "anchor": 3 })))
                .with_inline_toolbar(only(&["link", "italic"])),
            ToolDescriptor::new("raw"),
            ToolDescriptor::new("delimiter")
                .with_sanitize(RuleSet::new())
                .with_inline_toolbar(only(&["bold"])),
            ToolDescriptor::new("bold").inline().with_sanitize(rules(json!({ "b": {} }))),
            ToolDescriptor::new("italic").inline().with_sanitize(rules(json!({ "i": true }))),
            ToolDescriptor::new("link")
                .inline()
                .with_sanitize(rules(json!({ "a": { "href": true }, "b": true }))),
        ])
    }

    #[test]
    fn test_declared_field_overrides_base_per_key() {
        let composer = RuleComposer::new(Arc::new(editor_tools()));
        let header = composer.compose_tool_config("header").unwrap();

        let text = header.get("text").and_then(Rule::as_set).unwrap();
        assert_eq!(text.get("a"), Some(&Rule::Allow(true)));
        assert_eq!(text.get("b"), Some(&Rule::Allow(true)));
        assert_eq!(text.get("i"), Some(&Rule::Allow(true)));
        assert_eq!(text.get("br"), Some(&Rule::Allow(true)));
    }

    #[test]
    fn test_booleans_and_literals_are_kept_verbatim() {
        let composer = RuleComposer::new(Arc::new(editor_tools()));
        let header = composer.compose_tool_config("header").unwrap();
        assert_eq!(header.get("level"), Some(&Rule::Allow(false)));
        assert_eq!(header.get("anchor"), Some(&Rule::Literal(json!(3))));
    }

    #[test]
    fn test_tool_without_rules_gets_inline_config() {
        let composer = RuleComposer::new(Arc::new(editor_tools()));
        let raw = composer.compose_tool_config("raw").unwrap();
        assert_eq!(*raw, rules(json!({ "br": true, "wbr": true })));

        let delimiter = composer.compose_tool_config("delimiter").unwrap();
        assert_eq!(*delimiter, rules(json!({ "b": {}, "br": true, "wbr": true })));
    }

    #[test]
    fn test_compose_is_cached_and_queries_registry_once() {
        let registry = Arc::new(CountingRegistry::new(editor_tools()));
        let composer = RuleComposer::new(registry.clone());

        let first = composer.compose_tool_config("paragraph").unwrap();
        let second = composer.compose_tool_config("paragraph").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.lookups("paragraph"), 1);
    }

    #[test]
    fn test_all_inline_config_is_computed_once_in_order() {
        let registry = Arc::new(CountingRegistry::new(editor_tools()));
        let composer = RuleComposer::new(registry.clone());

        let all = composer.all_inline_tools_config();
        // `link` is registered after `bold` and wins on `b`.
        assert_eq!(*all, rules(json!({ "a": { "href": true }, "b": true, "i": true })));

        let again = composer.all_inline_tools_config();
        assert!(Arc::ptr_eq(&all, &again));
        assert_eq!(registry.inline_scans.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inline_list_merges_in_list_order() {
        let registry = StaticToolRegistry::new([
            ToolDescriptor::new("a_first").with_inline_toolbar(only(&["link", "bold"])),
            ToolDescriptor::new("b_first").with_inline_toolbar(only(&["bold", "link"])),
            ToolDescriptor::new("bold").inline().with_sanitize(rules(json!({ "b": {} }))),
            ToolDescriptor::new("link")
                .inline()
                .with_sanitize(rules(json!({ "a": { "href": true }, "b": true }))),
        ]);
        let composer = RuleComposer::new(Arc::new(registry));

        let a_first = composer.inline_tools_config("a_first").unwrap();
        assert_eq!(a_first.get("b"), Some(&Rule::Set(RuleSet::new())));
        let b_first = composer.inline_tools_config("b_first").unwrap();
        assert_eq!(b_first.get("b"), Some(&Rule::Allow(true)));
    }

    #[test]
    fn test_disabled_toolbar_only_allows_line_breaks() {
        let registry = StaticToolRegistry::new([
            ToolDescriptor::new("plain"),
            ToolDescriptor::new("empty").with_inline_toolbar(InlineToolbar::Only(vec![])),
        ]);
        let composer = RuleComposer::new(Arc::new(registry));
        let expected = rules(json!({ "br": true, "wbr": true }));
        assert_eq!(composer.inline_tools_config("plain").unwrap(), expected);
        assert_eq!(composer.inline_tools_config("empty").unwrap(), expected);
    }

    #[test]
    fn test_line_breaks_forced_even_when_denied() {
        let registry = StaticToolRegistry::new([
            ToolDescriptor::new("strict")
                .with_sanitize(rules(json!({ "text": { "br": false, "wbr": false } })))
                .with_inline_toolbar(InlineToolbar::All),
            ToolDescriptor::new("nobreak")
                .inline()
                .with_sanitize(rules(json!({ "br": false }))),
        ]);
        let composer = RuleComposer::new(Arc::new(registry));

        let inline = composer.inline_tools_config("strict").unwrap();
        assert_eq!(inline.get("br"), Some(&Rule::Allow(true)));

        let composed = composer.compose_tool_config("strict").unwrap();
        let text = composed.get("text").and_then(Rule::as_set).unwrap();
        assert_eq!(text.get("br"), Some(&Rule::Allow(true)));
        assert_eq!(text.get("wbr"), Some(&Rule::Allow(true)));
    }

    #[test]
    fn test_all_inline_cache_is_not_polluted_by_line_breaks() {
        let composer = RuleComposer::new(Arc::new(editor_tools()));
        composer.compose_tool_config("paragraph").unwrap();
        assert!(!composer.all_inline_tools_config().contains_key("br"));
    }

    #[test]
    fn test_unknown_tools_fail_fast() {
        let registry = StaticToolRegistry::new([
            ToolDescriptor::new("paragraph").with_inline_toolbar(only(&["ghost"])),
        ]);
        let composer = RuleComposer::new(Arc::new(registry));

        assert_eq!(
            composer.compose_tool_config("missing").unwrap_err(),
            SanitizerError::ToolNotFound("missing".to_string())
        );
        assert_eq!(
            composer.compose_tool_config("paragraph").unwrap_err(),
            SanitizerError::InlineToolNotFound {
                tool: "paragraph".to_string(),
                inline_tool: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_invalidate_forces_recomposition() {
        let registry = Arc::new(CountingRegistry::new(editor_tools()));
        let composer = RuleComposer::new(registry.clone());

        let before = composer.compose_tool_config("paragraph").unwrap();
        composer.invalidate();
        let after = composer.compose_tool_config("paragraph").unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before, after);
        assert_eq!(registry.lookups("paragraph"), 2);
        assert_eq!(registry.inline_scans.load(Ordering::SeqCst), 2);
    }
}
