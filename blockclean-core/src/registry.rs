// blockclean-core/src/registry.rs
//! The tool registry seam.
//!
//! The composer never reaches into global state to learn about tools. It asks
//! a [`ToolRegistry`] handed to it at construction. [`StaticToolRegistry`] is
//! the in-memory implementation built from a `RegistryConfig`.
//!
//! The registry must not change while a composer built on it is alive; the
//! composer caches what it reads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::rules::RuleSet;

/// Key under which a tool publishes its sanitize rules in configuration.
pub const SANITIZE_CONFIG_KEY: &str = "sanitize";

/// Which inline-formatting tools a block tool enables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InlineToolbarRepr", into = "InlineToolbarRepr")]
pub enum InlineToolbar {
    #[default]
    Disabled,
    All,
    Only(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum InlineToolbarRepr {
    Flag(bool),
    List(Vec<String>),
}

impl From<InlineToolbarRepr> for InlineToolbar {
    fn from(repr: InlineToolbarRepr) -> Self {
        match repr {
            InlineToolbarRepr::Flag(true) => InlineToolbar::All,
            InlineToolbarRepr::Flag(false) => InlineToolbar::Disabled,
            InlineToolbarRepr::List(names) => InlineToolbar::Only(names),
        }
    }
}

impl From<InlineToolbar> for InlineToolbarRepr {
    fn from(toolbar: InlineToolbar) -> Self {
        match toolbar {
            InlineToolbar::All => InlineToolbarRepr::Flag(true),
            InlineToolbar::Disabled => InlineToolbarRepr::Flag(false),
            InlineToolbar::Only(names) => InlineToolbarRepr::List(names),
        }
    }
}

/// Per-tool settings block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub inline_toolbar: InlineToolbar,
}

/// Everything the core needs to know about one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name (e.g., "paragraph", "link").
    pub name: String,
    /// True for inline-formatting tools (bold, link, ...).
    #[serde(default)]
    pub inline: bool,
    /// Declared rules. Block tools map field names to rule sets; inline tools
    /// map tags to element rules. `Some` of an empty set means "no rules".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitize: Option<RuleSet>,
    #[serde(flatten)]
    pub settings: ToolSettings,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    pub fn with_sanitize(mut self, rules: RuleSet) -> Self {
        self.sanitize = Some(rules);
        self
    }

    pub fn with_inline_toolbar(mut self, toolbar: InlineToolbar) -> Self {
        self.settings.inline_toolbar = toolbar;
        self
    }

    /// Declared rules, or `None` when the tool declares none or declares the
    /// explicit empty marker.
    pub fn declared_rules(&self) -> Option<&RuleSet> {
        self.sanitize.as_ref().filter(|rules| !rules.is_empty())
    }
}

/// Read-only view of the registered tools.
pub trait ToolRegistry: Send + Sync {
    /// Looks any tool up by name.
    fn tool(&self, name: &str) -> Option<&ToolDescriptor>;

    /// All inline-formatting tools, in registration order.
    fn inline_tools(&self) -> Vec<&ToolDescriptor>;

    fn tool_settings(&self, name: &str) -> Option<&ToolSettings> {
        self.tool(name).map(|tool| &tool.settings)
    }

    fn inline_tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tool(name).filter(|tool| tool.inline)
    }
}

/// In-memory registry preserving registration order.
#[derive(Debug, Clone, Default)]
pub struct StaticToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl StaticToolRegistry {
    pub fn new(tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut registry = Self::default();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Adds a tool, replacing (in place) any tool already registered under
    /// the same name.
    pub fn register(&mut self, tool: ToolDescriptor) {
        match self.index.get(&tool.name) {
            Some(&pos) => self.tools[pos] = tool,
            None => {
                self.index.insert(tool.name.clone(), self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }
}

impl ToolRegistry for StaticToolRegistry {
    fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&pos| &self.tools[pos])
    }

    fn inline_tools(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().filter(|tool| tool.inline).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = StaticToolRegistry::new([
            ToolDescriptor::new("bold").inline(),
            ToolDescriptor::new("paragraph"),
            ToolDescriptor::new("italic").inline(),
        ]);
        registry.register(ToolDescriptor::new("bold"));

        assert_eq!(registry.len(), 3);
        assert!(!registry.tool("bold").unwrap().inline);
        let inline: Vec<&str> = registry.inline_tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(inline, vec!["italic"]);
    }

    #[test]
    fn test_inline_tool_lookup_requires_inline_flag() {
        let registry = StaticToolRegistry::new([
            ToolDescriptor::new("paragraph"),
            ToolDescriptor::new("link").inline(),
        ]);
        assert!(registry.inline_tool("link").is_some());
        assert!(registry.inline_tool("paragraph").is_none());
        assert!(registry.inline_tool("missing").is_none());
    }

    #[test]
    fn test_declared_rules_treats_empty_as_none() {
        let tool = ToolDescriptor::new("delimiter").with_sanitize(RuleSet::new());
        assert!(tool.declared_rules().is_none());
        assert!(ToolDescriptor::new("raw").declared_rules().is_none());
    }

    #[test]
    fn test_inline_toolbar_yaml_shapes() {
        let all: ToolSettings = serde_yml::from_str("inline_toolbar: true").unwrap();
        assert_eq!(all.inline_toolbar, InlineToolbar::All);
        let none: ToolSettings = serde_yml::from_str("inline_toolbar: false").unwrap();
        assert_eq!(none.inline_toolbar, InlineToolbar::Disabled);
        let some: ToolSettings = serde_yml::from_str("inline_toolbar: [bold, link]").unwrap();
        assert_eq!(
            some.inline_toolbar,
            InlineToolbar::Only(vec!["bold".to_string(), "link".to_string()])
        );
        let missing: ToolSettings = serde_yml::from_str("{}").unwrap();
        assert_eq!(missing.inline_toolbar, InlineToolbar::Disabled);
    }
}
