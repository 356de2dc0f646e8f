// blockclean-core/src/sanitizer.rs
//! The tree sanitizer.
//!
//! Walks arbitrary JSON-shaped block data and cleans every string leaf with
//! the rule that applies at its position. Sequences reuse their parent's rule
//! for every element. Mappings look each field up in the current rule set and
//! fall back to the parent rule when the field has no rule-shaped entry, so a
//! flat tag allow-list works for data of any depth.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::cleaner::{AmmoniaCleaner, HtmlCleaner};
use crate::composer::RuleComposer;
use crate::config::RegistryConfig;
use crate::errors::SanitizerError;
use crate::registry::ToolRegistry;
use crate::rules::{Rule, RuleSet};

/// One block of a batch: the tool that produced it and its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub tool: String,
    #[serde(default)]
    pub data: Value,
}

impl BlockEntry {
    pub fn new(tool: impl Into<String>, data: Value) -> Self {
        Self {
            tool: tool.into(),
            data,
        }
    }
}

/// The rule in force at one point of the walk.
#[derive(Clone, Copy)]
enum Applied<'r> {
    Set(&'r RuleSet),
    Other(&'r Rule),
}

impl<'r> From<&'r Rule> for Applied<'r> {
    fn from(rule: &'r Rule) -> Self {
        match rule {
            Rule::Set(set) => Applied::Set(set),
            other => Applied::Other(other),
        }
    }
}

/// Composes per-tool rules and applies them to block data.
pub struct Sanitizer {
    composer: RuleComposer,
    cleaner: Arc<dyn HtmlCleaner>,
    default_rules: RuleSet,
}

impl Sanitizer {
    pub fn new(registry: Arc<dyn ToolRegistry>, cleaner: Arc<dyn HtmlCleaner>) -> Self {
        Self {
            composer: RuleComposer::new(registry),
            cleaner,
            default_rules: RuleSet::new(),
        }
    }

    /// Sets the rules [`Sanitizer::clean`] uses when the caller passes none.
    pub fn with_default_rules(mut self, rules: RuleSet) -> Self {
        self.default_rules = rules;
        self
    }

    /// Builds a sanitizer over a validated registry config, cleaning with
    /// [`AmmoniaCleaner`].
    pub fn from_config(config: RegistryConfig) -> Result<Self> {
        let default_rules = config.default_rules.clone();
        let registry = config.into_registry()?;
        debug!("Building sanitizer over {} registered tools.", registry.len());
        Ok(Self::new(Arc::new(registry), Arc::new(AmmoniaCleaner)).with_default_rules(default_rules))
    }

    pub fn composer(&self) -> &RuleComposer {
        &self.composer
    }

    /// Sanitizes every entry's data with its tool's composed rules.
    ///
    /// All tools are resolved before any data is touched, so an unknown tool
    /// fails the whole batch.
    pub fn sanitize_batch(&self, mut entries: Vec<BlockEntry>) -> Result<Vec<BlockEntry>, SanitizerError> {
        let configs = entries
            .iter()
            .map(|entry| self.composer.compose_tool_config(&entry.tool))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sanitized = 0usize;
        for (entry, rules) in entries.iter_mut().zip(configs) {
            if rules.is_empty() {
                continue;
            }
            entry.data = self.deep_sanitize(&entry.data, &rules);
            sanitized += 1;
        }

        info!("Sanitized {} of {} blocks.", sanitized, entries.len());
        Ok(entries)
    }

    /// Sanitizes the data of one block produced by `tool_name`.
    pub fn sanitize_tool_data(&self, tool_name: &str, data: &Value) -> Result<Value, SanitizerError> {
        let rules = self.composer.compose_tool_config(tool_name)?;
        if rules.is_empty() {
            return Ok(data.clone());
        }
        Ok(self.deep_sanitize(data, &rules))
    }

    /// Returns a copy of `value` with every string leaf cleaned.
    pub fn deep_sanitize(&self, value: &Value, rules: &RuleSet) -> Value {
        self.walk(value, Applied::Set(rules))
    }

    /// Like [`Sanitizer::deep_sanitize`] for a rule of any shape.
    pub fn deep_sanitize_with(&self, value: &Value, rule: &Rule) -> Value {
        self.walk(value, Applied::from(rule))
    }

    /// Cleans one string, with the default rules when `rules` is `None`.
    pub fn clean(&self, input: &str, rules: Option<&RuleSet>) -> String {
        self.cleaner.clean(input, rules.unwrap_or(&self.default_rules))
    }

    fn walk(&self, value: &Value, applied: Applied<'_>) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|item| self.walk(item, applied)).collect()),
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(field, item)| {
                        let field_applied = match applied {
                            Applied::Set(set) => set.field_rule(field).map_or(applied, Applied::from),
                            Applied::Other(_) => applied,
                        };
                        (field.clone(), self.walk(item, field_applied))
                    })
                    .collect(),
            ),
            Value::String(text) => Value::String(self.clean_leaf(text, applied)),
            Value::Number(_) | Value::Bool(_) | Value::Null => value.clone(),
        }
    }

    fn clean_leaf(&self, text: &str, applied: Applied<'_>) -> String {
        match applied {
            Applied::Set(set) => self.cleaner.clean(text, set),
            Applied::Other(Rule::Allow(false)) => self.cleaner.clean(text, &RuleSet::new()),
            Applied::Other(_) => text.to_string(),
        }
    }
}
