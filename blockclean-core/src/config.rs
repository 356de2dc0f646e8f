//! Configuration management for `blockclean-core`.
//!
//! This module defines the on-disk shape of a tool registry, loads it from
//! YAML, merges user overrides onto the embedded defaults and validates the
//! result before it is turned into a [`StaticToolRegistry`].
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::registry::{InlineToolbar, StaticToolRegistry, ToolDescriptor, SANITIZE_CONFIG_KEY};
use crate::rules::RuleSet;

/// Top-level configuration: the tools and the global default rule set.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Rules used by single-string cleaning when the caller supplies none.
    #[serde(default)]
    pub default_rules: RuleSet,
    /// Registered tools, in registration order.
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

impl RegistryConfig {
    /// Loads a tool registry from a YAML file.
    ///
    /// Only parse errors are reported here. Inline toolbar references may name
    /// built-in tools, so validation waits until the file is merged with the
    /// defaults and [`RegistryConfig::into_registry`] is called.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading tool registry from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: RegistryConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded {} tools from file {}.", config.tools.len(), path.display());

        Ok(config)
    }

    /// Loads the built-in tool set from the embedded configuration.
    pub fn load_default_tools() -> Result<Self> {
        debug!("Loading default tools from embedded string...");
        let default_yaml = include_str!("../config/default_tools.yaml");
        let config: RegistryConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default tools")?;

        debug!("Loaded {} default tools.", config.tools.len());
        Ok(config)
    }

    /// Validates the tools and builds the in-memory registry.
    pub fn into_registry(self) -> Result<StaticToolRegistry> {
        validate_tools(&self.tools)?;
        Ok(StaticToolRegistry::new(self.tools))
    }
}

/// Merges user-defined tools onto the defaults.
///
/// A user tool replaces the default tool of the same name in its original
/// position; new user tools are appended. A non-empty user `default_rules`
/// replaces the default one.
pub fn merge_tools(default_config: RegistryConfig, user_config: Option<RegistryConfig>) -> RegistryConfig {
    debug!("merge_tools called. Initial default tools count: {}", default_config.tools.len());

    let mut tools = default_config.tools;
    let mut default_rules = default_config.default_rules;

    if let Some(user_cfg) = user_config {
        debug!("User config provided. Merging {} user tools.", user_cfg.tools.len());
        let mut positions: HashMap<String, usize> = tools
            .iter()
            .enumerate()
            .map(|(pos, tool)| (tool.name.clone(), pos))
            .collect();

        for user_tool in user_cfg.tools {
            match positions.get(&user_tool.name) {
                Some(&pos) => tools[pos] = user_tool,
                None => {
                    positions.insert(user_tool.name.clone(), tools.len());
                    tools.push(user_tool);
                }
            }
        }

        if !user_cfg.default_rules.is_empty() {
            debug!("Overriding default rules with {} user entries.", user_cfg.default_rules.len());
            default_rules = user_cfg.default_rules;
        }
    }

    debug!("Final total tools after merge: {}", tools.len());
    RegistryConfig { default_rules, tools }
}

/// Validates tool names and inline toolbar references.
fn validate_tools(tools: &[ToolDescriptor]) -> Result<()> {
    let mut names = HashSet::new();
    let mut errors = Vec::new();

    let inline_names: HashSet<&str> = tools
        .iter()
        .filter(|tool| tool.inline)
        .map(|tool| tool.name.as_str())
        .collect();

    for tool in tools {
        if tool.name.is_empty() {
            errors.push("A tool has an empty `name` field.".to_string());
        } else if !names.insert(tool.name.as_str()) {
            errors.push(format!("Duplicate tool name found: '{}'.", tool.name));
        }

        if tool.inline && tool.sanitize.is_none() {
            debug!(
                "Inline tool '{}' has no `{}` block and contributes no rules.",
                tool.name, SANITIZE_CONFIG_KEY
            );
        }

        if let InlineToolbar::Only(enabled) = &tool.settings.inline_toolbar {
            for inline_name in enabled {
                if !inline_names.contains(inline_name.as_str()) {
                    errors.push(format!(
                        "Tool '{}' enables '{}' in `inline_toolbar`, which is not a registered inline tool.",
                        tool.name, inline_name
                    ));
                }
            }
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Tool validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}
