// blockclean-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use test_log::test;

use blockclean_core::config::{self, RegistryConfig};
use blockclean_core::{InlineToolbar, Rule, ToolDescriptor, ToolRegistry};

fn write_config(yaml: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml.as_bytes())?;
    Ok(file)
}

#[test]
fn test_load_default_tools() {
    let config = RegistryConfig::load_default_tools().unwrap();
    assert!(!config.tools.is_empty());
    let paragraph = config.tools.iter().find(|t| t.name == "paragraph").unwrap();
    assert_eq!(paragraph.settings.inline_toolbar, InlineToolbar::All);
    assert!(!paragraph.inline);
    let link = config.tools.iter().find(|t| t.name == "link").unwrap();
    assert!(link.inline);
}

#[test]
fn test_load_from_file() -> Result<()> {
    let file = write_config(
        r#"
default_rules:
  b: true
tools:
  - name: note
    inline_toolbar: [underline]
    sanitize:
      body:
        p: true
      pinned: false
  - name: underline
    inline: true
    sanitize:
      u: {}
"#,
    )?;
    let config = RegistryConfig::load_from_file(file.path())?;
    assert_eq!(config.tools.len(), 2);
    assert_eq!(config.default_rules.get("b"), Some(&Rule::Allow(true)));

    let note = &config.tools[0];
    assert_eq!(note.settings.inline_toolbar, InlineToolbar::Only(vec!["underline".to_string()]));
    let declared = note.sanitize.as_ref().unwrap();
    assert_eq!(declared.get("pinned"), Some(&Rule::Allow(false)));
    assert!(declared.get("body").and_then(Rule::as_set).is_some());
    Ok(())
}

#[test]
fn test_user_tool_can_enable_builtin_inline_tools() -> Result<()> {
    let file = write_config(
        r#"
tools:
  - name: caption
    inline_toolbar: [bold, link]
    sanitize:
      text: {}
"#,
    )?;
    let user = RegistryConfig::load_from_file(file.path())?;
    let defaults = RegistryConfig::load_default_tools()?;

    let registry = config::merge_tools(defaults, Some(user)).into_registry()?;
    let caption = registry.tool("caption").unwrap();
    assert_eq!(
        caption.settings.inline_toolbar,
        InlineToolbar::Only(vec!["bold".to_string(), "link".to_string()])
    );
    Ok(())
}

#[test]
fn test_dangling_inline_reference_rejected_after_merge() -> Result<()> {
    let file = write_config(
        r#"
tools:
  - name: note
    inline_toolbar: [underline]
"#,
    )?;
    let user = RegistryConfig::load_from_file(file.path())?;
    let defaults = RegistryConfig::load_default_tools()?;

    let err = config::merge_tools(defaults, Some(user)).into_registry().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Tool validation failed"));
    assert!(message.contains("Tool 'note' enables 'underline'"));
    Ok(())
}

#[test]
fn test_load_from_file_reports_parse_errors() -> Result<()> {
    let file = write_config("tools: [ { name: 3, inline: maybe } ]")?;
    let err = RegistryConfig::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_load_from_missing_file() {
    let err = RegistryConfig::load_from_file("/nonexistent/blockclean/tools.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_merge_tools_no_user_config() {
    let defaults = RegistryConfig::load_default_tools().unwrap();
    let merged = config::merge_tools(defaults.clone(), None);
    assert_eq!(merged, defaults);
}

#[test]
fn test_merge_tools_override_keeps_position() -> Result<()> {
    let defaults = RegistryConfig::load_default_tools()?;
    let paragraph_pos = defaults.tools.iter().position(|t| t.name == "paragraph").unwrap();
    let user = RegistryConfig {
        default_rules: Default::default(),
        tools: vec![
            ToolDescriptor::new("paragraph"),
            ToolDescriptor::new("underline").inline(),
        ],
    };

    let merged = config::merge_tools(defaults.clone(), Some(user));
    assert_eq!(merged.tools.len(), defaults.tools.len() + 1);
    assert_eq!(merged.tools[paragraph_pos], ToolDescriptor::new("paragraph"));
    assert_eq!(merged.tools.last().unwrap().name, "underline");
    assert!(merged.default_rules.is_empty());

    let registry = merged.into_registry()?;
    assert_eq!(registry.inline_tools().last().unwrap().name, "underline");
    Ok(())
}

#[test]
fn test_merge_tools_replaces_default_rules_when_given() -> Result<()> {
    let defaults = RegistryConfig::load_default_tools()?;
    let user: RegistryConfig = serde_yml::from_str("default_rules: { i: true }")?;
    let merged = config::merge_tools(defaults, Some(user));
    assert_eq!(merged.default_rules.get("i"), Some(&Rule::Allow(true)));
    Ok(())
}

#[test]
fn test_into_registry_rejects_duplicates() {
    let config = RegistryConfig {
        default_rules: Default::default(),
        tools: vec![ToolDescriptor::new("paragraph"), ToolDescriptor::new("paragraph")],
    };
    assert!(config.into_registry().is_err());
}
