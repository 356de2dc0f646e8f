//! `compose` command: prints the effective rule set of one tool.

use anyhow::{Context, Result};
use blockclean_core::Sanitizer;

use super::{load_registry_config, write_output};
use crate::cli::ComposeCommand;

pub fn run_compose(cmd: &ComposeCommand) -> Result<()> {
    let config = load_registry_config(cmd.config.as_deref())?;
    let sanitizer = Sanitizer::from_config(config)?;

    let composed = sanitizer
        .composer()
        .compose_tool_config(&cmd.tool)
        .with_context(|| format!("Failed to compose rules for tool '{}'", cmd.tool))?;
    let json = serde_json::to_string_pretty(composed.as_ref()).context("Failed to serialize composed rules")?;
    write_output(None, &json)
}
