//! `clean` command: cleans one string against an explicit or default rule set.

use anyhow::{Context, Result};
use blockclean_core::{RuleSet, Sanitizer};
use log::debug;

use super::{load_registry_config, read_input, write_output};
use crate::cli::CleanCommand;

pub fn run_clean(cmd: &CleanCommand) -> Result<()> {
    let config = load_registry_config(cmd.config.as_deref())?;
    let sanitizer = Sanitizer::from_config(config)?;

    let rules = cmd.rules.as_deref().map(parse_rules).transpose()?;
    let input = match &cmd.text {
        Some(text) => text.clone(),
        None => read_input(cmd.input_file.as_deref())?,
    };
    let input = input.strip_suffix('\n').unwrap_or(&input);

    let cleaned = sanitizer.clean(input, rules.as_ref());
    debug!("Cleaned {} bytes into {} bytes.", input.len(), cleaned.len());
    write_output(None, &cleaned)
}

/// Parses a rule set given as JSON on the command line.
pub fn parse_rules(json: &str) -> Result<RuleSet> {
    serde_json::from_str(json).context("Failed to parse --rules as a JSON object")
}
