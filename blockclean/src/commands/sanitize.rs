//! `sanitize` command: cleans a whole editor document.

use anyhow::{Context, Result};
use blockclean_core::headless_sanitize_json;
use log::info;

use super::{load_registry_config, read_input, write_output};
use crate::cli::SanitizeCommand;

pub fn run_sanitize(cmd: &SanitizeCommand) -> Result<()> {
    info!("Starting sanitize operation.");
    let config = load_registry_config(cmd.config.as_deref())?;
    let input = read_input(cmd.input_file.as_deref())?;

    let output = headless_sanitize_json(config, &input, cmd.pretty).context("Sanitization failed")?;
    write_output(cmd.output.as_deref(), &output)?;

    info!("Sanitize operation completed.");
    Ok(())
}
