//! Command implementations for the blockclean CLI, plus the input and
//! configuration helpers they share.

pub mod clean;
pub mod compose;
pub mod sanitize;

use anyhow::{Context, Result};
use blockclean_core::{merge_tools, RegistryConfig};
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Built-in tools, merged with the user's registry file when one is given.
pub fn load_registry_config(user_config: Option<&Path>) -> Result<RegistryConfig> {
    let defaults = RegistryConfig::load_default_tools().context("Failed to load built-in tools")?;
    let user = match user_config {
        Some(path) => Some(
            RegistryConfig::load_from_file(path)
                .with_context(|| format!("Failed to load tool registry {}", path.display()))?,
        ),
        None => None,
    };
    Ok(merge_tools(defaults, user))
}

/// Reads the whole input from `path`, or from stdin when `path` is `None`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            debug!("Reading input from file: {}", path.display());
            fs::read_to_string(path).with_context(|| format!("Failed to read input file {}", path.display()))
        }
        None => {
            debug!("Reading input from stdin.");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Writes `content` plus a newline to `path`, or to stdout when `path` is `None`.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    use std::io::Write;

    match path {
        Some(path) => {
            debug!("Writing output to file: {}", path.display());
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            writeln!(file, "{}", content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", content)?;
        }
    }
    Ok(())
}
