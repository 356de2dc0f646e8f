//! This file defines the command-line interface (CLI) for the blockclean
//! application, including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "blockclean",
    version = env!("CARGO_PKG_VERSION"),
    about = "Strip disallowed markup from block-editor documents",
    long_about = "blockclean composes per-tool markup rules (each tool's own rules plus the inline formatting tools it enables) and applies them to every string in a block-editor document, keeping the document's structure intact.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all log output.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `blockclean` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes an editor document (a block array or an object with `blocks`).
    #[command(about = "Sanitizes an editor document read from a file or stdin.")]
    Sanitize(SanitizeCommand),

    /// Cleans a single string against a rule set.
    #[command(about = "Cleans a single string against a rule set.")]
    Clean(CleanCommand),

    /// Prints the composed rule set of one tool as JSON.
    #[command(about = "Prints the composed rule set of one tool as JSON.")]
    Compose(ComposeCommand),
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write sanitized output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Path to a tool registry file (YAML), merged over the built-in tools.
    #[arg(long = "config", short = 'c', value_name = "FILE", env = "BLOCKCLEAN_CONFIG", help = "Path to a tool registry file (YAML).")]
    pub config: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[arg(long, short = 'p', help = "Pretty-print the output JSON.")]
    pub pretty: bool,
}

/// Arguments for the `clean` command.
#[derive(Parser, Debug)]
pub struct CleanCommand {
    /// Path to an input file (reads from stdin if neither this nor --text is given).
    #[arg(long, short = 'i', value_name = "FILE", conflicts_with = "text", help = "Read the string from a file.")]
    pub input_file: Option<PathBuf>,

    /// The string to clean.
    #[arg(long, short = 't', value_name = "TEXT", help = "Clean this string instead of reading input.")]
    pub text: Option<String>,

    /// Rule set as inline JSON, e.g. '{"b": true, "a": {"href": true}}'.
    #[arg(long, short = 'r', value_name = "JSON", help = "Rule set as inline JSON (defaults to the registry's default rules).")]
    pub rules: Option<String>,

    /// Path to a tool registry file (YAML), merged over the built-in tools.
    #[arg(long = "config", short = 'c', value_name = "FILE", env = "BLOCKCLEAN_CONFIG", help = "Path to a tool registry file (YAML).")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `compose` command.
#[derive(Parser, Debug)]
pub struct ComposeCommand {
    /// Name of the tool to compose.
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Path to a tool registry file (YAML), merged over the built-in tools.
    #[arg(long = "config", short = 'c', value_name = "FILE", env = "BLOCKCLEAN_CONFIG", help = "Path to a tool registry file (YAML).")]
    pub config: Option<PathBuf>,
}
