// blockclean-core/src/lib.rs
//! # blockclean Core Library
//!
//! `blockclean-core` sanitizes the data produced by block-editor tools. Each
//! tool declares which markup its fields may carry; inline-formatting tools
//! (bold, link, ...) contribute the tags they produce to every tool that
//! enables them. The library composes those declarations into one rule set
//! per tool and walks arbitrary JSON block data, cleaning every string leaf
//! with the rule that applies at its position.
//!
//! ## Modules
//!
//! * `rules`: The `Rule` / `RuleSet` model shared by every other module.
//! * `registry`: The `ToolRegistry` trait and the in-memory `StaticToolRegistry`.
//! * `config`: YAML registry configuration, defaults, merging and validation.
//! * `cleaner`: The `HtmlCleaner` primitive and its `ammonia` implementation.
//! * `composer`: Per-tool rule composition with session caches.
//! * `sanitizer`: Recursive tree sanitization and batch processing.
//! * `headless`: One-shot helpers for whole editor documents.
//! * `errors`: The `SanitizerError` type.
//!
//! ## Usage Example
//!
//! ```rust
//! use blockclean_core::{BlockEntry, RegistryConfig, Sanitizer};
//! use anyhow::Result;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     // 1. Load the built-in tools and build a sanitizer over them.
//!     let config = RegistryConfig::load_default_tools()?;
//!     let sanitizer = Sanitizer::from_config(config)?;
//!
//!     // 2. Sanitize a batch of blocks.
//!     let batch = vec![BlockEntry::new(
//!         "paragraph",
//!         json!({ "text": "<script>bad()</script>Hello <b>World</b>" }),
//!     )];
//!     let sanitized = sanitizer.sanitize_batch(batch)?;
//!     assert_eq!(sanitized[0].data["text"], "Hello <b>World</b>");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Composition and sanitization return `SanitizerError` (unknown tools are an
//! error, never silently skipped). Configuration loading and the headless
//! helpers use `anyhow::Error` with context.
//!
//! License: MIT OR Apache-2.0

pub mod cleaner;
pub mod composer;
pub mod config;
pub mod errors;
pub mod headless;
pub mod registry;
pub mod rules;
pub mod sanitizer;

/// Re-exports the rule model.
pub use rules::{Predicate, PredicateInput, Rule, RuleSet, LINE_BREAK_TAGS};

/// Re-exports the registry seam and its in-memory implementation.
pub use registry::{
    InlineToolbar, StaticToolRegistry, ToolDescriptor, ToolRegistry, ToolSettings, SANITIZE_CONFIG_KEY,
};

/// Re-exports configuration loading and merging.
pub use config::{merge_tools, RegistryConfig};

/// Re-exports the cleaning primitive.
pub use cleaner::{AmmoniaCleaner, HtmlCleaner};

pub use composer::RuleComposer;
pub use sanitizer::{BlockEntry, Sanitizer};
pub use errors::SanitizerError;

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{headless_sanitize_json, sanitize_document};
