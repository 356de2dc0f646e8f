//! errors.rs - Custom error types for the blockclean-core library.
//!
//! Rule composition and tree sanitization are total over their inputs; the
//! only failures come from asking the tool registry about a tool it does not
//! know, or from trying to serialize a rule that only exists in code.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All error types produced by the `blockclean-core` library.
///
/// Marked `#[non_exhaustive]` so new variants can be added without breaking
/// downstream matches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SanitizerError {
    #[error("Tool '{0}' is not registered")]
    ToolNotFound(String),

    #[error("Tool '{tool}' enables inline tool '{inline_tool}', which is not a registered inline tool")]
    InlineToolNotFound { tool: String, inline_tool: String },

    #[error("Predicate rules exist only in code and cannot be serialized")]
    UnserializablePredicate,
}
