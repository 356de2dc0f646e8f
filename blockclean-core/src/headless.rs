// File: blockclean-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot, non-interactive sanitization of whole
//! editor documents.
//!
//! A document is either a bare JSON array of blocks or an object holding a
//! `blocks` array next to other keys (`time`, `version`, ...). Each block names
//! its tool under `tool` or `type`. Every key other than `data` is kept
//! exactly as given.

use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use serde_json::{Map, Value};

use crate::config::RegistryConfig;
use crate::sanitizer::Sanitizer;

const TOOL_KEYS: [&str; 2] = ["tool", "type"];

/// Parses `input`, sanitizes every block and re-serializes the document.
pub fn headless_sanitize_json(config: RegistryConfig, input: &str, pretty: bool) -> Result<String> {
    let sanitizer = Sanitizer::from_config(config)?;
    let document: Value = serde_json::from_str(input).context("Failed to parse input document as JSON")?;
    let sanitized = sanitize_document(&sanitizer, &document)?;

    let output = if pretty {
        serde_json::to_string_pretty(&sanitized)
    } else {
        serde_json::to_string(&sanitized)
    };
    output.context("Failed to serialize sanitized document")
}

/// Sanitizes a parsed document, returning a new one of the same shape.
pub fn sanitize_document(sanitizer: &Sanitizer, document: &Value) -> Result<Value> {
    match document {
        Value::Array(blocks) => Ok(Value::Array(sanitize_blocks(sanitizer, blocks)?)),
        Value::Object(fields) => {
            let blocks = match fields.get("blocks") {
                Some(Value::Array(blocks)) => blocks,
                _ => bail!("Input document object has no `blocks` array"),
            };
            let mut out = fields.clone();
            out.insert("blocks".to_string(), Value::Array(sanitize_blocks(sanitizer, blocks)?));
            Ok(Value::Object(out))
        }
        _ => bail!("Input document must be a JSON array of blocks or an object with a `blocks` array"),
    }
}

fn sanitize_blocks(sanitizer: &Sanitizer, blocks: &[Value]) -> Result<Vec<Value>> {
    let tools = blocks
        .iter()
        .enumerate()
        .map(|(pos, block)| block_tool(pos, block))
        .collect::<Result<Vec<_>>>()?;

    // Resolve every tool first so an unknown one leaves nothing half-done.
    for tool in &tools {
        sanitizer.composer().compose_tool_config(tool)?;
    }

    let mut out = Vec::with_capacity(blocks.len());
    for (block, tool) in blocks.iter().zip(&tools) {
        let mut fields: Map<String, Value> = block.as_object().cloned().unwrap_or_default();
        if let Some(data) = fields.get("data") {
            let sanitized = sanitizer.sanitize_tool_data(tool, data)?;
            fields.insert("data".to_string(), sanitized);
        }
        out.push(Value::Object(fields));
    }
    debug!("Sanitized a document of {} blocks.", out.len());
    Ok(out)
}

fn block_tool(pos: usize, block: &Value) -> Result<&str> {
    let fields = block
        .as_object()
        .ok_or_else(|| anyhow!("Block {} is not a JSON object", pos))?;
    TOOL_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .ok_or_else(|| anyhow!("Block {} has no `tool` or `type` string", pos))
}
