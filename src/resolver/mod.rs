//! Identifier resolver
//!
//! Maps block tags to human-readable stock names using the reference table
//! written by the stock scraper (`top_stocks.json`).


use crate::error::{Result, StockyError};
use crate::types::{Block, StockNameMapping, StockReference};
use std::path::Path;

/// Location of the reference table relative to the scripts directory
pub const DEFAULT_REFERENCE_PATH: &str = "../Json/top_stocks.json";

/// Read and parse the reference table.
///
/// The file must be a JSON array; each object is read leniently (see
/// [`StockReference::from_json`]) and anything that is not an object is skipped.
pub fn load_reference<P: AsRef<Path>>(path: P) -> Result<Vec<StockReference>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StockyError::ReferenceNotFound(path.display().to_string()),
        _ => StockyError::Io(e),
    })?;

    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(entries.iter().filter_map(StockReference::from_json).collect())
}

/// Resolve every block's tag against an already loaded table.
///
/// The first entry with an equal tag wins; blocks without a match are left out.
/// Repeated block tags simply overwrite the same key.
pub fn resolve_tags(blocks: &[Block], reference: &[StockReference]) -> StockNameMapping {
    let mut mapping = StockNameMapping::new();

    for block in blocks {
        let tag = block.tag();
        if let Some(entry) = reference.iter().find(|entry| entry.tag == tag) {
            mapping.insert(tag.to_string(), entry.name.clone());
        }
    }

    mapping
}

/// Load the reference table once and map block tags to stock names.
///
/// A missing or malformed table is logged and yields an empty mapping.
pub fn match_stock_names<P: AsRef<Path>>(blocks: &[Block], path: P) -> StockNameMapping {
    let path = path.as_ref();
    let reference = match load_reference(path) {
        Ok(entries) => entries,
        Err(StockyError::Json(e)) => {
            tracing::error!("The file {} is not a valid JSON file: {}", path.display(), e);
            return StockNameMapping::new();
        }
        Err(e) => {
            tracing::error!("Failed to load stock reference: {}", e);
            return StockNameMapping::new();
        }
    };

    let mapping = resolve_tags(blocks, &reference);
    tracing::info!(
        "Resolved {} of {} blocks against {} reference entries",
        mapping.len(),
        blocks.len(),
        reference.len()
    );
    mapping
}
