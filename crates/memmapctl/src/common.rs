use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ipxact_model::MemoryDocument;
use serde::Serialize;
use tracing::debug;

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

pub fn load_document(path: &Path) -> Result<MemoryDocument> {
    let text = read_text(path)?;
    let document = MemoryDocument::from_xml(&text)
        .with_context(|| format!("parse IP-XACT document {}", path.display()))?;
    debug!(
        path = %path.display(),
        memory_maps = document.memory_maps.len(),
        "document loaded"
    );
    Ok(document)
}

/// Write `text` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("write {}", path.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}
