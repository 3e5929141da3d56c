use std::path::Path;

use anyhow::{bail, Result};
use ipxact_model::MemoryDocument;
use serde::Serialize;
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct ValidationReport<'a> {
    path: String,
    valid: bool,
    errors: &'a [String],
}

/// Validate every memory map and address space; `remap_states` extends the
/// states declared by the document itself.
pub fn validate(mut document: MemoryDocument, remap_states: &[String]) -> Vec<String> {
    document.remap_states.extend(remap_states.iter().cloned());
    document.collect_errors()
}

pub fn run(path: &Path, remap_states: &[String], json: bool) -> Result<()> {
    let document = common::load_document(path)?;
    let checked = document.memory_maps.len() + document.address_spaces.len();
    let errors = validate(document, remap_states);
    info!(checked, errors = errors.len(), "validation finished");

    if json {
        common::print_json(&ValidationReport {
            path: path.display().to_string(),
            valid: errors.is_empty(),
            errors: &errors,
        })?;
    } else if errors.is_empty() {
        println!("{}: {checked} memory maps and address spaces are valid", path.display());
    } else {
        for error in &errors {
            println!("{error}");
        }
    }

    if !errors.is_empty() {
        bail!("{} validation errors in {}", errors.len(), path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"<spirit:memoryMap>
        <spirit:name>m</spirit:name>
        <spirit:memoryRemap spirit:state="sleep">
            <spirit:name>r</spirit:name>
        </spirit:memoryRemap>
    </spirit:memoryMap>"#;

    #[test]
    fn extra_remap_states_are_honoured() {
        let document = MemoryDocument::from_xml(MAP).expect("load");
        let errors = validate(document.clone(), &[]);
        assert_eq!(
            errors,
            vec![
                "Remap state sleep of memory remap r within memory map m is not a remap state of component"
                    .to_string()
            ]
        );
        assert!(validate(document, &["sleep".to_string()]).is_empty());
    }
}
