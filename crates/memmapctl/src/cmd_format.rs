use std::path::Path;

use anyhow::{bail, Context, Result};
use ipxact_model::{write_address_space, write_memory_map, AddressSpace, MemoryMap, WriteOptions};
use tracing::info;

use crate::common;

/// Re-serialise a standalone memory map or address space document.
pub fn format_document(text: &str, indent: usize) -> Result<String> {
    let root = ipxact_xml::parse_document(text).context("parse XML")?;
    let options = WriteOptions {
        indent,
        ..WriteOptions::default()
    };
    let formatted = match root.name.as_str() {
        "spirit:memoryMap" => {
            let map = MemoryMap::from_xml(&root).context("decode memory map")?;
            write_memory_map(&map, options)?
        }
        "spirit:addressSpace" => {
            let space = AddressSpace::from_xml(&root).context("decode address space")?;
            write_address_space(&space, options)?
        }
        other => bail!("cannot format <{other}>: expected a memory map or address space document"),
    };
    Ok(formatted)
}

pub fn run(file: &Path, output: Option<&Path>, indent: usize) -> Result<()> {
    let text = common::read_text(file)?;
    let mut formatted = format_document(&text, indent)?;
    formatted.push('\n');
    info!(path = %file.display(), indent, "document formatted");
    common::write_output(output, &formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_whitespace_and_indentation() {
        let text = "<spirit:memoryMap>   <spirit:name>m</spirit:name>\n\n</spirit:memoryMap>";
        let formatted = format_document(text, 2).expect("format");
        assert_eq!(
            formatted,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<spirit:memoryMap>\n  <spirit:name>m</spirit:name>\n  <spirit:addressUnitBits>8</spirit:addressUnitBits>\n</spirit:memoryMap>"
        );
        assert_eq!(format_document(&formatted, 2).expect("format again"), formatted);
    }

    #[test]
    fn keeps_namespace_declarations() {
        let text = concat!(
            "<spirit:memoryMap xmlns:spirit=\"http://www.spiritconsortium.org/XMLSchema/SPIRIT/1.5\" ",
            "xmlns:kactus2=\"http://funbase.cs.tut.fi/\">",
            "<spirit:name>m</spirit:name>",
            "<spirit:vendorExtensions><kactus2:offPage/></spirit:vendorExtensions>",
            "</spirit:memoryMap>"
        );
        let formatted = format_document(text, 2).expect("format");
        assert!(formatted.contains(concat!(
            "\n<spirit:memoryMap xmlns:kactus2=\"http://funbase.cs.tut.fi/\" ",
            "xmlns:spirit=\"http://www.spiritconsortium.org/XMLSchema/SPIRIT/1.5\">\n"
        )));
        assert!(formatted.contains("<kactus2:offPage/>"));
        assert_eq!(format_document(&formatted, 2).expect("format again"), formatted);
    }

    #[test]
    fn rejects_other_documents() {
        let err = format_document("<spirit:component/>", 4).unwrap_err();
        assert!(err.to_string().starts_with("cannot format <spirit:component>"));
    }
}
