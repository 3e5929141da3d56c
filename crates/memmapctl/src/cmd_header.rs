use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use ipxact_model::{numeric, HeaderOptions, MemoryDocument, MemoryMap};
use tracing::info;

use crate::common;

pub struct HeaderArgs {
    pub file: PathBuf,
    pub map: Option<String>,
    pub prefix: String,
    pub block_prefix: bool,
    /// Numeric literal added to every address.
    pub offset: String,
    pub output: Option<PathBuf>,
}

/// Headers of the selected map, or of every map when none is selected,
/// separated by a blank line.
pub fn render_headers(document: &MemoryDocument, args: &HeaderArgs) -> Result<String> {
    let maps: Vec<&MemoryMap> = match &args.map {
        Some(name) => vec![document
            .find_memory_map(name)
            .ok_or_else(|| anyhow!("no memory map named {name}"))?],
        None => document.memory_maps.iter().collect(),
    };
    if maps.is_empty() {
        bail!("document contains no memory maps");
    }

    let options = HeaderOptions {
        offset: numeric::parse_literal(&args.offset),
        id_prefix: args.prefix.clone(),
        use_block_prefix: args.block_prefix,
    };
    let mut text = String::new();
    for (index, map) in maps.iter().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        let header = map
            .header_text(&options)
            .with_context(|| format!("generate header for memory map {}", map.name()))?;
        text.push_str(&header);
    }
    Ok(text)
}

pub fn run(args: HeaderArgs) -> Result<()> {
    let document = common::load_document(&args.file)?;
    let text = render_headers(&document, &args)?;
    info!(bytes = text.len(), "header generated");
    common::write_output(args.output.as_deref(), &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r#"<spirit:component>
        <spirit:memoryMaps>
            <spirit:memoryMap>
                <spirit:name>first</spirit:name>
                <spirit:addressBlock>
                    <spirit:name>regs</spirit:name>
                    <spirit:baseAddress>0x100</spirit:baseAddress>
                    <spirit:range>0x10</spirit:range>
                    <spirit:width>32</spirit:width>
                    <spirit:usage>register</spirit:usage>
                    <spirit:register>
                        <spirit:name>ctrl</spirit:name>
                        <spirit:addressOffset>0x8</spirit:addressOffset>
                        <spirit:size>32</spirit:size>
                    </spirit:register>
                </spirit:addressBlock>
            </spirit:memoryMap>
            <spirit:memoryMap>
                <spirit:name>second</spirit:name>
            </spirit:memoryMap>
        </spirit:memoryMaps>
    </spirit:component>"#;

    fn args(map: Option<&str>) -> HeaderArgs {
        HeaderArgs {
            file: PathBuf::from("soc.xml"),
            map: map.map(str::to_string),
            prefix: "soc".into(),
            block_prefix: false,
            offset: "4k".into(),
            output: None,
        }
    }

    #[test]
    fn selected_map_only() {
        let document = MemoryDocument::from_xml(COMPONENT).expect("load");
        let text = render_headers(&document, &args(Some("first"))).expect("render");
        assert!(text.contains("#define SOC_CTRL 0x1108\n"));
        assert!(text.contains("#ifndef __FIRST_H\n"));
        assert!(!text.contains("__SECOND_H"));
    }

    #[test]
    fn every_map_by_default() {
        let document = MemoryDocument::from_xml(COMPONENT).expect("load");
        let text = render_headers(&document, &args(None)).expect("render");
        assert!(text.contains("#endif /* __FIRST_H */\n\n/*"));
        assert!(text.ends_with("#endif /* __SECOND_H */\n"));
    }

    #[test]
    fn unknown_map_is_an_error() {
        let document = MemoryDocument::from_xml(COMPONENT).expect("load");
        let err = render_headers(&document, &args(Some("third"))).unwrap_err();
        assert_eq!(err.to_string(), "no memory map named third");
    }
}
