use std::path::Path;

use anyhow::Result;
use ipxact_model::{numeric, AddressSpace, MemoryDocument, MemoryMap};
use serde::Serialize;

use crate::common;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MapSummary {
    pub name: String,
    pub first_address: String,
    pub last_address: String,
    pub max_width: i32,
    pub items: usize,
    pub remaps: usize,
    pub unique_registers: bool,
    pub unique_memories: bool,
}

impl From<&MemoryMap> for MapSummary {
    fn from(map: &MemoryMap) -> Self {
        Self {
            name: map.name().to_string(),
            first_address: map.first_address_str(),
            last_address: map.last_address_str(),
            max_width: map.max_width(),
            items: map.items().len(),
            remaps: map.memory_remaps.len(),
            unique_registers: map.unique_register_names(),
            unique_memories: map.unique_memory_names(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SpaceSummary {
    pub name: String,
    pub range: String,
    pub width: i32,
    pub last_address: String,
    pub segments: usize,
    pub local_memory_map: bool,
}

impl From<&AddressSpace> for SpaceSummary {
    fn from(space: &AddressSpace) -> Self {
        Self {
            name: space.name().to_string(),
            range: space.range.clone(),
            width: space.width,
            last_address: numeric::format_hex(space.last_address()),
            segments: space.segments.len(),
            local_memory_map: space.has_local_memory_map(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub component: String,
    pub memory_maps: Vec<MapSummary>,
    pub address_spaces: Vec<SpaceSummary>,
}

pub fn summarize(document: &MemoryDocument) -> DocumentSummary {
    DocumentSummary {
        component: document.component.clone(),
        memory_maps: document.memory_maps.iter().map(MapSummary::from).collect(),
        address_spaces: document
            .address_spaces
            .iter()
            .map(SpaceSummary::from)
            .collect(),
    }
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

pub fn run(path: &Path, json: bool) -> Result<()> {
    let document = common::load_document(path)?;
    let summary = summarize(&document);

    if json {
        return common::print_json(&summary);
    }

    if summary.memory_maps.is_empty() && summary.address_spaces.is_empty() {
        println!("No memory maps or address spaces found.");
        return Ok(());
    }

    if !summary.memory_maps.is_empty() {
        println!(
            "{:<20} {:<12} {:<12} {:<6} {:<6} {:<7} {}",
            "MEMORY MAP", "FIRST", "LAST", "WIDTH", "ITEMS", "REMAPS", "UNIQUE REGISTERS"
        );
        for map in &summary.memory_maps {
            println!(
                "{:<20} {:<12} {:<12} {:<6} {:<6} {:<7} {}",
                or_dash(&map.name),
                or_dash(&map.first_address),
                or_dash(&map.last_address),
                map.max_width,
                map.items,
                map.remaps,
                if map.unique_registers { "yes" } else { "no" },
            );
        }
    }

    if !summary.address_spaces.is_empty() {
        if !summary.memory_maps.is_empty() {
            println!();
        }
        println!(
            "{:<20} {:<12} {:<12} {:<6} {:<9} {}",
            "ADDRESS SPACE", "RANGE", "LAST", "WIDTH", "SEGMENTS", "LOCAL MAP"
        );
        for space in &summary.address_spaces {
            println!(
                "{:<20} {:<12} {:<12} {:<6} {:<9} {}",
                or_dash(&space.name),
                or_dash(&space.range),
                space.last_address,
                space.width,
                space.segments,
                if space.local_memory_map { "yes" } else { "no" },
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r#"<spirit:component>
        <spirit:name>soc</spirit:name>
        <spirit:memoryMaps>
            <spirit:memoryMap>
                <spirit:name>cpu</spirit:name>
                <spirit:addressBlock>
                    <spirit:name>ram</spirit:name>
                    <spirit:baseAddress>0x2000</spirit:baseAddress>
                    <spirit:range>0x1000</spirit:range>
                    <spirit:width>16</spirit:width>
                    <spirit:usage>memory</spirit:usage>
                </spirit:addressBlock>
            </spirit:memoryMap>
        </spirit:memoryMaps>
        <spirit:addressSpaces>
            <spirit:addressSpace>
                <spirit:name>master</spirit:name>
                <spirit:range>64k</spirit:range>
                <spirit:width>32</spirit:width>
            </spirit:addressSpace>
        </spirit:addressSpaces>
    </spirit:component>"#;

    #[test]
    fn summarises_maps_and_spaces() {
        let document = MemoryDocument::from_xml(COMPONENT).expect("load");
        let summary = summarize(&document);
        assert_eq!(summary.component, "soc");
        assert_eq!(
            summary.memory_maps,
            vec![MapSummary {
                name: "cpu".into(),
                first_address: "0x2000".into(),
                last_address: "0x2fff".into(),
                max_width: 16,
                items: 1,
                remaps: 0,
                unique_registers: true,
                unique_memories: true,
            }]
        );
        assert_eq!(summary.address_spaces[0].last_address, "0xffff");
        assert!(!summary.address_spaces[0].local_memory_map);
    }

    #[test]
    fn json_uses_field_names() {
        let document = MemoryDocument::from_xml(COMPONENT).expect("load");
        let value = serde_json::to_value(summarize(&document)).expect("json");
        assert_eq!(value["memory_maps"][0]["last_address"], "0x2fff");
        assert_eq!(value["address_spaces"][0]["segments"], 0);
    }
}
