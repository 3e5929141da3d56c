//! Memory maps, memory remaps and C header generation.

use std::collections::BTreeMap;
use std::fmt;

use ipxact_xml::{XmlElement, XmlError, XmlSink};
use tracing::debug;

use crate::address_block::AddressBlock;
use crate::general::Usage;
use crate::item::{self, ItemHeader, MemoryMapItem};
use crate::name_group::NameGroup;
use crate::numeric;
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, write_attributes, ModelError};

/// Item list plumbing shared by [`MemoryMap`] and [`MemoryRemap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbstractMemoryMap {
    pub id: String,
    pub name_group: NameGroup,
    pub items: Vec<MemoryMapItem>,
}

impl AbstractMemoryMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name_group: NameGroup::new(name),
            ..Self::default()
        }
    }

    fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        Ok(Self {
            id: element
                .attribute("spirit:id")
                .unwrap_or_default()
                .trim()
                .to_string(),
            name_group: NameGroup::from_xml(element),
            items: item::items_from_xml(element)?,
        })
    }

    /// Write the id attribute onto the open element, then the name group and
    /// the items.
    fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        if !self.id.is_empty() {
            sink.write_attribute("spirit:id", &self.id)?;
        }
        self.name_group.write(sink)?;
        for item in &self.items {
            item.write(sink)?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    pub fn contains_sub_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.name_group.is_empty()
    }

    pub fn address_blocks(&self) -> impl Iterator<Item = &AddressBlock> {
        self.items.iter().filter_map(MemoryMapItem::as_address_block)
    }

    /// Base address of the address block with the smallest base, as
    /// written. The first block wins ties.
    pub fn first_address_str(&self) -> String {
        let mut first: Option<(u64, &str)> = None;
        for block in self.address_blocks() {
            let base = block.header.base_address_value();
            if first.map_or(true, |(lowest, _)| base < lowest) {
                first = Some((base, block.header.base_address.as_str()));
            }
        }
        first.map(|(_, text)| text.to_string()).unwrap_or_default()
    }

    /// Last address of the address block with the largest base, in hex. The
    /// last block wins ties. Empty when there is no block or the chosen block
    /// has neither base nor range.
    pub fn last_address_str(&self) -> String {
        let mut last: Option<(u64, &AddressBlock)> = None;
        for block in self.address_blocks() {
            let base = block.header.base_address_value();
            if base >= last.map_or(0, |(highest, _)| highest) {
                last = Some((base, block));
            }
        }
        let Some((base, block)) = last else {
            return String::new();
        };
        let range = numeric::parse_literal(&block.range);
        if base == 0 && range == 0 {
            return String::new();
        }
        numeric::format_hex(range.wrapping_add(base).wrapping_sub(1))
    }

    pub fn last_address(&self) -> u64 {
        numeric::parse_literal(&self.last_address_str())
    }

    /// Widest address block, `0` when there is none.
    pub fn max_width(&self) -> i32 {
        self.address_blocks()
            .map(|block| block.width)
            .fold(0, i32::max)
    }

    /// Register names of every address block in document order.
    pub fn register_names(&self) -> Vec<&str> {
        self.address_blocks()
            .flat_map(AddressBlock::register_names)
            .collect()
    }

    pub fn unique_register_names(&self) -> bool {
        validation::all_unique(self.register_names())
    }

    /// Names of the address blocks used as memory.
    pub fn memory_names(&self) -> Vec<&str> {
        self.address_blocks()
            .filter(|block| block.usage() == Usage::Memory)
            .map(AddressBlock::name)
            .collect()
    }

    pub fn unique_memory_names(&self) -> bool {
        validation::all_unique(self.memory_names())
    }

    pub fn write_registers(
        &self,
        out: &mut dyn fmt::Write,
        offset: u64,
        use_block_prefix: bool,
        id_prefix: &str,
    ) -> fmt::Result {
        for block in self.address_blocks() {
            block.write_registers(out, offset, use_block_prefix, id_prefix)?;
        }
        Ok(())
    }

    pub fn write_memory_addresses(
        &self,
        out: &mut dyn fmt::Write,
        offset: u64,
        id_prefix: &str,
    ) -> fmt::Result {
        for block in self.address_blocks() {
            block.write_memory_addresses(out, offset, id_prefix)?;
        }
        Ok(())
    }

    fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(MemoryMapItem::name)
    }

    fn items_valid(&self, ctx: ValidationContext<'_>) -> bool {
        validation::all_unique(self.item_names()) && self.items.iter().all(|item| item.is_valid(ctx))
    }

    fn collect_item_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        identifier: &str,
    ) -> bool {
        let mut valid = true;
        for duplicate in validation::duplicate_names(self.item_names()) {
            errors.push(format!(
                "{identifier} contains several memory map items with name {duplicate}"
            ));
            valid = false;
        }
        for item in &self.items {
            if !item.collect_errors(ctx, errors, identifier) {
                valid = false;
            }
        }
        valid
    }
}

/// `spirit:memoryRemap`: an alternate view of a memory map, active in the
/// named remap state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryRemap {
    pub map: AbstractMemoryMap,
    /// Name of a component remap state.
    pub remap_state: String,
}

impl MemoryRemap {
    pub fn new(name: impl Into<String>, remap_state: impl Into<String>) -> Self {
        Self {
            map: AbstractMemoryMap::new(name),
            remap_state: remap_state.into(),
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:memoryRemap")?;
        Ok(Self {
            map: AbstractMemoryMap::from_xml(element)?,
            remap_state: element
                .attribute("spirit:state")
                .unwrap_or_default()
                .to_string(),
        })
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:memoryRemap")?;
        if !self.remap_state.is_empty() {
            sink.write_attribute("spirit:state", &self.remap_state)?;
        }
        self.map.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        self.map.name()
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        !self.name().is_empty()
            && !self.remap_state.is_empty()
            && ctx.has_remap_state(&self.remap_state)
            && self.map.items_valid(ctx)
    }

    /// The empty state and the undeclared state are reported independently.
    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        let mut valid = true;
        let name = self.name();

        if name.is_empty() {
            errors.push(format!("No name specified for memory remap within {parent}"));
            valid = false;
        }
        if self.remap_state.is_empty() {
            errors.push(format!(
                "No remap state assigned for memory remap {name} within {parent}"
            ));
            valid = false;
        }
        if !ctx.has_remap_state(&self.remap_state) {
            errors.push(format!(
                "Remap state {} of memory remap {name} within {parent} is not a remap state of component",
                self.remap_state
            ));
            valid = false;
        }
        let identifier = format!("memory remap {name}");
        if !self.map.collect_item_errors(ctx, errors, &identifier) {
            valid = false;
        }
        valid
    }
}

/// Settings for [`MemoryMap::write_header`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Added to every address.
    pub offset: u64,
    /// Prefix of every define, unless the block name is used instead.
    pub id_prefix: String,
    /// Prefix register defines with the name of their address block.
    pub use_block_prefix: bool,
}

/// `spirit:memoryMap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    pub map: AbstractMemoryMap,
    /// Attributes of the root element other than `spirit:id`, namespace
    /// declarations included.
    pub attributes: BTreeMap<String, String>,
    pub memory_remaps: Vec<MemoryRemap>,
    pub address_unit_bits: u32,
    pub vendor_extensions: VendorExtensions,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self {
            map: AbstractMemoryMap::default(),
            attributes: BTreeMap::new(),
            memory_remaps: Vec::new(),
            address_unit_bits: 8,
            vendor_extensions: VendorExtensions::default(),
        }
    }
}

impl MemoryMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            map: AbstractMemoryMap::new(name),
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:memoryMap")?;
        Self::decode(element, false)
    }

    /// Decode the `spirit:localMemoryMap` of an address space. A local map
    /// has no remaps and takes its address unit from the address space.
    pub fn from_local_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:localMemoryMap")?;
        Self::decode(element, true)
    }

    fn decode(element: &XmlElement, local: bool) -> Result<Self, ModelError> {
        let mut attributes = element.attribute_map();
        attributes.remove("spirit:id");
        let mut map = MemoryMap {
            map: AbstractMemoryMap::from_xml(element)?,
            attributes,
            ..MemoryMap::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:memoryRemap" if !local => {
                    map.memory_remaps.push(MemoryRemap::from_xml(child)?)
                }
                "spirit:addressUnitBits" if !local => {
                    map.address_unit_bits = numeric::parse_int_or_zero(&child.text())
                }
                "spirit:vendorExtensions" => map.vendor_extensions.extend_from_xml(child),
                name if MemoryMapItem::is_item_element(name)
                    || ItemHeader::is_header_element(name) => {}
                _ => item::skip_unknown(element, child),
            }
        }
        debug!(
            map = %map.name(),
            items = map.map.items.len(),
            remaps = map.memory_remaps.len(),
            "parsed memory map"
        );
        Ok(map)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        debug!(map = %self.name(), "writing memory map");
        sink.start_element("spirit:memoryMap")?;
        write_attributes(sink, &self.attributes)?;
        self.map.write(sink)?;
        for remap in &self.memory_remaps {
            remap.write(sink)?;
        }
        sink.write_text_element("spirit:addressUnitBits", &self.address_unit_bits.to_string())?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    /// Write as the `spirit:localMemoryMap` of an address space. Remaps and
    /// the address unit are left out.
    pub fn write_local(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        debug!(map = %self.name(), "writing local memory map");
        sink.start_element("spirit:localMemoryMap")?;
        write_attributes(sink, &self.attributes)?;
        self.map.write(sink)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        self.map.name()
    }

    pub fn items(&self) -> &[MemoryMapItem] {
        &self.map.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<MemoryMapItem> {
        &mut self.map.items
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty() && self.memory_remaps.is_empty()
    }

    pub fn contains_sub_items(&self) -> bool {
        self.map.contains_sub_items()
    }

    pub fn first_address_str(&self) -> String {
        self.map.first_address_str()
    }

    pub fn last_address_str(&self) -> String {
        self.map.last_address_str()
    }

    pub fn last_address(&self) -> u64 {
        self.map.last_address()
    }

    pub fn max_width(&self) -> i32 {
        self.map.max_width()
    }

    pub fn unique_register_names(&self) -> bool {
        self.map.unique_register_names()
    }

    pub fn unique_memory_names(&self) -> bool {
        self.map.unique_memory_names()
    }

    pub fn write_registers(
        &self,
        out: &mut dyn fmt::Write,
        offset: u64,
        use_block_prefix: bool,
        id_prefix: &str,
    ) -> fmt::Result {
        self.map
            .write_registers(out, offset, use_block_prefix, id_prefix)
    }

    pub fn write_memory_addresses(
        &self,
        out: &mut dyn fmt::Write,
        offset: u64,
        id_prefix: &str,
    ) -> fmt::Result {
        self.map.write_memory_addresses(out, offset, id_prefix)
    }

    /// Complete header: a description comment, include guards, register
    /// defines and then memory defines.
    pub fn write_header(&self, out: &mut dyn fmt::Write, options: &HeaderOptions) -> fmt::Result {
        let guard = header_guard(self.name());
        writeln!(out, "/*")?;
        writeln!(
            out,
            " * Header file generated from memory map \"{}\".",
            self.name()
        )?;
        writeln!(
            out,
            " * This file contains addresses of the memories and registers defined in the memory map."
        )?;
        writeln!(out, "*/")?;
        writeln!(out)?;
        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        writeln!(out)?;
        self.write_registers(
            out,
            options.offset,
            options.use_block_prefix,
            &options.id_prefix,
        )?;
        self.write_memory_addresses(out, options.offset, &options.id_prefix)?;
        writeln!(out, "#endif /* {guard} */")
    }

    pub fn header_text(&self, options: &HeaderOptions) -> Result<String, ModelError> {
        let mut text = String::new();
        self.write_header(&mut text, options)?;
        Ok(text)
    }

    pub fn remap_names(&self) -> Vec<&str> {
        self.memory_remaps.iter().map(MemoryRemap::name).collect()
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        !self.name().is_empty()
            && self.map.items_valid(ctx)
            && validation::all_unique(self.remap_names())
            && self.memory_remaps.iter().all(|remap| remap.is_valid(ctx))
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        let mut valid = true;
        let name = self.name();
        let identifier = format!("memory map {name}");

        if name.is_empty() {
            errors.push(format!("No name specified for memory map within {parent}"));
            valid = false;
        }
        if !self.map.collect_item_errors(ctx, errors, &identifier) {
            valid = false;
        }
        for duplicate in validation::duplicate_names(self.remap_names()) {
            errors.push(format!(
                "{identifier} contains several memory remaps with name {duplicate}"
            ));
            valid = false;
        }
        for remap in &self.memory_remaps {
            if !remap.collect_errors(ctx, errors, &identifier) {
                valid = false;
            }
        }
        valid
    }
}

/// `__NAME_H` with every character that cannot appear in a macro name
/// replaced by `_`.
fn header_guard(name: &str) -> String {
    let mut guard = String::from("__");
    for c in name.chars() {
        guard.push(if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        });
    }
    guard.push_str("_H");
    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Bank;
    use crate::register::Register;
    use crate::subspace_map::SubspaceMap;
    use crate::vendor::VendorExtension;
    use crate::{parse_memory_map, write_memory_map, WriteOptions};

    const MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<spirit:memoryMap spirit:id="cpu_map">
    <spirit:name>cpu</spirit:name>
    <spirit:description>CPU view</spirit:description>
    <spirit:addressBlock>
        <spirit:name>regs</spirit:name>
        <spirit:baseAddress>0x0</spirit:baseAddress>
        <spirit:range>0x100</spirit:range>
        <spirit:width>32</spirit:width>
        <spirit:usage>register</spirit:usage>
        <spirit:register>
            <spirit:name>ctrl</spirit:name>
            <spirit:addressOffset>0x4</spirit:addressOffset>
            <spirit:size>32</spirit:size>
            <spirit:field>
                <spirit:name>enable</spirit:name>
                <spirit:bitOffset>0</spirit:bitOffset>
                <spirit:bitWidth>1</spirit:bitWidth>
            </spirit:field>
        </spirit:register>
    </spirit:addressBlock>
    <spirit:addressBlock>
        <spirit:name>ram</spirit:name>
        <spirit:baseAddress>4k</spirit:baseAddress>
        <spirit:range>0x1000</spirit:range>
        <spirit:width>64</spirit:width>
        <spirit:usage>memory</spirit:usage>
        <spirit:access>read-write</spirit:access>
    </spirit:addressBlock>
    <spirit:memoryRemap spirit:state="boot">
        <spirit:name>boot_view</spirit:name>
        <spirit:addressBlock>
            <spirit:name>rom</spirit:name>
            <spirit:baseAddress>0x0</spirit:baseAddress>
            <spirit:range>0x800</spirit:range>
            <spirit:width>32</spirit:width>
            <spirit:usage>memory</spirit:usage>
        </spirit:addressBlock>
    </spirit:memoryRemap>
    <spirit:addressUnitBits>8</spirit:addressUnitBits>
    <spirit:vendorExtensions>
        <kactus2:offPage/>
        <acme:owner team="soc">cpu</acme:owner>
    </spirit:vendorExtensions>
</spirit:memoryMap>"#;

    fn block(name: &str, base: &str, range: &str) -> MemoryMapItem {
        let mut block = AddressBlock::new(name, base);
        block.range = range.into();
        block.width = 32;
        block.into()
    }

    fn map_with(items: Vec<MemoryMapItem>) -> MemoryMap {
        let mut map = MemoryMap::new("m");
        map.map.items = items;
        map
    }

    #[test]
    fn parses_items_remaps_and_extensions() {
        let map = parse_memory_map(MAP).expect("parse");
        assert_eq!(map.map.id, "cpu_map");
        assert_eq!(map.name(), "cpu");
        assert_eq!(map.items().len(), 2);
        assert_eq!(map.memory_remaps.len(), 1);
        assert_eq!(map.memory_remaps[0].remap_state, "boot");
        assert_eq!(map.address_unit_bits, 8);
        let extensions: Vec<&VendorExtension> = map.vendor_extensions.iter().collect();
        assert!(matches!(extensions[0], VendorExtension::Placeholder { .. }));
        assert!(matches!(extensions[1], VendorExtension::Generic(_)));
    }

    #[test]
    fn roundtrip_is_lossless() {
        let map = parse_memory_map(MAP).expect("parse");
        let xml = write_memory_map(&map, WriteOptions::default()).expect("write");
        let reparsed = parse_memory_map(&xml).expect("reparse");
        assert_eq!(reparsed, map);
        assert_eq!(reparsed.first_address_str(), "0x0");
        assert_eq!(
            write_memory_map(&reparsed, WriteOptions::default()).expect("write again"),
            xml
        );
    }

    #[test]
    fn root_attributes_survive_roundtrip() {
        let xml = concat!(
            "<spirit:memoryMap xmlns:kactus2=\"http://funbase.cs.tut.fi/\" ",
            "xmlns:spirit=\"http://www.spiritconsortium.org/XMLSchema/SPIRIT/1.5\" spirit:id=\"m0\">",
            "<spirit:name>m</spirit:name>",
            "</spirit:memoryMap>"
        );
        let map = parse_memory_map(xml).expect("parse");
        assert_eq!(map.map.id, "m0");
        assert_eq!(
            map.attributes.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["xmlns:kactus2", "xmlns:spirit"]
        );
        let written = write_memory_map(&map, WriteOptions::default()).expect("write");
        assert!(written.contains("xmlns:kactus2=\"http://funbase.cs.tut.fi/\""));
        assert!(written.contains("spirit:id=\"m0\""));
        assert_eq!(parse_memory_map(&written).expect("reparse"), map);
    }

    #[test]
    fn address_queries() {
        let map = parse_memory_map(MAP).expect("parse");
        assert_eq!(map.first_address_str(), "0x0");
        assert_eq!(map.last_address_str(), "0x1fff");
        assert_eq!(map.last_address(), 0x1fff);
        assert_eq!(map.max_width(), 64);
        assert!(map.unique_register_names());
        assert!(map.unique_memory_names());
        assert!(map.contains_sub_items());
        assert!(!map.is_empty());
        assert!(MemoryMap::default().is_empty());
    }

    #[test]
    fn first_address_keeps_written_text_and_first_tie() {
        let map = map_with(vec![
            block("a", "4k", "1"),
            block("b", "0x1000", "1"),
            block("c", "0x2000", "1"),
        ]);
        assert_eq!(map.first_address_str(), "4k");
    }

    #[test]
    fn last_address_prefers_last_tie() {
        let map = map_with(vec![block("a", "0x100", "0x10"), block("b", "256", "0x20")]);
        assert_eq!(map.last_address_str(), "0x11f");
    }

    #[test]
    fn last_address_of_unset_block_is_empty() {
        let map = map_with(vec![block("a", "", "")]);
        assert_eq!(map.last_address_str(), "");
        assert_eq!(map.last_address(), 0);
        assert_eq!(MemoryMap::new("m").last_address_str(), "");
    }

    #[test]
    fn queries_only_consider_address_blocks() {
        let mut bank = Bank::new("bank", "0x9000", "serial");
        bank.items.push(block("inner", "0x0", "0x10"));
        let map = map_with(vec![
            MemoryMapItem::Bank(bank),
            SubspaceMap::new("sub", "0x8000", "m").into(),
            block("a", "0x10", "0x10"),
        ]);
        assert_eq!(map.first_address_str(), "0x10");
        assert_eq!(map.last_address_str(), "0x1f");
        assert_eq!(map.max_width(), 32);
    }

    #[test]
    fn duplicate_item_names_reported_once() {
        let map = map_with(vec![
            block("dup", "0x0", "0x10"),
            block("dup", "0x10", "0x10"),
            block("dup", "0x20", "0x10"),
        ]);
        assert!(!map.is_valid(ValidationContext::default()));
        let mut errors = Vec::new();
        assert!(!map.collect_errors(ValidationContext::default(), &mut errors, "component c"));
        assert_eq!(
            errors,
            vec!["memory map m contains several memory map items with name dup".to_string()]
        );
    }

    #[test]
    fn register_and_memory_name_uniqueness() {
        let mut first = AddressBlock::new("a", "0x0");
        first.registers.push(Register::new("ctrl", "0x0", 32).into());
        let mut second = AddressBlock::new("b", "0x100");
        second.registers.push(Register::new("ctrl", "0x0", 32).into());
        let map = map_with(vec![first.into(), second.into()]);
        assert_eq!(map.map.register_names(), vec!["ctrl", "ctrl"]);
        assert!(!map.unique_register_names());

        let mut ram = AddressBlock::new("ram", "0x0");
        ram.data.usage = Usage::Memory;
        let mut reserved = AddressBlock::new("ram", "0x100");
        reserved.data.usage = Usage::Reserved;
        let map = map_with(vec![ram.clone().into(), reserved.into()]);
        assert!(map.unique_memory_names());
        let map = map_with(vec![ram.clone().into(), ram.into()]);
        assert!(!map.unique_memory_names());
    }

    #[test]
    fn remap_state_messages_are_distinct() {
        let states = vec!["active".to_string(), "off".to_string()];
        let ctx = ValidationContext::new(&[], &states);

        let remap = MemoryRemap::new("r", "sleep");
        assert!(!remap.is_valid(ctx));
        let mut errors = Vec::new();
        assert!(!remap.collect_errors(ctx, &mut errors, "memory map m"));
        assert_eq!(
            errors,
            vec![
                "Remap state sleep of memory remap r within memory map m is not a remap state of component"
                    .to_string()
            ]
        );

        let remap = MemoryRemap::new("r", "");
        let mut errors = Vec::new();
        assert!(!remap.collect_errors(ctx, &mut errors, "memory map m"));
        assert_eq!(
            errors[0],
            "No remap state assigned for memory remap r within memory map m"
        );

        assert!(MemoryRemap::new("r", "active").is_valid(ctx));
    }

    #[test]
    fn duplicate_remaps_and_nested_errors() {
        let states = vec!["boot".to_string()];
        let ctx = ValidationContext::new(&[], &states);
        let mut map = map_with(vec![block("a", "0x0", "0x10")]);
        map.memory_remaps.push(MemoryRemap::new("view", "boot"));
        map.memory_remaps.push(MemoryRemap::new("view", "boot"));
        let mut errors = Vec::new();
        assert!(!map.collect_errors(ctx, &mut errors, "component c"));
        assert_eq!(
            errors,
            vec!["memory map m contains several memory remaps with name view".to_string()]
        );
        map.memory_remaps.pop();
        assert!(map.is_valid(ctx));
    }

    #[test]
    fn header_wraps_defines_in_guards() {
        let map = parse_memory_map(MAP).expect("parse");
        let options = HeaderOptions {
            offset: 0x1000_0000,
            ..HeaderOptions::default()
        };
        let text = map.header_text(&options).expect("header");
        let expected_body = "#ifndef __CPU_H\n#define __CPU_H\n\n\
             /*\n * Address block: regs\n*/\n\
             /*\n * Register name: ctrl\n*/\n#define CTRL 0x10000004\n\n\
             /*\n * Memory block name: ram\n * Width: 64\n * Range: 0x1000\n * Access: read-write\n*/\n\
             #define RAM_START 0x10001000\n#define RAM_END 0x10001fff\n\n\
             #endif /* __CPU_H */\n";
        assert!(text.starts_with("/*\n * Header file generated from memory map \"cpu\".\n"));
        assert!(text.ends_with(expected_body), "{text}");
    }

    #[test]
    fn header_guard_sanitises_name() {
        assert_eq!(header_guard("cpu-map.v2"), "__CPU_MAP_V2_H");
    }
}
