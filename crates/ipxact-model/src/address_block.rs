use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use ipxact_xml::{XmlElement, XmlError, XmlSink};
use tracing::debug;

use crate::general::Usage;
use crate::item::{self, ItemHeader, MemoryBlockData};
use crate::numeric;
use crate::register::RegisterModel;
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, write_attributes, ModelError};

/// `spirit:addressBlock`: a contiguous range holding registers or memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBlock {
    pub header: ItemHeader,
    pub type_identifier: String,
    pub range: String,
    pub range_attributes: BTreeMap<String, String>,
    /// Bit width, `-1` when unset.
    pub width: i32,
    pub width_attributes: BTreeMap<String, String>,
    pub data: MemoryBlockData,
    pub registers: Vec<RegisterModel>,
    pub vendor_extensions: VendorExtensions,
}

impl Default for AddressBlock {
    fn default() -> Self {
        Self {
            header: ItemHeader::default(),
            type_identifier: String::new(),
            range: "1".to_string(),
            range_attributes: BTreeMap::new(),
            width: -1,
            width_attributes: BTreeMap::new(),
            data: MemoryBlockData::default(),
            registers: Vec::new(),
            vendor_extensions: VendorExtensions::default(),
        }
    }
}

impl AddressBlock {
    pub fn new(name: impl Into<String>, base_address: impl Into<String>) -> Self {
        Self {
            header: ItemHeader::new(name, base_address),
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:addressBlock")?;
        let mut block = AddressBlock {
            header: ItemHeader::from_xml(element),
            range: String::new(),
            ..AddressBlock::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:typeIdentifier" => block.type_identifier = child.text(),
                "spirit:range" => {
                    block.range = child.text();
                    block.range_attributes = child.attribute_map();
                }
                "spirit:width" => {
                    block.width = numeric::parse_int_or_zero(&child.text());
                    block.width_attributes = child.attribute_map();
                }
                "spirit:register" | "spirit:registerFile" => {
                    if let Some(register) = RegisterModel::from_xml(child)? {
                        block.registers.push(register);
                    }
                }
                "spirit:vendorExtensions" => block.vendor_extensions.extend_from_xml(child),
                name if ItemHeader::is_header_element(name) => {}
                _ => {
                    if !block.data.read_child(child) {
                        item::skip_unknown(element, child);
                    }
                }
            }
        }
        debug!(
            block = %block.name(),
            registers = block.registers.len(),
            "parsed address block"
        );
        Ok(block)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:addressBlock")?;
        self.header.write(sink)?;
        if !self.type_identifier.is_empty() {
            sink.write_text_element("spirit:typeIdentifier", &self.type_identifier)?;
        }
        sink.start_element("spirit:range")?;
        write_attributes(sink, &self.range_attributes)?;
        sink.write_text(&self.range)?;
        sink.end_element()?;
        sink.start_element("spirit:width")?;
        write_attributes(sink, &self.width_attributes)?;
        sink.write_text(&self.width.to_string())?;
        sink.end_element()?;
        self.data.write(sink)?;
        for register in &self.registers {
            register.write(sink)?;
        }
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn usage(&self) -> Usage {
        self.data.usage
    }

    /// `base + range - 1`, or `0` when both are undefined.
    pub fn last_address(&self) -> u64 {
        numeric::last_address(
            self.header.base_address_value(),
            numeric::parse_literal(&self.range),
        )
    }

    /// Last address in hex, or an empty string when base and range are both
    /// zero. A zero length block at address zero is reported the same way.
    pub fn last_address_str(&self) -> String {
        let base = self.header.base_address_value();
        let range = numeric::parse_literal(&self.range);
        if base == 0 && range == 0 {
            return String::new();
        }
        numeric::format_hex(base.wrapping_add(range).wrapping_sub(1))
    }

    /// Largest address offset among the registers. Register files are not
    /// considered.
    pub fn last_register_address(&self) -> u64 {
        self.all_register_offsets().into_iter().max().unwrap_or(0)
    }

    /// Address offsets of the registers in document order, register files
    /// excluded.
    pub fn all_register_offsets(&self) -> Vec<u64> {
        self.registers
            .iter()
            .filter_map(RegisterModel::as_register)
            .map(|register| numeric::parse_literal(&register.address_offset))
            .collect()
    }

    pub fn register_names(&self) -> Vec<&str> {
        self.registers.iter().map(RegisterModel::name).collect()
    }

    pub fn has_unique_register_names(&self) -> bool {
        validation::all_unique(self.register_names())
    }

    /// Emit the C defines of every register when the block is used for
    /// registers. Offsets are `offset + base address + register offset`.
    pub fn write_registers(
        &self,
        out: &mut dyn fmt::Write,
        offset: u64,
        use_block_prefix: bool,
        id_prefix: &str,
    ) -> fmt::Result {
        if self.data.usage != Usage::Register {
            return Ok(());
        }
        writeln!(out, "/*")?;
        writeln!(out, " * Address block: {}", self.name())?;
        writeln!(out, "*/")?;

        let prefix = if use_block_prefix {
            self.name()
        } else {
            id_prefix
        };
        let block_offset = offset.wrapping_add(self.header.base_address_value());
        for register in self.registers.iter().filter_map(RegisterModel::as_register) {
            register.write_define(out, block_offset, prefix)?;
        }
        writeln!(out)
    }

    /// Emit `_START`/`_END` defines when the block is memory or reserved.
    pub fn write_memory_addresses(
        &self,
        out: &mut dyn fmt::Write,
        offset: u64,
        id_prefix: &str,
    ) -> fmt::Result {
        let kind = match self.data.usage {
            Usage::Memory => "Memory",
            Usage::Reserved => "Reserved",
            _ => return Ok(()),
        };
        let start = offset.wrapping_add(self.header.base_address_value());
        let end = numeric::parse_literal(&self.last_address_str()).wrapping_add(offset);

        writeln!(out, "/*")?;
        writeln!(out, " * {kind} block name: {}", self.name())?;
        writeln!(out, " * Width: {}", self.width)?;
        writeln!(out, " * Range: {}", self.range)?;
        if let Some(access) = self.data.access.as_xml() {
            writeln!(out, " * Access: {access}")?;
        }
        writeln!(out, "*/")?;

        let mut name = String::new();
        if !id_prefix.is_empty() {
            write!(name, "{}_", id_prefix.to_uppercase())?;
        }
        name.push_str(&self.name().to_uppercase());
        writeln!(out, "#define {name}_START {}", numeric::format_hex(start))?;
        writeln!(out, "#define {name}_END {}", numeric::format_hex(end))?;
        writeln!(out)
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        if self.name().is_empty()
            || self.header.base_address.is_empty()
            || self.range.is_empty()
            || self.width < 0
        {
            return false;
        }
        if self.has_usage_conflict() || !self.has_unique_register_names() {
            return false;
        }
        self.data.is_valid(ctx) && self.registers.iter().all(|register| register.is_valid(ctx))
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        let mut valid = true;
        let name = self.name();
        let identifier = format!("address block {name}");

        if name.is_empty() {
            errors.push(format!("No name specified for address block within {parent}"));
            valid = false;
        }
        if self.header.base_address.is_empty() {
            errors.push(format!(
                "No base address set for address block {name} within {parent}"
            ));
            valid = false;
        }
        if self.range.is_empty() {
            errors.push(format!("No range set for address block {name} within {parent}"));
            valid = false;
        }
        if self.width < 0 {
            errors.push(format!("No width set for address block {name} within {parent}"));
            valid = false;
        }
        if self.has_usage_conflict() {
            let usage = self.data.usage.as_xml().unwrap_or_default();
            errors.push(format!(
                "Address block {name} within {parent} has usage {usage} but contains registers"
            ));
            valid = false;
        }
        for duplicate in validation::duplicate_names(self.register_names()) {
            errors.push(format!(
                "Address block {name} contains several registers with name {duplicate}"
            ));
            valid = false;
        }
        if !self.data.collect_errors(ctx, errors, &identifier) {
            valid = false;
        }
        for register in &self.registers {
            if !register.collect_errors(ctx, errors, &identifier) {
                valid = false;
            }
        }
        valid
    }

    fn has_usage_conflict(&self) -> bool {
        matches!(self.data.usage, Usage::Reserved | Usage::Memory) && !self.registers.is_empty()
    }
}
