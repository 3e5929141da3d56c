//! The memory map item composite: address blocks, banks and subspace maps.

use std::collections::BTreeMap;

use ipxact_xml::{XmlElement, XmlError, XmlSink};
use tracing::trace;

use crate::address_block::AddressBlock;
use crate::bank::Bank;
use crate::general::{Access, BooleanValue, Usage};
use crate::name_group::NameGroup;
use crate::numeric;
use crate::parameter::{self, Parameter};
use crate::subspace_map::SubspaceMap;
use crate::validation::{self, ValidationContext};
use crate::{write_attributes, ModelError};

/// Data every memory map item carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemHeader {
    pub name_group: NameGroup,
    /// Attributes of the item element itself, e.g. `spirit:bankAlignment`.
    pub attributes: BTreeMap<String, String>,
    pub base_address: String,
    pub base_address_attributes: BTreeMap<String, String>,
}

impl ItemHeader {
    pub fn new(name: impl Into<String>, base_address: impl Into<String>) -> Self {
        Self {
            name_group: NameGroup::new(name),
            base_address: base_address.into(),
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Self {
        let mut header = ItemHeader {
            name_group: NameGroup::from_xml(element),
            attributes: element.attribute_map(),
            ..ItemHeader::default()
        };
        if let Some(base) = element.find_child("spirit:baseAddress") {
            header.base_address = base.text();
            header.base_address_attributes = base.attribute_map();
        }
        header
    }

    /// Write the attributes onto the already opened item element, then the
    /// name group and the base address when it is set.
    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        write_attributes(sink, &self.attributes)?;
        self.name_group.write(sink)?;
        if !self.base_address.is_empty() {
            sink.start_element("spirit:baseAddress")?;
            write_attributes(sink, &self.base_address_attributes)?;
            sink.write_text(&self.base_address)?;
            sink.end_element()?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Numeric value of the base address, `0` when unset or malformed.
    pub fn base_address_value(&self) -> u64 {
        numeric::parse_literal(&self.base_address)
    }

    pub(crate) fn is_header_element(name: &str) -> bool {
        NameGroup::is_name_element(name) || name == "spirit:baseAddress"
    }
}

/// The usage, volatile and access triple plus parameters shared by address
/// blocks and banks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBlockData {
    pub usage: Usage,
    pub volatile: BooleanValue,
    pub access: Access,
    pub parameters: Vec<Parameter>,
}

impl MemoryBlockData {
    /// Feed one child element; returns `false` when it is not part of the bundle.
    pub(crate) fn read_child(&mut self, child: &XmlElement) -> bool {
        match child.name.as_str() {
            "spirit:usage" => self.usage = Usage::from_xml(&child.text()),
            "spirit:volatile" => self.volatile = BooleanValue::from_xml(&child.text()),
            "spirit:access" => self.access = Access::from_xml(&child.text()),
            "spirit:parameters" => self
                .parameters
                .extend(parameter::parameters_from_xml(child)),
            _ => return false,
        }
        true
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        if let Some(usage) = self.usage.as_xml() {
            sink.write_text_element("spirit:usage", usage)?;
        }
        if let Some(volatile) = self.volatile.as_xml() {
            sink.write_text_element("spirit:volatile", volatile)?;
        }
        if let Some(access) = self.access.as_xml() {
            sink.write_text_element("spirit:access", access)?;
        }
        parameter::write_parameters(sink, &self.parameters)
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        validation::parameters_valid(&self.parameters, ctx)
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        validation::collect_parameter_errors(&self.parameters, ctx, errors, parent)
    }
}

/// One entry of a memory map, memory remap or bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryMapItem {
    AddressBlock(AddressBlock),
    Bank(Bank),
    SubspaceMap(SubspaceMap),
}

impl MemoryMapItem {
    /// Whether an element with this tag decodes into an item.
    pub fn is_item_element(name: &str) -> bool {
        matches!(
            name,
            "spirit:addressBlock" | "spirit:bank" | "spirit:subspaceMap"
        )
    }

    /// Decode an item element, `None` when the tag is not an item.
    pub fn from_xml(element: &XmlElement) -> Result<Option<Self>, ModelError> {
        let item = match element.name.as_str() {
            "spirit:addressBlock" => MemoryMapItem::AddressBlock(AddressBlock::from_xml(element)?),
            "spirit:bank" => MemoryMapItem::Bank(Bank::from_xml(element)?),
            "spirit:subspaceMap" => MemoryMapItem::SubspaceMap(SubspaceMap::from_xml(element)?),
            _ => return Ok(None),
        };
        Ok(Some(item))
    }

    pub fn header(&self) -> &ItemHeader {
        match self {
            MemoryMapItem::AddressBlock(block) => &block.header,
            MemoryMapItem::Bank(bank) => &bank.header,
            MemoryMapItem::SubspaceMap(map) => &map.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut ItemHeader {
        match self {
            MemoryMapItem::AddressBlock(block) => &mut block.header,
            MemoryMapItem::Bank(bank) => &mut bank.header,
            MemoryMapItem::SubspaceMap(map) => &mut map.header,
        }
    }

    pub fn name(&self) -> &str {
        self.header().name()
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        match self {
            MemoryMapItem::AddressBlock(block) => block.write(sink),
            MemoryMapItem::Bank(bank) => bank.write(sink),
            MemoryMapItem::SubspaceMap(map) => map.write(sink),
        }
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        match self {
            MemoryMapItem::AddressBlock(block) => block.is_valid(ctx),
            MemoryMapItem::Bank(bank) => bank.is_valid(ctx),
            MemoryMapItem::SubspaceMap(map) => map.is_valid(ctx),
        }
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        match self {
            MemoryMapItem::AddressBlock(block) => block.collect_errors(ctx, errors, parent),
            MemoryMapItem::Bank(bank) => bank.collect_errors(ctx, errors, parent),
            MemoryMapItem::SubspaceMap(map) => map.collect_errors(ctx, errors, parent),
        }
    }

    pub fn as_address_block(&self) -> Option<&AddressBlock> {
        match self {
            MemoryMapItem::AddressBlock(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_address_block_mut(&mut self) -> Option<&mut AddressBlock> {
        match self {
            MemoryMapItem::AddressBlock(block) => Some(block),
            _ => None,
        }
    }
}

impl From<AddressBlock> for MemoryMapItem {
    fn from(block: AddressBlock) -> Self {
        MemoryMapItem::AddressBlock(block)
    }
}

impl From<Bank> for MemoryMapItem {
    fn from(bank: Bank) -> Self {
        MemoryMapItem::Bank(bank)
    }
}

impl From<SubspaceMap> for MemoryMapItem {
    fn from(map: SubspaceMap) -> Self {
        MemoryMapItem::SubspaceMap(map)
    }
}

/// Decode every item child of `element` in document order.
pub(crate) fn items_from_xml(element: &XmlElement) -> Result<Vec<MemoryMapItem>, ModelError> {
    let mut items = Vec::new();
    for child in element.child_elements() {
        if let Some(item) = MemoryMapItem::from_xml(child)? {
            items.push(item);
        }
    }
    Ok(items)
}

pub(crate) fn skip_unknown(parent: &XmlElement, child: &XmlElement) {
    trace!(parent = %parent.name, element = %child.name, "skipping unknown element");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::{Register, RegisterModel};
    use ipxact_xml::parse_document;

    #[test]
    fn header_reads_attributes_and_base_address() {
        let element = parse_document(
            r#"<spirit:bank spirit:bankAlignment="serial">
                <spirit:name>b0</spirit:name>
                <spirit:baseAddress spirit:prompt="Base">0x100</spirit:baseAddress>
            </spirit:bank>"#,
        )
        .expect("parse");
        let header = ItemHeader::from_xml(&element);
        assert_eq!(header.name(), "b0");
        assert_eq!(header.attribute("spirit:bankAlignment"), Some("serial"));
        assert_eq!(header.base_address_value(), 0x100);
        assert_eq!(
            header.base_address_attributes.get("spirit:prompt").map(String::as_str),
            Some("Base")
        );
    }

    #[test]
    fn dispatches_by_tag_and_skips_others() {
        let element = parse_document(
            r#"<spirit:memoryMap>
                <spirit:name>map</spirit:name>
                <spirit:addressBlock><spirit:name>a</spirit:name></spirit:addressBlock>
                <spirit:subspaceMap spirit:masterRef="m"><spirit:name>s</spirit:name></spirit:subspaceMap>
                <spirit:bank><spirit:name>b</spirit:name></spirit:bank>
            </spirit:memoryMap>"#,
        )
        .expect("parse");
        let items = items_from_xml(&element).expect("items");
        let names: Vec<&str> = items.iter().map(MemoryMapItem::name).collect();
        assert_eq!(names, vec!["a", "s", "b"]);
        assert!(items[0].as_address_block().is_some());
        assert!(matches!(items[1], MemoryMapItem::SubspaceMap(_)));
        assert!(matches!(items[2], MemoryMapItem::Bank(_)));
    }

    #[test]
    fn clone_of_bank_is_independent() {
        let mut block = AddressBlock::new("regs", "0x0");
        block.data.usage = Usage::Register;
        block
            .registers
            .push(RegisterModel::Register(Register::new("r0", "0x0", 32)));
        block
            .registers
            .push(RegisterModel::Register(Register::new("r1", "0x4", 32)));
        let mut bank = Bank::new("bank0", "0x0", "serial");
        bank.items.push(block.into());
        let original = MemoryMapItem::Bank(bank);

        let mut copy = original.clone();
        if let MemoryMapItem::Bank(bank) = &mut copy {
            if let Some(block) = bank.items[0].as_address_block_mut() {
                if let RegisterModel::Register(register) = &mut block.registers[0] {
                    register.name_group.name = "renamed".into();
                }
            }
        }

        let MemoryMapItem::Bank(original_bank) = &original else {
            panic!("expected a bank");
        };
        let block = original_bank.items[0].as_address_block().expect("block");
        assert_eq!(block.registers[0].name(), "r0");
        assert_ne!(copy, original);
    }
}
