use std::collections::BTreeMap;

use ipxact_xml::{XmlElement, XmlError, XmlSink};
use tracing::debug;

use crate::item;
use crate::memory_map::MemoryMap;
use crate::name_group::NameGroup;
use crate::numeric;
use crate::parameter::{self, Parameter};
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, write_attributes, ModelError};

/// `spirit:segment`: a named window of an address space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub name_group: NameGroup,
    pub address_offset: String,
    pub offset_attributes: BTreeMap<String, String>,
    pub range: String,
    pub range_attributes: BTreeMap<String, String>,
    pub vendor_extensions: VendorExtensions,
}

impl Segment {
    pub fn new(
        name: impl Into<String>,
        address_offset: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self {
            name_group: NameGroup::new(name),
            address_offset: address_offset.into(),
            range: range.into(),
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:segment")?;
        let mut segment = Segment {
            name_group: NameGroup::from_xml(element),
            ..Segment::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:addressOffset" => {
                    segment.address_offset = child.text();
                    segment.offset_attributes = child.attribute_map();
                }
                "spirit:range" => {
                    segment.range = child.text();
                    segment.range_attributes = child.attribute_map();
                }
                "spirit:vendorExtensions" => segment.vendor_extensions.extend_from_xml(child),
                name if NameGroup::is_name_element(name) => {}
                _ => item::skip_unknown(element, child),
            }
        }
        Ok(segment)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:segment")?;
        self.name_group.write(sink)?;
        sink.start_element("spirit:addressOffset")?;
        write_attributes(sink, &self.offset_attributes)?;
        sink.write_text(&self.address_offset)?;
        sink.end_element()?;
        sink.start_element("spirit:range")?;
        write_attributes(sink, &self.range_attributes)?;
        sink.write_text(&self.range)?;
        sink.end_element()?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    /// `offset + range - 1`, or `0` when both are undefined.
    pub fn last_address(&self) -> u64 {
        numeric::last_address(
            numeric::parse_literal(&self.address_offset),
            numeric::parse_literal(&self.range),
        )
    }

    pub fn is_valid(&self) -> bool {
        !self.name().is_empty() && !self.address_offset.is_empty() && !self.range.is_empty()
    }

    pub fn collect_errors(&self, errors: &mut Vec<String>, parent: &str) -> bool {
        let mut valid = true;
        let name = self.name();
        if name.is_empty() {
            errors.push(format!("No name specified for segment within {parent}"));
            valid = false;
        }
        if self.address_offset.is_empty() {
            errors.push(format!(
                "No address offset set for segment {name} within {parent}"
            ));
            valid = false;
        }
        if self.range.is_empty() {
            errors.push(format!("No range set for segment {name} within {parent}"));
            valid = false;
        }
        valid
    }
}

/// `spirit:addressSpace`: the addressable range seen by a master interface,
/// optionally with a local memory map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpace {
    /// Attributes of the `spirit:addressSpace` element, namespace
    /// declarations included.
    pub attributes: BTreeMap<String, String>,
    pub name_group: NameGroup,
    pub range: String,
    pub range_attributes: BTreeMap<String, String>,
    /// Bit width, `-1` when unset.
    pub width: i32,
    pub width_attributes: BTreeMap<String, String>,
    pub segments: Vec<Segment>,
    pub address_unit_bits: u32,
    pub local_memory_map: Option<MemoryMap>,
    pub parameters: Vec<Parameter>,
    pub vendor_extensions: VendorExtensions,
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self {
            attributes: BTreeMap::new(),
            name_group: NameGroup::default(),
            range: String::new(),
            range_attributes: BTreeMap::new(),
            width: -1,
            width_attributes: BTreeMap::new(),
            segments: Vec::new(),
            address_unit_bits: 8,
            local_memory_map: None,
            parameters: Vec::new(),
            vendor_extensions: VendorExtensions::default(),
        }
    }
}

impl AddressSpace {
    pub fn new(name: impl Into<String>, range: impl Into<String>, width: i32) -> Self {
        Self {
            name_group: NameGroup::new(name),
            range: range.into(),
            width,
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:addressSpace")?;
        let mut space = AddressSpace {
            attributes: element.attribute_map(),
            name_group: NameGroup::from_xml(element),
            ..AddressSpace::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:range" => {
                    space.range = child.text();
                    space.range_attributes = child.attribute_map();
                }
                "spirit:width" => {
                    space.width = numeric::parse_int_or_zero(&child.text());
                    space.width_attributes = child.attribute_map();
                }
                "spirit:segments" => {
                    for segment in child.child_elements() {
                        if segment.name == "spirit:segment" {
                            space.segments.push(Segment::from_xml(segment)?);
                        } else {
                            item::skip_unknown(child, segment);
                        }
                    }
                }
                "spirit:addressUnitBits" => {
                    space.address_unit_bits = numeric::parse_int_or_zero(&child.text())
                }
                "spirit:localMemoryMap" => {
                    space.local_memory_map = Some(MemoryMap::from_local_xml(child)?)
                }
                "spirit:parameters" => space
                    .parameters
                    .extend(parameter::parameters_from_xml(child)),
                "spirit:vendorExtensions" => space.vendor_extensions.extend_from_xml(child),
                name if NameGroup::is_name_element(name) => {}
                _ => item::skip_unknown(element, child),
            }
        }
        debug!(
            space = %space.name(),
            segments = space.segments.len(),
            local_map = space.local_memory_map.is_some(),
            "parsed address space"
        );
        Ok(space)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        debug!(space = %self.name(), "writing address space");
        sink.start_element("spirit:addressSpace")?;
        write_attributes(sink, &self.attributes)?;
        self.name_group.write(sink)?;
        sink.start_element("spirit:range")?;
        write_attributes(sink, &self.range_attributes)?;
        sink.write_text(&self.range)?;
        sink.end_element()?;
        sink.start_element("spirit:width")?;
        write_attributes(sink, &self.width_attributes)?;
        sink.write_text(&self.width.to_string())?;
        sink.end_element()?;
        if !self.segments.is_empty() {
            sink.start_element("spirit:segments")?;
            for segment in &self.segments {
                segment.write(sink)?;
            }
            sink.end_element()?;
        }
        sink.write_text_element("spirit:addressUnitBits", &self.address_unit_bits.to_string())?;
        if let Some(map) = &self.local_memory_map {
            map.write_local(sink)?;
        }
        parameter::write_parameters(sink, &self.parameters)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    /// `range - 1`, or `0` for an unset range.
    pub fn last_address(&self) -> u64 {
        numeric::parse_literal(&self.range).saturating_sub(1)
    }

    /// Highest last address over all segments, `0` without segments.
    pub fn last_segmented_address(&self) -> u64 {
        self.segments
            .iter()
            .map(Segment::last_address)
            .max()
            .unwrap_or(0)
    }

    /// True when a local memory map is attached and has any content.
    pub fn has_local_memory_map(&self) -> bool {
        self.local_memory_map
            .as_ref()
            .is_some_and(|map| !map.is_empty())
    }

    /// The local memory map, created empty on first access.
    pub fn local_memory_map_mut(&mut self) -> &mut MemoryMap {
        self.local_memory_map.get_or_insert_with(MemoryMap::default)
    }

    pub fn segment_names(&self) -> Vec<&str> {
        self.segments.iter().map(Segment::name).collect()
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        if self.name().is_empty() || self.range.is_empty() || self.width < 0 {
            return false;
        }
        if !validation::all_unique(self.segment_names())
            || !self.segments.iter().all(Segment::is_valid)
        {
            return false;
        }
        if let Some(map) = self.local_memory_map.as_ref().filter(|map| !map.is_empty()) {
            if !map.is_valid(ctx) {
                return false;
            }
        }
        validation::parameters_valid(&self.parameters, ctx)
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        let mut valid = true;
        let name = self.name();
        let identifier = format!("address space {name}");

        if name.is_empty() {
            errors.push(format!("No name specified for address space within {parent}"));
            valid = false;
        }
        if self.range.is_empty() {
            errors.push(format!("No range set for address space {name} within {parent}"));
            valid = false;
        }
        if self.width < 0 {
            errors.push(format!("No width set for address space {name} within {parent}"));
            valid = false;
        }
        for duplicate in validation::duplicate_names(self.segment_names()) {
            errors.push(format!(
                "{identifier} contains several segments with name {duplicate}"
            ));
            valid = false;
        }
        for segment in &self.segments {
            if !segment.collect_errors(errors, &identifier) {
                valid = false;
            }
        }
        if let Some(map) = self.local_memory_map.as_ref().filter(|map| !map.is_empty()) {
            if !map.collect_errors(ctx, errors, &identifier) {
                valid = false;
            }
        }
        if !validation::collect_parameter_errors(&self.parameters, ctx, errors, &identifier) {
            valid = false;
        }
        valid
    }
}
