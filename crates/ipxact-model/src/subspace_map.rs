use ipxact_xml::{XmlElement, XmlError, XmlSink};

use crate::item::{self, ItemHeader};
use crate::parameter::{self, Parameter};
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, ModelError};

pub const MASTER_REF: &str = "spirit:masterRef";

/// `spirit:subspaceMap`: maps the address space of a master interface into
/// this memory map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubspaceMap {
    pub header: ItemHeader,
    pub parameters: Vec<Parameter>,
    pub vendor_extensions: VendorExtensions,
}

impl SubspaceMap {
    pub fn new(
        name: impl Into<String>,
        base_address: impl Into<String>,
        master_ref: impl Into<String>,
    ) -> Self {
        let mut header = ItemHeader::new(name, base_address);
        header
            .attributes
            .insert(MASTER_REF.to_string(), master_ref.into());
        Self {
            header,
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:subspaceMap")?;
        let mut map = SubspaceMap {
            header: ItemHeader::from_xml(element),
            ..SubspaceMap::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:parameters" => map
                    .parameters
                    .extend(parameter::parameters_from_xml(child)),
                "spirit:vendorExtensions" => map.vendor_extensions.extend_from_xml(child),
                name if ItemHeader::is_header_element(name) => {}
                _ => item::skip_unknown(element, child),
            }
        }
        Ok(map)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:subspaceMap")?;
        self.header.write(sink)?;
        parameter::write_parameters(sink, &self.parameters)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn master_ref(&self) -> Option<&str> {
        self.header.attribute(MASTER_REF)
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        !self.name().is_empty()
            && !self.master_ref().map_or(true, str::is_empty)
            && !self.header.base_address.is_empty()
            && validation::parameters_valid(&self.parameters, ctx)
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        let mut valid = true;
        let name = self.name();

        if name.is_empty() {
            errors.push(format!("No name specified for subspace map within {parent}"));
            valid = false;
        }
        if self.master_ref().map_or(true, str::is_empty) {
            errors.push(format!(
                "No master reference set for subspace map {name} within {parent}"
            ));
            valid = false;
        }
        if self.header.base_address.is_empty() {
            errors.push(format!(
                "No base address set for subspace map {name} within {parent}"
            ));
            valid = false;
        }
        let identifier = format!("subspace map {name}");
        if !validation::collect_parameter_errors(&self.parameters, ctx, errors, &identifier) {
            valid = false;
        }
        valid
    }
}
