use ipxact_xml::{XmlElement, XmlError, XmlSink};
use tracing::debug;

use crate::item;
use crate::name_group::NameGroup;
use crate::numeric;
use crate::parameter::{self, Parameter};
use crate::register::RegisterModel;
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, ModelError};

/// `spirit:registerFile`: a named group of registers and nested register files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    pub id: String,
    pub name_group: NameGroup,
    /// Array depth, `-1` when unset.
    pub dim: i32,
    pub address_offset: String,
    pub type_identifier: String,
    pub range: String,
    pub registers: Vec<RegisterModel>,
    pub parameters: Vec<Parameter>,
    pub vendor_extensions: VendorExtensions,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            id: String::new(),
            name_group: NameGroup::default(),
            dim: -1,
            address_offset: String::new(),
            type_identifier: String::new(),
            range: String::new(),
            registers: Vec::new(),
            parameters: Vec::new(),
            vendor_extensions: VendorExtensions::default(),
        }
    }
}

impl RegisterFile {
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
        expect_element(element, "spirit:registerFile")?;
        let mut file = RegisterFile {
            id: element.attribute("spirit:id").unwrap_or_default().to_string(),
            name_group: NameGroup::from_xml(element),
            ..RegisterFile::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:dim" => file.dim = numeric::parse_int_or_zero(&child.text()),
                "spirit:addressOffset" => file.address_offset = child.text(),
                "spirit:typeIdentifier" => file.type_identifier = child.text(),
                "spirit:range" => file.range = child.text(),
                "spirit:register" | "spirit:registerFile" => {
                    if let Some(register) = RegisterModel::from_xml(child)? {
                        file.registers.push(register);
                    }
                }
                "spirit:parameters" => file
                    .parameters
                    .extend(parameter::parameters_from_xml(child)),
                "spirit:vendorExtensions" => file.vendor_extensions.extend_from_xml(child),
                name if NameGroup::is_name_element(name) => {}
                _ => item::skip_unknown(element, child),
            }
        }
        debug!(
            file = %file.name_group.name,
            registers = file.registers.len(),
            "parsed register file"
        );
        Ok(file)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:registerFile")?;
        if !self.id.is_empty() {
            sink.write_attribute("spirit:id", &self.id)?;
        }
        self.name_group.write(sink)?;
        if self.dim >= 0 {
            sink.write_text_element("spirit:dim", &self.dim.to_string())?;
        }
        sink.write_text_element("spirit:addressOffset", &self.address_offset)?;
        if !self.type_identifier.is_empty() {
            sink.write_text_element("spirit:typeIdentifier", &self.type_identifier)?;
        }
        sink.write_text_element("spirit:range", &self.range)?;
        for register in &self.registers {
            register.write(sink)?;
        }
        parameter::write_parameters(sink, &self.parameters)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    pub fn register_names(&self) -> Vec<&str> {
        self.registers.iter().map(RegisterModel::name).collect()
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        !self.name().is_empty()
            && !self.address_offset.is_empty()
            && !self.range.is_empty()
            && validation::all_unique(self.register_names())
            && self.registers.iter().all(|register| register.is_valid(ctx))
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
        let identifier = format!("register file {name}");

        if name.is_empty() {
            errors.push(format!("No name specified for register file within {parent}"));
            valid = false;
        }
        if self.address_offset.is_empty() {
            errors.push(format!(
                "No address offset set for register file {name} within {parent}"
            ));
            valid = false;
        }
        if self.range.is_empty() {
            errors.push(format!("No range set for register file {name} within {parent}"));
            valid = false;
        }
        for duplicate in validation::duplicate_names(self.register_names()) {
            errors.push(format!(
                "Register file {name} contains several registers with name {duplicate}"
            ));
            valid = false;
        }
        for register in &self.registers {
            if !register.collect_errors(ctx, errors, &identifier) {
                valid = false;
            }
        }
        if !validation::collect_parameter_errors(&self.parameters, ctx, errors, &identifier) {
            valid = false;
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::Register;
    use ipxact_xml::parse_document;

    #[test]
    fn parses_nested_register_files() {
        let element = parse_document(
            r#"<spirit:registerFile spirit:id="dma">
                <spirit:name>dma</spirit:name>
                <spirit:addressOffset>0x100</spirit:addressOffset>
                <spirit:range>0x40</spirit:range>
                <spirit:register>
                    <spirit:name>src</spirit:name>
                    <spirit:addressOffset>0x0</spirit:addressOffset>
                    <spirit:size>32</spirit:size>
                </spirit:register>
                <spirit:registerFile>
                    <spirit:name>channel</spirit:name>
                    <spirit:addressOffset>0x20</spirit:addressOffset>
                    <spirit:range>0x20</spirit:range>
                </spirit:registerFile>
            </spirit:registerFile>"#,
        )
        .expect("parse");
        let file = RegisterFile::from_xml(&element).expect("decode");
        assert_eq!(file.id, "dma");
        assert_eq!(file.register_names(), vec!["src", "channel"]);
        assert!(matches!(file.registers[1], RegisterModel::RegisterFile(_)));
        assert!(file.is_valid(ValidationContext::default()));
    }

    #[test]
    fn reports_missing_range_and_duplicates() {
        let mut file = RegisterFile::new("dma", "0x0", "");
        file.registers.push(Register::new("a", "0x0", 32).into());
        file.registers.push(Register::new("a", "0x4", 32).into());
        let mut errors = Vec::new();
        assert!(!file.collect_errors(ValidationContext::default(), &mut errors, "address block regs"));
        assert_eq!(
            errors,
            vec![
                "No range set for register file dma within address block regs".to_string(),
                "Register file dma contains several registers with name a".to_string(),
            ]
        );
        assert!(!file.is_valid(ValidationContext::default()));
    }
}
