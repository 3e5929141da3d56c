//! Bit fields of a register and their bit range containment check.

use std::collections::BTreeMap;

use ipxact_xml::{XmlElement, XmlError, XmlSink};

use crate::enumerated_value::EnumeratedValue;
use crate::general::{self, Access, ModifiedWrite, ReadAction, TestConstraint};
use crate::item;
use crate::name_group::NameGroup;
use crate::numeric;
use crate::parameter::{self, Parameter};
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, write_attributes, ModelError};

/// `spirit:writeValueConstraint` of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteValueConstraint {
    WriteAsRead,
    UseEnumeratedValues,
    MinMax { minimum: String, maximum: String },
}

impl WriteValueConstraint {
    /// Decode the constraint. A bound without its counterpart, or no
    /// recognised child at all, is a missing element.
    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:writeAsRead" => return Ok(WriteValueConstraint::WriteAsRead),
                "spirit:useEnumeratedValues" => {
                    return Ok(WriteValueConstraint::UseEnumeratedValues)
                }
                "spirit:minimum" | "spirit:maximum" => {
                    return Ok(WriteValueConstraint::MinMax {
                        minimum: element.required_child_text("spirit:minimum")?,
                        maximum: element.required_child_text("spirit:maximum")?,
                    })
                }
                _ => {}
            }
        }
        Err(XmlError::MissingElement {
            parent: element.name.clone(),
            child: "spirit:writeAsRead".to_string(),
        }
        .into())
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:writeValueConstraint")?;
        match self {
            WriteValueConstraint::WriteAsRead => {
                sink.write_text_element("spirit:writeAsRead", "true")?
            }
            WriteValueConstraint::UseEnumeratedValues => {
                sink.write_text_element("spirit:useEnumeratedValues", "true")?
            }
            WriteValueConstraint::MinMax { minimum, maximum } => {
                sink.write_text_element("spirit:minimum", minimum)?;
                sink.write_text_element("spirit:maximum", maximum)?;
            }
        }
        sink.end_element()
    }
}

/// `spirit:field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: String,
    pub name_group: NameGroup,
    /// Offset of the least significant bit, `-1` when unset.
    pub bit_offset: i32,
    pub type_identifier: String,
    pub bit_width: u32,
    pub bit_width_attributes: BTreeMap<String, String>,
    pub enumerated_values: Vec<EnumeratedValue>,
    pub parameters: Vec<Parameter>,
    pub volatile: bool,
    pub access: Access,
    pub modified_write: ModifiedWrite,
    pub read_action: ReadAction,
    pub testable: bool,
    pub test_constraint: TestConstraint,
    pub write_constraint: Option<WriteValueConstraint>,
    pub vendor_extensions: VendorExtensions,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            id: String::new(),
            name_group: NameGroup::default(),
            bit_offset: -1,
            type_identifier: String::new(),
            bit_width: 0,
            bit_width_attributes: BTreeMap::new(),
            enumerated_values: Vec::new(),
            parameters: Vec::new(),
            volatile: false,
            access: Access::Unspecified,
            modified_write: ModifiedWrite::Unspecified,
            read_action: ReadAction::Unspecified,
            testable: true,
            test_constraint: TestConstraint::Unspecified,
            write_constraint: None,
            vendor_extensions: VendorExtensions::default(),
        }
    }
}

impl Field {
    pub fn new(name: impl Into<String>, bit_offset: i32, bit_width: u32) -> Self {
        Self {
            name_group: NameGroup::new(name),
            bit_offset,
            bit_width,
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:field")?;
        let mut field = Field {
            id: element.attribute("spirit:id").unwrap_or_default().to_string(),
            name_group: NameGroup::from_xml(element),
            ..Field::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:bitOffset" => field.bit_offset = numeric::parse_int_or_zero(&child.text()),
                "spirit:typeIdentifier" => field.type_identifier = child.text(),
                "spirit:bitWidth" => {
                    field.bit_width = numeric::parse_int_or_zero(&child.text());
                    field.bit_width_attributes = child.attribute_map();
                }
                "spirit:volatile" => field.volatile = general::parse_bool(&child.text(), false),
                "spirit:access" => field.access = Access::from_xml(&child.text()),
                "spirit:enumeratedValues" => {
                    for value in child
                        .child_elements()
                        .filter(|node| node.name == "spirit:enumeratedValue")
                    {
                        field.enumerated_values.push(EnumeratedValue::from_xml(value)?);
                    }
                }
                "spirit:modifiedWriteValue" => {
                    field.modified_write = ModifiedWrite::from_xml(&child.text())
                }
                "spirit:writeValueConstraint" => {
                    field.write_constraint = Some(WriteValueConstraint::from_xml(child)?)
                }
                "spirit:readAction" => field.read_action = ReadAction::from_xml(&child.text()),
                "spirit:testable" => {
                    field.testable = general::parse_bool(&child.text(), true);
                    field.test_constraint = TestConstraint::from_xml(
                        child.attribute("spirit:testConstraint").unwrap_or_default(),
                    );
                }
                "spirit:parameters" => field
                    .parameters
                    .extend(parameter::parameters_from_xml(child)),
                "spirit:vendorExtensions" => field.vendor_extensions.extend_from_xml(child),
                name if NameGroup::is_name_element(name) => {}
                _ => item::skip_unknown(element, child),
            }
        }
        Ok(field)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:field")?;
        if !self.id.is_empty() {
            sink.write_attribute("spirit:id", &self.id)?;
        }
        self.name_group.write(sink)?;
        sink.write_text_element("spirit:bitOffset", &self.bit_offset.to_string())?;
        if !self.type_identifier.is_empty() {
            sink.write_text_element("spirit:typeIdentifier", &self.type_identifier)?;
        }
        sink.start_element("spirit:bitWidth")?;
        write_attributes(sink, &self.bit_width_attributes)?;
        sink.write_text(&self.bit_width.to_string())?;
        sink.end_element()?;
        if self.volatile {
            sink.write_text_element("spirit:volatile", general::bool_to_xml(true))?;
        }
        if let Some(access) = self.access.as_xml() {
            sink.write_text_element("spirit:access", access)?;
        }
        if !self.enumerated_values.is_empty() {
            sink.start_element("spirit:enumeratedValues")?;
            for value in &self.enumerated_values {
                value.write(sink)?;
            }
            sink.end_element()?;
        }
        if let Some(modified) = self.modified_write.as_xml() {
            sink.write_text_element("spirit:modifiedWriteValue", modified)?;
        }
        if let Some(constraint) = &self.write_constraint {
            constraint.write(sink)?;
        }
        if let Some(action) = self.read_action.as_xml() {
            sink.write_text_element("spirit:readAction", action)?;
        }
        if !self.testable || self.test_constraint.is_specified() {
            sink.start_element("spirit:testable")?;
            if let Some(constraint) = self.test_constraint.as_xml() {
                sink.write_attribute("spirit:testConstraint", constraint)?;
            }
            sink.write_text(general::bool_to_xml(self.testable))?;
            sink.end_element()?;
        }
        parameter::write_parameters(sink, &self.parameters)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    /// Index of the most significant bit, `None` when the width is zero.
    pub fn msb(&self) -> Option<i64> {
        (self.bit_width > 0).then(|| i64::from(self.bit_offset) + i64::from(self.bit_width) - 1)
    }

    /// Whether the bit range ends inside a register of `register_size` bits.
    pub fn fits_in(&self, register_size: u32) -> bool {
        self.msb()
            .map_or(true, |msb| msb < i64::from(register_size))
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>, register_size: u32) -> bool {
        !self.name().is_empty()
            && self.bit_offset >= 0
            && self.bit_width > 0
            && self.fits_in(register_size)
            && self.enumerated_values.iter().all(EnumeratedValue::is_valid)
            && validation::parameters_valid(&self.parameters, ctx)
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        register_size: u32,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        let mut valid = true;
        let name = self.name();
        let identifier = format!("field {name}");

        if name.is_empty() {
            errors.push(format!("No name specified for field within {parent}"));
            valid = false;
        }
        if self.bit_offset < 0 {
            errors.push(format!(
                "Invalid bit offset set for field {name} within {parent}"
            ));
            valid = false;
        }
        if self.bit_width == 0 {
            errors.push(format!("Invalid bit width set for field {name} within {parent}"));
            valid = false;
        }
        if let Some(msb) = self.msb().filter(|_| !self.fits_in(register_size)) {
            errors.push(format!(
                "Field {name} within {parent} does not fit: the register contains \
                 {register_size} bits but field's MSB bit is {msb}"
            ));
            valid = false;
        }
        for value in &self.enumerated_values {
            if !value.collect_errors(errors, &identifier) {
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
    use crate::general::EnumUsage;
    use crate::{render, WriteOptions};
    use ipxact_xml::parse_document;

    const FIELD: &str = r#"<spirit:field spirit:id="mode_id">
        <spirit:name>mode</spirit:name>
        <spirit:bitOffset>2</spirit:bitOffset>
        <spirit:bitWidth spirit:resolve="user">3</spirit:bitWidth>
        <spirit:volatile>true</spirit:volatile>
        <spirit:access>read-write</spirit:access>
        <spirit:enumeratedValues>
            <spirit:enumeratedValue spirit:usage="write">
                <spirit:name>idle</spirit:name>
                <spirit:value>0</spirit:value>
            </spirit:enumeratedValue>
        </spirit:enumeratedValues>
        <spirit:modifiedWriteValue>oneToClear</spirit:modifiedWriteValue>
        <spirit:writeValueConstraint>
            <spirit:minimum>0</spirit:minimum>
            <spirit:maximum>5</spirit:maximum>
        </spirit:writeValueConstraint>
        <spirit:readAction>clear</spirit:readAction>
        <spirit:testable spirit:testConstraint="restore">false</spirit:testable>
    </spirit:field>"#;

    fn parse_field(xml: &str) -> Result<Field, ModelError> {
        Field::from_xml(&parse_document(xml).expect("parse"))
    }

    #[test]
    fn parses_every_property() {
        let field = parse_field(FIELD).expect("decode");
        assert_eq!(field.id, "mode_id");
        assert_eq!(field.bit_offset, 2);
        assert_eq!(field.bit_width, 3);
        assert!(field.volatile);
        assert_eq!(field.access, Access::ReadWrite);
        assert_eq!(field.enumerated_values[0].usage, EnumUsage::Write);
        assert_eq!(field.modified_write, ModifiedWrite::OneToClear);
        assert_eq!(
            field.write_constraint,
            Some(WriteValueConstraint::MinMax {
                minimum: "0".into(),
                maximum: "5".into()
            })
        );
        assert_eq!(field.read_action, ReadAction::Clear);
        assert!(!field.testable);
        assert_eq!(field.test_constraint, TestConstraint::Restore);
        assert_eq!(field.msb(), Some(4));
    }

    #[test]
    fn roundtrip_keeps_every_property() {
        let field = parse_field(FIELD).expect("decode");
        let xml = render(WriteOptions::default(), |sink| Ok(field.write(sink)?)).expect("write");
        assert_eq!(parse_field(&xml).expect("reparse"), field);
    }

    #[test]
    fn default_testable_is_not_written() {
        let field = Field::new("f", 0, 1);
        let options = WriteOptions {
            indent: 0,
            declaration: false,
        };
        let xml = render(options, |sink| Ok(field.write(sink)?)).expect("write");
        assert_eq!(
            xml,
            "<spirit:field><spirit:name>f</spirit:name><spirit:bitOffset>0</spirit:bitOffset>\
             <spirit:bitWidth>1</spirit:bitWidth></spirit:field>"
        );
    }

    #[test]
    fn unpaired_bound_is_a_missing_element() {
        let err = parse_field(
            r#"<spirit:field><spirit:name>f</spirit:name>
                <spirit:writeValueConstraint><spirit:minimum>1</spirit:minimum></spirit:writeValueConstraint>
            </spirit:field>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::Xml(XmlError::MissingElement { ref child, .. }) if child == "spirit:maximum"
        ));

        let err = parse_field(
            r#"<spirit:field><spirit:name>f</spirit:name>
                <spirit:writeValueConstraint/></spirit:field>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Xml(XmlError::MissingElement { .. })));
    }

    #[test]
    fn bit_range_containment() {
        let ctx = ValidationContext::default();
        assert!(Field::new("f", 6, 2).is_valid(ctx, 8));
        assert!(!Field::new("f", 6, 3).is_valid(ctx, 8));
        assert!(Field::new("f", 0, 8).is_valid(ctx, 8));
        assert!(!Field::new("f", 0, 9).is_valid(ctx, 8));

        let mut errors = Vec::new();
        assert!(!Field::new("f", 6, 3).collect_errors(ctx, 8, &mut errors, "register r"));
        assert_eq!(
            errors,
            vec![
                "Field f within register r does not fit: the register contains 8 bits but field's MSB bit is 8"
                    .to_string()
            ]
        );
    }

    #[test]
    fn containment_holds_for_all_small_layouts() {
        let ctx = ValidationContext::default();
        for size in 1..=16u32 {
            for offset in 0..=16i32 {
                for width in 1..=16u32 {
                    let field = Field::new("f", offset, width);
                    let fits = offset as u32 + width <= size;
                    assert_eq!(field.is_valid(ctx, size), fits, "{offset}+{width} in {size}");
                }
            }
        }
    }

    #[test]
    fn offset_width_and_name_are_checked() {
        let field = Field::new("", -1, 0);
        let mut errors = Vec::new();
        assert!(!field.collect_errors(ValidationContext::default(), 32, &mut errors, "register r"));
        assert_eq!(
            errors,
            vec![
                "No name specified for field within register r".to_string(),
                "Invalid bit offset set for field  within register r".to_string(),
                "Invalid bit width set for field  within register r".to_string(),
            ]
        );
    }
}
