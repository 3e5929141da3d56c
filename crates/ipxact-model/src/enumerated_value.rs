use ipxact_xml::{XmlElement, XmlError, XmlSink};

use crate::general::EnumUsage;
use crate::name_group::NameGroup;
use crate::vendor::VendorExtensions;
use crate::{expect_element, ModelError};

/// `spirit:enumeratedValue`: a named value of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumeratedValue {
    pub usage: EnumUsage,
    pub name_group: NameGroup,
    pub value: String,
    pub vendor_extensions: VendorExtensions,
}

impl EnumeratedValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name_group: NameGroup::new(name),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:enumeratedValue")?;
        let mut value = EnumeratedValue {
            usage: EnumUsage::from_xml(element.attribute("spirit:usage").unwrap_or_default()),
            name_group: NameGroup::from_xml(element),
            ..EnumeratedValue::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:value" => value.value = child.text(),
                "spirit:vendorExtensions" => value.vendor_extensions.extend_from_xml(child),
                _ => {}
            }
        }
        Ok(value)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:enumeratedValue")?;
        sink.write_attribute("spirit:usage", self.usage.as_xml())?;
        self.name_group.write(sink)?;
        sink.write_text_element("spirit:value", &self.value)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    pub fn is_valid(&self) -> bool {
        !self.name().is_empty() && !self.value.is_empty()
    }

    pub fn collect_errors(&self, errors: &mut Vec<String>, parent: &str) -> bool {
        let mut valid = true;
        if self.name().is_empty() {
            errors.push(format!(
                "No name specified for enumerated value within {parent}"
            ));
            valid = false;
        }
        if self.value.is_empty() {
            errors.push(format!(
                "No value set for enumerated value {} within {parent}",
                self.name()
            ));
            valid = false;
        }
        valid
    }
}
