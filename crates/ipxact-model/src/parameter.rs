//! Parameters and choices, treated as validated leaves of the memory model.

use std::collections::BTreeMap;

use ipxact_xml::{XmlElement, XmlError, XmlSink};

use crate::name_group::NameGroup;
use crate::numeric;
use crate::vendor::VendorExtensions;
use crate::write_attributes;

const VALID_FORMATS: &[&str] = &["bool", "bitString", "long", "float", "string"];
const VALID_RESOLVES: &[&str] = &["immediate", "user", "dependent", "generated"];

/// `spirit:parameter` with the attributes of its `spirit:value` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub attributes: BTreeMap<String, String>,
    pub name_group: NameGroup,
    pub value: String,
    pub value_attributes: BTreeMap<String, String>,
    pub vendor_extensions: VendorExtensions,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name_group: NameGroup::new(name),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Self {
        let mut parameter = Parameter {
            attributes: element.attribute_map(),
            name_group: NameGroup::from_xml(element),
            ..Parameter::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:value" => {
                    parameter.value = child.text();
                    parameter.value_attributes = child.attribute_map();
                }
                "spirit:vendorExtensions" => parameter.vendor_extensions.extend_from_xml(child),
                _ => {}
            }
        }
        parameter
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:parameter")?;
        write_attributes(sink, &self.attributes)?;
        self.name_group.write(sink)?;
        sink.start_element("spirit:value")?;
        write_attributes(sink, &self.value_attributes)?;
        sink.write_text(&self.value)?;
        sink.end_element()?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    pub fn value_attribute(&self, name: &str) -> &str {
        self.value_attributes
            .get(name)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn format(&self) -> &str {
        self.value_attribute("spirit:format")
    }

    pub fn resolve(&self) -> &str {
        self.value_attribute("spirit:resolve")
    }

    pub fn choice_ref(&self) -> &str {
        self.value_attribute("spirit:choiceRef")
    }

    pub fn is_valid(&self, choices: &[Choice]) -> bool {
        self.find_errors(choices, "").is_empty()
    }

    /// Every problem with this parameter, each message ending in `within {context}`.
    pub fn find_errors(&self, choices: &[Choice], context: &str) -> Vec<String> {
        let mut errors = Vec::new();
        let name = self.name();
        let format = self.format();

        if name.is_empty() {
            errors.push(format!("No name specified for parameter within {context}"));
        }

        if self.value.is_empty() {
            errors.push(format!(
                "No value specified for parameter {name} within {context}"
            ));
        } else {
            if !value_matches_format(&self.value, format) {
                errors.push(format!(
                    "Value {} violates format {format} in parameter {name} within {context}",
                    self.value
                ));
            }
            let minimum = self.value_attribute("spirit:minimum");
            if compares_with_boundary(minimum, format)
                && value_of(&self.value, format) < value_of(minimum, format)
            {
                errors.push(format!(
                    "Value {} violates minimum value {minimum} in parameter {name} within {context}",
                    self.value
                ));
            }
            let maximum = self.value_attribute("spirit:maximum");
            if compares_with_boundary(maximum, format)
                && value_of(&self.value, format) > value_of(maximum, format)
            {
                errors.push(format!(
                    "Value {} violates maximum value {maximum} in parameter {name} within {context}",
                    self.value
                ));
            }
            if let Some(choice) = find_choice(choices, self.choice_ref()) {
                if !choice.has_enumeration(&self.value) {
                    errors.push(format!(
                        "Value {} references unknown enumeration for choice {} in parameter {name} within {context}",
                        self.value, choice.name
                    ));
                }
            }
        }

        if !format.is_empty() && !VALID_FORMATS.contains(&format) {
            errors.push(format!(
                "Invalid format {format} specified for parameter {name} within {context}"
            ));
        }

        let bit_string_length = self.value_attribute("spirit:bitStringLength");
        if format == "bitString" && bit_string_length.is_empty() {
            errors.push(format!(
                "No bit string length specified for parameter {name} within {context}"
            ));
        } else if format != "bitString" && !bit_string_length.is_empty() {
            errors.push(format!(
                "Bit string length specified for format other than bitString for parameter {name} within {context}"
            ));
        }

        let choice_ref = self.choice_ref();
        if !choice_ref.is_empty() && find_choice(choices, choice_ref).is_none() {
            errors.push(format!(
                "Choice {choice_ref} referenced in parameter {name} is not specified within {context}"
            ));
        }

        let resolve = self.resolve();
        if !resolve.is_empty() && !VALID_RESOLVES.contains(&resolve) {
            errors.push(format!(
                "Invalid resolve {resolve} specified for parameter {name} within {context}"
            ));
        }
        if matches!(resolve, "user" | "generated") && self.value_attribute("spirit:id").is_empty() {
            errors.push(format!(
                "No id specified for parameter {name} with resolve {resolve} within {context}"
            ));
        }

        errors
    }
}

fn find_choice<'a>(choices: &'a [Choice], name: &str) -> Option<&'a Choice> {
    if name.is_empty() {
        return None;
    }
    choices.iter().find(|choice| choice.name == name)
}

fn value_matches_format(value: &str, format: &str) -> bool {
    match format {
        "bool" => matches!(value, "true" | "false"),
        "long" => is_long_literal(value),
        "float" => value.trim().parse::<f64>().is_ok(),
        "bitString" => {
            let digits = value.trim().trim_start_matches('"').trim_end_matches('"');
            !digits.is_empty() && digits.chars().all(|c| c == '0' || c == '1')
        }
        _ => true,
    }
}

fn is_long_literal(value: &str) -> bool {
    let trimmed = value.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    !unsigned.is_empty() && (numeric::parse_literal(unsigned) != 0 || is_zero_literal(unsigned))
}

fn is_zero_literal(text: &str) -> bool {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c == '0')
}

fn compares_with_boundary(boundary: &str, format: &str) -> bool {
    !boundary.is_empty()
        && matches!(format, "long" | "float")
        && value_matches_format(boundary, format)
}

fn value_of(text: &str, format: &str) -> f64 {
    match format {
        "long" => {
            let trimmed = text.trim();
            match trimmed.strip_prefix('-') {
                Some(rest) => -(numeric::parse_literal(rest) as f64),
                None => numeric::parse_literal(trimmed) as f64,
            }
        }
        _ => text.trim().parse().unwrap_or(0.0),
    }
}

/// Decode the `spirit:parameter` children of a `spirit:parameters` container.
pub fn parameters_from_xml(container: &XmlElement) -> Vec<Parameter> {
    container
        .child_elements()
        .filter(|child| child.name == "spirit:parameter")
        .map(Parameter::from_xml)
        .collect()
}

/// Write a `spirit:parameters` container when the list is not empty.
pub fn write_parameters(sink: &mut dyn XmlSink, parameters: &[Parameter]) -> Result<(), XmlError> {
    if parameters.is_empty() {
        return Ok(());
    }
    sink.start_element("spirit:parameters")?;
    for parameter in parameters {
        parameter.write(sink)?;
    }
    sink.end_element()
}

/// One allowed value of a [`Choice`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
    pub value: String,
    pub text: Option<String>,
    pub help: Option<String>,
}

/// `spirit:choice`: a named set of values a parameter may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub enumerations: Vec<Enumeration>,
}

impl Choice {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            enumerations: values
                .iter()
                .map(|value| Enumeration {
                    value: value.to_string(),
                    ..Enumeration::default()
                })
                .collect(),
        }
    }

    pub fn from_xml(element: &XmlElement) -> Self {
        let mut choice = Choice::default();
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:name" => choice.name = child.text(),
                "spirit:enumeration" => choice.enumerations.push(Enumeration {
                    value: child.text(),
                    text: child.attribute("spirit:text").map(str::to_string),
                    help: child.attribute("spirit:help").map(str::to_string),
                }),
                _ => {}
            }
        }
        choice
    }

    pub fn has_enumeration(&self, value: &str) -> bool {
        self.enumerations.iter().any(|entry| entry.value == value)
    }
}
