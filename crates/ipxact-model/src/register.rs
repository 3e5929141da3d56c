//! Registers, their shared layout definition and alternate layouts.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use ipxact_xml::{XmlElement, XmlError, XmlSink};
use tracing::debug;

use crate::field::Field;
use crate::general::{Access, BooleanValue};
use crate::item;
use crate::name_group::NameGroup;
use crate::numeric;
use crate::parameter::{self, Parameter};
use crate::register_file::RegisterFile;
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, write_attributes, ModelError};

const DIM_EXPRESSION: &str = "kactus2:dimExpression";
const IS_PRESENT: &str = "kactus2:isPresent";
const SIZE_EXPRESSION: &str = "kactus2:sizeExpression";

/// Entry of an address block's register list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterModel {
    Register(Register),
    RegisterFile(RegisterFile),
}

impl RegisterModel {
    /// Decode `spirit:register` or `spirit:registerFile`, `None` for any other tag.
    pub fn from_xml(element: &XmlElement) -> Result<Option<Self>, ModelError> {
        let model = match element.name.as_str() {
            "spirit:register" => RegisterModel::Register(Register::from_xml(element)?),
            "spirit:registerFile" => RegisterModel::RegisterFile(RegisterFile::from_xml(element)?),
            _ => return Ok(None),
        };
        Ok(Some(model))
    }

    pub fn name(&self) -> &str {
        match self {
            RegisterModel::Register(register) => &register.name_group.name,
            RegisterModel::RegisterFile(file) => &file.name_group.name,
        }
    }

    pub fn address_offset(&self) -> &str {
        match self {
            RegisterModel::Register(register) => &register.address_offset,
            RegisterModel::RegisterFile(file) => &file.address_offset,
        }
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        match self {
            RegisterModel::Register(register) => register.write(sink),
            RegisterModel::RegisterFile(file) => file.write(sink),
        }
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        match self {
            RegisterModel::Register(register) => register.is_valid(ctx),
            RegisterModel::RegisterFile(file) => file.is_valid(ctx),
        }
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        match self {
            RegisterModel::Register(register) => register.collect_errors(ctx, errors, parent),
            RegisterModel::RegisterFile(file) => file.collect_errors(ctx, errors, parent),
        }
    }

    pub fn as_register(&self) -> Option<&Register> {
        match self {
            RegisterModel::Register(register) => Some(register),
            RegisterModel::RegisterFile(_) => None,
        }
    }

    pub fn as_register_mut(&mut self) -> Option<&mut Register> {
        match self {
            RegisterModel::Register(register) => Some(register),
            RegisterModel::RegisterFile(_) => None,
        }
    }
}

impl From<Register> for RegisterModel {
    fn from(register: Register) -> Self {
        RegisterModel::Register(register)
    }
}

impl From<RegisterFile> for RegisterModel {
    fn from(file: RegisterFile) -> Self {
        RegisterModel::RegisterFile(file)
    }
}

/// `spirit:reset` of a register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reset {
    pub value: String,
    pub mask: String,
}

impl Reset {
    fn from_xml(element: &XmlElement) -> Self {
        let mut reset = Reset::default();
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:value" => reset.value = child.text(),
                "spirit:mask" => reset.mask = child.text(),
                _ => {}
            }
        }
        reset
    }

    fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:reset")?;
        sink.write_text_element("spirit:value", &self.value)?;
        if !self.mask.is_empty() {
            sink.write_text_element("spirit:mask", &self.mask)?;
        }
        sink.end_element()
    }
}

/// Layout shared by a register and its alternates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterDefinition {
    pub type_identifier: String,
    /// Width in bits, `0` when unset.
    pub size: u32,
    pub size_attributes: BTreeMap<String, String>,
    pub volatile: BooleanValue,
    pub access: Access,
    /// Parsed whenever present, written only when its value is not empty.
    pub reset: Option<Reset>,
    pub fields: Vec<Field>,
}

impl RegisterDefinition {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Feed one child of the register element; `false` when the child is not
    /// part of the definition.
    pub(crate) fn read_child(&mut self, child: &XmlElement) -> Result<bool, ModelError> {
        match child.name.as_str() {
            "spirit:typeIdentifier" => self.type_identifier = child.text(),
            "spirit:size" => {
                self.size = numeric::parse_int_or_zero(&child.text());
                self.size_attributes = child.attribute_map();
            }
            "spirit:volatile" => self.volatile = BooleanValue::from_xml(&child.text()),
            "spirit:access" => self.access = Access::from_xml(&child.text()),
            "spirit:reset" => self.reset = Some(Reset::from_xml(child)),
            "spirit:field" => self.fields.push(Field::from_xml(child)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        self.write_layout(sink, true)
    }

    fn write_layout(&self, sink: &mut dyn XmlSink, with_size: bool) -> Result<(), XmlError> {
        if !self.type_identifier.is_empty() {
            sink.write_text_element("spirit:typeIdentifier", &self.type_identifier)?;
        }
        if with_size {
            sink.start_element("spirit:size")?;
            write_attributes(sink, &self.size_attributes)?;
            sink.write_text(&self.size.to_string())?;
            sink.end_element()?;
        }
        if let Some(volatile) = self.volatile.as_xml() {
            sink.write_text_element("spirit:volatile", volatile)?;
        }
        if let Some(access) = self.access.as_xml() {
            sink.write_text_element("spirit:access", access)?;
        }
        if let Some(reset) = self.reset.as_ref().filter(|reset| !reset.value.is_empty()) {
            reset.write(sink)?;
        }
        for field in &self.fields {
            field.write(sink)?;
        }
        Ok(())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name_group.name.as_str()).collect()
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        self.size > 0 && self.layout_valid(ctx, self.size)
    }

    /// Append every problem, using `identifier` (e.g. `register ctrl`) as the
    /// parent of the fields.
    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        identifier: &str,
    ) -> bool {
        let mut valid = true;
        if self.size == 0 {
            errors.push(format!("No size specified for {identifier}"));
            valid = false;
        }
        if !self.collect_layout_errors(ctx, self.size, errors, identifier) {
            valid = false;
        }
        valid
    }

    fn layout_valid(&self, ctx: ValidationContext<'_>, register_size: u32) -> bool {
        if self.reset.as_ref().is_some_and(|reset| reset.value.is_empty()) {
            return false;
        }
        validation::all_unique(self.field_names())
            && self
                .fields
                .iter()
                .all(|field| field.is_valid(ctx, register_size))
    }

    fn collect_layout_errors(
        &self,
        ctx: ValidationContext<'_>,
        register_size: u32,
        errors: &mut Vec<String>,
        identifier: &str,
    ) -> bool {
        let mut valid = true;
        if self.reset.as_ref().is_some_and(|reset| reset.value.is_empty()) {
            errors.push(format!("No reset value specified for {identifier}"));
            valid = false;
        }
        for duplicate in validation::duplicate_names(self.field_names()) {
            errors.push(format!(
                "{identifier} contains several fields with name {duplicate}"
            ));
            valid = false;
        }
        for field in &self.fields {
            if !field.collect_errors(ctx, register_size, errors, identifier) {
                valid = false;
            }
        }
        valid
    }
}

/// `spirit:register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub id: String,
    pub name_group: NameGroup,
    /// Array depth, `-1` when unset.
    pub dim: i32,
    pub address_offset: String,
    pub definition: RegisterDefinition,
    pub alternate_registers: Vec<AlternateRegister>,
    pub parameters: Vec<Parameter>,
    pub vendor_extensions: VendorExtensions,
}

impl Default for Register {
    fn default() -> Self {
        Self {
            id: String::new(),
            name_group: NameGroup::default(),
            dim: -1,
            address_offset: String::new(),
            definition: RegisterDefinition::default(),
            alternate_registers: Vec::new(),
            parameters: Vec::new(),
            vendor_extensions: VendorExtensions::default(),
        }
    }
}

impl Register {
    pub fn new(name: impl Into<String>, address_offset: impl Into<String>, size: u32) -> Self {
        Self {
            name_group: NameGroup::new(name),
            address_offset: address_offset.into(),
            definition: RegisterDefinition::new(size),
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:register")?;
        let mut register = Register {
            id: element.attribute("spirit:id").unwrap_or_default().to_string(),
            name_group: NameGroup::from_xml(element),
            ..Register::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:dim" => register.dim = numeric::parse_int_or_zero(&child.text()),
                "spirit:addressOffset" => register.address_offset = child.text(),
                "spirit:alternateRegisters" => {
                    for alternate in child
                        .child_elements()
                        .filter(|node| node.name == "spirit:alternateRegister")
                    {
                        register
                            .alternate_registers
                            .push(AlternateRegister::from_xml(alternate)?);
                    }
                }
                "spirit:parameters" => register
                    .parameters
                    .extend(parameter::parameters_from_xml(child)),
                "spirit:vendorExtensions" => register.vendor_extensions.extend_from_xml(child),
                name if NameGroup::is_name_element(name) => {}
                _ => {
                    if !register.definition.read_child(child)? {
                        item::skip_unknown(element, child);
                    }
                }
            }
        }
        debug!(
            register = %register.name_group.name,
            fields = register.definition.fields.len(),
            "parsed register"
        );
        Ok(register)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:register")?;
        if !self.id.is_empty() {
            sink.write_attribute("spirit:id", &self.id)?;
        }
        self.name_group.write(sink)?;
        if self.dim >= 0 {
            sink.write_text_element("spirit:dim", &self.dim.to_string())?;
        }
        sink.write_text_element("spirit:addressOffset", &self.address_offset)?;
        self.definition.write(sink)?;
        if !self.alternate_registers.is_empty() {
            sink.start_element("spirit:alternateRegisters")?;
            for alternate in &self.alternate_registers {
                alternate.write(sink)?;
            }
            sink.end_element()?;
        }
        parameter::write_parameters(sink, &self.parameters)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    pub fn size(&self) -> u32 {
        self.definition.size
    }

    pub fn dimension_expression(&self) -> &str {
        self.vendor_extensions.value(DIM_EXPRESSION).unwrap_or("")
    }

    pub fn set_dimension_expression(&mut self, expression: impl Into<String>) {
        self.vendor_extensions.set_value(DIM_EXPRESSION, expression);
    }

    pub fn remove_dimension_expression(&mut self) {
        self.vendor_extensions.remove(DIM_EXPRESSION);
    }

    /// Presence condition, `1` when none is given.
    pub fn is_present_expression(&self) -> &str {
        self.vendor_extensions.value(IS_PRESENT).unwrap_or("1")
    }

    pub fn set_is_present_expression(&mut self, expression: impl Into<String>) {
        self.vendor_extensions.set_value(IS_PRESENT, expression);
    }

    pub fn remove_is_present_expression(&mut self) {
        self.vendor_extensions.remove(IS_PRESENT);
    }

    pub fn size_expression(&self) -> &str {
        self.vendor_extensions.value(SIZE_EXPRESSION).unwrap_or("")
    }

    pub fn set_size_expression(&mut self, expression: impl Into<String>) {
        self.vendor_extensions.set_value(SIZE_EXPRESSION, expression);
    }

    pub fn remove_size_expression(&mut self) {
        self.vendor_extensions.remove(SIZE_EXPRESSION);
    }

    /// Write the comment and `#define` of this register at `offset` plus its
    /// own address offset.
    pub fn write_define(&self, out: &mut dyn fmt::Write, offset: u64, prefix: &str) -> fmt::Result {
        writeln!(out, "/*")?;
        writeln!(out, " * Register name: {}", self.name())?;
        if !self.name_group.description.is_empty() {
            writeln!(out, " * Description:")?;
            writeln!(out, " * {}", self.name_group.description)?;
        }
        writeln!(out, "*/")?;

        let address = offset.wrapping_add(numeric::parse_literal(&self.address_offset));
        let name = self.name().to_uppercase();
        if prefix.is_empty() {
            writeln!(out, "#define {name} {}", numeric::format_hex(address))
        } else {
            writeln!(
                out,
                "#define {}_{name} {}",
                prefix.to_uppercase(),
                numeric::format_hex(address)
            )
        }
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        if self.name().is_empty() || self.address_offset.is_empty() {
            return false;
        }
        self.definition.is_valid(ctx)
            && self
                .alternate_registers
                .iter()
                .all(|alternate| alternate.is_valid(ctx, self.size()))
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
        let identifier = format!("register {name}");

        if name.is_empty() {
            errors.push(format!("No name specified for register within {parent}"));
            valid = false;
        }
        if self.address_offset.is_empty() {
            errors.push(format!(
                "No address offset set for register {name} within {parent}"
            ));
            valid = false;
        }
        if !self.definition.collect_errors(ctx, errors, &identifier) {
            valid = false;
        }
        for alternate in &self.alternate_registers {
            if !alternate.collect_errors(ctx, self.size(), errors, &identifier) {
                valid = false;
            }
        }
        if !validation::collect_parameter_errors(&self.parameters, ctx, errors, &identifier) {
            valid = false;
        }
        valid
    }
}

/// `spirit:alternateRegister`: another field layout of the same register,
/// active while one of its alternate groups is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlternateRegister {
    pub id: String,
    pub name_group: NameGroup,
    pub alternate_groups: Vec<String>,
    /// Layout without a size of its own; fields are checked against the
    /// size of the owning register.
    pub definition: RegisterDefinition,
    pub parameters: Vec<Parameter>,
    pub vendor_extensions: VendorExtensions,
}

impl AlternateRegister {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name_group: NameGroup::new(name),
            alternate_groups: vec![group.into()],
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:alternateRegister")?;
        let mut alternate = AlternateRegister {
            id: element.attribute("spirit:id").unwrap_or_default().to_string(),
            name_group: NameGroup::from_xml(element),
            ..AlternateRegister::default()
        };
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:alternateGroups" => alternate.alternate_groups.extend(
                    child
                        .child_elements()
                        .filter(|group| group.name == "spirit:alternateGroup")
                        .map(XmlElement::text),
                ),
                "spirit:parameters" => alternate
                    .parameters
                    .extend(parameter::parameters_from_xml(child)),
                "spirit:vendorExtensions" => alternate.vendor_extensions.extend_from_xml(child),
                name if NameGroup::is_name_element(name) => {}
                _ => {
                    if !alternate.definition.read_child(child)? {
                        item::skip_unknown(element, child);
                    }
                }
            }
        }
        Ok(alternate)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:alternateRegister")?;
        if !self.id.is_empty() {
            sink.write_attribute("spirit:id", &self.id)?;
        }
        self.name_group.write(sink)?;
        sink.start_element("spirit:alternateGroups")?;
        for group in &self.alternate_groups {
            sink.write_text_element("spirit:alternateGroup", group)?;
        }
        sink.end_element()?;
        self.definition.write_layout(sink, false)?;
        parameter::write_parameters(sink, &self.parameters)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        &self.name_group.name
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>, register_size: u32) -> bool {
        !self.name().is_empty()
            && !self.alternate_groups.is_empty()
            && self.definition.layout_valid(ctx, register_size)
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
        let identifier = format!("alternate register {name}");

        if name.is_empty() {
            errors.push(format!(
                "No name specified for alternate register within {parent}"
            ));
            valid = false;
        }
        if self.alternate_groups.is_empty() {
            errors.push(format!(
                "At least one alternate group must be specified for alternate register {name} within {parent}"
            ));
            valid = false;
        }
        if !self
            .definition
            .collect_layout_errors(ctx, register_size, errors, &identifier)
        {
            valid = false;
        }
        if !validation::collect_parameter_errors(&self.parameters, ctx, errors, &identifier) {
            valid = false;
        }
        valid
    }
}
