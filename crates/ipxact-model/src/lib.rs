//! IP-XACT memory map model: parse, validate, serialise and generate C headers.
//!
//! Documents are read through [`ipxact_xml::parse_document`] and every entity
//! is decoded from its element by name dispatch. Entities own their children
//! outright, so `clone()` is always a deep copy. Validation never fails with
//! an error: each entity offers a short-circuiting `is_valid` and an
//! accumulating `collect_errors` that appends human readable messages.

pub mod address_block;
pub mod address_space;
pub mod bank;
pub mod document;
pub mod enumerated_value;
pub mod field;
pub mod general;
pub mod item;
pub mod memory_map;
pub mod name_group;
pub mod numeric;
pub mod parameter;
pub mod register;
pub mod register_file;
pub mod subspace_map;
pub mod validation;
pub mod vendor;

use ipxact_xml::{XmlElement, XmlError, XmlSink, XmlWriter};
use thiserror::Error;

pub use address_block::AddressBlock;
pub use address_space::{AddressSpace, Segment};
pub use bank::Bank;
pub use document::MemoryDocument;
pub use enumerated_value::EnumeratedValue;
pub use field::{Field, WriteValueConstraint};
pub use general::{
    Access, BooleanValue, EnumUsage, ModifiedWrite, ReadAction, TestConstraint, Usage,
};
pub use item::{ItemHeader, MemoryBlockData, MemoryMapItem};
pub use memory_map::{AbstractMemoryMap, HeaderOptions, MemoryMap, MemoryRemap};
pub use name_group::NameGroup;
pub use parameter::{Choice, Enumeration, Parameter};
pub use register::{AlternateRegister, Register, RegisterDefinition, RegisterModel, Reset};
pub use register_file::RegisterFile;
pub use subspace_map::SubspaceMap;
pub use validation::ValidationContext;
pub use vendor::{VendorExtension, VendorExtensions};

/// Error type produced while decoding or serialising the model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The XML layer failed or a structurally required child was absent.
    #[error(transparent)]
    Xml(#[from] XmlError),
    /// A decoder was handed an element of the wrong kind.
    #[error("expected <{expected}> element, found <{found}>")]
    UnexpectedElement { expected: String, found: String },
    /// Writing generated text to a caller supplied sink failed.
    #[error("text output failed")]
    Format(#[from] std::fmt::Error),
}

/// Serialisation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level, `0` writes everything on one line.
    pub indent: usize,
    /// Emit the `<?xml ...?>` declaration first.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            declaration: true,
        }
    }
}

/// Parse a standalone `spirit:memoryMap` document.
pub fn parse_memory_map(xml: &str) -> Result<MemoryMap, ModelError> {
    let root = ipxact_xml::parse_document(xml)?;
    MemoryMap::from_xml(&root)
}

/// Parse a standalone `spirit:addressSpace` document.
pub fn parse_address_space(xml: &str) -> Result<AddressSpace, ModelError> {
    let root = ipxact_xml::parse_document(xml)?;
    AddressSpace::from_xml(&root)
}

/// Serialise a memory map as a standalone document.
pub fn write_memory_map(map: &MemoryMap, options: WriteOptions) -> Result<String, ModelError> {
    render(options, |sink| Ok(map.write(sink)?))
}

/// Serialise an address space as a standalone document.
pub fn write_address_space(
    space: &AddressSpace,
    options: WriteOptions,
) -> Result<String, ModelError> {
    render(options, |sink| Ok(space.write(sink)?))
}

pub(crate) fn render(
    options: WriteOptions,
    body: impl FnOnce(&mut dyn XmlSink) -> Result<(), ModelError>,
) -> Result<String, ModelError> {
    let mut writer = if options.indent > 0 {
        XmlWriter::with_indent(Vec::new(), options.indent)
    } else {
        XmlWriter::new(Vec::new())
    };
    if options.declaration {
        writer.write_declaration()?;
    }
    body(&mut writer)?;
    let bytes = writer.into_inner()?;
    String::from_utf8(bytes).map_err(|err| XmlError::Writer(err.to_string()).into())
}

pub(crate) fn expect_element(element: &XmlElement, expected: &str) -> Result<(), ModelError> {
    if element.name == expected {
        Ok(())
    } else {
        Err(ModelError::UnexpectedElement {
            expected: expected.to_string(),
            found: element.name.clone(),
        })
    }
}

/// Write every `(name, value)` pair as an attribute of the open element.
pub(crate) fn write_attributes<'a>(
    sink: &mut dyn XmlSink,
    attributes: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> Result<(), XmlError> {
    for (name, value) in attributes {
        sink.write_attribute(name, value)?;
    }
    Ok(())
}
