use ipxact_xml::{XmlElement, XmlError, XmlSink};
use tracing::debug;

use crate::item::{self, ItemHeader, MemoryBlockData, MemoryMapItem};
use crate::validation::{self, ValidationContext};
use crate::vendor::VendorExtensions;
use crate::{expect_element, ModelError};

pub const BANK_ALIGNMENT: &str = "spirit:bankAlignment";

/// `spirit:bank`: items laid out together according to the bank alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bank {
    pub header: ItemHeader,
    pub items: Vec<MemoryMapItem>,
    pub data: MemoryBlockData,
    pub vendor_extensions: VendorExtensions,
}

impl Bank {
    pub fn new(
        name: impl Into<String>,
        base_address: impl Into<String>,
        alignment: impl Into<String>,
    ) -> Self {
        let mut header = ItemHeader::new(name, base_address);
        header
            .attributes
            .insert(BANK_ALIGNMENT.to_string(), alignment.into());
        Self {
            header,
            ..Self::default()
        }
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self, ModelError> {
        expect_element(element, "spirit:bank")?;
        let mut bank = Bank {
            header: ItemHeader::from_xml(element),
            ..Bank::default()
        };
        for child in element.child_elements() {
            if let Some(item) = MemoryMapItem::from_xml(child)? {
                bank.items.push(item);
                continue;
            }
            match child.name.as_str() {
                "spirit:vendorExtensions" => bank.vendor_extensions.extend_from_xml(child),
                name if ItemHeader::is_header_element(name) => {}
                _ => {
                    if !bank.data.read_child(child) {
                        item::skip_unknown(element, child);
                    }
                }
            }
        }
        debug!(bank = %bank.name(), items = bank.items.len(), "parsed bank");
        Ok(bank)
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.start_element("spirit:bank")?;
        self.header.write(sink)?;
        for item in &self.items {
            item.write(sink)?;
        }
        self.data.write(sink)?;
        self.vendor_extensions.write(sink)?;
        sink.end_element()
    }

    pub fn name(&self) -> &str {
        self.header.name()
    }

    pub fn alignment(&self) -> Option<&str> {
        self.header.attribute(BANK_ALIGNMENT)
    }

    fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(MemoryMapItem::name)
    }

    pub fn is_valid(&self, ctx: ValidationContext<'_>) -> bool {
        if self.name().is_empty()
            || self.alignment().map_or(true, str::is_empty)
            || self.header.base_address.is_empty()
            || self.items.is_empty()
        {
            return false;
        }
        validation::all_unique(self.item_names())
            && self.items.iter().all(|item| item.is_valid(ctx))
            && self.data.is_valid(ctx)
    }

    pub fn collect_errors(
        &self,
        ctx: ValidationContext<'_>,
        errors: &mut Vec<String>,
        parent: &str,
    ) -> bool {
        let mut valid = true;
        let name = self.name();
        let identifier = format!("bank {name}");

        if name.is_empty() {
            errors.push(format!("No name specified for bank within {parent}"));
            valid = false;
        }
        if self.alignment().map_or(true, str::is_empty) {
            errors.push(format!("No bank alignment set for bank {name} within {parent}"));
            valid = false;
        }
        if self.header.base_address.is_empty() {
            errors.push(format!("No base address set for bank {name} within {parent}"));
            valid = false;
        }
        if self.items.is_empty() {
            errors.push(format!(
                "Bank {name} within {parent} does not contain any items"
            ));
            valid = false;
        }
        for duplicate in validation::duplicate_names(self.item_names()) {
            errors.push(format!(
                "Bank {name} contains several items with name {duplicate}"
            ));
            valid = false;
        }
        for item in &self.items {
            if !item.collect_errors(ctx, errors, &identifier) {
                valid = false;
            }
        }
        if !self.data.collect_errors(ctx, errors, &identifier) {
            valid = false;
        }
        valid
    }
}
