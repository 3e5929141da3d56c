//! Whole documents: every memory map and address space found in a file
//! together with the component level data they are validated against.

use ipxact_xml::XmlElement;
use tracing::debug;

use crate::address_space::AddressSpace;
use crate::memory_map::MemoryMap;
use crate::parameter::Choice;
use crate::validation::ValidationContext;
use crate::ModelError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDocument {
    /// Name of the enclosing component, empty for a standalone map or space.
    pub component: String,
    pub memory_maps: Vec<MemoryMap>,
    pub address_spaces: Vec<AddressSpace>,
    pub choices: Vec<Choice>,
    pub remap_states: Vec<String>,
}

impl MemoryDocument {
    pub fn from_xml(xml: &str) -> Result<Self, ModelError> {
        let root = ipxact_xml::parse_document(xml)?;
        Self::from_element(&root)
    }

    /// Collect entities from `root` and anywhere below it.
    pub fn from_element(root: &XmlElement) -> Result<Self, ModelError> {
        let mut document = MemoryDocument::default();
        if root.name == "spirit:component" {
            document.component = root
                .find_child("spirit:name")
                .map(XmlElement::text)
                .unwrap_or_default();
        }

        for map in elements_named(root, "spirit:memoryMap") {
            document.memory_maps.push(MemoryMap::from_xml(map)?);
        }
        for space in elements_named(root, "spirit:addressSpace") {
            document.address_spaces.push(AddressSpace::from_xml(space)?);
        }
        for choice in elements_named(root, "spirit:choice") {
            document.choices.push(Choice::from_xml(choice));
        }
        for state in elements_named(root, "spirit:remapState") {
            let name = state
                .find_child("spirit:name")
                .map(XmlElement::text)
                .unwrap_or_default();
            document.remap_states.push(name);
        }

        debug!(
            component = %document.component,
            memory_maps = document.memory_maps.len(),
            address_spaces = document.address_spaces.len(),
            remap_states = document.remap_states.len(),
            "loaded document"
        );
        Ok(document)
    }

    pub fn context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.choices, &self.remap_states)
    }

    /// Identifier used as the parent of top level entities in messages.
    pub fn identifier(&self) -> String {
        if self.component.is_empty() {
            "document".to_string()
        } else {
            format!("component {}", self.component)
        }
    }

    pub fn find_memory_map(&self, name: &str) -> Option<&MemoryMap> {
        self.memory_maps.iter().find(|map| map.name() == name)
    }

    pub fn is_valid(&self) -> bool {
        let ctx = self.context();
        self.memory_maps.iter().all(|map| map.is_valid(ctx))
            && self.address_spaces.iter().all(|space| space.is_valid(ctx))
    }

    pub fn collect_errors(&self) -> Vec<String> {
        let ctx = self.context();
        let parent = self.identifier();
        let mut errors = Vec::new();
        for map in &self.memory_maps {
            map.collect_errors(ctx, &mut errors, &parent);
        }
        for space in &self.address_spaces {
            space.collect_errors(ctx, &mut errors, &parent);
        }
        errors
    }
}

fn elements_named<'a>(root: &'a XmlElement, name: &str) -> Vec<&'a XmlElement> {
    let mut found = Vec::new();
    if root.name == name {
        found.push(root);
    }
    root.descendants_named(name, &mut found);
    found
}
