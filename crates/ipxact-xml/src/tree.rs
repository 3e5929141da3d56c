use std::borrow::Cow;
use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::XmlError;

/// A single node of the parse tree: either a nested element or character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Owned XML element with its attributes kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified tag name including the namespace prefix, e.g. `spirit:name`.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder helper appending an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder helper appending a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Builder helper appending an element child.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Iterate over the direct child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given tag name.
    pub fn find_child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Recursively collect every descendant element (excluding `self`) with the given name.
    pub fn descendants_named<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlElement>) {
        for child in self.child_elements() {
            if child.name == name {
                out.push(child);
            }
            child.descendants_named(name, out);
        }
    }

    /// Concatenated direct text content with surrounding whitespace removed,
    /// the form typed leaves such as `spirit:range` are read in.
    pub fn text(&self) -> String {
        self.raw_text().trim().to_string()
    }

    /// Concatenated direct text content exactly as it appeared in the document.
    pub fn raw_text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            if let XmlNode::Text(value) = node {
                text.push_str(value);
            }
        }
        text
    }

    /// Text of a required child element.
    pub fn required_child_text(&self, child: &str) -> Result<String, XmlError> {
        self.find_child(child)
            .map(XmlElement::text)
            .ok_or_else(|| XmlError::MissingElement {
                parent: self.name.clone(),
                child: child.to_string(),
            })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes as a sorted map, the representation the model stores.
    pub fn attribute_map(&self) -> BTreeMap<String, String> {
        self.attributes.iter().cloned().collect()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Parse a complete document and return its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Xml("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|err| XmlError::Xml(err.to_string()))?;
                push_text(&mut stack, value);
            }
            Ok(Event::CData(data)) => {
                let bytes = data.into_inner();
                push_text(&mut stack, String::from_utf8_lossy(&bytes));
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(XmlError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Xml(format!("unclosed element <{}>", open.name)));
    }
    let root = root.ok_or_else(|| XmlError::Xml("document has no root element".into()))?;
    debug!(root = %root.name, children = root.children.len(), "parsed xml document");
    Ok(root)
}

fn element_from_start(event: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(event.name().as_ref()).to_string();
    let mut element = XmlElement::new(name);
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Xml(format!(
            "multiple root elements, second is <{}>",
            element.name
        ))),
    }
}

fn push_text(stack: &mut [XmlElement], value: Cow<'_, str>) {
    // Indentation between elements carries no data. Character data outside
    // the root element is ignored.
    if value.trim().is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Text(value.into_owned()));
    }
}
