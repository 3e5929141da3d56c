//! Vendor extensions: preserved verbatim so unknown data survives a round-trip.

use ipxact_xml::{write_tree, XmlElement, XmlError, XmlNode, XmlSink};
use tracing::trace;

/// Single value extensions recognised by tag name.
pub const VALUE_EXTENSIONS: &[&str] = &[
    "kactus2:dimExpression",
    "kactus2:isPresent",
    "kactus2:sizeExpression",
    "kactus2:offsetExpression",
    "kactus2:widthExpression",
];

/// Empty flag extensions recognised by tag name.
pub const PLACEHOLDER_EXTENSIONS: &[&str] =
    &["kactus2:adHocVisible", "kactus2:offPage", "kactus2:draft"];

pub const POSITION_EXTENSION: &str = "kactus2:position";

/// One child of a `spirit:vendorExtensions` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorExtension {
    /// `<name>value</name>`
    Value { name: String, value: String },
    /// `<name x=".." y=".."/>`
    Position { name: String, x: i64, y: i64 },
    /// `<name/>`
    Placeholder { name: String },
    /// Any other subtree, replayed exactly as read.
    Generic(XmlElement),
}

impl VendorExtension {
    /// Classify a node. Recognised variants are only used when writing them
    /// back reproduces the node exactly; everything else stays generic.
    pub fn from_xml(element: &XmlElement) -> Self {
        let name = element.name.as_str();
        if VALUE_EXTENSIONS.contains(&name) && element.attributes.is_empty() {
            let text_only = element
                .children
                .iter()
                .all(|child| matches!(child, XmlNode::Text(_)));
            let value = element.raw_text();
            if text_only && element.children.len() == 1 && value.trim() == value {
                return VendorExtension::Value {
                    name: name.to_string(),
                    value,
                };
            }
        }
        if PLACEHOLDER_EXTENSIONS.contains(&name)
            && element.attributes.is_empty()
            && !element.has_children()
        {
            return VendorExtension::Placeholder {
                name: name.to_string(),
            };
        }
        if name == POSITION_EXTENSION && !element.has_children() {
            if let Some(position) = parse_position(element) {
                return position;
            }
        }
        trace!(extension = %name, "keeping vendor extension verbatim");
        VendorExtension::Generic(element.clone())
    }

    /// Tag name identifying the extension.
    pub fn name(&self) -> &str {
        match self {
            VendorExtension::Value { name, .. }
            | VendorExtension::Position { name, .. }
            | VendorExtension::Placeholder { name } => name,
            VendorExtension::Generic(element) => &element.name,
        }
    }

    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        match self {
            VendorExtension::Value { name, value } => sink.write_text_element(name, value),
            VendorExtension::Position { name, x, y } => {
                sink.start_element(name)?;
                sink.write_attribute("x", &x.to_string())?;
                sink.write_attribute("y", &y.to_string())?;
                sink.end_element()
            }
            VendorExtension::Placeholder { name } => {
                sink.start_element(name)?;
                sink.end_element()
            }
            VendorExtension::Generic(element) => write_tree(sink, element),
        }
    }
}

fn parse_position(element: &XmlElement) -> Option<VendorExtension> {
    if element.attributes.len() != 2 {
        return None;
    }
    let (x_key, x_text) = &element.attributes[0];
    let (y_key, y_text) = &element.attributes[1];
    if x_key != "x" || y_key != "y" {
        return None;
    }
    let x: i64 = x_text.parse().ok()?;
    let y: i64 = y_text.parse().ok()?;
    if x.to_string() != *x_text || y.to_string() != *y_text {
        return None;
    }
    Some(VendorExtension::Position {
        name: element.name.clone(),
        x,
        y,
    })
}

/// Ordered list of extensions attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorExtensions {
    extensions: Vec<VendorExtension>,
}

impl VendorExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the children of a `spirit:vendorExtensions` container.
    pub fn from_xml(container: &XmlElement) -> Self {
        Self {
            extensions: container
                .child_elements()
                .map(VendorExtension::from_xml)
                .collect(),
        }
    }

    /// Append the children of another container, keeping order.
    pub fn extend_from_xml(&mut self, container: &XmlElement) {
        self.extensions
            .extend(container.child_elements().map(VendorExtension::from_xml));
    }

    /// Write the `spirit:vendorExtensions` container when there is anything to write.
    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        if self.extensions.is_empty() {
            return Ok(());
        }
        sink.start_element("spirit:vendorExtensions")?;
        for extension in &self.extensions {
            extension.write(sink)?;
        }
        sink.end_element()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VendorExtension> {
        self.extensions.iter()
    }

    pub fn push(&mut self, extension: VendorExtension) {
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// First extension with the given tag name.
    pub fn find(&self, name: &str) -> Option<&VendorExtension> {
        self.extensions.iter().find(|ext| ext.name() == name)
    }

    /// Value of the first value extension with the given tag name.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.extensions.iter().find_map(|ext| match ext {
            VendorExtension::Value { name: tag, value } if tag == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Update the first value extension named `name`, or append a new one.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        for ext in &mut self.extensions {
            if let VendorExtension::Value { name: tag, value: current } = ext {
                if tag == name {
                    *current = value;
                    return;
                }
            }
        }
        self.extensions.push(VendorExtension::Value {
            name: name.to_string(),
            value,
        });
    }

    /// Remove every extension with the given tag name, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.extensions.len();
        self.extensions.retain(|ext| ext.name() != name);
        before - self.extensions.len()
    }
}

impl FromIterator<VendorExtension> for VendorExtensions {
    fn from_iter<I: IntoIterator<Item = VendorExtension>>(iter: I) -> Self {
        Self {
            extensions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_xml::{parse_document, XmlWriter};

    const EXTENSIONS: &str = concat!(
        "<spirit:vendorExtensions>",
        "<kactus2:dimExpression>N * 2</kactus2:dimExpression>",
        "<kactus2:position x=\"10\" y=\"-4\"/>",
        "<kactus2:offPage/>",
        "<acme:layout acme:mode=\"dense\"><acme:row>1</acme:row><acme:row/></acme:layout>",
        "<kactus2:isPresent kactus2:note=\"odd\">1</kactus2:isPresent>",
        "</spirit:vendorExtensions>"
    );

    fn write_to_string(extensions: &VendorExtensions) -> String {
        let mut writer = XmlWriter::new(Vec::new());
        extensions.write(&mut writer).expect("write");
        String::from_utf8(writer.into_inner().expect("finish")).expect("utf8")
    }

    #[test]
    fn classifies_known_and_opaque_extensions() {
        let container = parse_document(EXTENSIONS).expect("parse");
        let extensions = VendorExtensions::from_xml(&container);
        let kinds: Vec<&VendorExtension> = extensions.iter().collect();
        assert_eq!(kinds.len(), 5);
        assert!(matches!(kinds[0], VendorExtension::Value { value, .. } if value == "N * 2"));
        assert!(matches!(kinds[1], VendorExtension::Position { x: 10, y: -4, .. }));
        assert!(matches!(kinds[2], VendorExtension::Placeholder { .. }));
        assert!(matches!(kinds[3], VendorExtension::Generic(_)));
        // Extra attribute keeps a known tag opaque.
        assert!(matches!(kinds[4], VendorExtension::Generic(_)));
    }

    #[test]
    fn writes_back_verbatim() {
        let container = parse_document(EXTENSIONS).expect("parse");
        let extensions = VendorExtensions::from_xml(&container);
        assert_eq!(write_to_string(&extensions), EXTENSIONS);
    }

    #[test]
    fn opaque_text_keeps_its_whitespace() {
        let xml = concat!(
            "<spirit:vendorExtensions>",
            "<acme:script>  x = 1;\n  y = 2;\n</acme:script>",
            "<kactus2:isPresent> 1 </kactus2:isPresent>",
            "</spirit:vendorExtensions>"
        );
        let extensions = VendorExtensions::from_xml(&parse_document(xml).expect("parse"));
        assert!(extensions
            .iter()
            .all(|ext| matches!(ext, VendorExtension::Generic(_))));
        assert_eq!(write_to_string(&extensions), xml);
    }

    #[test]
    fn value_lookup_first_match_wins() {
        let mut extensions = VendorExtensions::new();
        extensions.set_value("kactus2:isPresent", "0");
        extensions.push(VendorExtension::Value {
            name: "kactus2:isPresent".into(),
            value: "1".into(),
        });
        assert_eq!(extensions.value("kactus2:isPresent"), Some("0"));
        extensions.set_value("kactus2:isPresent", "EN");
        assert_eq!(extensions.value("kactus2:isPresent"), Some("EN"));
        assert_eq!(extensions.len(), 2);
        assert_eq!(extensions.remove("kactus2:isPresent"), 2);
        assert!(extensions.is_empty());
        assert_eq!(write_to_string(&extensions), "");
    }
}
