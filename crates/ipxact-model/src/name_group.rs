use ipxact_xml::{XmlElement, XmlError, XmlSink};

/// `spirit:name`, `spirit:displayName` and `spirit:description` of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameGroup {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

impl NameGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Read the three sibling elements from the children of `element`.
    pub fn from_xml(element: &XmlElement) -> Self {
        let mut group = NameGroup::default();
        for child in element.child_elements() {
            match child.name.as_str() {
                "spirit:name" => group.name = child.text().trim().to_string(),
                "spirit:displayName" => group.display_name = child.text(),
                "spirit:description" => group.description = child.text(),
                _ => {}
            }
        }
        group
    }

    /// Whether `element` is one of the name group elements.
    pub fn is_name_element(name: &str) -> bool {
        matches!(
            name,
            "spirit:name" | "spirit:displayName" | "spirit:description"
        )
    }

    /// Write the name and any non-empty display name and description.
    pub fn write(&self, sink: &mut dyn XmlSink) -> Result<(), XmlError> {
        sink.write_text_element("spirit:name", &self.name)?;
        if !self.display_name.is_empty() {
            sink.write_text_element("spirit:displayName", &self.display_name)?;
        }
        if !self.description.is_empty() {
            sink.write_text_element("spirit:description", &self.description)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.display_name.is_empty() && self.description.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_xml::{parse_document, XmlWriter};

    #[test]
    fn reads_and_writes_sibling_elements() {
        let element = parse_document(
            "<spirit:register><spirit:name> ctrl </spirit:name>\
             <spirit:description>Control register</spirit:description></spirit:register>",
        )
        .expect("parse");
        let group = NameGroup::from_xml(&element);
        assert_eq!(group.name, "ctrl");
        assert!(group.display_name.is_empty());
        assert_eq!(group.description, "Control register");

        let mut writer = XmlWriter::new(Vec::new());
        group.write(&mut writer).expect("write");
        let out = String::from_utf8(writer.into_inner().expect("finish")).expect("utf8");
        assert_eq!(
            out,
            "<spirit:name>ctrl</spirit:name><spirit:description>Control register</spirit:description>"
        );
    }
}
