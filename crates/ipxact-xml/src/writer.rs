use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{XmlElement, XmlError, XmlNode};

/// Streaming XML output in strict nesting order.
///
/// Attributes apply to the most recently started element and must be written
/// before any text or child element of that element.
pub trait XmlSink {
    fn start_element(&mut self, name: &str) -> Result<(), XmlError>;
    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), XmlError>;
    fn write_text(&mut self, text: &str) -> Result<(), XmlError>;
    fn end_element(&mut self) -> Result<(), XmlError>;

    /// Write `<name>text</name>`.
    fn write_text_element(&mut self, name: &str, text: &str) -> Result<(), XmlError> {
        self.start_element(name)?;
        self.write_text(text)?;
        self.end_element()
    }
}

/// [`XmlSink`] backed by a quick-xml writer.
pub struct XmlWriter<W: Write> {
    writer: Writer<W>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
            pending: None,
            open: Vec::new(),
        }
    }

    /// Writer that indents nested elements with `indent` spaces per level.
    pub fn with_indent(inner: W, indent: usize) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', indent),
            pending: None,
            open: Vec::new(),
        }
    }

    /// Emit `<?xml version="1.0" encoding="UTF-8"?>`.
    pub fn write_declaration(&mut self) -> Result<(), XmlError> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    /// Finish writing and return the underlying sink.
    pub fn into_inner(mut self) -> Result<W, XmlError> {
        if let Some(name) = self.open.last() {
            return Err(XmlError::Writer(format!("element <{name}> was never closed")));
        }
        self.flush_pending()?;
        Ok(self.writer.into_inner())
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.writer
            .write_event(event)
            .map_err(|err| XmlError::Writer(err.to_string()))
    }

    fn flush_pending(&mut self) -> Result<(), XmlError> {
        if let Some(start) = self.pending.take() {
            self.emit(Event::Start(start))?;
        }
        Ok(())
    }
}

impl<W: Write> XmlSink for XmlWriter<W> {
    fn start_element(&mut self, name: &str) -> Result<(), XmlError> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), XmlError> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(XmlError::Writer(format!(
                "attribute {name} written outside of a start tag"
            ))),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), XmlError> {
        self.flush_pending()?;
        self.emit(Event::Text(BytesText::new(text)))
    }

    fn end_element(&mut self) -> Result<(), XmlError> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| XmlError::Writer("no open element to close".into()))?;
        match self.pending.take() {
            Some(start) => self.emit(Event::Empty(start)),
            None => self.emit(Event::End(BytesEnd::new(name))),
        }
    }
}

/// Replay a captured element verbatim: start tag, attributes, then each child
/// either as text or as a nested replay.
pub fn write_tree(sink: &mut dyn XmlSink, element: &XmlElement) -> Result<(), XmlError> {
    sink.start_element(&element.name)?;
    for (name, value) in &element.attributes {
        sink.write_attribute(name, value)?;
    }
    for child in &element.children {
        match child {
            XmlNode::Text(text) => sink.write_text(text)?,
            XmlNode::Element(nested) => write_tree(sink, nested)?,
        }
    }
    sink.end_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    fn render(build: impl FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<(), XmlError>) -> String {
        let mut writer = XmlWriter::new(Vec::new());
        build(&mut writer).expect("write");
        String::from_utf8(writer.into_inner().expect("finish")).expect("utf8")
    }

    #[test]
    fn writes_attributes_on_open_element() {
        let out = render(|w| {
            w.start_element("spirit:bank")?;
            w.write_attribute("spirit:bankAlignment", "serial")?;
            w.write_text_element("spirit:name", "b0")?;
            w.start_element("spirit:width")?;
            w.end_element()?;
            w.end_element()
        });
        assert_eq!(
            out,
            r#"<spirit:bank spirit:bankAlignment="serial"><spirit:name>b0</spirit:name><spirit:width/></spirit:bank>"#
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let out = render(|w| {
            w.start_element("a")?;
            w.write_attribute("x", "1 < 2")?;
            w.write_text("a & b")?;
            w.end_element()
        });
        assert_eq!(out, r#"<a x="1 &lt; 2">a &amp; b</a>"#);
    }

    #[test]
    fn attribute_after_content_is_rejected() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.start_element("a").expect("start");
        writer.write_text("x").expect("text");
        let err = writer.write_attribute("late", "1").unwrap_err();
        assert!(matches!(err, XmlError::Writer(_)));
        assert!(writer.end_element().is_ok());
        assert!(writer.end_element().is_err());
    }

    #[test]
    fn unclosed_element_is_reported_on_finish() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.start_element("a").expect("start");
        assert!(writer.into_inner().is_err());
    }

    #[test]
    fn tree_replay_roundtrip() {
        let xml = r#"<kactus2:extension kactus2:kind="custom"><kactus2:item x="1">text</kactus2:item><kactus2:flag/></kactus2:extension>"#;
        let tree = parse_document(xml).expect("parse");
        let out = render(|w| write_tree(w, &tree));
        assert_eq!(out, xml);
        assert_eq!(parse_document(&out).expect("reparse"), tree);
    }
}
