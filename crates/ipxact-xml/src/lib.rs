//! Read and write IP-XACT XML through a small owned parse tree using quick-xml.
//!
//! The object model never touches quick-xml directly: documents are first
//! parsed into an [`XmlElement`] tree and serialised through the [`XmlSink`]
//! trait, mirroring a DOM reader and a streaming writer.

mod tree;
mod writer;

use thiserror::Error;

pub use tree::{parse_document, XmlElement, XmlNode};
pub use writer::{write_tree, XmlSink, XmlWriter};

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("element <{parent}> has no <{child}> child")]
    MissingElement { parent: String, child: String },
    #[error("writer: {0}")]
    Writer(String),
}
