//! Document model and serializer.

use std::fmt;

use indikit_object::TextBuilder;

/// One node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Cdata(String),
    Comment(String),
}

/// An element: name, attributes in document order, children in document
/// order. Attribute names may repeat; lookups return the first match.
///
/// A self-closing element serializes as `<name />` and its children, if
/// any were forced in, are not serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub self_closing: bool,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> XmlElement {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Value of the first attribute with this name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Text of the first text or CDATA child.
    pub fn content(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            XmlNode::Text(text) | XmlNode::Cdata(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Replaces all children with a single text node.
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Serializes the element with attribute values and text escaped,
    /// comments and CDATA sections wrapped raw. A non-self-closing
    /// element always gets a closing tag, even when it has no content.
    pub fn to_xml_string(&self) -> String {
        let mut out = TextBuilder::new();
        self.write_xml(&mut out);
        out.build()
    }

    fn write_xml(&self, out: &mut TextBuilder) {
        out.push("<");
        out.push(&self.name);
        for (name, value) in &self.attributes {
            out.push(" ");
            out.push(name);
            out.push("=\"");
            out.push_xml(value);
            out.push("\"");
        }
        if self.self_closing {
            out.push(" />");
            return;
        }
        out.push(">");
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_xml(out),
                XmlNode::Text(text) => out.push_xml(text),
                XmlNode::Cdata(text) => {
                    out.push("<![CDATA[");
                    out.push(text);
                    out.push("]]>");
                }
                XmlNode::Comment(text) => {
                    out.push("<!--");
                    out.push(text);
                    out.push("-->");
                }
            }
        }
        out.push("</");
        out.push(&self.name);
        out.push(">");
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}
