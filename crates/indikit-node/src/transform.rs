//! Conversion between the dict representation of a property message
//! and its XML wire form.
//!
//! A dict maps onto an element through three reserved keys: `"<>"`
//! holds the tag name, `"$"` the text content, and `"children"` a list
//! of nested dicts. Every key starting with `@` becomes an attribute,
//! in insertion order. The mapping is lossy in one direction only:
//! comments and whitespace-only text disappear when XML is read back
//! into a dict.

use indikit_object::{Dict, List, Object};
use indikit_xml::{XmlElement, XmlNode};

/// Renders a property dict as an XML element. Anything that is not a
/// dict, or a dict without a `"<>"` tag, logs an error and yields
/// `None`.
pub fn object_to_xml(object: &Object) -> Option<XmlElement> {
    let dict = match Dict::from_object(object) {
        Some(dict) => dict,
        None => {
            log::error!("only a dict can be rendered as XML");
            return None;
        }
    };

    let name = match dict.get_str("<>") {
        Some(name) => name,
        None => {
            log::error!("cannot render a dict without a `<>` tag as XML");
            return None;
        }
    };

    let mut element = XmlElement::new(&name);
    for (key, value) in dict.iter() {
        if key == "<>" {
            continue;
        }
        if key == "$" {
            element.children.push(XmlNode::Text(value.to_raw_string()));
        } else if let Some(attribute) = key.strip_prefix('@') {
            element.push_attribute(attribute, &value.to_raw_string());
        } else if key == "children" {
            if let Some(children) = List::from_object(&value) {
                for child in children.iter() {
                    if let Some(child_element) = object_to_xml(&child) {
                        element.children.push(XmlNode::Element(child_element));
                    }
                }
            }
        }
    }
    Some(element)
}

/// Builds a property dict from a parsed XML element: the tag first,
/// then the text content, the attributes in document order, and the
/// element children last.
pub fn xml_to_object(element: &XmlElement) -> Dict {
    let mut dict = Dict::new();
    dict.set_quiet("<>", element.name.as_str());

    for node in &element.children {
        let text = match node {
            XmlNode::Text(text) | XmlNode::Cdata(text) => text,
            _ => continue,
        };
        if text.is_empty() {
            continue;
        }
        let trimmed = trim_content(text);
        if !trimmed.is_empty() {
            dict.set_quiet("$", trimmed);
        }
        break;
    }

    for (name, value) in &element.attributes {
        dict.set_quiet(&format!("@{name}"), value.as_str());
    }

    let children = List::new();
    for node in &element.children {
        if let XmlNode::Element(child) = node {
            children.push_quiet(xml_to_object(child).into_object());
        }
    }
    if !children.is_empty() {
        dict.set_quiet("children", children);
    }

    dict
}

/// Strips whitespace and literal quote characters from both ends of
/// element text.
fn trim_content(text: &str) -> &str {
    text.trim_matches([' ', '\t', '\n', '\x0B', '\x0C', '\r', '"'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use indikit_xml::parse_xml;

    #[test]
    fn dicts_render_with_attributes_and_children() {
        let mut vector = Dict::new();
        vector.set_quiet("<>", "defSwitchVector");
        vector.set_quiet("@device", "cam");
        vector.set_quiet("@name", "power");

        let mut leaf = Dict::new();
        leaf.set_quiet("<>", "defSwitch");
        leaf.set_quiet("@name", "on");
        leaf.set_quiet("$", "On");

        let children = List::new();
        children.push_quiet(leaf.into_object());
        vector.set_quiet("children", children);

        let element = object_to_xml(vector.as_object()).unwrap();
        assert_eq!(
            element.to_xml_string(),
            "<defSwitchVector device=\"cam\" name=\"power\">\
             <defSwitch name=\"on\">On</defSwitch>\
             </defSwitchVector>"
        );
    }

    #[test]
    fn dicts_without_a_tag_are_rejected() {
        let mut dict = Dict::new();
        dict.set_quiet("@device", "cam");
        assert!(object_to_xml(dict.as_object()).is_none());
        assert!(object_to_xml(&Object::number(1.0)).is_none());
    }

    #[test]
    fn elements_read_back_into_dicts() {
        let element = parse_xml(
            "<newSwitchVector device=\"cam\" name=\"power\">\
             <oneSwitch name=\"on\">\n  \"On\"  \n</oneSwitch>\
             </newSwitchVector>",
        )
        .unwrap();
        let dict = xml_to_object(&element);

        assert_eq!(dict.get_str("<>").as_deref(), Some("newSwitchVector"));
        assert_eq!(dict.get_str("@device").as_deref(), Some("cam"));
        let children = dict.get_list("children").unwrap();
        let leaf = Dict::from_object(&children.get(0).unwrap()).unwrap();
        assert_eq!(leaf.get_str("<>").as_deref(), Some("oneSwitch"));
        assert_eq!(leaf.get_str("$").as_deref(), Some("On"));
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let element = parse_xml("<message>   </message>").unwrap();
        let dict = xml_to_object(&element);
        assert!(dict.get("$").is_none());
        assert!(dict.get("children").is_none());
    }

    #[test]
    fn numbers_render_bare() {
        let mut dict = Dict::new();
        dict.set_quiet("<>", "oneNumber");
        dict.set_quiet("@size", 512.0);
        let element = object_to_xml(dict.as_object()).unwrap();
        assert_eq!(element.to_xml_string(), "<oneNumber size=\"512\"></oneNumber>");
    }
}
