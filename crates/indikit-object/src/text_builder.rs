//! Escape-aware text assembly.
//!
//! Serializers queue fragments together with the escaping each fragment
//! needs, then materialize the result in one pass. The same builder is
//! shared by the JSON encoder and the XML writer, so both escape tables
//! live here.

/// Escaping applied to one queued fragment when the builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Json,
    Xml,
}

#[derive(Debug, Clone)]
struct Part {
    text: String,
    escape: Escape,
}

/// An ordered list of fragments, each carrying its own escape mode.
#[derive(Debug, Clone, Default)]
pub struct TextBuilder {
    parts: Vec<Part>,
}

impl TextBuilder {
    pub fn new() -> TextBuilder {
        TextBuilder { parts: Vec::new() }
    }

    /// Queues a fragment that renders verbatim.
    pub fn push(&mut self, text: &str) {
        self.parts.push(Part {
            text: text.to_owned(),
            escape: Escape::None,
        });
    }

    /// Queues a fragment that renders with JSON string escaping.
    pub fn push_json(&mut self, text: &str) {
        self.parts.push(Part {
            text: text.to_owned(),
            escape: Escape::Json,
        });
    }

    /// Queues a fragment that renders with XML entity escaping.
    pub fn push_xml(&mut self, text: &str) {
        self.parts.push(Part {
            text: text.to_owned(),
            escape: Escape::Xml,
        });
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Renders every fragment in order, applying each fragment's escape mode.
    pub fn build(&self) -> String {
        let mut out = String::with_capacity(self.capacity_hint());
        for part in &self.parts {
            match part.escape {
                Escape::None => out.push_str(&part.text),
                Escape::Json => escape_json_into(&part.text, &mut out),
                Escape::Xml => escape_xml_into(&part.text, &mut out),
            }
        }
        out
    }

    /// Renders every fragment as one JSON string literal: the concatenation
    /// is JSON-escaped as a whole and wrapped in double quotes. Fragment
    /// escape modes are ignored here.
    pub fn build_quoted(&self) -> String {
        let mut out = String::with_capacity(self.capacity_hint() + 2);
        out.push('"');
        for part in &self.parts {
            escape_json_into(&part.text, &mut out);
        }
        out.push('"');
        out
    }

    fn capacity_hint(&self) -> usize {
        self.parts.iter().map(|p| p.text.len()).sum()
    }
}

/// Appends `text` to `out` with JSON string escaping.
///
/// The escape set is exactly `"` `\` and the five short control escapes
/// `\b` `\f` `\n` `\r` `\t`. Other control bytes pass through unchanged,
/// which keeps encoding the inverse of the decoder for every string the
/// decoder can produce.
pub fn escape_json_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
}

/// Appends `text` to `out` with the five XML entity escapes.
pub fn escape_xml_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_per_part_escaping() {
        let mut b = TextBuilder::new();
        b.push("<x>");
        b.push_json("a\"b\n");
        b.push_xml("<&>");
        assert_eq!(b.build(), "<x>a\\\"b\\n&lt;&amp;&gt;");
    }

    #[test]
    fn build_quoted_wraps_and_escapes_everything() {
        let mut b = TextBuilder::new();
        b.push("tab\t");
        b.push_xml("quote\"");
        assert_eq!(b.build_quoted(), "\"tab\\tquote\\\"\"");
    }

    #[test]
    fn empty_builder_renders_empty() {
        let b = TextBuilder::new();
        assert!(b.is_empty());
        assert_eq!(b.build(), "");
        assert_eq!(b.build_quoted(), "\"\"");
    }

    #[test]
    fn clear_discards_parts() {
        let mut b = TextBuilder::new();
        b.push("x");
        b.clear();
        assert!(b.is_empty());
    }
}
