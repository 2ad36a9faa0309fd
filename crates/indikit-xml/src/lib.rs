//! Strict XML codec for the INDI wire dialect.
//!
//! This is not a general XML implementation. It covers exactly the
//! dialect exchanged between INDI peers:
//!
//! - elements, attributes, text, comments, and CDATA sections,
//! - the five named entities `&lt; &gt; &amp; &quot; &apos;`, with no
//!   numeric character references,
//! - no prologue, no DOCTYPE, no processing instructions, and exactly
//!   one root element per document.
//!
//! [`framing`] locates one complete protocol message inside a growing
//! receive buffer, so a caller can cut parser input out of a TCP
//! stream that carries no length prefix.

mod dom;
mod error;
mod parser;

pub mod framing;

pub use dom::{XmlElement, XmlNode};
pub use error::XmlError;
pub use parser::{parse_xml, parse_xml_bytes};
