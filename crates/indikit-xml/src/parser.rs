//! Tokenizer and recursive-descent parser.
//!
//! The tokenizer is context-sensitive: between `<` and `>` it produces
//! identifiers, `=`, `/`, and quoted strings; outside it produces raw
//! text runs ending at the next `<`. Whitespace before a token is
//! skipped, so text keeps its trailing but never its leading spaces.
//! A NUL byte at a token boundary ends the input; inside a token it is
//! an error.

use crate::dom::{XmlElement, XmlNode};
use crate::error::XmlError;

/// Parses one complete document: a single root element with nothing but
/// whitespace after it.
pub fn parse_xml(text: &str) -> Result<XmlElement, XmlError> {
    parse_xml_bytes(text.as_bytes())
}

/// Parses one complete document from raw bytes, e.g. a span cut out of
/// a receive buffer by [`crate::framing`].
pub fn parse_xml_bytes(data: &[u8]) -> Result<XmlElement, XmlError> {
    let mut parser = Parser::new(data)?;
    let root = parser.parse_element()?;
    if parser.token != Token::Eof {
        return Err(XmlError::TrailingData(parser.at));
    }
    Ok(root)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `<`
    OpenStart,
    /// `</`
    CloseStart,
    /// `>`
    TagEnd,
    Slash,
    Equals,
    Ident(String),
    Quoted(String),
    Text(String),
    Comment(String),
    Cdata(String),
    Eof,
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Bytes allowed in element and attribute names.
fn is_name_byte(b: u8) -> bool {
    matches!(b, b'-' | b'.' | b'0'..=b'9' | b':' | b'A'..=b'Z' | b'_' | b'a'..=b'z')
}

fn utf8(bytes: &[u8], at: usize) -> Result<String, XmlError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| XmlError::InvalidUtf8(at))
}

/// Decodes the five named entities. `start` is the absolute offset of
/// `bytes[0]`, used to report the position of a bad `&`.
fn decode_entities(bytes: &[u8], start: usize) -> Result<String, XmlError> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'&' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let rest = &bytes[i + 1..];
        if rest.starts_with(b"lt;") {
            out.push(b'<');
            i += 4;
        } else if rest.starts_with(b"gt;") {
            out.push(b'>');
            i += 4;
        } else if rest.starts_with(b"amp;") {
            out.push(b'&');
            i += 5;
        } else if rest.starts_with(b"quot;") {
            out.push(b'"');
            i += 6;
        } else if rest.starts_with(b"apos;") {
            out.push(b'\'');
            i += 6;
        } else {
            return Err(XmlError::UnknownEntity(start + i));
        }
    }
    String::from_utf8(out).map_err(|_| XmlError::InvalidUtf8(start))
}

struct Tokenizer<'a> {
    data: &'a [u8],
    pos: usize,
    /// True between a `<` or `</` and the matching `>`.
    tag: bool,
}

impl<'a> Tokenizer<'a> {
    fn next(&mut self) -> Result<(Token, usize), XmlError> {
        while self.pos < self.data.len() && is_space(self.data[self.pos]) {
            self.pos += 1;
        }
        let at = self.pos;
        if self.pos >= self.data.len() || self.data[self.pos] == 0 {
            return Ok((Token::Eof, at));
        }
        match self.data[self.pos] {
            b'<' => {
                let rest = &self.data[self.pos..];
                if rest.starts_with(b"<!--") {
                    self.block(at, 4, b"-->", Token::Comment, XmlError::UnterminatedComment)
                } else if rest.starts_with(b"<![CDATA[") {
                    self.block(at, 9, b"]]>", Token::Cdata, XmlError::UnterminatedCdata)
                } else {
                    self.tag = true;
                    if rest.len() >= 2 && rest[1] == b'/' {
                        self.pos += 2;
                        Ok((Token::CloseStart, at))
                    } else {
                        self.pos += 1;
                        Ok((Token::OpenStart, at))
                    }
                }
            }
            b'>' => {
                self.tag = false;
                self.pos += 1;
                Ok((Token::TagEnd, at))
            }
            b'/' if self.tag => {
                self.pos += 1;
                Ok((Token::Slash, at))
            }
            b'=' if self.tag => {
                self.pos += 1;
                Ok((Token::Equals, at))
            }
            quote @ (b'"' | b'\'') if self.tag => self.quoted(at, quote),
            _ if self.tag => self.ident(at),
            _ => self.text(at),
        }
    }

    /// Comment or CDATA body: everything between the opener of `skip`
    /// bytes and the `closer`, not entity-decoded.
    fn block(
        &mut self,
        at: usize,
        skip: usize,
        closer: &[u8],
        token: fn(String) -> Token,
        error: fn(usize) -> XmlError,
    ) -> Result<(Token, usize), XmlError> {
        let mut i = at + skip;
        loop {
            if i + closer.len() > self.data.len() {
                return Err(error(at));
            }
            if &self.data[i..i + closer.len()] == closer {
                break;
            }
            if self.data[i] == 0 {
                return Err(error(at));
            }
            i += 1;
        }
        self.pos = i + closer.len();
        let body = utf8(&self.data[at + skip..i], at + skip)?;
        Ok((token(body), at))
    }

    fn quoted(&mut self, at: usize, quote: u8) -> Result<(Token, usize), XmlError> {
        let mut i = at + 1;
        loop {
            if i >= self.data.len() {
                return Err(XmlError::UnterminatedString(at));
            }
            let b = self.data[i];
            if b == quote {
                break;
            }
            if b == 0 {
                return Err(XmlError::UnterminatedString(at));
            }
            i += 1;
        }
        self.pos = i + 1;
        let body = decode_entities(&self.data[at + 1..i], at + 1)?;
        Ok((Token::Quoted(body), at))
    }

    fn ident(&mut self, at: usize) -> Result<(Token, usize), XmlError> {
        let mut i = at;
        while i < self.data.len() && is_name_byte(self.data[i]) {
            i += 1;
        }
        if i == at {
            return Err(XmlError::UnexpectedCharacter(at));
        }
        self.pos = i;
        let name = utf8(&self.data[at..i], at)?;
        Ok((Token::Ident(name), at))
    }

    fn text(&mut self, at: usize) -> Result<(Token, usize), XmlError> {
        let mut i = at;
        while i < self.data.len() && self.data[i] != b'<' {
            if self.data[i] == 0 {
                return Err(XmlError::UnexpectedCharacter(i));
            }
            i += 1;
        }
        self.pos = i;
        let body = decode_entities(&self.data[at..i], at)?;
        Ok((Token::Text(body), at))
    }
}

struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    token: Token,
    at: usize,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Result<Parser<'a>, XmlError> {
        let mut tokenizer = Tokenizer {
            data,
            pos: 0,
            tag: false,
        };
        let (token, at) = tokenizer.next()?;
        Ok(Parser { tokenizer, token, at })
    }

    fn advance(&mut self) -> Result<(), XmlError> {
        let (token, at) = self.tokenizer.next()?;
        self.token = token;
        self.at = at;
        Ok(())
    }

    fn parse_element(&mut self) -> Result<XmlElement, XmlError> {
        if self.token != Token::OpenStart {
            return Err(XmlError::UnexpectedToken(self.at));
        }
        self.advance()?;
        let name = match self.token.clone() {
            Token::Ident(name) => name,
            _ => return Err(XmlError::UnexpectedToken(self.at)),
        };
        self.advance()?;
        let mut element = XmlElement::new(name);
        while let Token::Ident(attr) = self.token.clone() {
            self.advance()?;
            if self.token != Token::Equals {
                return Err(XmlError::UnexpectedToken(self.at));
            }
            self.advance()?;
            let value = match self.token.clone() {
                Token::Quoted(value) => value,
                _ => return Err(XmlError::UnexpectedToken(self.at)),
            };
            self.advance()?;
            element.push_attribute(attr, value);
        }
        if self.token == Token::Slash {
            element.self_closing = true;
            self.advance()?;
        }
        if self.token != Token::TagEnd {
            return Err(XmlError::UnexpectedToken(self.at));
        }
        self.advance()?;
        if element.self_closing {
            return Ok(element);
        }
        self.parse_content(&mut element)?;
        self.parse_closing_tag(&element.name)?;
        Ok(element)
    }

    fn parse_content(&mut self, element: &mut XmlElement) -> Result<(), XmlError> {
        loop {
            match self.token.clone() {
                Token::OpenStart => {
                    let child = self.parse_element()?;
                    element.children.push(XmlNode::Element(child));
                }
                Token::Comment(text) => {
                    self.advance()?;
                    element.children.push(XmlNode::Comment(text));
                }
                Token::Cdata(text) => {
                    self.advance()?;
                    element.children.push(XmlNode::Cdata(text));
                }
                Token::Text(text) => {
                    self.advance()?;
                    element.children.push(XmlNode::Text(text));
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_closing_tag(&mut self, name: &str) -> Result<(), XmlError> {
        if self.token != Token::CloseStart {
            return Err(XmlError::UnexpectedToken(self.at));
        }
        self.advance()?;
        match &self.token {
            Token::Ident(closer) if closer == name => {}
            Token::Ident(_) => return Err(XmlError::MismatchedClosingTag(self.at)),
            _ => return Err(XmlError::UnexpectedToken(self.at)),
        }
        self.advance()?;
        if self.token != Token::TagEnd {
            return Err(XmlError::UnexpectedToken(self.at));
        }
        self.advance()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(data: &[u8]) -> Vec<Token> {
        let mut tokenizer = Tokenizer {
            data,
            pos: 0,
            tag: false,
        };
        let mut out = Vec::new();
        loop {
            let (token, _) = tokenizer.next().unwrap();
            let done = token == Token::Eof;
            out.push(token);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn tag_mode_switches_the_token_set() {
        assert_eq!(
            tokens(b"<a x=\"1\"/>"),
            vec![
                Token::OpenStart,
                Token::Ident("a".to_owned()),
                Token::Ident("x".to_owned()),
                Token::Equals,
                Token::Quoted("1".to_owned()),
                Token::Slash,
                Token::TagEnd,
                Token::Eof,
            ],
        );
    }

    #[test]
    fn slash_and_equals_are_plain_text_outside_a_tag() {
        assert_eq!(
            tokens(b"<a>x=1/2</a>"),
            vec![
                Token::OpenStart,
                Token::Ident("a".to_owned()),
                Token::TagEnd,
                Token::Text("x=1/2".to_owned()),
                Token::CloseStart,
                Token::Ident("a".to_owned()),
                Token::TagEnd,
                Token::Eof,
            ],
        );
    }

    #[test]
    fn text_keeps_trailing_but_not_leading_whitespace() {
        assert_eq!(
            tokens(b"<a>  hi  </a>")[3],
            Token::Text("hi  ".to_owned()),
        );
    }

    #[test]
    fn whitespace_only_content_produces_no_text_token() {
        assert_eq!(
            tokens(b"<a>   </a>")[3],
            Token::CloseStart,
        );
    }

    #[test]
    fn entities_decode_in_text_and_strings() {
        assert_eq!(
            tokens(b"<a x=\"&lt;&apos;\">&amp;&gt;&quot;</a>")[4],
            Token::Quoted("<'".to_owned()),
        );
        assert_eq!(
            tokens(b"<a>&amp;&gt;&quot;</a>")[3],
            Token::Text("&>\"".to_owned()),
        );
    }

    #[test]
    fn unknown_entities_are_rejected_with_their_offset() {
        let mut tokenizer = Tokenizer {
            data: b"<a>x&nbsp;</a>",
            pos: 0,
            tag: false,
        };
        tokenizer.next().unwrap();
        tokenizer.next().unwrap();
        tokenizer.next().unwrap();
        assert_eq!(tokenizer.next(), Err(XmlError::UnknownEntity(4)));
    }

    #[test]
    fn nul_ends_the_input_at_a_token_boundary() {
        assert_eq!(tokens(b"<a/>\0ignored").last(), Some(&Token::Eof));
    }
}
