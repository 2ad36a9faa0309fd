use crate::dict::Dict;
use crate::list::List;
use crate::object::Object;
use crate::utf8::encode_code_point;

use super::error::JsonError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Eof,
    Null,
    True,
    False,
    Number(f64),
    Str(String),
    CurlyOpen,
    CurlyClose,
    SquareOpen,
    SquareClose,
    Colon,
    Comma,
}

struct Tokenizer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn next(&mut self) -> Result<(Token, usize), JsonError> {
        while self.pos < self.data.len() && is_space(self.data[self.pos]) {
            self.pos += 1;
        }
        let at = self.pos;
        if self.pos >= self.data.len() {
            return Ok((Token::Eof, at));
        }
        match self.data[self.pos] {
            // An embedded NUL ends the input, like a C string would.
            0 => Ok((Token::Eof, at)),
            b'{' => {
                self.pos += 1;
                Ok((Token::CurlyOpen, at))
            }
            b'}' => {
                self.pos += 1;
                Ok((Token::CurlyClose, at))
            }
            b'[' => {
                self.pos += 1;
                Ok((Token::SquareOpen, at))
            }
            b']' => {
                self.pos += 1;
                Ok((Token::SquareClose, at))
            }
            b':' => {
                self.pos += 1;
                Ok((Token::Colon, at))
            }
            b',' => {
                self.pos += 1;
                Ok((Token::Comma, at))
            }
            b'"' => self.scan_string(at),
            b'-' | b'0'..=b'9' => self.scan_number(at),
            _ => self.scan_keyword(at),
        }
    }

    fn scan_string(&mut self, at: usize) -> Result<(Token, usize), JsonError> {
        self.pos += 1;
        let start = self.pos;
        loop {
            if self.pos >= self.data.len() {
                return Err(JsonError::UnterminatedString(at));
            }
            match self.data[self.pos] {
                b'"' => break,
                0 => return Err(JsonError::UnterminatedString(at)),
                b'\\' => {
                    // The escaped byte is never a terminator.
                    self.pos += if self.pos + 1 < self.data.len() { 2 } else { 1 };
                }
                _ => self.pos += 1,
            }
        }
        let raw = &self.data[start..self.pos];
        self.pos += 1;
        Ok((Token::Str(decode_string(raw, at)?), at))
    }

    fn scan_number(&mut self, at: usize) -> Result<(Token, usize), JsonError> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.data.len() && is_number_byte(self.data[self.pos]) {
            self.pos += 1;
        }
        let raw = std::str::from_utf8(&self.data[start..self.pos])
            .map_err(|_| JsonError::InvalidNumber(at))?;
        let value: f64 = raw.parse().map_err(|_| JsonError::InvalidNumber(at))?;
        Ok((Token::Number(value), at))
    }

    fn scan_keyword(&mut self, at: usize) -> Result<(Token, usize), JsonError> {
        let rest = &self.data[self.pos..];
        for (text, token) in [
            (&b"null"[..], Token::Null),
            (&b"true"[..], Token::True),
            (&b"false"[..], Token::False),
        ] {
            if rest.starts_with(text) {
                self.pos += text.len();
                return Ok((token, at));
            }
        }
        Err(JsonError::UnexpectedCharacter(at))
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn is_number_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
}

/// Decodes the bytes between a string token's quotes. Escapes are
/// resolved into a byte buffer first, each `\uXXXX` independently, then
/// the buffer is validated as UTF-8 in one step. A lone surrogate half is
/// therefore a decode error, not a replacement character.
fn decode_string(raw: &[u8], at: usize) -> Result<String, JsonError> {
    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        i += 1;
        if i >= raw.len() {
            return Err(JsonError::TruncatedEscape(at));
        }
        match raw[i] {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                if raw.len() - i < 5 {
                    return Err(JsonError::TruncatedEscape(at));
                }
                let hex = std::str::from_utf8(&raw[i + 1..i + 5])
                    .map_err(|_| JsonError::InvalidEscape(at))?;
                let cp = u32::from_str_radix(hex, 16)
                    .map_err(|_| JsonError::InvalidEscape(at))?;
                encode_code_point(cp, &mut out);
                i += 4;
            }
            // Unknown escapes drop the backslash and keep the byte.
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8(out).map_err(|_| JsonError::InvalidUtf8(at))
}

struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    token: Token,
    at: usize,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Result<Parser<'a>, JsonError> {
        let mut tokenizer = Tokenizer { data, pos: 0 };
        let (token, at) = tokenizer.next()?;
        Ok(Parser { tokenizer, token, at })
    }

    fn advance(&mut self) -> Result<(), JsonError> {
        let (token, at) = self.tokenizer.next()?;
        self.token = token;
        self.at = at;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Object, JsonError> {
        match self.token.clone() {
            Token::Null => {
                self.advance()?;
                Ok(Object::null())
            }
            Token::True => {
                self.advance()?;
                Ok(Object::boolean(true))
            }
            Token::False => {
                self.advance()?;
                Ok(Object::boolean(false))
            }
            Token::Number(value) => {
                self.advance()?;
                Ok(Object::number(value))
            }
            Token::Str(text) => {
                self.advance()?;
                Ok(Object::string(text))
            }
            Token::CurlyOpen => self.parse_dict(),
            Token::SquareOpen => self.parse_list(),
            _ => Err(JsonError::UnexpectedToken(self.at)),
        }
    }

    fn parse_dict(&mut self) -> Result<Object, JsonError> {
        self.advance()?;
        let dict = Dict::new();
        if self.token == Token::CurlyClose {
            self.advance()?;
            return Ok(dict.into_object());
        }
        loop {
            let key = match &self.token {
                Token::Str(text) => text.clone(),
                _ => return Err(JsonError::NonStringKey(self.at)),
            };
            self.advance()?;
            if self.token != Token::Colon {
                return Err(JsonError::UnexpectedToken(self.at));
            }
            self.advance()?;
            let value = self.parse_value()?;
            dict.set_quiet(&key, value);
            match self.token {
                Token::Comma => {
                    self.advance()?;
                    if self.token == Token::CurlyClose {
                        return Err(JsonError::DanglingComma(self.at));
                    }
                }
                Token::CurlyClose => {
                    self.advance()?;
                    return Ok(dict.into_object());
                }
                _ => return Err(JsonError::UnexpectedToken(self.at)),
            }
        }
    }

    fn parse_list(&mut self) -> Result<Object, JsonError> {
        self.advance()?;
        let list = List::new();
        if self.token == Token::SquareClose {
            self.advance()?;
            return Ok(list.into_object());
        }
        loop {
            let value = self.parse_value()?;
            list.push_quiet(value);
            match self.token {
                Token::Comma => {
                    self.advance()?;
                    if self.token == Token::SquareClose {
                        return Err(JsonError::DanglingComma(self.at));
                    }
                }
                Token::SquareClose => {
                    self.advance()?;
                    return Ok(list.into_object());
                }
                _ => return Err(JsonError::UnexpectedToken(self.at)),
            }
        }
    }
}

/// Parses one JSON value from `input`. The whole input must be consumed.
pub fn parse_json(input: &str) -> Result<Object, JsonError> {
    parse_json_bytes(input.as_bytes())
}

/// Parses one JSON value from raw bytes. The whole input must be
/// consumed, except that a NUL byte terminates it early.
pub fn parse_json_bytes(data: &[u8]) -> Result<Object, JsonError> {
    let mut parser = Parser::new(data)?;
    let value = parser.parse_value()?;
    if parser.token != Token::Eof {
        return Err(JsonError::TrailingData(parser.at));
    }
    Ok(value)
}
