use thiserror::Error;

/// Decode failure, with the byte offset where the offending token starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("unexpected character at byte {0}")]
    UnexpectedCharacter(usize),
    #[error("unexpected token at byte {0}")]
    UnexpectedToken(usize),
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("truncated escape sequence in string starting at byte {0}")]
    TruncatedEscape(usize),
    #[error("invalid unicode escape in string starting at byte {0}")]
    InvalidEscape(usize),
    #[error("decoded string starting at byte {0} is not valid UTF-8")]
    InvalidUtf8(usize),
    #[error("invalid number literal at byte {0}")]
    InvalidNumber(usize),
    #[error("dangling comma before byte {0}")]
    DanglingComma(usize),
    #[error("object key at byte {0} is not a string")]
    NonStringKey(usize),
    #[error("trailing data after the top-level value at byte {0}")]
    TrailingData(usize),
}
