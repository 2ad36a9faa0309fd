//! Parse failures, each carrying the byte offset where it was detected.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// A byte that cannot start or continue a token at this position.
    #[error("unexpected character at byte {0}")]
    UnexpectedCharacter(usize),

    /// A well-formed token in a position the grammar does not allow.
    #[error("unexpected token at byte {0}")]
    UnexpectedToken(usize),

    /// A quoted attribute value with no closing quote.
    #[error("unterminated string at byte {0}")]
    UnterminatedString(usize),

    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),

    #[error("unterminated CDATA section at byte {0}")]
    UnterminatedCdata(usize),

    /// An `&` that does not start one of the five named entities.
    #[error("unknown entity at byte {0}")]
    UnknownEntity(usize),

    /// A closing tag whose name differs from its opener.
    #[error("mismatched closing tag at byte {0}")]
    MismatchedClosingTag(usize),

    #[error("invalid UTF-8 at byte {0}")]
    InvalidUtf8(usize),

    /// Extra content after the root element.
    #[error("trailing data at byte {0}")]
    TrailingData(usize),
}
