//! Strict JSON decoder for the object model.
//!
//! - the whole input must be one value, trailing bytes are an error,
//! - object keys must be strings, dangling commas are errors,
//! - `\uXXXX` escapes take exactly four hex digits and each escape is
//!   encoded independently, surrogate pairs are never combined,
//! - unknown escapes drop the backslash and keep the escaped character.
//!
//! The matching encoder lives on [`crate::Object`].

mod decoder;
mod error;

pub use decoder::{parse_json, parse_json_bytes};
pub use error::JsonError;
