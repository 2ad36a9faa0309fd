//! Dynamic object model for INDI-style telemetry nodes.
//!
//! The model is a mutable tagged tree with six kinds (`Null`, `Boolean`,
//! `Number`, `String`, `List`, `Dict`) and three properties the usual
//! JSON value types do not have:
//!
//! - containers preserve insertion order,
//! - every node keeps a non-owning link to its parent, so a mutation
//!   anywhere in a tree can notify the handlers registered above it,
//! - string nodes remember the byte length of the payload they were
//!   built from, which may differ from the length of the stored text.
//!
//! The JSON codec is hand-written: a strict recursive-descent decoder in
//! [`json`] and a compact (no whitespace) encoder on [`Object`] itself.

mod convert;
mod dict;
mod list;
mod object;
mod text_builder;
mod utf8;

pub mod json;

pub use dict::Dict;
pub use json::{parse_json, parse_json_bytes, JsonError};
pub use list::List;
pub use object::{format_number, Kind, LeafHook, Object, OutputHook, VectorHook};
pub use text_builder::TextBuilder;
