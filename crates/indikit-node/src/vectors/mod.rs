//! Property-vector constructors, setters, getters, and set-vector
//! projections for the five INDI property families plus streams.
//!
//! Defs and vectors are plain [`Dict`](indikit_object::Dict)s following
//! the reserved-key convention, so everything here builds trees rather
//! than bespoke structs. Registering a vector with a node installs the
//! publishing out hook; before that, changes at most hit a fallback
//! hook that logs the announcement they would have produced.

mod common;

mod blob;
mod light;
mod number;
mod stream;
mod switch;
mod text;

pub use blob::{
    blob_def, blob_def_get, blob_def_set, blob_def_vector, blob_is_compressed, blob_set_vector,
};
pub use common::VectorOptions;
pub use light::{light_def, light_def_get, light_def_set, light_def_vector, light_set_vector};
pub use number::{
    number_def, number_def_get, number_def_set, number_def_vector, number_set_vector, NumberValue,
};
pub use stream::{stream_def, stream_def_vector, stream_set_vector};
pub use switch::{
    switch_def, switch_def_get, switch_def_set, switch_def_vector, switch_set_vector,
};
pub use text::{text_def, text_def_get, text_def_set, text_def_vector, text_set_vector};

pub(crate) use common::copy_entry;
