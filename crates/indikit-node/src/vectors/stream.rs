//! Stream vectors: declarations for the streaming-telemetry publish
//! path. A stream def names one field of each published frame; a name
//! ending in `.b` marks the field for base64 encoding, `.z` for
//! zlib plus base64.

use indikit_object::{Dict, List};

use crate::vectors::common::{def_to_set, set_opts, VectorOptions};
use crate::vocabulary::State;

/// Builds one `defStream` field declaration.
pub fn stream_def(name: &str, label: Option<&str>) -> Dict {
    let label = match label {
        Some(label) if !label.is_empty() => label,
        _ => name,
    };

    let result = Dict::new();
    result.set_quiet("<>", "defStream");
    result.set_quiet("@name", name);
    result.set_quiet("@label", label);
    result
}

/// Builds a `defStreamVector` declaring the fields of one stream.
pub fn stream_def_vector(
    device: &str,
    name: &str,
    state: State,
    defs: &[Dict],
    opts: Option<&VectorOptions>,
) -> Dict {
    let result = Dict::new();
    let children = List::new();

    result.set_quiet("<>", "defStreamVector");
    result.set_quiet("children", children.as_object().clone());

    result.set_quiet("@device", device);
    result.set_quiet("@name", name);
    result.set_quiet("@state", state.as_str());

    set_opts(&result, opts);

    for def in defs {
        children.push_quiet(def.as_object().clone());
    }

    result
}

/// Projects a stream def vector onto its `setStreamVector` form.
pub fn stream_set_vector(vector: &Dict) -> Dict {
    def_to_set(vector, "setStreamVector", "oneStream")
}
