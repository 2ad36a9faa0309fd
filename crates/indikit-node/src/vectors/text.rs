//! Text vectors: free-form string properties.

use indikit_object::{Dict, List};

use crate::vectors::common::{def_to_set, set_opts, VectorOptions};
use crate::vocabulary::{Perm, State};

/// Builds one `defText` leaf.
pub fn text_def(name: &str, label: Option<&str>, value: &str) -> Dict {
    let label = match label {
        Some(label) if !label.is_empty() => label,
        _ => name,
    };

    let result = Dict::new();
    result.set_quiet("<>", "defText");
    result.set_quiet("@name", name);
    result.set_quiet("@label", label);
    text_def_set(&result, value);
    result
}

/// Builds a `defTextVector` holding the provided defs.
pub fn text_def_vector(
    device: &str,
    name: &str,
    state: State,
    perm: Perm,
    defs: &[Dict],
    opts: Option<&VectorOptions>,
) -> Dict {
    let result = Dict::new();
    let children = List::new();

    result.set_quiet("<>", "defTextVector");
    result.set_quiet("children", children.as_object().clone());

    result.set_quiet("@device", device);
    result.set_quiet("@name", name);
    result.set_quiet("@state", state.as_str());
    result.set_quiet("@perm", perm.as_str());

    set_opts(&result, opts);

    for def in defs {
        children.push_quiet(def.as_object().clone());
    }

    result
}

/// Projects a text def vector onto its `setTextVector` form.
pub fn text_set_vector(vector: &Dict) -> Dict {
    def_to_set(vector, "setTextVector", "oneText")
}

/// Writes a text leaf, notifying the tree. Returns whether the value
/// changed.
pub fn text_def_set(def: &Dict, value: &str) -> bool {
    def.set("$", value)
}

/// Reads a text leaf back.
pub fn text_def_get(def: &Dict) -> Option<String> {
    def.get_str("$")
}
