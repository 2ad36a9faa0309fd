//! Light vectors: read-only state indicators. Lights carry neither a
//! permission nor a rule; their leaf value is one of the four states.

use indikit_object::{Dict, List};

use crate::vectors::common::{def_to_set, install_unregistered_hook, set_opts, VectorOptions};
use crate::vocabulary::State;

/// Builds one `defLight` leaf.
pub fn light_def(name: &str, label: Option<&str>, value: State) -> Dict {
    let label = match label {
        Some(label) if !label.is_empty() => label,
        _ => name,
    };

    let result = Dict::new();
    result.set_quiet("<>", "defLight");
    result.set_quiet("@name", name);
    result.set_quiet("@label", label);
    result.set_quiet("$", value.as_str());
    result
}

/// Builds a `defLightVector` holding the provided defs.
pub fn light_def_vector(
    device: &str,
    name: &str,
    state: State,
    defs: &[Dict],
    opts: Option<&VectorOptions>,
) -> Dict {
    let result = Dict::new();
    let children = List::new();

    result.set_quiet("<>", "defLightVector");
    result.set_quiet("children", children.as_object().clone());

    result.set_quiet("@device", device);
    result.set_quiet("@name", name);
    result.set_quiet("@state", state.as_str());

    set_opts(&result, opts);

    for def in defs {
        children.push_quiet(def.as_object().clone());
    }

    install_unregistered_hook(&result, "setLightVector", "oneLight");
    result
}

/// Projects a light def vector onto its `setLightVector` form.
pub fn light_set_vector(vector: &Dict) -> Dict {
    def_to_set(vector, "setLightVector", "oneLight")
}

/// Writes a light leaf, notifying the tree. Returns whether the value
/// changed.
pub fn light_def_set(def: &Dict, value: State) -> bool {
    def.set("$", value.as_str())
}

/// Reads a light leaf back, `None` when the value is missing or not a
/// state.
pub fn light_def_get(def: &Dict) -> Option<State> {
    def.get_str("$")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_carry_a_state_as_value() {
        let def = light_def("cooling", None, State::Busy);
        assert_eq!(def.get_str("$").as_deref(), Some("Busy"));
        assert_eq!(light_def_get(&def), Some(State::Busy));

        assert!(light_def_set(&def, State::Ok));
        assert_eq!(light_def_get(&def), Some(State::Ok));
    }

    #[test]
    fn vectors_carry_neither_perm_nor_rule() {
        let vector = light_def_vector("cam", "status", State::Idle, &[], None);
        assert_eq!(vector.get_str("<>").as_deref(), Some("defLightVector"));
        assert!(vector.get("@perm").is_none());
        assert!(vector.get("@rule").is_none());
    }
}
