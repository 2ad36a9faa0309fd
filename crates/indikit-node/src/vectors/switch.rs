//! Switch vectors: named groups of `On`/`Off` toggles governed by a
//! selection rule.

use indikit_object::{Dict, List};

use crate::vectors::common::{def_to_set, install_unregistered_hook, set_opts, VectorOptions};
use crate::vocabulary::{OnOff, Perm, Rule, State};

/// Builds one `defSwitch` leaf. An absent or empty label falls back to
/// the name.
pub fn switch_def(name: &str, label: Option<&str>, value: OnOff) -> Dict {
    let label = match label {
        Some(label) if !label.is_empty() => label,
        _ => name,
    };

    let result = Dict::new();
    result.set_quiet("<>", "defSwitch");
    result.set_quiet("@name", name);
    result.set_quiet("@label", label);
    result.set_quiet("$", value.as_str());
    result
}

/// Builds a `defSwitchVector` holding the provided defs. The defs stay
/// shared with the caller so later [`switch_def_set`] calls reach the
/// vector through the tree.
pub fn switch_def_vector(
    device: &str,
    name: &str,
    state: State,
    perm: Perm,
    rule: Rule,
    defs: &[Dict],
    opts: Option<&VectorOptions>,
) -> Dict {
    let result = Dict::new();
    let children = List::new();

    result.set_quiet("<>", "defSwitchVector");
    result.set_quiet("children", children.as_object().clone());

    result.set_quiet("@device", device);
    result.set_quiet("@name", name);
    result.set_quiet("@state", state.as_str());
    result.set_quiet("@perm", perm.as_str());
    result.set_quiet("@rule", rule.as_str());

    set_opts(&result, opts);

    for def in defs {
        children.push_quiet(def.as_object().clone());
    }

    install_unregistered_hook(&result, "setSwitchVector", "oneSwitch");
    result
}

/// Projects a switch def vector onto its `setSwitchVector` form.
pub fn switch_set_vector(vector: &Dict) -> Dict {
    def_to_set(vector, "setSwitchVector", "oneSwitch")
}

/// Writes a switch leaf, notifying the tree. Returns whether the value
/// changed.
pub fn switch_def_set(def: &Dict, value: OnOff) -> bool {
    def.set("$", value.as_str())
}

/// Reads a switch leaf back, `None` when the value is missing or not
/// part of the vocabulary.
pub fn switch_def_get(def: &Dict) -> Option<OnOff> {
    def.get_str("$")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defs_fall_back_to_the_name_as_label() {
        let def = switch_def("turn_on", None, OnOff::Off);
        assert_eq!(def.get_str("@label").as_deref(), Some("turn_on"));
        let def = switch_def("turn_on", Some(""), OnOff::Off);
        assert_eq!(def.get_str("@label").as_deref(), Some("turn_on"));
        let def = switch_def("turn_on", Some("Turn on"), OnOff::Off);
        assert_eq!(def.get_str("@label").as_deref(), Some("Turn on"));
    }

    #[test]
    fn vectors_share_their_defs_with_the_caller() {
        let def = switch_def("turn_on", None, OnOff::Off);
        let vector = switch_def_vector(
            "cam",
            "power",
            State::Idle,
            Perm::ReadWrite,
            Rule::OneOfMany,
            &[def.clone()],
            None,
        );

        assert!(switch_def_set(&def, OnOff::On));
        let children = vector.get_list("children").unwrap();
        let stored = Dict::from_object(&children.get(0).unwrap()).unwrap();
        assert_eq!(stored.get_str("$").as_deref(), Some("On"));
        assert_eq!(switch_def_get(&def), Some(OnOff::On));
    }

    #[test]
    fn vectors_carry_the_switch_attributes() {
        let vector = switch_def_vector(
            "cam",
            "power",
            State::Ok,
            Perm::ReadWrite,
            Rule::AtMostOne,
            &[],
            None,
        );
        assert_eq!(vector.get_str("<>").as_deref(), Some("defSwitchVector"));
        assert_eq!(vector.get_str("@perm").as_deref(), Some("rw"));
        assert_eq!(vector.get_str("@rule").as_deref(), Some("AtMostOne"));
        assert_eq!(vector.get_str("@group").as_deref(), Some("Main"));
    }

    #[test]
    fn the_set_projection_keeps_values_and_names_only() {
        let defs = [
            switch_def("turn_on", None, OnOff::On),
            switch_def("turn_off", None, OnOff::Off),
        ];
        let vector = switch_def_vector(
            "cam",
            "power",
            State::Ok,
            Perm::ReadWrite,
            Rule::OneOfMany,
            &defs,
            None,
        );

        let set = switch_set_vector(&vector);
        assert_eq!(set.get_str("<>").as_deref(), Some("setSwitchVector"));
        assert_eq!(set.get_str("@device").as_deref(), Some("cam"));
        assert!(set.get("@perm").is_none());
        assert!(set.get("@rule").is_none());

        let children = set.get_list("children").unwrap();
        assert_eq!(children.len(), 2);
        let first = Dict::from_object(&children.get(0).unwrap()).unwrap();
        assert_eq!(first.get_str("<>").as_deref(), Some("oneSwitch"));
        assert_eq!(first.get_str("@name").as_deref(), Some("turn_on"));
        assert_eq!(first.get_str("$").as_deref(), Some("On"));
        assert!(first.get("@label").is_none());
    }
}
