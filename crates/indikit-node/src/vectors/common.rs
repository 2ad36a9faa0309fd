//! Shared machinery behind the per-type vector constructors: optional
//! presentation attributes, the def-to-set projection, and the scalar
//! entry copier used by both.

use indikit_object::{Dict, Kind, List};

use crate::messages::local_timestamp;

/// Optional presentation attributes accepted by every vector
/// constructor. Unset fields stay off the wire, except the group which
/// falls back to `"Main"`.
#[derive(Debug, Clone, Default)]
pub struct VectorOptions {
    pub label: Option<String>,
    pub group: Option<String>,
    pub hints: Option<String>,
    pub timeout: f64,
    pub message: Option<String>,
}

/// Stamps a fresh `@timestamp`, the optional presentation attributes,
/// and the trailing `@group` onto a vector under construction.
pub(crate) fn set_opts(dict: &Dict, opts: Option<&VectorOptions>) {
    dict.set_quiet("@timestamp", local_timestamp().as_str());

    let mut group = "Main";
    if let Some(opts) = opts {
        match opts.group.as_deref() {
            Some(value) if !value.is_empty() => group = value,
            _ => {}
        }
        if let Some(label) = opts.label.as_deref() {
            dict.set_quiet("@label", label);
        }
        if let Some(hints) = opts.hints.as_deref() {
            dict.set_quiet("@hints", hints);
        }
        if opts.timeout > 0.0 {
            dict.set_quiet("@timeout", opts.timeout);
        }
        if let Some(message) = opts.message.as_deref() {
            dict.set_quiet("@message", message);
        }
    }

    dict.set_quiet("@group", group);
}

/// Copies one scalar entry from `src` to `dst` under the same key,
/// reporting whether the destination value changed. A missing key
/// copies nothing, a null copies nothing but still counts as a change,
/// and a container logs an error.
pub(crate) fn copy_entry(dst: &Dict, src: &Dict, key: &str, notify: bool) -> bool {
    let Some(object) = src.get(key) else {
        return false;
    };
    match object.kind() {
        Kind::Null => true,
        Kind::Boolean => {
            let value = object.as_bool().unwrap_or(false);
            if notify {
                dst.set(key, value)
            } else {
                dst.set_quiet(key, value)
            }
        }
        Kind::Number => {
            let value = object.as_f64().unwrap_or(0.0);
            if notify {
                dst.set(key, value)
            } else {
                dst.set_quiet(key, value)
            }
        }
        Kind::String => {
            let value = object.string_value().unwrap_or_default();
            if notify {
                dst.set(key, value)
            } else {
                dst.set_quiet(key, value)
            }
        }
        _ => {
            log::error!("cannot copy the container entry `{key}`");
            false
        }
    }
}

/// Projects a def vector onto its announcement form: `set_tag` at the
/// top, `one_tag` per child, carrying only the value-bearing subset of
/// the definition. BLOB children additionally report their payload
/// format and decoded size.
pub(crate) fn def_to_set(def_vector: &Dict, set_tag: &str, one_tag: &str) -> Dict {
    let result = Dict::new();
    result.set_quiet("<>", set_tag);

    copy_entry(&result, def_vector, "@device", false);
    copy_entry(&result, def_vector, "@name", false);
    copy_entry(&result, def_vector, "@state", false);
    copy_entry(&result, def_vector, "@timeout", false);
    copy_entry(&result, def_vector, "@timestamp", false);
    copy_entry(&result, def_vector, "@message", false);

    let children = List::new();

    if let Some(defs) = def_vector.get_list("children") {
        for def in defs.iter() {
            let Some(def) = Dict::from_object(&def) else {
                continue;
            };
            let child = Dict::new();
            child.set_quiet("<>", one_tag);
            copy_entry(&child, &def, "$", false);
            copy_entry(&child, &def, "@name", false);
            if one_tag == "oneBLOB" {
                copy_entry(&child, &def, "@format", false);
                if let Some(raw_size) = def.get("$").and_then(|payload| payload.raw_size()) {
                    child.set_quiet("@size", raw_size as f64);
                }
            }
            children.push_quiet(child.into_object());
        }
    }

    result.set_quiet("children", children);
    result
}

/// Default out hook put on freshly built vectors. Registration with a
/// node replaces it; until then any change just logs the announcement
/// that would have been published.
pub(crate) fn install_unregistered_hook(
    vector: &Dict,
    set_tag: &'static str,
    one_tag: &'static str,
) {
    vector.as_object().set_output_hook(move |object, _modified| {
        if let Some(def_vector) = Dict::from_object(object) {
            let set_vector = def_to_set(&def_vector, set_tag, one_tag);
            log::debug!("not registered: {}", set_vector.to_json_string());
        }
    });
}
