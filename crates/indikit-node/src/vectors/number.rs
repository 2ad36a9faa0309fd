//! Number vectors. Every leaf carries a printf-style or sexagesimal
//! `@format` that governs how values are rendered to and parsed from
//! the wire.

use indikit_object::{Dict, List};

use crate::format::{format_f64, format_i64, parse_f64, parse_i64};
use crate::vectors::common::{def_to_set, install_unregistered_hook, set_opts, VectorOptions};
use crate::vocabulary::{Perm, State};

/// A number leaf value, kept integral when the caller provided an
/// integer so `%d`-family formats render exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Integer(i64),
    Float(f64),
}

impl NumberValue {
    pub fn as_f64(self) -> f64 {
        match self {
            NumberValue::Integer(value) => value as f64,
            NumberValue::Float(value) => value,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            NumberValue::Integer(value) => value,
            NumberValue::Float(value) => value as i64,
        }
    }

    fn to_wire(self, format: &str) -> String {
        match self {
            NumberValue::Integer(value) => format_i64(format, value),
            NumberValue::Float(value) => format_f64(format, value),
        }
    }

    fn from_wire(format: &str, text: &str) -> NumberValue {
        if !format.contains(['f', 'e', 'g']) && format.contains(['d', 'u', 'x', 'X']) {
            NumberValue::Integer(parse_i64(format, text))
        } else {
            NumberValue::Float(parse_f64(format, text))
        }
    }
}

impl From<i64> for NumberValue {
    fn from(value: i64) -> NumberValue {
        NumberValue::Integer(value)
    }
}

impl From<f64> for NumberValue {
    fn from(value: f64) -> NumberValue {
        NumberValue::Float(value)
    }
}

/// Builds one `defNumber` leaf; min, max, step, and the value are all
/// rendered through `format`.
pub fn number_def<V: Into<NumberValue>>(
    name: &str,
    label: Option<&str>,
    format: &str,
    min: V,
    max: V,
    step: V,
    value: V,
) -> Dict {
    let label = match label {
        Some(label) if !label.is_empty() => label,
        _ => name,
    };

    let result = Dict::new();
    result.set_quiet("<>", "defNumber");
    result.set_quiet("@name", name);
    result.set_quiet("@label", label);
    result.set_quiet("@format", format);
    result.set_quiet("@min", min.into().to_wire(format).as_str());
    result.set_quiet("@max", max.into().to_wire(format).as_str());
    result.set_quiet("@step", step.into().to_wire(format).as_str());
    result.set_quiet("$", value.into().to_wire(format).as_str());
    result
}

/// Builds a `defNumberVector` holding the provided defs.
pub fn number_def_vector(
    device: &str,
    name: &str,
    state: State,
    perm: Perm,
    defs: &[Dict],
    opts: Option<&VectorOptions>,
) -> Dict {
    let result = Dict::new();
    let children = List::new();

    result.set_quiet("<>", "defNumberVector");
    result.set_quiet("children", children.as_object().clone());

    result.set_quiet("@device", device);
    result.set_quiet("@name", name);
    result.set_quiet("@state", state.as_str());
    result.set_quiet("@perm", perm.as_str());

    set_opts(&result, opts);

    for def in defs {
        children.push_quiet(def.as_object().clone());
    }

    install_unregistered_hook(&result, "setNumberVector", "oneNumber");
    result
}

/// Projects a number def vector onto its `setNumberVector` form.
pub fn number_set_vector(vector: &Dict) -> Dict {
    def_to_set(vector, "setNumberVector", "oneNumber")
}

/// Writes a number leaf through its `@format`, notifying the tree.
/// Returns whether the rendered value changed.
pub fn number_def_set(def: &Dict, value: impl Into<NumberValue>) -> bool {
    let Some(format) = def.get_str("@format") else {
        log::error!("number def without a `@format`");
        return false;
    };
    def.set("$", value.into().to_wire(&format).as_str())
}

/// Reads a number leaf back through its `@format`.
pub fn number_def_get(def: &Dict) -> Option<NumberValue> {
    let format = def.get_str("@format")?;
    let text = def.get_str("$")?;
    Some(NumberValue::from_wire(&format, &text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defs_render_their_bounds_through_the_format() {
        let def = number_def("exposure", None, "%.2f", 0.0, 3600.0, 0.5, 1.0);
        assert_eq!(def.get_str("@min").as_deref(), Some("0.00"));
        assert_eq!(def.get_str("@max").as_deref(), Some("3600.00"));
        assert_eq!(def.get_str("@step").as_deref(), Some("0.50"));
        assert_eq!(def.get_str("$").as_deref(), Some("1.00"));
    }

    #[test]
    fn integer_defs_keep_integral_rendering() {
        let def = number_def("gain", None, "%d", 0i64, 500, 1, 100);
        assert_eq!(def.get_str("$").as_deref(), Some("100"));
        assert_eq!(number_def_get(&def), Some(NumberValue::Integer(100)));
    }

    #[test]
    fn setters_round_trip_through_the_format() {
        let def = number_def("ra", None, "%10.6m", 0.0, 24.0, 0.0, 0.0);
        assert!(number_def_set(&def, 12.5));
        assert_eq!(def.get_str("$").as_deref(), Some("  12:30:00"));
        assert_eq!(number_def_get(&def).map(NumberValue::as_f64), Some(12.5));
    }

    #[test]
    fn setting_the_same_value_reports_no_change() {
        let def = number_def("gain", None, "%d", 0i64, 500, 1, 100);
        assert!(!number_def_set(&def, 100i64));
        assert!(number_def_set(&def, 101i64));
    }
}
