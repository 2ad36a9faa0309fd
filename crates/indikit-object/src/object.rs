//! The core object handle, scalar operations, and the JSON encoder.
//!
//! An [`Object`] is a cheap cloneable handle to one shared tree node.
//! Cloning a handle never copies the node, so two handles can address
//! the same mutable value, and containers compare by identity while
//! scalars compare by value.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::text_builder::TextBuilder;

/// The six value kinds an [`Object`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    List,
    Dict,
}

/// Change handler fired on a node and each of its ancestors after a
/// mutation. The flag tells whether the mutation changed a value.
pub type OutputHook = Rc<dyn Fn(&Object, bool)>;

/// Input handler fired on a leaf when a client writes it. Arguments are
/// the proposed value and the previous value.
pub type LeafHook = Rc<dyn Fn(&Object, &Object)>;

/// Input handler fired once on a vector after all of its leaves were
/// written. The flag tells whether any leaf changed.
pub type VectorHook = Rc<dyn Fn(&Object, bool)>;

/// Text payload of a string node. `raw_size` remembers the byte length
/// of the payload the text was built from, which differs from
/// `value.len()` when the text is an encoding of binary data.
#[derive(Debug, Clone)]
pub(crate) struct Text {
    pub value: String,
    pub raw_size: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub key: String,
    pub value: Object,
}

pub(crate) enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    Str(Text),
    List(Vec<Object>),
    Dict(Vec<Entry>),
}

pub(crate) struct Inner {
    pub value: Value,
    pub parent: Weak<RefCell<Inner>>,
    pub output_hook: Option<OutputHook>,
    pub leaf_hook: Option<LeafHook>,
    pub vector_hook: Option<VectorHook>,
    pub disabled: bool,
    pub blob_disabled: bool,
}

/// Handle to one node of a shared mutable tree.
#[derive(Clone)]
pub struct Object {
    pub(crate) inner: Rc<RefCell<Inner>>,
}

impl Object {
    pub(crate) fn from_value(value: Value) -> Object {
        Object {
            inner: Rc::new(RefCell::new(Inner {
                value,
                parent: Weak::new(),
                output_hook: None,
                leaf_hook: None,
                vector_hook: None,
                disabled: false,
                blob_disabled: false,
            })),
        }
    }

    pub fn null() -> Object {
        Object::from_value(Value::Null)
    }

    pub fn boolean(value: bool) -> Object {
        Object::from_value(Value::Boolean(value))
    }

    /// Builds a number node. NaN is not representable; it is logged and
    /// stored as zero.
    pub fn number(value: f64) -> Object {
        let value = if value.is_nan() {
            log::error!("NaN is not a representable number value, storing 0");
            0.0
        } else {
            value
        };
        Object::from_value(Value::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Object {
        let value = value.into();
        let raw_size = value.len();
        Object::from_value(Value::Str(Text { value, raw_size }))
    }

    /// Builds a string node whose text encodes a payload of `raw_size`
    /// bytes, e.g. base64 text carrying a binary blob.
    pub fn string_with_size(value: impl Into<String>, raw_size: usize) -> Object {
        Object::from_value(Value::Str(Text {
            value: value.into(),
            raw_size,
        }))
    }

    pub fn kind(&self) -> Kind {
        kind_of(&self.inner.borrow().value)
    }

    /// True when both handles address the same node.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.inner.borrow().value {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.inner.borrow().value {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn string_value(&self) -> Option<String> {
        match &self.inner.borrow().value {
            Value::Str(text) => Some(text.value.clone()),
            _ => None,
        }
    }

    /// Payload byte length of a string node.
    pub fn raw_size(&self) -> Option<usize> {
        match &self.inner.borrow().value {
            Value::Str(text) => Some(text.raw_size),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Object> {
        self.inner.borrow().parent.upgrade().map(|rc| Object { inner: rc })
    }

    pub(crate) fn set_parent(&self, parent: &Object) {
        self.inner.borrow_mut().parent = Rc::downgrade(&parent.inner);
    }

    pub(crate) fn clear_parent(&self) {
        self.inner.borrow_mut().parent = Weak::new();
    }

    /// True when `self` is `container` or one of its ancestors. Inserting
    /// `self` under `container` would then create a cycle.
    pub(crate) fn is_self_or_ancestor_of(&self, container: &Object) -> bool {
        let mut current = Some(container.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Stores a new value and notifies upward. Like every setter, returns
    /// whether the stored value differs from the old one.
    pub fn set_bool(&self, value: bool) -> bool {
        self.set_scalar(Value::Boolean(value), true)
    }

    pub fn set_bool_quiet(&self, value: bool) -> bool {
        self.set_scalar(Value::Boolean(value), false)
    }

    /// Stores a new number value and notifies upward. NaN is refused and
    /// reports no change.
    pub fn set_number(&self, value: f64) -> bool {
        self.set_number_impl(value, true)
    }

    pub fn set_number_quiet(&self, value: f64) -> bool {
        self.set_number_impl(value, false)
    }

    fn set_number_impl(&self, value: f64, notify: bool) -> bool {
        if value.is_nan() {
            log::error!("NaN is not a representable number value");
            return false;
        }
        self.set_scalar(Value::Number(value), notify)
    }

    pub fn set_string(&self, value: impl Into<String>) -> bool {
        let value = value.into();
        let raw_size = value.len();
        self.set_scalar(Value::Str(Text { value, raw_size }), true)
    }

    pub fn set_string_quiet(&self, value: impl Into<String>) -> bool {
        let value = value.into();
        let raw_size = value.len();
        self.set_scalar(Value::Str(Text { value, raw_size }), false)
    }

    pub fn set_string_with_size(&self, value: impl Into<String>, raw_size: usize) -> bool {
        self.set_scalar(
            Value::Str(Text {
                value: value.into(),
                raw_size,
            }),
            true,
        )
    }

    fn set_scalar(&self, new: Value, notify: bool) -> bool {
        let modified;
        {
            let mut inner = self.inner.borrow_mut();
            match (&mut inner.value, new) {
                (Value::Boolean(cur), Value::Boolean(v)) => {
                    modified = *cur != v;
                    *cur = v;
                }
                (Value::Number(cur), Value::Number(v)) => {
                    modified = *cur != v;
                    *cur = v;
                }
                (Value::Str(cur), Value::Str(v)) => {
                    modified = cur.value != v.value;
                    *cur = v;
                }
                (current, _) => {
                    log::error!("cannot store a scalar into a {:?} node", kind_of(current));
                    return false;
                }
            }
        }
        if notify {
            self.notify(modified);
        }
        modified
    }

    /// Value equality for scalars, identity equality for containers.
    /// String nodes compare by text only; payload sizes are ignored.
    pub fn equal(&self, other: &Object) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let a = self.inner.borrow();
        let b = other.inner.borrow();
        match (&a.value, &b.value) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x.value == y.value,
            _ => false,
        }
    }

    /// Runs the output hooks of this node and of every ancestor, nearest
    /// first. Hooks are cloned out before they run, so a handler may
    /// freely re-borrow the node it is called on.
    pub fn notify(&self, modified: bool) {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            let hook = node.inner.borrow().output_hook.clone();
            if let Some(hook) = hook {
                hook(&node, modified);
            }
            current = node.parent();
        }
    }

    pub fn set_output_hook(&self, hook: impl Fn(&Object, bool) + 'static) {
        self.inner.borrow_mut().output_hook = Some(Rc::new(hook));
    }

    pub fn clear_output_hook(&self) {
        self.inner.borrow_mut().output_hook = None;
    }

    pub fn set_leaf_hook(&self, hook: impl Fn(&Object, &Object) + 'static) {
        self.inner.borrow_mut().leaf_hook = Some(Rc::new(hook));
    }

    pub fn leaf_hook(&self) -> Option<LeafHook> {
        self.inner.borrow().leaf_hook.clone()
    }

    pub fn set_vector_hook(&self, hook: impl Fn(&Object, bool) + 'static) {
        self.inner.borrow_mut().vector_hook = Some(Rc::new(hook));
    }

    pub fn vector_hook(&self) -> Option<VectorHook> {
        self.inner.borrow().vector_hook.clone()
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.borrow().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.borrow_mut().disabled = disabled;
    }

    pub fn is_blob_disabled(&self) -> bool {
        self.inner.borrow().blob_disabled
    }

    pub fn set_blob_disabled(&self, disabled: bool) {
        self.inner.borrow_mut().blob_disabled = disabled;
    }

    /// Serializes the subtree as compact JSON: no whitespace, container
    /// entries in insertion order.
    pub fn to_json_string(&self) -> String {
        let mut out = TextBuilder::new();
        self.write_json(&mut out);
        out.build()
    }

    /// Like [`Object::to_json_string`], except a top-level string node
    /// renders as its bare text, without quotes or escaping.
    pub fn to_raw_string(&self) -> String {
        {
            let inner = self.inner.borrow();
            if let Value::Str(text) = &inner.value {
                return text.value.clone();
            }
        }
        self.to_json_string()
    }

    fn write_json(&self, out: &mut TextBuilder) {
        let inner = self.inner.borrow();
        match &inner.value {
            Value::Null => out.push("null"),
            Value::Boolean(true) => out.push("true"),
            Value::Boolean(false) => out.push("false"),
            Value::Number(value) => out.push(&format_number(*value)),
            Value::Str(text) => {
                out.push("\"");
                out.push_json(&text.value);
                out.push("\"");
            }
            Value::List(items) => {
                out.push("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(",");
                    }
                    item.write_json(out);
                }
                out.push("]");
            }
            Value::Dict(entries) => {
                out.push("{");
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push(",");
                    }
                    out.push("\"");
                    out.push_json(&entry.key);
                    out.push("\":");
                    entry.value.write_json(out);
                }
                out.push("}");
            }
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        self.equal(other)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.to_json_string()).finish()
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::boolean(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::number(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::number(value as f64)
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::string(value)
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::string(value)
    }
}

pub(crate) fn kind_of(value: &Value) -> Kind {
    match value {
        Value::Null => Kind::Null,
        Value::Boolean(_) => Kind::Boolean,
        Value::Number(_) => Kind::Number,
        Value::Str(_) => Kind::String,
        Value::List(_) => Kind::List,
        Value::Dict(_) => Kind::Dict,
    }
}

/// Formats a number the way the JSON encoder does: integral values below
/// 1e15 in magnitude render without a fraction, everything else uses the
/// shortest representation that round-trips through `str::parse::<f64>`.
/// Non-finite values render as `null` and clamped extremes.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "null".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "1e308".to_owned()
        } else {
            "-1e308".to_owned()
        };
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dict;
    use std::cell::Cell;

    #[test]
    fn scalars_compare_by_value() {
        assert!(Object::null().equal(&Object::null()));
        assert!(Object::boolean(true).equal(&Object::boolean(true)));
        assert!(!Object::boolean(true).equal(&Object::boolean(false)));
        assert!(Object::number(1.5).equal(&Object::number(1.5)));
        assert!(Object::string("a").equal(&Object::string("a")));
        assert!(!Object::string("a").equal(&Object::number(1.0)));
    }

    #[test]
    fn string_equality_ignores_raw_size() {
        let a = Object::string_with_size("cGF5bG9hZA==", 7);
        let b = Object::string("cGF5bG9hZA==");
        assert!(a.equal(&b));
    }

    #[test]
    fn containers_compare_by_identity() {
        let a = Dict::new().into_object();
        let b = Dict::new().into_object();
        assert!(!a.equal(&b));
        assert!(a.equal(&a.clone()));
    }

    #[test]
    fn notify_walks_to_the_root_nearest_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let root = Dict::new();
        let child = Dict::new();
        root.set("child", child.clone());
        let leaf = Object::number(1.0);
        child.set("leaf", leaf.clone());

        let o = order.clone();
        leaf.set_output_hook(move |_, _| o.borrow_mut().push("leaf"));
        let o = order.clone();
        child.as_object().set_output_hook(move |_, _| o.borrow_mut().push("child"));
        let o = order.clone();
        root.as_object().set_output_hook(move |_, _| o.borrow_mut().push("root"));

        leaf.set_number(2.0);
        assert_eq!(*order.borrow(), vec!["leaf", "child", "root"]);
    }

    #[test]
    fn notify_reports_modified_only_on_change() {
        let seen = Rc::new(Cell::new(None));
        let leaf = Object::number(4.0);
        let s = seen.clone();
        leaf.set_output_hook(move |_, modified| s.set(Some(modified)));

        leaf.set_number(4.0);
        assert_eq!(seen.get(), Some(false));
        leaf.set_number(5.0);
        assert_eq!(seen.get(), Some(true));
    }

    #[test]
    fn hooks_may_reborrow_their_node() {
        let leaf = Object::number(1.0);
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        leaf.set_output_hook(move |node, _| s.set(node.as_f64().unwrap_or(f64::MIN)));
        leaf.set_number(9.0);
        assert_eq!(seen.get(), 9.0);
    }

    #[test]
    fn setters_report_whether_the_value_changed() {
        let leaf = Object::string("On");
        assert!(!leaf.set_string("On"));
        assert!(leaf.set_string("Off"));
        let flag = Object::boolean(false);
        assert!(flag.set_bool(true));
        assert!(!flag.set_bool(true));
    }

    #[test]
    fn set_number_refuses_nan() {
        let leaf = Object::number(3.0);
        assert!(!leaf.set_number(f64::NAN));
        assert_eq!(leaf.as_f64(), Some(3.0));
    }

    #[test]
    fn typed_set_refuses_other_kinds() {
        let leaf = Object::string("x");
        assert!(!leaf.set_number(1.0));
        assert_eq!(leaf.string_value().as_deref(), Some("x"));
    }

    #[test]
    fn format_number_matches_encoder_rules() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(1e15), "1000000000000000");
        assert_eq!(format_number(f64::NAN), "null");
        assert_eq!(format_number(f64::INFINITY), "1e308");
        assert_eq!(format_number(f64::NEG_INFINITY), "-1e308");
    }
}
