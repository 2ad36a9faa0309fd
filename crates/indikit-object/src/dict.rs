//! String-keyed container with insertion order.

use crate::list::List;
use crate::object::{Entry, Object, Value};

/// Kind-checked handle to a dict node. Entries keep insertion order;
/// writing an existing key replaces the value in place and keeps the
/// key's position.
#[derive(Debug, Clone)]
pub struct Dict {
    obj: Object,
}

impl Default for Dict {
    fn default() -> Dict {
        Dict::new()
    }
}

impl Dict {
    pub fn new() -> Dict {
        Dict {
            obj: Object::from_value(Value::Dict(Vec::new())),
        }
    }

    /// Reinterprets a handle as a dict. Returns `None` when the node is
    /// not a dict.
    pub fn from_object(obj: &Object) -> Option<Dict> {
        match obj.inner.borrow().value {
            Value::Dict(_) => Some(Dict { obj: obj.clone() }),
            _ => None,
        }
    }

    pub fn as_object(&self) -> &Object {
        &self.obj
    }

    pub fn into_object(self) -> Object {
        self.obj
    }

    pub fn len(&self) -> usize {
        match &self.obj.inner.borrow().value {
            Value::Dict(entries) => entries.len(),
            _ => unreachable!("dict handle without dict value"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a handle to the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Object> {
        match &self.obj.inner.borrow().value {
            Value::Dict(entries) => entries
                .iter()
                .find(|entry| entry.key == key)
                .map(|entry| entry.value.clone()),
            _ => unreachable!("dict handle without dict value"),
        }
    }

    /// Stores `value` under `key` and notifies upward from this dict.
    /// Replaces in place when the key exists, appends at the tail when it
    /// does not. Returns whether the stored value differs from the old one
    /// per [`Object::equal`], so re-setting an equal value reports false.
    /// Also returns false without storing when the insertion would create
    /// a cycle.
    pub fn set(&self, key: &str, value: impl Into<Object>) -> bool {
        self.set_impl(key, value.into(), true)
    }

    /// Same as [`Dict::set`] without the notification.
    pub fn set_quiet(&self, key: &str, value: impl Into<Object>) -> bool {
        self.set_impl(key, value.into(), false)
    }

    fn set_impl(&self, key: &str, value: Object, notify: bool) -> bool {
        if value.is_self_or_ancestor_of(&self.obj) {
            log::error!("refusing to insert an ancestor under key `{key}`");
            return false;
        }
        value.set_parent(&self.obj);
        let new = value.clone();
        let modified;
        let replaced;
        {
            let mut inner = self.obj.inner.borrow_mut();
            let entries = match &mut inner.value {
                Value::Dict(entries) => entries,
                _ => unreachable!("dict handle without dict value"),
            };
            match entries.iter_mut().find(|entry| entry.key == key) {
                Some(entry) => {
                    // equal() borrows the children, not this dict.
                    modified = !entry.value.equal(&value);
                    replaced = Some(std::mem::replace(&mut entry.value, value));
                }
                None => {
                    modified = true;
                    replaced = None;
                    entries.push(Entry {
                        key: key.to_owned(),
                        value,
                    });
                }
            }
        }
        if let Some(old) = replaced {
            if !old.ptr_eq(&new) {
                old.clear_parent();
            }
        }
        if notify {
            self.obj.notify(modified);
        }
        modified
    }

    /// Unlinks the first entry stored under `key`. Does not notify.
    pub fn del(&self, key: &str) -> bool {
        let removed;
        {
            let mut inner = self.obj.inner.borrow_mut();
            let entries = match &mut inner.value {
                Value::Dict(entries) => entries,
                _ => unreachable!("dict handle without dict value"),
            };
            removed = entries
                .iter()
                .position(|entry| entry.key == key)
                .map(|i| entries.remove(i));
        }
        match removed {
            Some(entry) => {
                entry.value.clear_parent();
                true
            }
            None => false,
        }
    }

    /// Unlinks every entry, then notifies upward once.
    pub fn clear(&self) {
        let old;
        {
            let mut inner = self.obj.inner.borrow_mut();
            let entries = match &mut inner.value {
                Value::Dict(entries) => entries,
                _ => unreachable!("dict handle without dict value"),
            };
            old = std::mem::take(entries);
        }
        for entry in &old {
            entry.value.clear_parent();
        }
        self.obj.notify(true);
    }

    /// Iterates over a snapshot of the entries taken when the iterator is
    /// created. Mutating the dict while iterating affects the dict, not
    /// the snapshot.
    pub fn iter(&self) -> std::vec::IntoIter<(String, Object)> {
        let snapshot: Vec<_> = match &self.obj.inner.borrow().value {
            Value::Dict(entries) => entries
                .iter()
                .map(|entry| (entry.key.clone(), entry.value.clone()))
                .collect(),
            _ => unreachable!("dict handle without dict value"),
        };
        snapshot.into_iter()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Value under `key` when it is a string node.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)?.string_value()
    }

    /// Value under `key` when it is a number node.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_dict(&self, key: &str) -> Option<Dict> {
        Dict::from_object(&self.get(key)?)
    }

    pub fn get_list(&self, key: &str) -> Option<List> {
        List::from_object(&self.get(key)?)
    }

    pub fn to_json_string(&self) -> String {
        self.obj.to_json_string()
    }
}

impl From<Dict> for Object {
    fn from(dict: Dict) -> Self {
        dict.into_object()
    }
}
