//! Index-addressed container with insertion order.

use crate::object::{Object, Value};

/// Kind-checked handle to a list node. Writing an index that exists
/// replaces the item in place; writing past the end appends at the tail.
#[derive(Debug, Clone)]
pub struct List {
    obj: Object,
}

impl Default for List {
    fn default() -> List {
        List::new()
    }
}

impl List {
    pub fn new() -> List {
        List {
            obj: Object::from_value(Value::List(Vec::new())),
        }
    }

    /// Reinterprets a handle as a list. Returns `None` when the node is
    /// not a list.
    pub fn from_object(obj: &Object) -> Option<List> {
        match obj.inner.borrow().value {
            Value::List(_) => Some(List { obj: obj.clone() }),
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
            Value::List(items) => items.len(),
            _ => unreachable!("list handle without list value"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Object> {
        match &self.obj.inner.borrow().value {
            Value::List(items) => items.get(index).cloned(),
            _ => unreachable!("list handle without list value"),
        }
    }

    /// Stores `value` at `index`, appending at the tail when the index is
    /// out of range, and notifies upward from this list. Returns whether
    /// the stored value differs from the old one per [`Object::equal`],
    /// and false without storing when the insertion would create a cycle.
    pub fn set(&self, index: usize, value: impl Into<Object>) -> bool {
        self.set_impl(index, value.into(), true)
    }

    /// Same as [`List::set`] without the notification.
    pub fn set_quiet(&self, index: usize, value: impl Into<Object>) -> bool {
        self.set_impl(index, value.into(), false)
    }

    /// Appends at the tail and notifies upward.
    pub fn push(&self, value: impl Into<Object>) -> bool {
        self.set_impl(usize::MAX, value.into(), true)
    }

    pub fn push_quiet(&self, value: impl Into<Object>) -> bool {
        self.set_impl(usize::MAX, value.into(), false)
    }

    fn set_impl(&self, index: usize, value: Object, notify: bool) -> bool {
        if value.is_self_or_ancestor_of(&self.obj) {
            log::error!("refusing to insert an ancestor at index {index}");
            return false;
        }
        value.set_parent(&self.obj);
        let new = value.clone();
        let modified;
        let replaced;
        {
            let mut inner = self.obj.inner.borrow_mut();
            let items = match &mut inner.value {
                Value::List(items) => items,
                _ => unreachable!("list handle without list value"),
            };
            match items.get_mut(index) {
                Some(slot) => {
                    modified = !slot.equal(&value);
                    replaced = Some(std::mem::replace(slot, value));
                }
                None => {
                    modified = true;
                    replaced = None;
                    items.push(value);
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

    /// Unlinks the item at `index`. Does not notify.
    pub fn del(&self, index: usize) -> bool {
        let removed;
        {
            let mut inner = self.obj.inner.borrow_mut();
            let items = match &mut inner.value {
                Value::List(items) => items,
                _ => unreachable!("list handle without list value"),
            };
            if index >= items.len() {
                return false;
            }
            removed = items.remove(index);
        }
        removed.clear_parent();
        true
    }

    /// Unlinks every item, then notifies upward once.
    pub fn clear(&self) {
        let old;
        {
            let mut inner = self.obj.inner.borrow_mut();
            let items = match &mut inner.value {
                Value::List(items) => items,
                _ => unreachable!("list handle without list value"),
            };
            old = std::mem::take(items);
        }
        for item in &old {
            item.clear_parent();
        }
        self.obj.notify(true);
    }

    /// Iterates over a snapshot of the items taken when the iterator is
    /// created.
    pub fn iter(&self) -> std::vec::IntoIter<Object> {
        let snapshot: Vec<_> = match &self.obj.inner.borrow().value {
            Value::List(items) => items.to_vec(),
            _ => unreachable!("list handle without list value"),
        };
        snapshot.into_iter()
    }

    pub fn to_json_string(&self) -> String {
        self.obj.to_json_string()
    }
}

impl From<List> for Object {
    fn from(list: List) -> Self {
        list.into_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_appends_in_order() {
        let l = List::new();
        l.push(1.0);
        l.push("two");
        l.push(true);
        assert_eq!(l.to_json_string(), "[1,\"two\",true]");
    }

    #[test]
    fn set_replaces_in_range_and_appends_out_of_range() {
        let l = List::new();
        l.push(1.0);
        l.push(2.0);
        assert!(l.set(0, 9.0));
        assert!(!l.set(0, 9.0));
        l.set(7, 3.0);
        assert_eq!(l.to_json_string(), "[9,2,3]");
    }

    #[test]
    fn get_out_of_range_is_none() {
        let l = List::new();
        l.push(1.0);
        assert!(l.get(1).is_none());
    }

    #[test]
    fn del_shifts_remaining_items() {
        let l = List::new();
        l.push(1.0);
        l.push(2.0);
        l.push(3.0);
        assert!(l.del(1));
        assert!(!l.del(5));
        assert_eq!(l.to_json_string(), "[1,3]");
    }

    #[test]
    fn nested_containers_serialize_in_order() {
        let l = List::new();
        let d = crate::Dict::new();
        d.set("k", "v");
        l.push(d);
        l.push(List::new());
        assert_eq!(l.to_json_string(), "[{\"k\":\"v\"},[]]");
    }
}
