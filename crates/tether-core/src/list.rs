use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::signal::Signal;
use crate::value::Value;

// ── ListChange ────────────────────────────────────────────────────────────

/// A structural edit reported by [`ObservableList::changed`].
///
/// Indices refer to the list *after* the edit, except `Removed::index`,
/// which is where the removed run used to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Inserted { index: usize, count: usize },
    Removed { index: usize, count: usize },
    Moved { from: usize, to: usize },
    Replaced { index: usize },
    /// Contents replaced wholesale.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} out of bounds for list of length {len}")]
pub struct OutOfBounds {
    pub index: usize,
    pub len: usize,
}

// ── ObservableList ────────────────────────────────────────────────────────

/// A model collection that reports structural edits.
pub struct ObservableList {
    items: RefCell<Vec<Value>>,
    changed: Signal<ListChange>,
}

pub type ListRef = Rc<ObservableList>;

impl ObservableList {
    pub fn new() -> Self {
        Self { items: RefCell::new(Vec::new()), changed: Signal::new() }
    }

    pub fn new_ref() -> ListRef {
        Rc::new(Self::new())
    }

    pub fn from_items<I, V>(items: I) -> ListRef
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Rc::new(Self {
            items: RefCell::new(items.into_iter().map(Into::into).collect()),
            changed: Signal::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn changed(&self) -> &Signal<ListChange> {
        &self.changed
    }

    // ── Mutation ──────────────────────────────────────────────────────────
    //
    // Each edit releases the borrow before emitting, so subscribers may read
    // the list (or edit it again) from inside their callback.

    pub fn push(&self, value: impl Into<Value>) {
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(value.into());
            items.len() - 1
        };
        self.changed.emit(&ListChange::Inserted { index, count: 1 });
    }

    /// Insert at `index`; `index == len` appends.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<(), OutOfBounds> {
        {
            let mut items = self.items.borrow_mut();
            let len = items.len();
            if index > len {
                return Err(OutOfBounds { index, len });
            }
            items.insert(index, value.into());
        }
        self.changed.emit(&ListChange::Inserted { index, count: 1 });
        Ok(())
    }

    pub fn remove(&self, index: usize) -> Result<Value, OutOfBounds> {
        let removed = {
            let mut items = self.items.borrow_mut();
            let len = items.len();
            if index >= len {
                return Err(OutOfBounds { index, len });
            }
            items.remove(index)
        };
        self.changed.emit(&ListChange::Removed { index, count: 1 });
        Ok(removed)
    }

    pub fn move_item(&self, from: usize, to: usize) -> Result<(), OutOfBounds> {
        {
            let mut items = self.items.borrow_mut();
            let len = items.len();
            for index in [from, to] {
                if index >= len {
                    return Err(OutOfBounds { index, len });
                }
            }
            if from == to {
                return Ok(());
            }
            let item = items.remove(from);
            items.insert(to, item);
        }
        self.changed.emit(&ListChange::Moved { from, to });
        Ok(())
    }

    pub fn replace(&self, index: usize, value: impl Into<Value>) -> Result<Value, OutOfBounds> {
        let old = {
            let mut items = self.items.borrow_mut();
            let len = items.len();
            let slot = items.get_mut(index).ok_or(OutOfBounds { index, len })?;
            std::mem::replace(slot, value.into())
        };
        self.changed.emit(&ListChange::Replaced { index });
        Ok(old)
    }

    /// Replace the whole contents and emit [`ListChange::Reset`].
    pub fn reset<I, V>(&self, items: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        *self.items.borrow_mut() = items.into_iter().map(Into::into).collect();
        self.changed.emit(&ListChange::Reset);
    }

    pub fn clear(&self) {
        self.reset(std::iter::empty::<Value>());
    }
}

impl Default for ObservableList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObservableList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(list: &ObservableList) -> (Rc<RefCell<Vec<ListChange>>>, crate::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let sub = list.changed().subscribe(move |c| s.borrow_mut().push(*c));
        (seen, sub)
    }

    #[test]
    fn edits_emit_changes() {
        let list = ObservableList::from_items(["a", "b"]);
        let (seen, _sub) = recorder(&list);
        list.push("c");
        list.insert(0, "z").unwrap();
        list.move_item(0, 3).unwrap();
        list.remove(1).unwrap();
        list.replace(0, "y").unwrap();
        list.clear();
        assert_eq!(
            *seen.borrow(),
            vec![
                ListChange::Inserted { index: 2, count: 1 },
                ListChange::Inserted { index: 0, count: 1 },
                ListChange::Moved { from: 0, to: 3 },
                ListChange::Removed { index: 1, count: 1 },
                ListChange::Replaced { index: 0 },
                ListChange::Reset,
            ]
        );
    }

    #[test]
    fn move_reorders() {
        let list = ObservableList::from_items([1, 2, 3]);
        list.move_item(2, 0).unwrap();
        assert_eq!(list.snapshot(), vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn out_of_bounds_edits_do_not_emit() {
        let list = ObservableList::from_items([1]);
        let (seen, _sub) = recorder(&list);
        assert_eq!(list.insert(3, 0), Err(OutOfBounds { index: 3, len: 1 }));
        assert!(list.remove(1).is_err());
        assert!(list.move_item(0, 5).is_err());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn subscriber_can_read_during_emit() {
        let list = ObservableList::from_items([1]);
        let l = Rc::clone(&list);
        let lens = Rc::new(RefCell::new(Vec::new()));
        let lens2 = Rc::clone(&lens);
        let _sub = list.changed().subscribe(move |_| lens2.borrow_mut().push(l.len()));
        list.push(2);
        assert_eq!(*lens.borrow(), vec![2]);
    }
}
