//! Single-threaded change notification.
//!
//! A [`Signal<T>`] holds a list of callbacks. [`Signal::subscribe`] returns a
//! [`Subscription`] guard; dropping the guard removes the callback. Every
//! notification in tether (member changes, list edits, command enablement,
//! view activation) is a `Signal`.
//!
//! # Invariants
//!
//! 1. Callbacks run synchronously, in subscription order, inside `emit`.
//! 2. `emit` snapshots the callback list first, so a callback may subscribe
//!    or unsubscribe (on this or any other signal) without a borrow panic.
//! 3. A subscription dropped before an `emit` starts is never called by it.
//! 4. A `Subscription` may outlive its `Signal`; dropping it is then a no-op.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Slots<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

// ── Signal ────────────────────────────────────────────────────────────────

pub struct Signal<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots { next_id: 0, entries: Vec::new() })),
        }
    }

    /// Register `f`; it runs on every `emit` until the returned guard drops.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, Rc::new(f)));
            id
        };

        let weak: Weak<RefCell<Slots<T>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.borrow_mut().entries.retain(|(i, _)| *i != id);
            }
        })
    }

    /// Call every current subscriber with `value`.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .slots
            .borrow()
            .entries
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for f in snapshot {
            f(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().entries.len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.slots.borrow().entries.len())
            .finish()
    }
}

// ── Subscription ──────────────────────────────────────────────────────────

/// RAII guard for a [`Signal`] callback. Unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn cancel(mut self) {
        if let Some(c) = self.cancel.take() {
            c();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(c) = self.cancel.take() {
            c();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emits_in_subscription_order() {
        let signal = Signal::<i32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2) = (Rc::clone(&log), Rc::clone(&log));
        let _a = signal.subscribe(move |v| l1.borrow_mut().push(("a", *v)));
        let _b = signal.subscribe(move |v| l2.borrow_mut().push(("b", *v)));
        signal.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn drop_unsubscribes() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |_| h.set(h.get() + 1));
        signal.emit(&());
        drop(sub);
        signal.emit(&());
        assert_eq!(hits.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn callback_may_subscribe_during_emit() {
        let signal = Rc::new(Signal::<()>::new());
        let held = Rc::new(RefCell::new(Vec::new()));
        let (s, h) = (Rc::clone(&signal), Rc::clone(&held));
        let _outer = signal.subscribe(move |_| {
            h.borrow_mut().push(s.subscribe(|_| {}));
        });
        signal.emit(&());
        assert_eq!(signal.subscriber_count(), 2);
    }

    #[test]
    fn subscription_outlives_signal() {
        let signal = Signal::<u8>::new();
        let sub = signal.subscribe(|_| {});
        drop(signal);
        sub.cancel();
    }
}
