use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::signal::Signal;
use crate::value::Value;

// ── Command ───────────────────────────────────────────────────────────────

/// An invocable action exposed by a model.
///
/// The binding engine only executes commands and mirrors their enabled
/// state onto views. What executing means is up to the implementation.
pub trait Command {
    fn execute(&self, parameter: Value);

    fn is_enabled(&self) -> bool {
        true
    }

    /// Fires with the new state whenever enablement changes.
    fn enabled_changed(&self) -> Option<&Signal<bool>> {
        None
    }
}

pub type CommandRef = Rc<dyn Command>;

// ── ActionCommand ─────────────────────────────────────────────────────────

/// A [`Command`] backed by a closure, with a toggleable enabled flag.
///
/// Executing a disabled command does nothing.
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tether_core::{ActionCommand, Command, Value};
///
/// let total = Rc::new(Cell::new(0));
/// let t = Rc::clone(&total);
/// let add = ActionCommand::new(move |p| t.set(t.get() + p.as_int().unwrap_or(1)));
/// add.execute(Value::Int(5));
/// add.set_enabled(false);
/// add.execute(Value::Int(5));
/// assert_eq!(total.get(), 5);
/// ```
pub struct ActionCommand {
    action: Box<dyn Fn(&Value)>,
    enabled: Cell<bool>,
    enabled_changed: Signal<bool>,
}

impl ActionCommand {
    pub fn new(action: impl Fn(&Value) + 'static) -> Self {
        Self {
            action: Box::new(action),
            enabled: Cell::new(true),
            enabled_changed: Signal::new(),
        }
    }

    pub fn into_ref(self) -> CommandRef {
        Rc::new(self)
    }

    /// Change enablement; subscribers hear about it only on an actual change.
    pub fn set_enabled(&self, enabled: bool) {
        if self.enabled.replace(enabled) != enabled {
            self.enabled_changed.emit(&enabled);
        }
    }
}

impl Command for ActionCommand {
    fn execute(&self, parameter: Value) {
        if !self.enabled.get() {
            log::debug!("ignoring execute on a disabled command");
            return;
        }
        (self.action)(&parameter);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn enabled_changed(&self) -> Option<&Signal<bool>> {
        Some(&self.enabled_changed)
    }
}

impl fmt::Debug for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCommand")
            .field("enabled", &self.enabled.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn enabled_changes_are_reported_once() {
        let cmd = ActionCommand::new(|_| {});
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = cmd.enabled_changed().unwrap().subscribe(move |e| s.borrow_mut().push(*e));
        cmd.set_enabled(false);
        cmd.set_enabled(false);
        cmd.set_enabled(true);
        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn execute_passes_parameter() {
        let got = Rc::new(RefCell::new(Value::Null));
        let g = Rc::clone(&got);
        let cmd = ActionCommand::new(move |p| *g.borrow_mut() = p.clone());
        cmd.execute(Value::from("lot-7"));
        assert_eq!(*got.borrow(), Value::from("lot-7"));
    }
}
