//! Model collection ↔ list surface.
//!
//! A [`ListAdapter`] renders the rows of an [`ObservableList`] onto a
//! [`ListSurface`], follows the list's structural changes, and turns
//! user edits (insert / remove / move) and row selection into model
//! commands. It never mutates the list itself: the model owns the list
//! contents, and the adapter only re-renders when the list reports a change.
//!
//! [`ObservableList`]: tether_core::ObservableList

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tether_core::{AccessError, ListChange, ListRef, Object, ObjectRef, Subscription, Value, ValueKind};

use crate::error::BindError;
use crate::hooks::{invoke_command, HooksRef, ViewHooks};
use crate::view::{Row, View, ViewRef};

// ── ListEdit ──────────────────────────────────────────────────────────────

/// Parameter passed to a list's add and remove commands.
///
/// Exposed to commands as an [`Object`] with the read-only members
/// `Index` and `Item`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEdit {
    pub index: usize,
    pub item: Value,
}

impl ListEdit {
    pub fn new(index: usize, item: impl Into<Value>) -> Self {
        Self { index, item: item.into() }
    }

    pub fn into_value(self) -> Value {
        Value::Object(Rc::new(self))
    }

    /// Read an edit back out of a command parameter.
    ///
    /// Accepts any object with an int `Index` and an `Item` member.
    pub fn from_value(value: &Value) -> Option<ListEdit> {
        let obj = value.as_object()?;
        let index = usize::try_from(obj.get("Index").ok()?.as_int()?).ok()?;
        let item = obj.get("Item").ok()?;
        Some(ListEdit { index, item })
    }
}

impl Object for ListEdit {
    fn type_name(&self) -> &str {
        "ListEdit"
    }

    fn get(&self, member: &str) -> Result<Value, AccessError> {
        match member {
            "Index" => Ok(Value::from(self.index)),
            "Item" => Ok(self.item.clone()),
            _ => Err(AccessError::no_such_member("ListEdit", member)),
        }
    }

    fn set(&self, member: &str, _value: Value) -> Result<(), AccessError> {
        if self.has_member(member) {
            Err(AccessError::read_only("ListEdit", member))
        } else {
            Err(AccessError::no_such_member("ListEdit", member))
        }
    }

    fn has_member(&self, member: &str) -> bool {
        matches!(member, "Index" | "Item")
    }
}

// ── Configuration ─────────────────────────────────────────────────────────

/// What a row selection does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Write the selected item to this model property.
    Property(String),
    /// Execute this model command with the selected item.
    Command(String),
}

/// The per-surface settings taken from a binding's `{List ...}` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListConfig {
    pub item_template: String,
    pub add_command: Option<String>,
    pub remove_command: Option<String>,
    /// `true`, `false`, or a member name read from the item or the model.
    pub can_edit: Option<String>,
    pub can_move: Option<String>,
    pub selection: Option<Selection>,
}

// ── ListAdapter ───────────────────────────────────────────────────────────

struct AdapterState {
    config: ListConfig,
    view: Weak<dyn View>,
    model: ObjectRef,
    hooks: Option<HooksRef>,
    list: Option<ListRef>,
    listening: bool,
    list_sub: Option<Subscription>,
    selection_sub: Option<Subscription>,
}

/// Shared handle to the adapter driving one list surface.
///
/// Cloning yields another handle to the same adapter; the surface keeps one
/// so a second binding to the same surface reuses it.
#[derive(Clone)]
pub struct ListAdapter {
    inner: Rc<RefCell<AdapterState>>,
}

impl ListAdapter {
    pub(crate) fn new(view: &ViewRef, model: ObjectRef, config: ListConfig, hooks: Option<HooksRef>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(AdapterState {
                config,
                view: Rc::downgrade(view),
                model,
                hooks,
                list: None,
                listening: false,
                list_sub: None,
                selection_sub: None,
            })),
        }
    }

    pub fn config(&self) -> ListConfig {
        self.inner.borrow().config.clone()
    }

    pub fn list(&self) -> Option<ListRef> {
        self.inner.borrow().list.clone()
    }

    pub fn is_listening(&self) -> bool {
        self.inner.borrow().listening
    }

    /// `true` when both handles drive the same adapter.
    pub fn ptr_eq(&self, other: &ListAdapter) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn set_model(&self, model: ObjectRef) {
        self.inner.borrow_mut().model = model;
    }

    /// Hand the adapter to a new binding: new model, settings and hooks.
    pub(crate) fn retarget(&self, model: ObjectRef, config: ListConfig, hooks: Option<HooksRef>) {
        let mut st = self.inner.borrow_mut();
        st.model = model;
        st.config = config;
        st.hooks = hooks;
    }

    /// Replace the backing list and re-render every row.
    pub fn set_list(&self, list: Option<ListRef>) {
        let resubscribe = {
            let mut st = self.inner.borrow_mut();
            let same = match (&st.list, &list) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            st.list = list;
            !same && st.listening
        };
        if resubscribe {
            let sub = self.subscribe_list();
            self.inner.borrow_mut().list_sub = sub;
        }
        self.reload();
    }

    /// Start following list changes and row selection. Idempotent.
    pub fn add_handlers(&self) {
        if self.inner.borrow().listening {
            return;
        }
        let list_sub = self.subscribe_list();
        let selection_sub = self.subscribe_selection();
        let mut st = self.inner.borrow_mut();
        st.list_sub = list_sub;
        st.selection_sub = selection_sub;
        st.listening = true;
    }

    /// Stop following list changes and row selection. Idempotent.
    pub fn remove_handlers(&self) {
        let (list_sub, selection_sub) = {
            let mut st = self.inner.borrow_mut();
            st.listening = false;
            (st.list_sub.take(), st.selection_sub.take())
        };
        drop(list_sub);
        drop(selection_sub);
    }

    fn subscribe_list(&self) -> Option<Subscription> {
        let list = self.inner.borrow().list.clone()?;
        let weak = Rc::downgrade(&self.inner);
        Some(list.changed().subscribe(move |change| {
            if let Some(inner) = weak.upgrade() {
                ListAdapter { inner }.on_list_changed(change);
            }
        }))
    }

    fn subscribe_selection(&self) -> Option<Subscription> {
        let view = self.inner.borrow().view.upgrade()?;
        let selected = view.list_surface()?.selected()?;
        let weak = Rc::downgrade(&self.inner);
        Some(selected.subscribe(move |row| {
            if let Some(inner) = weak.upgrade() {
                if let Err(e) = (ListAdapter { inner }).select(*row) {
                    log::warn!("list selection failed: {e}");
                }
            }
        }))
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    /// The rows the surface should currently show.
    pub fn rows(&self) -> Vec<Row> {
        let (items, template, hooks) = {
            let st = self.inner.borrow();
            let items = st.list.as_ref().map(|l| l.snapshot()).unwrap_or_default();
            (items, st.config.item_template.clone(), st.hooks.clone())
        };
        items
            .into_iter()
            .map(|item| {
                let template = hooks
                    .as_deref()
                    .and_then(|h: &dyn ViewHooks| h.item_template(&template, &item))
                    .unwrap_or_else(|| template.clone());
                Row { template, item }
            })
            .collect()
    }

    /// Re-render every row.
    pub fn reload(&self) {
        let Some(view) = self.inner.borrow().view.upgrade() else { return };
        let rows = self.rows();
        if let Some(surface) = view.list_surface() {
            log::trace!("reloading {} rows", rows.len());
            surface.reload(rows);
        }
    }

    fn on_list_changed(&self, change: &ListChange) {
        let (view, hooks) = {
            let st = self.inner.borrow();
            (st.view.upgrade(), st.hooks.clone())
        };
        let Some(view) = view else { return };
        let rows = self.rows();
        if let Some(surface) = view.list_surface() {
            surface.apply_change(change, rows);
        }
        if let Some(h) = hooks {
            h.list_changed(&view, change);
        }
    }

    // ── Edit permissions ──────────────────────────────────────────────────

    fn flag(&self, flag: Option<&str>, item: &Value, absent: bool) -> Result<bool, BindError> {
        let Some(flag) = flag else { return Ok(absent) };
        if flag.eq_ignore_ascii_case("true") {
            return Ok(true);
        }
        if flag.eq_ignore_ascii_case("false") {
            return Ok(false);
        }

        let value = match item.as_object() {
            Some(obj) if obj.has_member(flag) => obj.get(flag)?,
            _ => {
                let model = self.inner.borrow().model.clone();
                model.get(flag)?
            }
        };
        value.as_bool().ok_or_else(|| {
            BindError::Access(AccessError::TypeMismatch {
                type_name: "list flag".to_string(),
                member: flag.to_string(),
                expected: ValueKind::Bool,
                found: value.kind(),
            })
        })
    }

    /// Whether `item` may be inserted or removed.
    ///
    /// Without a `CanEdit` flag an edit is allowed when the add or remove
    /// command it would need is configured.
    pub fn can_edit(&self, item: &Value) -> Result<bool, BindError> {
        let cfg = self.config();
        let has_command = cfg.add_command.is_some() || cfg.remove_command.is_some();
        self.flag(cfg.can_edit.as_deref(), item, has_command)
    }

    /// Whether `item` may be moved. Moves are denied without a `CanMove` flag.
    pub fn can_move(&self, item: &Value) -> Result<bool, BindError> {
        let cfg = self.config();
        self.flag(cfg.can_move.as_deref(), item, false)
    }

    // ── Structural edits ──────────────────────────────────────────────────
    //
    // Each edit is validated, then executed as a model command. `Ok(false)`
    // means the edit was rejected and nothing happened. No borrow of the
    // adapter is held while a command runs: the command edits the list and
    // the resulting change notification re-enters the adapter.

    /// Ask the model to insert `item` at `index` (`index == len` appends).
    pub fn insert(&self, index: usize, item: Value) -> Result<bool, BindError> {
        let Some(command) = self.config().add_command else { return Ok(false) };
        if index > self.len() || !self.can_edit(&item)? {
            log::debug!("insert at {index} rejected");
            return Ok(false);
        }
        self.run(&command, ListEdit::new(index, item))?;
        Ok(true)
    }

    /// Ask the model to remove the row at `index`.
    pub fn remove(&self, index: usize) -> Result<bool, BindError> {
        let Some(command) = self.config().remove_command else { return Ok(false) };
        let Some(item) = self.item(index) else { return Ok(false) };
        if !self.can_edit(&item)? {
            log::debug!("remove at {index} rejected");
            return Ok(false);
        }
        self.run(&command, ListEdit::new(index, item))?;
        Ok(true)
    }

    /// Ask the model to move a row: a remove at `from` then an add at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> Result<bool, BindError> {
        let cfg = self.config();
        let (Some(add), Some(remove)) = (cfg.add_command, cfg.remove_command) else {
            return Ok(false);
        };
        let Some(item) = self.item(from) else { return Ok(false) };
        if to >= self.len() || from == to || !self.can_move(&item)? {
            log::debug!("move {from} -> {to} rejected");
            return Ok(false);
        }
        self.run(&remove, ListEdit::new(from, item.clone()))?;
        self.run(&add, ListEdit::new(to, item))?;
        Ok(true)
    }

    /// Handle a row selection from the surface.
    pub fn select(&self, row: usize) -> Result<(), BindError> {
        let (selection, model) = {
            let st = self.inner.borrow();
            (st.config.selection.clone(), st.model.clone())
        };
        let (Some(selection), Some(item)) = (selection, self.item(row)) else {
            return Ok(());
        };
        match selection {
            Selection::Property(name) => model.set(&name, item)?,
            Selection::Command(name) => self.run(&name, item)?,
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.borrow().list.as_ref().map_or(0, |l| l.len())
    }

    fn item(&self, index: usize) -> Option<Value> {
        self.inner.borrow().list.as_ref()?.get(index)
    }

    fn run(&self, command: &str, parameter: impl Into<Value>) -> Result<(), BindError> {
        let (model, hooks) = {
            let st = self.inner.borrow();
            (st.model.clone(), st.hooks.clone())
        };
        invoke_command(&*model, hooks.as_deref(), command, parameter.into())?;
        Ok(())
    }
}

impl From<ListEdit> for Value {
    fn from(edit: ListEdit) -> Self {
        edit.into_value()
    }
}

impl fmt::Debug for ListAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.borrow();
        f.debug_struct("ListAdapter")
            .field("config", &st.config)
            .field("rows", &st.list.as_ref().map(|l| l.len()))
            .field("listening", &st.listening)
            .finish()
    }
}
